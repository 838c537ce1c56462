//! Ready-made callback shapes for common control topics.

use crate::error::NodeResult;
use crate::playback::StateCommand;

/// Maps `on` / `off` payloads to two handlers.
///
/// Any other payload is reported as `UnrecognizedCommand` without calling
/// either handler.
pub fn on_off_action<On, Off>(on: On, off: Off) -> impl Fn(&str) -> NodeResult<()> + Send + Sync
where
    On: Fn() + Send + Sync + 'static,
    Off: Fn() + Send + Sync + 'static,
{
    move |payload: &str| {
        match payload.parse::<StateCommand>()? {
            StateCommand::On => on(),
            StateCommand::Off => off(),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NodeError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn dispatches_on_and_off() {
        let ons = Arc::new(AtomicUsize::new(0));
        let offs = Arc::new(AtomicUsize::new(0));
        let action = {
            let ons = ons.clone();
            let offs = offs.clone();
            on_off_action(
                move || {
                    ons.fetch_add(1, Ordering::SeqCst);
                },
                move || {
                    offs.fetch_add(1, Ordering::SeqCst);
                },
            )
        };

        action("on").unwrap();
        action("off").unwrap();
        action("on").unwrap();
        assert!(matches!(action("On"), Err(NodeError::UnrecognizedCommand(_))));

        assert_eq!(ons.load(Ordering::SeqCst), 2);
        assert_eq!(offs.load(Ordering::SeqCst), 1);
    }
}
