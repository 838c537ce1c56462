//! State emitter abstraction for decoupling the controller from transport.
//!
//! The playback controller depends on the [`StateEmitter`] trait rather than on
//! the messaging transport, so it can be driven in tests and headless setups.

use super::StateSnapshot;

/// Trait for emitting state snapshots without knowledge of transport.
///
/// # Example
///
/// ```ignore
/// struct MyService {
///     emitter: Arc<dyn StateEmitter>,
/// }
///
/// impl MyService {
///     fn volume_changed(&self, snapshot: StateSnapshot) {
///         self.emitter.emit_state(&snapshot);
///     }
/// }
/// ```
pub trait StateEmitter: Send + Sync {
    /// Emits a state snapshot.
    fn emit_state(&self, snapshot: &StateSnapshot);
}

/// No-op emitter for testing or nodes without a state topic.
pub struct NoopStateEmitter;

impl StateEmitter for NoopStateEmitter {
    fn emit_state(&self, _snapshot: &StateSnapshot) {}
}

/// Logging emitter for debugging and development.
///
/// Logs all snapshots at debug level.
pub struct LoggingStateEmitter;

impl StateEmitter for LoggingStateEmitter {
    fn emit_state(&self, snapshot: &StateSnapshot) {
        tracing::debug!(?snapshot, "state_snapshot");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Test emitter that counts snapshots.
    struct CountingStateEmitter {
        count: AtomicUsize,
    }

    impl StateEmitter for CountingStateEmitter {
        fn emit_state(&self, _snapshot: &StateSnapshot) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn emitters_are_usable_as_trait_objects() {
        let counting = Arc::new(CountingStateEmitter {
            count: AtomicUsize::new(0),
        });
        let emitters: Vec<Arc<dyn StateEmitter>> = vec![
            Arc::new(NoopStateEmitter),
            Arc::new(LoggingStateEmitter),
            counting.clone(),
        ];
        let snapshot = StateSnapshot {
            is_on: true,
            volume: 5,
            title: None,
            audio_menu: None,
        };

        for emitter in &emitters {
            emitter.emit_state(&snapshot);
        }

        assert_eq!(counting.count.load(Ordering::SeqCst), 1);
    }
}
