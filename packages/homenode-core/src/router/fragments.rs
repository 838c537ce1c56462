//! Reassembly of messages the transport delivers in several fragments.
//!
//! Each fragment carries its byte offset (`fragment_index`) and the length of
//! the whole message (`fragment_total`). Fragments must arrive in order; a gap
//! or a mismatched total drops the partial message.

use std::collections::HashMap;

use bytes::{Bytes, BytesMut};

use super::transport::InboundMessage;
use crate::protocol_constants::MAX_REASSEMBLED_MESSAGE_BYTES;

struct Partial {
    total: usize,
    buf: BytesMut,
}

/// Per-topic reassembly buffers.
#[derive(Default)]
pub struct FragmentAssembler {
    partials: HashMap<String, Partial>,
}

impl FragmentAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one fragment. Returns the full payload once the message is
    /// complete.
    pub fn push(&mut self, msg: InboundMessage) -> Option<Bytes> {
        let valid = msg.fragment_length.min(msg.payload.len());
        let data = msg.payload.slice(..valid);

        if msg.fragment_total > MAX_REASSEMBLED_MESSAGE_BYTES {
            log::warn!(
                "[Router] Dropping {} byte message on {}: limit is {} bytes",
                msg.fragment_total,
                msg.topic,
                MAX_REASSEMBLED_MESSAGE_BYTES
            );
            self.partials.remove(&msg.topic);
            return None;
        }

        if msg.fragment_index == 0 {
            if self.partials.remove(&msg.topic).is_some() {
                log::warn!(
                    "[Router] New message on {} before previous one completed",
                    msg.topic
                );
            }
            if data.len() >= msg.fragment_total {
                return Some(data.slice(..msg.fragment_total));
            }
            let mut buf = BytesMut::with_capacity(msg.fragment_total);
            buf.extend_from_slice(&data);
            self.partials.insert(
                msg.topic,
                Partial {
                    total: msg.fragment_total,
                    buf,
                },
            );
            return None;
        }

        let in_sequence = self
            .partials
            .get(&msg.topic)
            .is_some_and(|p| p.total == msg.fragment_total && p.buf.len() == msg.fragment_index);
        if !in_sequence {
            log::warn!(
                "[Router] Out-of-sequence fragment on {} (offset {}), dropping message",
                msg.topic,
                msg.fragment_index
            );
            self.partials.remove(&msg.topic);
            return None;
        }

        let complete = match self.partials.get_mut(&msg.topic) {
            Some(partial) => {
                partial.buf.extend_from_slice(&data);
                partial.buf.len() >= partial.total
            }
            None => false,
        };
        if !complete {
            return None;
        }

        self.partials.remove(&msg.topic).map(|partial| {
            let mut buf = partial.buf;
            buf.truncate(partial.total);
            buf.freeze()
        })
    }

    /// Number of messages waiting for more fragments.
    pub fn pending(&self) -> usize {
        self.partials.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(topic: &str, data: &str, index: usize, total: usize) -> InboundMessage {
        InboundMessage {
            topic: topic.to_string(),
            payload: Bytes::from(data.to_string()),
            fragment_length: data.len(),
            fragment_index: index,
            fragment_total: total,
        }
    }

    #[test]
    fn single_fragment_passes_through_truncated() {
        let mut assembler = FragmentAssembler::new();
        let msg = InboundMessage {
            topic: "t".into(),
            payload: Bytes::from_static(b"12garbage"),
            fragment_length: 2,
            fragment_index: 0,
            fragment_total: 2,
        };
        assert_eq!(assembler.push(msg), Some(Bytes::from_static(b"12")));
        assert_eq!(assembler.pending(), 0);
    }

    #[test]
    fn fragments_are_reassembled_in_order() {
        let mut assembler = FragmentAssembler::new();
        assert_eq!(assembler.push(fragment("genre", "class", 0, 9)), None);
        assert_eq!(assembler.pending(), 1);
        assert_eq!(assembler.push(fragment("genre", "ical", 5, 9)), Some(Bytes::from_static(b"classical")));
        assert_eq!(assembler.pending(), 0);
    }

    #[test]
    fn topics_are_reassembled_independently() {
        let mut assembler = FragmentAssembler::new();
        assert_eq!(assembler.push(fragment("a", "he", 0, 5)), None);
        assert_eq!(assembler.push(fragment("b", "wo", 0, 5)), None);
        assert_eq!(assembler.push(fragment("b", "rld", 2, 5)), Some(Bytes::from_static(b"world")));
        assert_eq!(assembler.push(fragment("a", "llo", 2, 5)), Some(Bytes::from_static(b"hello")));
    }

    #[test]
    fn gap_drops_partial_message() {
        let mut assembler = FragmentAssembler::new();
        assembler.push(fragment("t", "abc", 0, 9));
        assert_eq!(assembler.push(fragment("t", "ghi", 6, 9)), None);
        assert_eq!(assembler.pending(), 0);
        // The missing middle arriving late does not resurrect it
        assert_eq!(assembler.push(fragment("t", "def", 3, 9)), None);
    }

    #[test]
    fn orphan_continuation_is_dropped() {
        let mut assembler = FragmentAssembler::new();
        assert_eq!(assembler.push(fragment("t", "tail", 4, 8)), None);
        assert_eq!(assembler.pending(), 0);
    }

    #[test]
    fn oversized_message_is_dropped() {
        let mut assembler = FragmentAssembler::new();
        let total = MAX_REASSEMBLED_MESSAGE_BYTES + 1;
        assert_eq!(assembler.push(fragment("t", "x", 0, total)), None);
        assert_eq!(assembler.pending(), 0);
    }
}
