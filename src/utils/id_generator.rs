//! Snowflake-style id generation.
//!
//! Layout of a generated id (63 bits, always positive as `i64`):
//!
//! ```text
//! | 41 bits: ms since EPOCH_MS | 10 bits: node | 12 bits: sequence |
//! ```

use chrono::Utc;
use std::sync::Mutex;
use thiserror::Error;

/// 2024-01-01T00:00:00Z in Unix milliseconds.
pub const EPOCH_MS: i64 = 1_704_067_200_000;

const NODE_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;
const TIMESTAMP_BITS: u32 = 41;

pub const MAX_NODE_ID: u16 = (1 << NODE_BITS) - 1;
const MAX_SEQUENCE: i64 = (1 << SEQUENCE_BITS) - 1;
const MAX_TIMESTAMP: i64 = (1 << TIMESTAMP_BITS) - 1;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("node id {0} out of range (0..={MAX_NODE_ID})")]
pub struct InvalidNodeId(pub u16);

#[derive(Debug, Default)]
struct State {
    last_ms: i64,
    sequence: i64,
}

/// Thread-safe generator of unique, strictly increasing ids.
///
/// When the wall clock goes backwards or a millisecond runs out of sequence
/// numbers, the generator keeps counting on its own logical clock instead of
/// waiting, so ids never repeat and never decrease.
#[derive(Debug)]
pub struct IdGenerator {
    node: i64,
    state: Mutex<State>,
}

impl IdGenerator {
    /// # Errors
    ///
    /// Returns [`InvalidNodeId`] if `node_id` does not fit in 10 bits.
    pub fn new(node_id: u16) -> Result<Self, InvalidNodeId> {
        if node_id > MAX_NODE_ID {
            return Err(InvalidNodeId(node_id));
        }
        Ok(Self {
            node: i64::from(node_id),
            state: Mutex::new(State::default()),
        })
    }

    pub fn node_id(&self) -> u16 {
        self.node as u16
    }

    pub fn next_id(&self) -> i64 {
        self.next_id_at(Utc::now().timestamp_millis())
    }

    fn next_id_at(&self, now_ms: i64) -> i64 {
        let elapsed = (now_ms - EPOCH_MS).clamp(0, MAX_TIMESTAMP);
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if elapsed > state.last_ms {
            state.last_ms = elapsed;
            state.sequence = 0;
        } else if state.sequence < MAX_SEQUENCE {
            state.sequence += 1;
        } else {
            state.last_ms += 1;
            state.sequence = 0;
        }

        // A fresh state starts at (0, 0) and the first branch needs a strictly
        // later millisecond, so (0, 0) is never emitted and ids are non-zero.
        (state.last_ms << (NODE_BITS + SEQUENCE_BITS)) | (self.node << SEQUENCE_BITS) | state.sequence
    }
}
