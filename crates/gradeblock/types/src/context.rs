use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Authenticated invocation context.
///
/// Built by the execution host for each transaction. `sender` is the
/// authenticated caller identity; the core never accepts a caller identity
/// from call arguments. `now` is the transaction time used for every
/// timestamp written during the call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub sender: Address,
    pub now: DateTime<Utc>,
}

impl CallContext {
    pub fn new(sender: impl Into<Address>, now: DateTime<Utc>) -> Self {
        Self {
            sender: sender.into(),
            now,
        }
    }

    /// Context for a message an instance sends on its own behalf while
    /// handling this call (same transaction time, instance as sender).
    pub fn relay(&self, instance: &Address) -> Self {
        Self {
            sender: instance.clone(),
            now: self.now,
        }
    }
}
