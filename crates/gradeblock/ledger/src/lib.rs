//! # gradeblock-ledger
//!
//! Execution host for GradeBlock instances. The ledger owns every deployed
//! record and multisig by address, delivers each transaction as one atomic
//! step with the caller identity and time it stamps itself, and keeps a
//! hash-chained receipt log.
//!
//! ## Core Components
//!
//! - **Ledger** - instance table, dispatch, snapshot rollback
//! - **Transaction / Call** - what a caller submits
//! - **Receipt** - blake3-chained record of every delivered transaction
//! - **Sequencer** - tokio task applying submitted transactions in order
//! - **LedgerConfig** - layered configuration (defaults, file, environment)
//! - **telemetry** - tracing subscriber bootstrap

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod instance;
pub mod ledger;
pub mod receipt;
pub mod sequencer;
pub mod telemetry;
pub mod transaction;

pub use config::{ExecutionConfig, LedgerConfig, LoggingConfig};
pub use error::{LedgerError, LedgerResult};
pub use instance::{Instance, InstanceKind};
pub use ledger::{Applied, Ledger};
pub use receipt::{Receipt, ReceiptStatus, RECEIPT_DOMAIN};
pub use sequencer::{spawn_sequencer, LedgerHandle};
pub use transaction::{Call, Outcome, RecordCall, Transaction};
