use std::fmt;
use std::sync::MutexGuard;

use gradeblock_governance::{LocalEndpoint, Multisig, SharedMultisig};
use gradeblock_record::{DelegatedGovernance, EmbeddedGovernance, RecordStore, RecordView};
use gradeblock_types::Address;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

pub type EmbeddedRecord = RecordStore<EmbeddedGovernance>;
pub type DelegatedRecord = RecordStore<DelegatedGovernance<LocalEndpoint>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceKind {
    Multisig,
    Record,
    DelegatedRecord,
}

impl fmt::Display for InstanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceKind::Multisig => write!(f, "multisig"),
            InstanceKind::Record => write!(f, "record"),
            InstanceKind::DelegatedRecord => write!(f, "delegated record"),
        }
    }
}

/// A deployed instance. Multisigs are shared so delegated records can reach
/// them through a [`LocalEndpoint`].
#[derive(Debug)]
pub enum Instance {
    Multisig(SharedMultisig),
    Record(Box<EmbeddedRecord>),
    DelegatedRecord(Box<DelegatedRecord>),
}

impl Instance {
    pub fn kind(&self) -> InstanceKind {
        match self {
            Instance::Multisig(_) => InstanceKind::Multisig,
            Instance::Record(_) => InstanceKind::Record,
            Instance::DelegatedRecord(_) => InstanceKind::DelegatedRecord,
        }
    }

    pub fn view(&self) -> Option<RecordView> {
        match self {
            Instance::Multisig(_) => None,
            Instance::Record(store) => Some(store.view()),
            Instance::DelegatedRecord(store) => Some(store.view()),
        }
    }

    pub(crate) fn snapshot(&self, address: &Address) -> LedgerResult<Snapshot> {
        Ok(match self {
            Instance::Multisig(shared) => Snapshot::Multisig(lock(shared, address)?.clone()),
            Instance::Record(store) => Snapshot::Record(store.clone()),
            Instance::DelegatedRecord(store) => Snapshot::DelegatedRecord(store.clone()),
        })
    }

    /// Put `snapshot` back. Multisig state is overwritten in place so
    /// endpoints held by delegated records keep pointing at it.
    pub(crate) fn restore(&mut self, address: &Address, snapshot: Snapshot) -> LedgerResult<()> {
        match (self, snapshot) {
            (Instance::Multisig(shared), Snapshot::Multisig(saved)) => {
                *lock(shared, address)? = saved;
            }
            (Instance::Record(store), Snapshot::Record(saved)) => *store = saved,
            (Instance::DelegatedRecord(store), Snapshot::DelegatedRecord(saved)) => *store = saved,
            _ => return Err(LedgerError::StatePoisoned(address.clone())),
        }
        Ok(())
    }
}

pub(crate) enum Snapshot {
    Multisig(Multisig),
    Record(Box<EmbeddedRecord>),
    DelegatedRecord(Box<DelegatedRecord>),
}

pub(crate) fn lock<'a>(
    shared: &'a SharedMultisig,
    address: &Address,
) -> LedgerResult<MutexGuard<'a, Multisig>> {
    shared
        .lock()
        .map_err(|_| LedgerError::StatePoisoned(address.clone()))
}
