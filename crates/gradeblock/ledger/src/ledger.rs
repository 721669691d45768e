use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use gradeblock_governance::{GovernanceConfig, LocalEndpoint, Multisig, SharedMultisig};
use gradeblock_record::{
    DelegatedGovernance, EmbeddedGovernance, GovernanceProvider, RecordStore, RecordView,
    RemovalMode,
};
use gradeblock_types::{Address, CallContext, Clock, Payload};
use tracing::{debug, info, warn};

use crate::config::ExecutionConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::instance::{lock, Instance, InstanceKind, Snapshot};
use crate::receipt::{Receipt, ReceiptStatus};
use crate::transaction::{Call, Outcome, RecordCall, Transaction};

/// Result of delivering one transaction.
#[derive(Debug)]
pub struct Applied {
    pub receipt: Receipt,
    pub outcome: LedgerResult<Outcome>,
}

impl Applied {
    pub fn is_committed(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn into_result(self) -> LedgerResult<Outcome> {
        self.outcome
    }
}

/// Host for deployed instances.
///
/// Transactions are applied one at a time. Each one is stamped with its
/// sender and the ledger time, runs against a snapshot of every instance,
/// and is rolled back in full if it fails. Ledger time never goes
/// backwards even if the clock does.
pub struct Ledger {
    clock: Arc<dyn Clock>,
    removal_mode: RemovalMode,
    instances: BTreeMap<Address, Instance>,
    receipts: Vec<Receipt>,
    last_time: Option<DateTime<Utc>>,
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("removal_mode", &self.removal_mode)
            .field("instances", &self.instances.len())
            .field("receipts", &self.receipts.len())
            .field("last_time", &self.last_time)
            .finish()
    }
}

impl Ledger {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            removal_mode: RemovalMode::default(),
            instances: BTreeMap::new(),
            receipts: Vec::new(),
            last_time: None,
        }
    }

    pub fn from_config(config: &ExecutionConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(clock).with_removal_mode(config.removal_mode)
    }

    /// Removal mode for delegated records deployed from now on.
    pub fn with_removal_mode(mut self, mode: RemovalMode) -> Self {
        self.removal_mode = mode;
        self
    }

    fn stamp(&mut self, sender: Address) -> CallContext {
        let now = self.clock.now();
        let now = match self.last_time {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_time = Some(now);
        CallContext { sender, now }
    }

    fn claim(&self, address: &Address) -> LedgerResult<()> {
        if address.is_null() {
            return Err(LedgerError::NullAddress);
        }
        if self.instances.contains_key(address) {
            return Err(LedgerError::AddressInUse(address.clone()));
        }
        Ok(())
    }

    /// Deploy a standalone multisig at `address`.
    pub fn deploy_multisig(&mut self, address: Address, config: &GovernanceConfig) -> LedgerResult<()> {
        self.claim(&address)?;
        let multisig = Multisig::from_config(config)?;
        info!(
            address = %address,
            signatories = multisig.signatories().len(),
            threshold = multisig.threshold(),
            "Multisig deployed"
        );
        self.instances
            .insert(address, Instance::Multisig(Arc::new(Mutex::new(multisig))));
        Ok(())
    }

    /// Deploy a record that carries its own proposal registry.
    pub fn deploy_record(
        &mut self,
        address: Address,
        owner: Address,
        subject: impl Into<String>,
        details: Payload,
        governance: &GovernanceConfig,
    ) -> LedgerResult<()> {
        self.claim(&address)?;
        let governance = EmbeddedGovernance::from_config(governance)?;
        let ctx = self.stamp(owner.clone());
        let store = RecordStore::create(&ctx, owner, subject, details, governance)?;
        info!(address = %address, "Record deployed");
        self.instances.insert(address, Instance::Record(Box::new(store)));
        Ok(())
    }

    /// Deploy a record governed by the multisig at `registry`. The multisig
    /// must still authorize `address` as a consumer before the record can
    /// propose.
    pub fn deploy_delegated_record(
        &mut self,
        address: Address,
        owner: Address,
        subject: impl Into<String>,
        details: Payload,
        registry: &Address,
    ) -> LedgerResult<()> {
        self.claim(&address)?;
        let shared = self.multisig(registry)?;
        let governance = DelegatedGovernance::new(
            address.clone(),
            LocalEndpoint::new(registry.clone(), shared),
        )
        .with_removal_mode(self.removal_mode);
        let ctx = self.stamp(owner.clone());
        let store = RecordStore::create(&ctx, owner, subject, details, governance)?;
        info!(
            address = %address,
            registry = %registry,
            removal_mode = ?self.removal_mode,
            "Delegated record deployed"
        );
        self.instances
            .insert(address, Instance::DelegatedRecord(Box::new(store)));
        Ok(())
    }

    /// Deliver `tx` as one atomic step and append its receipt.
    pub fn apply(&mut self, tx: Transaction) -> Applied {
        let ctx = self.stamp(tx.sender.clone());
        let entrypoint = tx.call.entrypoint();
        debug!(tx_id = %tx.id, sender = %tx.sender, target = %tx.target, entrypoint, "Applying transaction");

        let outcome = match self.snapshot() {
            Ok(snapshot) => {
                let outcome = self.dispatch(&ctx, &tx.target, tx.call);
                if outcome.is_err() {
                    if let Err(err) = self.restore(snapshot) {
                        warn!(tx_id = %tx.id, error = %err, "Rollback failed");
                    }
                }
                outcome
            }
            Err(err) => Err(err),
        };

        let status = match &outcome {
            Ok(_) => ReceiptStatus::Committed,
            Err(err) => ReceiptStatus::Failed {
                kind: err.kind(),
                message: err.to_string(),
            },
        };
        let previous = self.receipts.last().map_or_else(Receipt::genesis, |r| r.hash);
        let receipt = Receipt::seal(
            self.receipts.len() as u64,
            tx.id,
            tx.sender,
            tx.target,
            entrypoint,
            ctx.now,
            status,
            previous,
        );

        match &outcome {
            Ok(_) => info!(
                tx_id = %receipt.tx_id,
                sequence = receipt.sequence,
                entrypoint,
                "Transaction committed"
            ),
            Err(err) => warn!(
                tx_id = %receipt.tx_id,
                sequence = receipt.sequence,
                entrypoint,
                error = %err,
                "Transaction failed"
            ),
        }

        self.receipts.push(receipt.clone());
        Applied { receipt, outcome }
    }

    fn snapshot(&self) -> LedgerResult<Vec<(Address, Snapshot)>> {
        self.instances
            .iter()
            .map(|(address, instance)| Ok((address.clone(), instance.snapshot(address)?)))
            .collect()
    }

    fn restore(&mut self, snapshot: Vec<(Address, Snapshot)>) -> LedgerResult<()> {
        for (address, saved) in snapshot {
            if let Some(instance) = self.instances.get_mut(&address) {
                instance.restore(&address, saved)?;
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, ctx: &CallContext, target: &Address, call: Call) -> LedgerResult<Outcome> {
        let instance = self
            .instances
            .get_mut(target)
            .ok_or_else(|| LedgerError::UnknownInstance(target.clone()))?;
        let kind = instance.kind();

        match (instance, call) {
            (Instance::Multisig(shared), Call::Multisig { message }) => {
                let reply = lock(shared, target)?.handle(ctx, message)?;
                Ok(Outcome::Registry(reply))
            }
            (Instance::Record(store), Call::Record { call }) => {
                apply_record_call(store.as_mut(), ctx, call, target, kind)
            }
            (Instance::DelegatedRecord(store), Call::Record { call: RecordCall::RetryPendingRemovals }) => {
                Ok(Outcome::Retried(store.retry_pending_removals(ctx)))
            }
            (Instance::DelegatedRecord(store), Call::Record { call }) => {
                apply_record_call(store.as_mut(), ctx, call, target, kind)
            }
            (_, call) => Err(LedgerError::WrongEntryPoint {
                target: target.clone(),
                kind,
                entrypoint: call.entrypoint(),
            }),
        }
    }

    pub fn instance_kind(&self, address: &Address) -> LedgerResult<InstanceKind> {
        self.instances
            .get(address)
            .map(Instance::kind)
            .ok_or_else(|| LedgerError::UnknownInstance(address.clone()))
    }

    pub fn record_view(&self, address: &Address) -> LedgerResult<RecordView> {
        let instance = self
            .instances
            .get(address)
            .ok_or_else(|| LedgerError::UnknownInstance(address.clone()))?;
        instance.view().ok_or_else(|| LedgerError::WrongEntryPoint {
            target: address.clone(),
            kind: instance.kind(),
            entrypoint: "view",
        })
    }

    /// Shared handle to the multisig at `address`.
    pub fn multisig(&self, address: &Address) -> LedgerResult<SharedMultisig> {
        match self.instances.get(address) {
            Some(Instance::Multisig(shared)) => Ok(Arc::clone(shared)),
            Some(other) => Err(LedgerError::WrongEntryPoint {
                target: address.clone(),
                kind: other.kind(),
                entrypoint: "multisig",
            }),
            None => Err(LedgerError::UnknownInstance(address.clone())),
        }
    }

    pub fn receipts(&self) -> &[Receipt] {
        &self.receipts
    }

    /// Check sequence numbers, back-links and hashes of the receipt log.
    pub fn verify_receipts(&self) -> LedgerResult<()> {
        let mut previous = Receipt::genesis();
        for (index, receipt) in self.receipts.iter().enumerate() {
            let sequence = index as u64;
            if receipt.sequence != sequence
                || receipt.previous != previous
                || !receipt.verify_integrity()
            {
                warn!(sequence, "Receipt chain broken");
                return Err(LedgerError::ReceiptChainBroken { sequence });
            }
            previous = receipt.hash;
        }
        Ok(())
    }
}

fn apply_record_call<G: GovernanceProvider>(
    store: &mut RecordStore<G>,
    ctx: &CallContext,
    call: RecordCall,
    target: &Address,
    kind: InstanceKind,
) -> LedgerResult<Outcome> {
    let outcome = match call {
        RecordCall::Propose { payload, id } => Outcome::Proposed(store.propose(ctx, payload, id)?),
        RecordCall::ProposeOwnershipTransfer { new_owner, id } => {
            Outcome::Proposed(store.propose_ownership_transfer(ctx, &new_owner, id)?)
        }
        RecordCall::Approve { id } => {
            store.approve(ctx, id)?;
            Outcome::Approved
        }
        RecordCall::UpdateRecord { details, id } => {
            Outcome::Applied(store.update_record(ctx, details, id)?)
        }
        RecordCall::ExecuteUpdate { id } => Outcome::Applied(store.execute_update(ctx, id)?),
        RecordCall::RetrieveRecord { id } => {
            Outcome::Details(store.retrieve_record(ctx, id)?.clone())
        }
        RecordCall::VerifyRecord => Outcome::Verified(store.verify_record()?),
        RecordCall::ChangeOwnership { new_owner, id } => {
            Outcome::Applied(store.change_ownership(ctx, new_owner, id)?)
        }
        RecordCall::WithdrawProposal { id } => {
            store.withdraw_proposal(ctx, id)?;
            Outcome::Withdrawn
        }
        RecordCall::RetryPendingRemovals => {
            return Err(LedgerError::WrongEntryPoint {
                target: target.clone(),
                kind,
                entrypoint: "retry_pending_removals",
            })
        }
    };
    Ok(outcome)
}
