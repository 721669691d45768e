//! Async front end for a [`Ledger`].
//!
//! A single tokio task owns the ledger and drains a bounded queue, so
//! transactions from any number of submitters are applied one at a time in
//! arrival order.

use gradeblock_record::RecordView;
use gradeblock_types::Address;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{Applied, Ledger};
use crate::receipt::Receipt;
use crate::transaction::Transaction;

enum Command {
    Submit {
        tx: Transaction,
        reply: oneshot::Sender<Applied>,
    },
    View {
        address: Address,
        reply: oneshot::Sender<LedgerResult<RecordView>>,
    },
    Receipts {
        reply: oneshot::Sender<Vec<Receipt>>,
    },
    Shutdown {
        reply: oneshot::Sender<Ledger>,
    },
}

/// Cloneable handle to a running sequencer.
#[derive(Clone, Debug)]
pub struct LedgerHandle {
    commands: mpsc::Sender<Command>,
}

/// Move `ledger` into a new sequencer task. Must be called inside a tokio
/// runtime.
pub fn spawn_sequencer(ledger: Ledger, queue_depth: usize) -> LedgerHandle {
    let (commands, mut queue) = mpsc::channel(queue_depth.max(1));

    tokio::spawn(async move {
        let mut ledger = ledger;
        info!(queue_depth, "Sequencer started");

        while let Some(command) = queue.recv().await {
            match command {
                Command::Submit { tx, reply } => {
                    let applied = ledger.apply(tx);
                    if reply.send(applied).is_err() {
                        debug!("Submitter dropped before receiving its receipt");
                    }
                }
                Command::View { address, reply } => {
                    let _ = reply.send(ledger.record_view(&address));
                }
                Command::Receipts { reply } => {
                    let _ = reply.send(ledger.receipts().to_vec());
                }
                Command::Shutdown { reply } => {
                    let receipts = ledger.receipts().len();
                    info!(receipts, "Sequencer stopped");
                    if reply.send(ledger).is_err() {
                        warn!(receipts, "Shutdown requester went away; dropping the ledger");
                    }
                    return;
                }
            }
        }
        info!("Sequencer stopped: all handles dropped");
    });

    LedgerHandle { commands }
}

impl LedgerHandle {
    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> LedgerResult<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| LedgerError::SequencerClosed)?;
        response.await.map_err(|_| LedgerError::SequencerClosed)
    }

    /// Queue `tx` and wait for it to be applied.
    pub async fn submit(&self, tx: Transaction) -> LedgerResult<Applied> {
        self.request(|reply| Command::Submit { tx, reply }).await
    }

    pub async fn record_view(&self, address: Address) -> LedgerResult<RecordView> {
        self.request(|reply| Command::View { address, reply }).await?
    }

    pub async fn receipts(&self) -> LedgerResult<Vec<Receipt>> {
        self.request(|reply| Command::Receipts { reply }).await
    }

    /// Stop the sequencer after the commands already queued and hand the
    /// ledger back.
    pub async fn shutdown(self) -> LedgerResult<Ledger> {
        self.request(|reply| Command::Shutdown { reply }).await
    }
}
