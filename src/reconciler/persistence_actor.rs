//! Persistence actor for debounced slot snapshots using sled
//!
//! Reconciliation never waits on disk. Save requests are queued with
//! `try_send`; the actor keeps only the newest pending snapshot and writes it
//! once the debounce window has passed without another request.
//!
//! # Example
//!
//! ```ignore
//! use padslots::reconciler::PersistenceActor;
//!
//! let handle = PersistenceActor::spawn("./state/sled", 500)?;
//! let saved = handle.load_snapshot().await?;
//! handle.flush().await?;
//! handle.shutdown();
//! ```

use super::sinks::SlotStore;
use super::snapshot::SlotSnapshot;
use crate::slots::SlotBinding;
use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, trace, warn};

/// Default debounce window in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Key used to store the snapshot in sled
const SNAPSHOT_KEY: &[u8] = b"slot_snapshot";

/// Queue depth before save requests are dropped
const QUEUE_CAPACITY: usize = 100;

/// Commands sent to the persistence actor
#[derive(Debug)]
pub enum PersistenceCommand {
    /// Save a slot snapshot (debounced)
    Save(SlotSnapshot),
    /// Load the last persisted snapshot
    Load(oneshot::Sender<Option<SlotSnapshot>>),
    /// Force flush any pending snapshot
    Flush(oneshot::Sender<Result<()>>),
    Shutdown,
}

/// Persistence actor that manages debounced writes to sled database
pub struct PersistenceActor {
    db: sled::Db,
    command_rx: mpsc::Receiver<PersistenceCommand>,
    /// Pending snapshot awaiting flush
    pending_snapshot: Option<SlotSnapshot>,
    /// Timestamp of last save request
    last_write_ts: Instant,
    debounce_ms: u64,
    write_count: u64,
}

/// Handle to communicate with the persistence actor
///
/// This handle is cheap to clone and can be shared across tasks.
#[derive(Clone)]
pub struct PersistenceActorHandle {
    cmd_tx: mpsc::Sender<PersistenceCommand>,
}

impl PersistenceActor {
    /// Spawn a new persistence actor with the given database path and debounce window.
    ///
    /// A `debounce_ms` of 0 writes every snapshot immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the sled database cannot be opened.
    pub fn spawn(db_path: &str, debounce_ms: u64) -> Result<PersistenceActorHandle> {
        let db = sled::open(db_path)
            .with_context(|| format!("Failed to open sled database at: {}", db_path))?;

        info!("Persistence actor opened database at: {}", db_path);

        let (cmd_tx, command_rx) = mpsc::channel(QUEUE_CAPACITY);

        let actor = PersistenceActor {
            db,
            command_rx,
            pending_snapshot: None,
            last_write_ts: Instant::now(),
            debounce_ms,
            write_count: 0,
        };

        tokio::spawn(actor.run());

        Ok(PersistenceActorHandle { cmd_tx })
    }

    async fn run(mut self) {
        info!("Persistence actor started (debounce: {}ms)", self.debounce_ms);

        let tick_interval = if self.debounce_ms > 0 {
            self.debounce_ms
        } else {
            1000
        };
        let mut ticker = tokio::time::interval(Duration::from_millis(tick_interval));

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    let Some(cmd) = cmd else {
                        // Every handle dropped
                        if let Err(e) = self.flush_pending_snapshot().await {
                            error!("Final flush failed: {:#}", e);
                        }
                        return;
                    };
                    match cmd {
                        PersistenceCommand::Save(snapshot) => {
                            trace!(slots = snapshot.bindings.len(), "Queued slot snapshot");
                            self.pending_snapshot = Some(snapshot);
                            self.last_write_ts = Instant::now();

                            if self.debounce_ms == 0 {
                                if let Err(e) = self.flush_pending_snapshot().await {
                                    error!("Immediate flush failed: {:#}", e);
                                }
                            }
                        }
                        PersistenceCommand::Load(response_tx) => {
                            let snapshot = self.load_snapshot();
                            let _ = response_tx.send(snapshot);
                        }
                        PersistenceCommand::Flush(response_tx) => {
                            let result = self.flush_pending_snapshot().await;
                            let _ = response_tx.send(result);
                        }
                        PersistenceCommand::Shutdown => {
                            info!("Persistence actor shutting down, flushing pending snapshot");
                            if let Err(e) = self.flush_pending_snapshot().await {
                                error!("Final flush failed: {:#}", e);
                            }
                            info!(
                                "Persistence actor shutdown complete (total writes: {})",
                                self.write_count
                            );
                            return;
                        }
                    }
                }
                _ = ticker.tick() => {
                    if self.pending_snapshot.is_some() && self.debounce_ms > 0 {
                        let elapsed = self.last_write_ts.elapsed();
                        if elapsed >= Duration::from_millis(self.debounce_ms) {
                            trace!("Debounce window expired ({:?}), flushing", elapsed);
                            if let Err(e) = self.flush_pending_snapshot().await {
                                error!("Debounced flush failed: {:#}", e);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Write the pending snapshot, if any
    async fn flush_pending_snapshot(&mut self) -> Result<()> {
        let Some(snapshot) = self.pending_snapshot.take() else {
            trace!("No pending snapshot to flush");
            return Ok(());
        };

        let json = serde_json::to_vec(&snapshot).context("Failed to serialize slot snapshot")?;

        let db = self.db.clone();
        let write_result = tokio::task::spawn_blocking(move || {
            db.insert(SNAPSHOT_KEY, json)?;
            db.flush()?;
            Ok::<_, sled::Error>(())
        })
        .await;

        match write_result {
            Ok(Ok(())) => {
                self.write_count += 1;
                debug!(
                    slots = snapshot.bindings.len(),
                    "Slot snapshot written (write #{})", self.write_count
                );
                Ok(())
            }
            Ok(Err(e)) => {
                self.requeue(snapshot);
                Err(e).context("Failed to write slot snapshot to sled")
            }
            Err(e) => {
                self.requeue(snapshot);
                Err(anyhow::anyhow!("Snapshot write task panicked: {}", e))
            }
        }
    }

    /// Keep a snapshot that failed to write for the next flush, unless
    /// something newer arrived meanwhile
    fn requeue(&mut self, snapshot: SlotSnapshot) {
        if self.pending_snapshot.is_none() {
            self.pending_snapshot = Some(snapshot);
        }
    }

    /// Load a snapshot from the database
    ///
    /// Returns `None` if no snapshot exists or it cannot be decoded.
    fn load_snapshot(&self) -> Option<SlotSnapshot> {
        match self.db.get(SNAPSHOT_KEY) {
            Ok(Some(data)) => match serde_json::from_slice::<SlotSnapshot>(&data) {
                Ok(snapshot) => {
                    debug!(
                        "Loaded slot snapshot (version: {}, timestamp: {}, slots: {})",
                        snapshot.version,
                        snapshot.timestamp,
                        snapshot.bindings.len()
                    );
                    Some(snapshot)
                }
                Err(e) => {
                    warn!("Failed to deserialize slot snapshot: {}", e);
                    None
                }
            },
            Ok(None) => {
                debug!("No slot snapshot found in database");
                None
            }
            Err(e) => {
                error!("Failed to read slot snapshot from sled: {}", e);
                None
            }
        }
    }
}

impl PersistenceActorHandle {
    /// Queue a snapshot without waiting
    ///
    /// # Errors
    ///
    /// Returns an error if the queue is full or the actor has shut down.
    pub fn try_save_snapshot(&self, snapshot: SlotSnapshot) -> Result<()> {
        self.cmd_tx
            .try_send(PersistenceCommand::Save(snapshot))
            .map_err(|e| anyhow::anyhow!("Failed to queue slot snapshot: {}", e))
    }

    /// Load the most recently persisted snapshot
    ///
    /// Pending (not yet flushed) snapshots are not visible here.
    pub async fn load_snapshot(&self) -> Result<Option<SlotSnapshot>> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(PersistenceCommand::Load(tx))
            .await
            .context("Failed to send load command: actor shut down")?;

        rx.await.context("Failed to receive load response")
    }

    /// Force flush any pending snapshot to disk immediately
    pub async fn flush(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(PersistenceCommand::Flush(tx))
            .await
            .context("Failed to send flush command: actor shut down")?;

        rx.await.context("Failed to receive flush response")?
    }

    /// Signal the actor to shut down after flushing
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.try_send(PersistenceCommand::Shutdown);
    }
}

impl SlotStore for PersistenceActorHandle {
    fn save(&self, bindings: &[SlotBinding]) {
        if let Err(e) = self.try_save_snapshot(SlotSnapshot::new(bindings.to_vec())) {
            warn!("Dropping slot snapshot: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::BindingConfig;
    use tempfile::tempdir;

    fn make_bindings(n: usize) -> Vec<SlotBinding> {
        (0..n)
            .map(|i| SlotBinding::new(i, format!("pad{}", i), BindingConfig::generic()))
            .collect()
    }

    #[tokio::test]
    async fn test_spawn_and_shutdown() {
        let temp = tempdir().unwrap();
        let db_path = temp.path().join("test.sled");

        let handle = PersistenceActor::spawn(db_path.to_str().unwrap(), 100).unwrap();
        handle.shutdown();

        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_save_and_load_snapshot() {
        let temp = tempdir().unwrap();
        let db_path = temp.path().join("test.sled");

        let handle = PersistenceActor::spawn(db_path.to_str().unwrap(), 0).unwrap();
        handle.save(&make_bindings(2));

        // Commands are processed in order, so the save is written before the load
        let loaded = handle.load_snapshot().await.unwrap().unwrap();
        assert_eq!(loaded.bindings, make_bindings(2));
        assert_eq!(loaded.version, SlotSnapshot::VERSION);

        handle.shutdown();
    }

    #[tokio::test]
    async fn test_flush_forces_write() {
        let temp = tempdir().unwrap();
        let db_path = temp.path().join("test.sled");

        let handle = PersistenceActor::spawn(db_path.to_str().unwrap(), 10_000).unwrap();
        handle.save(&make_bindings(3));

        // Still inside the debounce window
        assert!(handle.load_snapshot().await.unwrap().is_none());

        handle.flush().await.unwrap();
        let loaded = handle.load_snapshot().await.unwrap().unwrap();
        assert_eq!(loaded.bindings.len(), 3);

        handle.shutdown();
    }

    #[tokio::test]
    async fn test_failed_write_is_requeued_unless_superseded() {
        let temp = tempdir().unwrap();
        let (_cmd_tx, command_rx) = mpsc::channel(1);
        let mut actor = PersistenceActor {
            db: sled::open(temp.path().join("test.sled")).unwrap(),
            command_rx,
            pending_snapshot: None,
            last_write_ts: Instant::now(),
            debounce_ms: 0,
            write_count: 0,
        };

        let failed = SlotSnapshot::new(make_bindings(1));
        actor.requeue(failed.clone());
        assert_eq!(actor.pending_snapshot.as_ref(), Some(&failed));

        let newer = SlotSnapshot::new(make_bindings(2));
        actor.pending_snapshot = Some(newer.clone());
        actor.requeue(failed);
        assert_eq!(actor.pending_snapshot.as_ref(), Some(&newer));

        // The retried snapshot reaches disk on the next flush
        actor.flush_pending_snapshot().await.unwrap();
        assert!(actor.pending_snapshot.is_none());
        assert_eq!(actor.load_snapshot().unwrap().bindings.len(), 2);
    }

    #[tokio::test]
    async fn test_debounce_coalesces_writes() {
        let temp = tempdir().unwrap();
        let db_path = temp.path().join("test.sled");

        let handle = PersistenceActor::spawn(db_path.to_str().unwrap(), 200).unwrap();

        for n in 1..=5 {
            handle.save(&make_bindings(n));
        }

        tokio::time::sleep(Duration::from_millis(500)).await;

        let loaded = handle.load_snapshot().await.unwrap().unwrap();
        assert_eq!(loaded.bindings.len(), 5);

        handle.shutdown();
    }
}
