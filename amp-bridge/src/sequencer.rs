//! Command sequencing and state synchronization
//!
//! The sequencer turns each logical operation into serial writes and
//! resolves it only once the zone registry reflects the expected outcome.
//! It is the one place that understands the two correctness hazards of
//! the wire protocol:
//!
//! - **Frame attribution.** Controllers reply asynchronously and
//!   interleaved queries would make incoming frames unattributable, so a
//!   chain query advances to controller `c+1` only after the registry
//!   holds the cumulative `6*c` zones.
//! - **Clear/refill races.** Every mutating operation opens with a
//!   registry clear; a concurrent clear could erase the very entry
//!   another caller is waiting on. A single in-flight-operation lock
//!   serializes all operations from their opening clear/write through
//!   their resolving wait.
//!
//! Every wait is bounded by the configured deadline. A timeout aborts the
//! operation and leaves the partial registry state for the next
//! operation's clear; nothing is rolled back.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use amp_protocol::{
    query_command, set_command, Attribute, ZoneId, ZoneStatus, ZONES_PER_CONTROLLER,
};
use amp_serial::Transport;
use zone_store::SnapshotStore;

use crate::error::{BridgeError, Result};

/// The zone registry: most recently observed status per zone
///
/// Written only by the frame pump; cleared only by the sequencer at the
/// start of a refresh cycle. Between a clear and the arrival of the
/// expected frames it holds a proper subset of the expected zones - the
/// transient all waits resolve against.
pub type ZoneRegistry = SnapshotStore<ZoneId, ZoneStatus>;

/// Issues commands and blocks callers until the registry confirms them
pub struct CommandSequencer {
    transport: Arc<dyn Transport>,
    registry: ZoneRegistry,
    controller_count: u8,
    wait_timeout: Duration,

    /// Single in-flight-operation lock. Held from an operation's opening
    /// clear/write until its resolving wait has been consumed; dropping a
    /// cancelled caller's future releases it, so an abandoned request
    /// cannot starve the queue.
    op_lock: Mutex<()>,
}

impl CommandSequencer {
    pub fn new(
        transport: Arc<dyn Transport>,
        registry: ZoneRegistry,
        controller_count: u8,
        wait_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            registry,
            controller_count,
            wait_timeout,
            op_lock: Mutex::new(()),
        }
    }

    /// The registry this sequencer synchronizes against
    pub fn registry(&self) -> &ZoneRegistry {
        &self.registry
    }

    /// Queries every controller in the chain, in order
    ///
    /// Does not clear first; pair with a clear (or use the higher-level
    /// operations) to run a full refresh cycle.
    pub async fn query_all(&self) -> Result<()> {
        let _op = self.op_lock.lock().await;
        self.query_all_locked().await
    }

    /// Returns one zone's status, optionally refreshing the whole chain
    /// first
    pub async fn query_zone(&self, zone: ZoneId, refresh: bool) -> Result<ZoneStatus> {
        let _op = self.op_lock.lock().await;

        if refresh {
            self.registry.clear();
            self.query_all_locked().await?;
        }

        self.wait_for(format!("status of zone {}", zone), |r| r.contains(&zone))
            .await?;
        // Present: the frame pump never removes entries and the operation
        // lock keeps other clears out until this returns.
        self.registry
            .get(&zone)
            .ok_or_else(|| self.timeout_error(format!("status of zone {}", zone)))
    }

    /// Returns all zones' status, sorted by zone id
    ///
    /// Refreshes when asked to, and also when the registry is still empty
    /// (a first read racing the startup prime query).
    pub async fn query_zones(&self, refresh: bool) -> Result<Vec<ZoneStatus>> {
        let _op = self.op_lock.lock().await;

        if refresh || self.registry.is_empty() {
            self.registry.clear();
            self.query_all_locked().await?;
        }

        let mut zones = self.registry.snapshot();
        zones.sort_by_key(|status| status.zone);
        Ok(zones)
    }

    /// Changes one attribute and returns the confirming status
    ///
    /// Protocol shape: clear the registry, issue the control command, and
    /// wait for the target zone's confirmation frame to reappear - the
    /// clear is what distinguishes the confirmation from stale state.
    ///
    /// The rest of the chain is refreshed afterwards in the background.
    /// That refresh re-acquires the operation lock, so its own clear is
    /// ordered strictly after this confirmation has been captured and
    /// after any operation already queued.
    pub async fn set_attribute(
        self: Arc<Self>,
        zone: ZoneId,
        attribute: Attribute,
        value: &str,
    ) -> Result<ZoneStatus> {
        let status = {
            let _op = self.op_lock.lock().await;

            self.registry.clear();
            let command = set_command(zone, attribute, value);
            self.transport.send(command.as_bytes())?;

            let waiting_for = format!("confirmation from zone {}", zone);
            self.wait_for(waiting_for.clone(), |r| r.contains(&zone))
                .await?;
            self.registry
                .get(&zone)
                .ok_or_else(|| self.timeout_error(waiting_for))?
        };
        debug!(zone = %zone, "attribute change confirmed");

        // The control command only made the target zone report; the other
        // zones' cached state is now stale relative to the clear above.
        let sequencer = Arc::clone(&self);
        tokio::spawn(async move {
            if let Err(e) = sequencer.refresh_after_set().await {
                warn!(error = %e, "background refresh after set failed");
            }
        });

        Ok(status)
    }

    async fn refresh_after_set(&self) -> Result<()> {
        let _op = self.op_lock.lock().await;
        self.registry.clear();
        self.query_all_locked().await
    }

    /// One chain query cycle; caller must hold the operation lock
    ///
    /// Waits for the cumulative zone count before advancing to the next
    /// controller, which is what keeps interleaved replies attributable.
    /// The count predicate is `>=`: keypad activity can make a zone
    /// broadcast unsolicited frames, and an extra frame must not strand
    /// the cycle.
    async fn query_all_locked(&self) -> Result<()> {
        for controller in 1..=self.controller_count {
            self.transport
                .send(query_command(controller).as_bytes())?;

            let expected = controller as usize * ZONES_PER_CONTROLLER as usize;
            self.wait_for(format!("{} zones from controller {}", expected, controller), |r| {
                r.len() >= expected
            })
            .await?;
        }
        debug!(controllers = self.controller_count, "chain query complete");
        Ok(())
    }

    async fn wait_for<F>(&self, waiting_for: String, predicate: F) -> Result<()>
    where
        F: FnMut(&ZoneRegistry) -> bool,
    {
        self.registry
            .wait_until(self.wait_timeout, predicate)
            .await
            .map_err(|_| self.timeout_error(waiting_for))
    }

    fn timeout_error(&self, waiting_for: String) -> BridgeError {
        BridgeError::Timeout {
            waiting_for,
            timeout: self.wait_timeout,
        }
    }
}

impl std::fmt::Debug for CommandSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSequencer")
            .field("controller_count", &self.controller_count)
            .field("wait_timeout", &self.wait_timeout)
            .finish()
    }
}
