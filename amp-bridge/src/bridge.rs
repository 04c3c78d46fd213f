//! Bridge API facade
//!
//! The surface consumed by the request layer. One method per logical
//! route: list zones, get zone, get attribute, set attribute. Inputs
//! arrive as raw strings (path segments, request bodies) and are
//! validated here, before anything touches the device.

use std::sync::Arc;

use tracing::{info, trace, warn};

use amp_protocol::{Attribute, ZoneId, ZoneStatus};
use amp_serial::{LineReceiver, SerialTransport, Transport};

use crate::config::BridgeConfig;
use crate::error::Result;
use crate::sequencer::{CommandSequencer, ZoneRegistry};

/// Protocol bridge for one amplifier controller chain
///
/// Owns the frame pump (serial lines in, registry updates out) and the
/// command sequencer (requests in, serial commands out). All methods are
/// blocking from the caller's perspective; internally they suspend at the
/// sequencer's wait points.
///
/// # Example
///
/// ```rust,ignore
/// let config = BridgeConfig::from_env()?;
/// let bridge = AmpBridge::open(config)?; // fatal if the device is gone
///
/// let zones = bridge.zones(false).await?;
/// let status = bridge.set_attribute("11", "volume", "20").await?;
/// ```
pub struct AmpBridge {
    sequencer: Arc<CommandSequencer>,
    config: BridgeConfig,
    pump: tokio::task::JoinHandle<()>,
}

impl AmpBridge {
    /// Opens the configured serial device and starts the bridge
    ///
    /// An unreachable device is an unrecoverable operating condition; the
    /// returned error should terminate the process.
    ///
    /// Must be called within a tokio runtime.
    pub fn open(config: BridgeConfig) -> Result<Self> {
        let (transport, lines) = SerialTransport::open(&config.device, config.baud_rate)?;
        info!(device = %config.device, controllers = config.controller_count, "bridge starting");
        Ok(Self::with_transport(transport, lines, config))
    }

    /// Starts the bridge over an arbitrary transport
    ///
    /// This is the seam tests use to script a whole controller chain via
    /// [`MockTransport`](amp_serial::MockTransport).
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        lines: LineReceiver,
        config: BridgeConfig,
    ) -> Self {
        let registry = ZoneRegistry::new();
        let pump = tokio::spawn(pump_lines(lines, registry.clone()));

        let sequencer = Arc::new(CommandSequencer::new(
            transport,
            registry,
            config.controller_count,
            config.wait_timeout,
        ));

        // Prime the cache, as the original queries the chain on open. A
        // cold chain just means the first read does the querying itself.
        let prime = Arc::clone(&sequencer);
        tokio::spawn(async move {
            if let Err(e) = prime.query_all().await {
                warn!(error = %e, "startup prime query failed");
            }
        });

        Self {
            sequencer,
            config,
            pump,
        }
    }

    /// Lists every zone of the configured chain
    ///
    /// Serves cached state unless `force_refresh` is set or the bridge is
    /// configured to requery on every read.
    pub async fn zones(&self, force_refresh: bool) -> Result<Vec<ZoneStatus>> {
        self.sequencer
            .query_zones(force_refresh || self.config.requery)
            .await
    }

    /// Returns one zone's status
    pub async fn zone(&self, zone: &str) -> Result<ZoneStatus> {
        let zone: ZoneId = zone.parse()?;
        self.sequencer.query_zone(zone, self.config.requery).await
    }

    /// Returns one attribute's verbatim field value
    ///
    /// Always requeries before reading, so the answer reflects the device
    /// rather than the cache.
    pub async fn attribute(&self, zone: &str, attribute: &str) -> Result<String> {
        let zone: ZoneId = zone.parse()?;
        let attribute = Attribute::resolve(attribute)?;

        let status = self.sequencer.query_zone(zone, true).await?;
        Ok(status.attribute(attribute).to_string())
    }

    /// Changes one attribute and returns the confirmed zone status
    ///
    /// The value is passed to the device verbatim. The returned status is
    /// the confirmation frame for the requested zone, never another
    /// zone's.
    pub async fn set_attribute(
        &self,
        zone: &str,
        attribute: &str,
        value: &str,
    ) -> Result<ZoneStatus> {
        let zone: ZoneId = zone.parse()?;
        let attribute = Attribute::resolve(attribute)?;

        Arc::clone(&self.sequencer)
            .set_attribute(zone, attribute, value)
            .await
    }

    /// The underlying zone registry, for observation
    pub fn registry(&self) -> &ZoneRegistry {
        self.sequencer.registry()
    }

    /// The configuration this bridge runs with
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}

impl Drop for AmpBridge {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

/// Write side of the registry: device lines in, whole snapshots out
///
/// The single mutation path. Status frames overwrite their zone's entry;
/// everything else on the bus is traced and dropped, because noise and
/// partial lines are normal on a shared serial bus.
async fn pump_lines(mut lines: LineReceiver, registry: ZoneRegistry) {
    while let Some(line) = lines.recv().await {
        match ZoneStatus::parse_line(&line) {
            Some(status) => {
                trace!(zone = %status.zone, "status frame");
                registry.put(status.zone, status);
            }
            None => trace!(line = %line, "ignoring non-status line"),
        }
    }
    // Channel closed: the transport is gone and so is any hope of fresh
    // state. Readers keep timing out; the process is expected to exit.
    warn!("serial line stream ended");
}
