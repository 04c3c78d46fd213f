//! End-to-end bridge tests against a scripted controller chain
//!
//! The mock amplifier below implements the device side of the wire
//! protocol: query commands make every zone of the addressed controller
//! broadcast a status frame, control commands update one zone's state and
//! make that zone confirm. No hardware, same observable protocol.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ampbridge::{AmpBridge, BridgeConfig, BridgeError, MockTransport, ZoneId, ZoneStatus};

/// Device-side state of one mock amplifier chain
struct MockAmp {
    zones: Mutex<HashMap<ZoneId, ZoneStatus>>,
}

impl MockAmp {
    fn new(controller_count: u8) -> Arc<Self> {
        let mut zones = HashMap::new();
        for controller in 1..=controller_count {
            for zone in ZoneId::zones_of(controller) {
                zones.insert(zone, default_status(zone));
            }
        }
        Arc::new(Self {
            zones: Mutex::new(zones),
        })
    }

    /// Device behavior for one written command
    fn respond(&self, command: &str) -> Vec<String> {
        let command = command.strip_suffix('\r').unwrap_or(command);
        let zones = self.zones.lock().unwrap();

        if let Some(addr) = command.strip_prefix('?') {
            // `?c0` - every zone of controller c replies, zone order not
            // guaranteed by the protocol (HashMap order is good enough)
            let controller = addr.as_bytes()[0] - b'0';
            return zones
                .values()
                .filter(|s| s.zone.controller() == controller)
                .map(frame)
                .collect();
        }

        if let Some(rest) = command.strip_prefix('<') {
            let (zone, rest) = rest.split_at(2);
            let (code, value) = rest.split_at(2);
            let Ok(zone) = zone.parse::<ZoneId>() else {
                return vec![];
            };

            drop(zones);
            let mut zones = self.zones.lock().unwrap();
            let Some(status) = zones.get_mut(&zone) else {
                return vec![]; // zone not on this chain: silence
            };
            let field = match code {
                "pa" => &mut status.pa,
                "pr" => &mut status.pr,
                "mu" => &mut status.mu,
                "vo" => &mut status.vo,
                "tr" => &mut status.tr,
                "bs" => &mut status.bs,
                "bl" => &mut status.bl,
                "ch" => &mut status.ch,
                "ls" => &mut status.ls,
                _ => return vec![],
            };
            *field = value.to_string();
            return vec![frame(status)];
        }

        vec![]
    }
}

fn default_status(zone: ZoneId) -> ZoneStatus {
    ZoneStatus {
        zone,
        pa: "00".into(),
        pr: "01".into(),
        mu: "00".into(),
        dt: "00".into(),
        vo: "10".into(),
        tr: "07".into(),
        bs: "07".into(),
        bl: "10".into(),
        ch: "01".into(),
        ls: "00".into(),
    }
}

/// Encodes a status struct back into its wire frame
fn frame(status: &ZoneStatus) -> String {
    format!(
        "#>{}{}{}{}{}{}{}{}{}{}{}",
        status.zone,
        status.pa,
        status.pr,
        status.mu,
        status.dt,
        status.vo,
        status.tr,
        status.bs,
        status.bl,
        status.ch,
        status.ls
    )
}

fn test_config(controller_count: u8) -> BridgeConfig {
    BridgeConfig {
        device: "mock".to_string(),
        controller_count,
        wait_timeout: Duration::from_millis(500),
        ..Default::default()
    }
}

/// Bridge wired to a responsive mock chain
fn scripted_bridge(controller_count: u8, config: BridgeConfig) -> (AmpBridge, Arc<MockTransport>) {
    let amp = MockAmp::new(controller_count);
    let (mock, lines) = MockTransport::new();
    mock.set_responder(move |cmd| amp.respond(cmd));
    let bridge = AmpBridge::with_transport(mock.clone(), lines, config);
    (bridge, mock)
}

/// Bridge wired to a chain that never answers anything
fn silent_bridge(config: BridgeConfig) -> (AmpBridge, Arc<MockTransport>) {
    let (mock, lines) = MockTransport::new();
    let bridge = AmpBridge::with_transport(mock.clone(), lines, config);
    (bridge, mock)
}

#[tokio::test]
async fn test_query_all_populates_whole_chain() {
    let (bridge, _mock) = scripted_bridge(2, test_config(2));

    let zones = bridge.zones(true).await.unwrap();
    assert_eq!(zones.len(), 12);

    // Exactly the expected id set, and the registry agrees
    let ids: Vec<String> = zones.iter().map(|s| s.zone.to_string()).collect();
    let expected: Vec<String> = (1..=2)
        .flat_map(|c| (1..=6).map(move |z| format!("{}{}", c, z)))
        .collect();
    assert_eq!(ids, expected); // sorted by zone id
    assert_eq!(bridge.registry().len(), 12);
}

#[tokio::test]
async fn test_get_single_zone() {
    let (bridge, _mock) = scripted_bridge(1, test_config(1));

    let status = bridge.zone("13").await.unwrap();
    assert_eq!(status.zone.to_string(), "13");
    assert_eq!(status.vo, "10");
}

#[tokio::test]
async fn test_invalid_inputs_rejected_before_any_write() {
    let (bridge, mock) = scripted_bridge(1, test_config(1));

    // Let the startup prime finish so the write log is stable
    bridge.zones(false).await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    let writes_before = mock.sent().len();

    for zone in ["10", "17", "xx", "1", "111"] {
        let err = bridge.zone(zone).await.unwrap_err();
        assert!(err.is_client_error(), "zone {:?}", zone);
    }
    let err = bridge.attribute("11", "loudness").await.unwrap_err();
    assert!(err.is_client_error());
    let err = bridge.set_attribute("10", "volume", "20").await.unwrap_err();
    assert!(err.is_client_error());

    assert_eq!(mock.sent().len(), writes_before, "rejected requests reached the device");
}

#[tokio::test]
async fn test_set_then_get_round_trip() {
    let (bridge, _mock) = scripted_bridge(1, test_config(1));

    let confirmed = bridge.set_attribute("11", "volume", "20").await.unwrap();
    assert_eq!(confirmed.zone.to_string(), "11");
    assert_eq!(confirmed.vo, "20");

    // Alias and canonical code read back the same value
    assert_eq!(bridge.attribute("11", "volume").await.unwrap(), "20");
    assert_eq!(bridge.attribute("11", "vo").await.unwrap(), "20");
}

#[tokio::test]
async fn test_set_returns_requested_zone_despite_other_frames() {
    let amp = MockAmp::new(1);
    let (mock, lines) = MockTransport::new();
    let chatty = Arc::clone(&amp);
    mock.set_responder(move |cmd| {
        let mut replies = chatty.respond(cmd);
        if cmd.starts_with('<') {
            // Another zone broadcasts first (keypad activity)
            let bystander = chatty.zones.lock().unwrap()[&"12".parse::<ZoneId>().unwrap()].clone();
            replies.insert(0, frame(&bystander));
        }
        replies
    });
    let bridge = AmpBridge::with_transport(mock, lines, test_config(1));

    let confirmed = bridge.set_attribute("11", "mute", "01").await.unwrap();
    assert_eq!(confirmed.zone.to_string(), "11");
    assert_eq!(confirmed.mu, "01");
}

#[tokio::test]
async fn test_unresponsive_device_times_out_without_false_success() {
    let (bridge, _mock) = silent_bridge(test_config(1));

    let err = bridge.set_attribute("11", "volume", "20").await.unwrap_err();
    assert!(matches!(err, BridgeError::Timeout { .. }), "got {:?}", err);

    // The registry does not claim success: the opening clear stands
    assert!(bridge.registry().is_empty());

    let err = bridge.zones(false).await.unwrap_err();
    assert!(matches!(err, BridgeError::Timeout { .. }));
}

#[tokio::test]
async fn test_concurrent_sets_are_serialized() {
    let (bridge, _mock) = scripted_bridge(1, test_config(1));
    let bridge = Arc::new(bridge);

    let (a, b) = tokio::join!(
        {
            let bridge = Arc::clone(&bridge);
            async move { bridge.set_attribute("11", "volume", "20").await }
        },
        {
            let bridge = Arc::clone(&bridge);
            async move { bridge.set_attribute("12", "volume", "30").await }
        },
    );

    // Neither caller's confirmation was erased by the other's clear
    let a = a.unwrap();
    let b = b.unwrap();
    assert_eq!(a.zone.to_string(), "11");
    assert_eq!(a.vo, "20");
    assert_eq!(b.zone.to_string(), "12");
    assert_eq!(b.vo, "30");
}

#[tokio::test]
async fn test_requery_mode_queries_on_every_read() {
    let config = BridgeConfig {
        requery: true,
        ..test_config(1)
    };
    let (bridge, mock) = scripted_bridge(1, config);

    bridge.zones(false).await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    let queries_before = mock.sent().iter().filter(|c| c.starts_with('?')).count();

    bridge.zones(false).await.unwrap();
    bridge.zone("11").await.unwrap();

    let queries_after = mock.sent().iter().filter(|c| c.starts_with('?')).count();
    assert_eq!(queries_after, queries_before + 2);
}

#[tokio::test]
async fn test_bus_noise_does_not_disturb_state() {
    let amp = MockAmp::new(1);
    let (mock, lines) = MockTransport::new();
    let noisy = Arc::clone(&amp);
    mock.set_responder(move |cmd| {
        let mut replies = noisy.respond(cmd);
        replies.insert(0, "garbage".to_string());
        replies.push("#>11".to_string()); // truncated frame
        replies
    });
    let bridge = AmpBridge::with_transport(mock, lines, test_config(1));

    let zones = bridge.zones(true).await.unwrap();
    assert_eq!(zones.len(), 6);
    assert!(zones.iter().all(|s| s.zone.zone() >= 1 && s.zone.zone() <= 6));
}

#[tokio::test]
async fn test_status_serializes_to_wire_shaped_json() {
    let (bridge, _mock) = scripted_bridge(1, test_config(1));

    let status = bridge.zone("11").await.unwrap();
    let json = serde_json::to_value(&status).unwrap();
    assert_eq!(json["zone"], "11");
    assert_eq!(json["pr"], "01");
    assert_eq!(json["vo"], "10");
}
