//! Integration tests for the AppService → FSM → ports pipeline.
//!
//! These run on the host (x86_64) and verify the event stream and
//! indicator writes the service produces while driving the simulated
//! board, without any real hardware.

use smartcollar::adapters::log_sink::LogEventSink;
use smartcollar::adapters::wifi::SimLink;
use smartcollar::app::events::AppEvent;
use smartcollar::app::ports::EventSink;
use smartcollar::fsm::StateId;
use smartcollar::fsm::context::FailureCause;
use smartcollar::session::DeviceIdentity;
use smartcollar::tracker::Zone;

use crate::mock_hw::Rig;

#[test]
fn start_emits_started_and_drives_led_off() {
    let rig = Rig::new(SimLink::Never);
    assert_eq!(rig.sink.events, vec![AppEvent::Started(StateId::Idle)]);
    assert_eq!(rig.led.writes.len(), 1);
    assert_eq!(rig.led.level(), Some(false));
}

#[test]
fn idle_ticks_produce_no_events_or_led_writes() {
    let mut rig = Rig::new(SimLink::Never);
    rig.steps(1_000, false);
    assert_eq!(rig.sink.events.len(), 1);
    assert_eq!(rig.led.writes.len(), 1);
    assert_eq!(rig.app.tick_count(), 1_000);
}

#[test]
fn long_press_event_precedes_first_transition() {
    let mut rig = Rig::new(SimLink::Never);
    rig.long_press();
    let long_press = rig.sink.events.iter().position(|e| *e == AppEvent::LongPress);
    let first_change = rig
        .sink
        .events
        .iter()
        .position(|e| matches!(e, AppEvent::StateChanged { .. }));
    assert!(long_press.unwrap() < first_change.unwrap());
    assert_eq!(
        rig.sink.events[first_change.unwrap()],
        AppEvent::StateChanged {
            from: StateId::Idle,
            to: StateId::PairingEnabled
        }
    );
}

#[test]
fn identity_captured_event_carries_trimmed_response() {
    let mut rig = Rig::new(SimLink::Never);
    rig.long_press();
    assert!(rig.run_until(StateId::AwaitingPeer, 10));
    let expected = DeviceIdentity::from_response(b"861234567890123\r\n\r\nOK", 15).unwrap();
    assert!(rig.sink.events.contains(&AppEvent::IdentityCaptured(expected)));
}

fn peer_events(rig: &Rig) -> Vec<AppEvent> {
    rig.sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::PeerConnected | AppEvent::PeerDisconnected))
        .cloned()
        .collect()
}

#[test]
fn peer_events_are_forwarded_in_order() {
    let mut rig = Rig::new(SimLink::Never);
    rig.to_awaiting_credentials();
    rig.ble.inject_peer_disconnected();
    rig.step(false);
    rig.ble.inject_peer_connected();
    rig.step(false);

    assert_eq!(
        peer_events(&rig),
        [
            AppEvent::PeerConnected,
            AppEvent::PeerDisconnected,
            AppEvent::PeerConnected
        ]
    );
    assert!(rig.app.peer_connected());
}

#[test]
fn peer_churn_within_one_tick_settles_on_latest_state() {
    let mut rig = Rig::new(SimLink::Never);
    rig.to_awaiting_credentials();
    for _ in 0..12 {
        rig.ble.inject_peer_disconnected();
        rig.ble.inject_peer_connected();
    }
    rig.ble.inject_peer_disconnected();
    rig.ble.inject_write(b"home:secret123");
    rig.step(false);

    assert_eq!(
        peer_events(&rig),
        [AppEvent::PeerConnected, AppEvent::PeerDisconnected]
    );
    assert!(!rig.app.peer_connected());
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::CredentialsReceived { .. })), 1);
}

#[test]
fn credentials_event_names_network_only() {
    let mut rig = Rig::new(SimLink::Never);
    rig.to_awaiting_credentials();
    rig.ble.inject_write(b"Attic:topsecret");
    rig.step(false);

    let received = rig
        .sink
        .events
        .iter()
        .find_map(|e| match e {
            AppEvent::CredentialsReceived { network } => Some(network.as_str()),
            _ => None,
        })
        .unwrap();
    assert_eq!(received, "Attic");
    assert!(!format!("{:?}", rig.sink.events).contains("topsecret"));
}

#[test]
fn failed_outcome_emitted_once() {
    let mut rig = Rig::with_identity(b"", SimLink::Never);
    rig.long_press();
    assert!(rig.run_until(StateId::Failed, 10));
    rig.steps(100, false);
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::ProvisioningFailed(FailureCause::IdentityInvalid { len: 0 })
        )),
        1
    );
}

#[test]
fn led_writes_only_on_level_change() {
    let mut rig = Rig::new(SimLink::Never);
    rig.long_press();
    assert!(rig.run_until(StateId::AwaitingPeer, 10));
    rig.steps(300, false);
    for pair in rig.led.writes.windows(2) {
        assert_ne!(pair[0].1, pair[1].1, "repeated LED level at {} ms", pair[1].0);
    }
}

#[test]
fn log_sink_renders_every_event() {
    let mut sink = LogEventSink::new();
    let identity = DeviceIdentity::from_response(b"861234567890123", 15).unwrap();
    let mut network = heapless::String::<32>::new();
    network.push_str("HomeNet").unwrap();

    for event in [
        AppEvent::Started(StateId::Idle),
        AppEvent::StateChanged {
            from: StateId::Idle,
            to: StateId::PairingEnabled,
        },
        AppEvent::LongPress,
        AppEvent::PeerConnected,
        AppEvent::PeerDisconnected,
        AppEvent::CredentialsReceived {
            network: network.clone(),
        },
        AppEvent::IdentityCaptured(identity),
        AppEvent::ProvisioningFailed(FailureCause::IdentityInvalid { len: 3 }),
        AppEvent::Provisioned { network },
        AppEvent::ZoneChanged(Zone::Outside),
        AppEvent::LocationReported {
            latitude: 48.1173,
            longitude: 11.516_667,
        },
    ] {
        sink.emit(&event);
    }
}
