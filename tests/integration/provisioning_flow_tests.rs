//! Integration tests for the gesture → modem → BLE → WiFi provisioning flow.
//!
//! Verifies the end-to-end sequence through the real outer-loop wiring:
//! long press, modem power pulse, identity capture, peer connection,
//! credential write, bounded join and the one-shot release on success.

use smartcollar::adapters::wifi::SimLink;
use smartcollar::app::events::AppEvent;
use smartcollar::app::ports::PairingPort;
use smartcollar::drivers::led_patterns::LedPattern;
use smartcollar::error::JoinError;
use smartcollar::fsm::StateId;
use smartcollar::fsm::context::FailureCause;
use smartcollar::session::CredentialPair;

use crate::mock_hw::Rig;

// ── Happy path ────────────────────────────────────────────────

#[test]
fn full_provisioning_flow_reaches_connected() {
    let mut rig = Rig::new(SimLink::AssociateAfter { ms: 2_500 });
    assert_eq!(rig.app.state(), StateId::Idle);
    assert_eq!(rig.led.level(), Some(false));

    rig.to_awaiting_credentials();
    assert_eq!(rig.app.led_pattern(), LedPattern::Solid);
    assert!(rig.ble.is_enabled());
    assert!(rig.app.identity().unwrap().as_str().starts_with("861234567890123"));

    rig.ble.inject_write(b"HomeNet:hunter22");
    assert_eq!(rig.step(false), StateId::JoiningNetwork);
    assert_eq!(rig.step(false), StateId::Connected);

    assert_eq!(rig.wifi.ssid(), "HomeNet");
    assert_eq!(rig.app.network_name(), Some("HomeNet"));
    assert!(!rig.ble.is_enabled());
    assert_eq!(rig.led.level(), Some(true));

    assert_eq!(
        rig.sink.state_path(),
        vec![
            StateId::PairingEnabled,
            StateId::ModemPoweringOn,
            StateId::IdentityQuery,
            StateId::AwaitingPeer,
            StateId::AwaitingCredentials,
            StateId::JoiningNetwork,
            StateId::Connected,
        ]
    );
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::Provisioned { network } if network == "HomeNet")),
        1
    );
}

#[test]
fn modem_powered_and_queried_in_order() {
    let mut rig = Rig::new(SimLink::AssociateAfter { ms: 0 });
    rig.to_awaiting_credentials();
    assert_eq!(rig.modem.rail_history(), [false, true]);
    assert_eq!(rig.modem.lines(), ["AT+CGSN"]);
}

// ── Gesture ───────────────────────────────────────────────────

#[test]
fn short_hold_does_not_start_pairing() {
    let mut rig = Rig::new(SimLink::Never);
    // 1990 ms of continuous hold, then release.
    rig.steps(200, true);
    rig.steps(50, false);
    assert_eq!(rig.app.state(), StateId::Idle);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::LongPress), 0);
    assert_eq!(rig.ble.stats().enable_calls, 0);
}

#[test]
fn hold_of_exactly_threshold_starts_pairing() {
    let mut rig = Rig::new(SimLink::Never);
    // Samples at 0, 10, ..., 2000 ms after the press.
    rig.steps(200, true);
    assert_eq!(rig.step(true), StateId::PairingEnabled);
}

#[test]
fn holding_through_the_sequence_fires_once() {
    let mut rig = Rig::new(SimLink::Never);
    rig.steps(400, true);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::LongPress), 1);
}

// ── Identity ──────────────────────────────────────────────────

#[test]
fn short_identity_fails_with_fast_blink() {
    let mut rig = Rig::with_identity(b"\r\nERROR\r\n", SimLink::Never);
    rig.long_press();
    assert!(rig.run_until(StateId::Failed, 10));
    assert_eq!(rig.app.led_pattern(), LedPattern::FastBlink);
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::ProvisioningFailed(FailureCause::IdentityInvalid { len: 5 })
        )),
        1
    );
}

#[test]
fn fifteen_character_identity_is_accepted() {
    let mut rig = Rig::with_identity(b"123456789012345", SimLink::Never);
    rig.long_press();
    assert!(rig.run_until(StateId::AwaitingPeer, 10));
    assert_eq!(rig.app.identity().unwrap().as_str(), "123456789012345");
}

#[test]
fn fourteen_character_identity_fails() {
    let mut rig = Rig::with_identity(b"12345678901234", SimLink::Never);
    rig.long_press();
    assert!(rig.run_until(StateId::Failed, 10));
}

#[test]
fn failed_led_toggles_every_200ms() {
    let mut rig = Rig::with_identity(b"", SimLink::Never);
    rig.long_press();
    assert!(rig.run_until(StateId::Failed, 10));

    let entered = rig.now_ms();
    rig.steps(100, false);
    let toggles = rig.led.writes_since(entered);
    assert_eq!(toggles.len(), 5);
    for pair in toggles.windows(2) {
        assert_eq!(pair[1].0 - pair[0].0, 200);
        assert_ne!(pair[0].1, pair[1].1);
    }
}

#[test]
fn failed_ignores_further_gestures() {
    let mut rig = Rig::with_identity(b"", SimLink::Never);
    rig.long_press();
    assert!(rig.run_until(StateId::Failed, 10));
    rig.long_press();
    rig.ble.inject_peer_connected();
    rig.ble.inject_write(b"net:pw");
    assert_eq!(rig.steps(20, false), StateId::Failed);
}

// ── Peer and credentials ──────────────────────────────────────

#[test]
fn awaiting_peer_slow_blinks() {
    let mut rig = Rig::new(SimLink::Never);
    rig.long_press();
    assert!(rig.run_until(StateId::AwaitingPeer, 10));
    let since = rig.now_ms();
    rig.steps(200, false);
    let writes = rig.led.writes_since(since);
    assert_eq!(writes.len(), 4);
    assert_eq!(writes[1].0 - writes[0].0, 500);
    assert_eq!(rig.app.state(), StateId::AwaitingPeer);
}

#[test]
fn credentials_before_peer_are_held_until_needed() {
    let mut rig = Rig::new(SimLink::AssociateAfter { ms: 0 });
    rig.long_press();
    assert!(rig.run_until(StateId::AwaitingPeer, 10));
    rig.ble.inject_write(b"early:bird");
    rig.steps(5, false);
    assert_eq!(rig.app.state(), StateId::AwaitingPeer);

    rig.ble.inject_peer_connected();
    assert_eq!(rig.step(false), StateId::AwaitingCredentials);
    assert_eq!(rig.step(false), StateId::JoiningNetwork);
    assert_eq!(rig.step(false), StateId::Connected);
    assert_eq!(rig.wifi.ssid(), "early");
}

#[test]
fn pairing_events_fired_during_blocking_ticks_are_kept() {
    let mut rig = Rig::new(SimLink::AssociateAfter { ms: 0 });
    rig.long_press();
    assert!(rig.run_until(StateId::ModemPoweringOn, 5));

    // The stack's host task keeps firing while the loop sits in the
    // power-on pulse and identity query.
    let mailbox = rig.ble.mailbox();
    let host_task = std::thread::spawn(move || {
        for _ in 0..50 {
            mailbox.set_peer(true);
            mailbox.set_peer(false);
        }
        mailbox.set_peer(true);
        mailbox.put_credentials(CredentialPair::parse(b"home:secret123").unwrap());
    });
    rig.step(false);
    rig.step(false);
    host_task.join().unwrap();

    assert!(rig.run_until(StateId::Connected, 10));
    assert_eq!(rig.wifi.ssid(), "home");
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::CredentialsReceived { .. })),
        1
    );
}

#[test]
fn payload_without_delimiter_is_ignored() {
    let mut rig = Rig::new(SimLink::AssociateAfter { ms: 0 });
    rig.to_awaiting_credentials();
    rig.ble.inject_write(b"nocolon");
    assert_eq!(rig.steps(50, false), StateId::AwaitingCredentials);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::CredentialsReceived { .. })),
        0
    );
}

#[test]
fn empty_secret_is_accepted() {
    let mut rig = Rig::new(SimLink::AssociateAfter { ms: 0 });
    rig.to_awaiting_credentials();
    rig.ble.inject_write(b"OpenCafe:");
    rig.step(false);
    assert_eq!(rig.step(false), StateId::Connected);
    assert_eq!(rig.wifi.ssid(), "OpenCafe");
}

#[test]
fn secret_keeps_everything_after_first_colon() {
    let mut rig = Rig::new(SimLink::Never);
    rig.to_awaiting_credentials();
    rig.ble.inject_write(b"net:a:b:c");
    assert_eq!(rig.step(false), StateId::JoiningNetwork);
    assert_eq!(rig.app.network_name(), Some("net"));
}

#[test]
fn peer_disconnect_does_not_regress() {
    let mut rig = Rig::new(SimLink::Never);
    rig.to_awaiting_credentials();
    rig.ble.inject_peer_disconnected();
    assert_eq!(rig.steps(10, false), StateId::AwaitingCredentials);
    assert!(!rig.app.peer_connected());
}

// ── Join bound ────────────────────────────────────────────────

#[test]
fn association_just_inside_bound_connects() {
    let mut rig = Rig::new(SimLink::AssociateAfter { ms: 119_000 });
    rig.to_awaiting_credentials();
    rig.ble.inject_write(b"slow:pw");
    rig.step(false);
    let start = rig.now_ms();
    assert_eq!(rig.step(false), StateId::Connected);
    // 119 s of polling plus the power-down window and one loop period.
    assert_eq!(rig.now_ms() - start, 119_000 + 5_000 + 10);
}

#[test]
fn association_at_bound_still_connects() {
    let mut rig = Rig::new(SimLink::AssociateAfter { ms: 120_000 });
    rig.to_awaiting_credentials();
    rig.ble.inject_write(b"edge:pw");
    rig.step(false);
    assert_eq!(rig.step(false), StateId::Connected);
}

#[test]
fn unreachable_network_fails_at_bound() {
    let mut rig = Rig::new(SimLink::Never);
    rig.to_awaiting_credentials();
    rig.ble.inject_write(b"far:away");
    rig.step(false);
    let start = rig.now_ms();
    assert_eq!(rig.step(false), StateId::Failed);
    assert_eq!(rig.now_ms() - start, 120_000 + 10);
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::ProvisioningFailed(FailureCause::JoinFailed(JoinError::Timeout {
                waited_ms: 120_000
            }))
        )),
        1
    );
    // Failure leaves the radio and modem as they were.
    assert!(rig.ble.is_enabled());
    assert_eq!(rig.modem.count_line("AT+QPOWD"), 0);
}

#[test]
fn rejected_join_fails_immediately() {
    let mut rig = Rig::new(SimLink::Reject);
    rig.to_awaiting_credentials();
    rig.ble.inject_write(b"bad:cfg");
    rig.step(false);
    assert_eq!(rig.step(false), StateId::Failed);
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::ProvisioningFailed(FailureCause::JoinFailed(JoinError::Rejected))
        )),
        1
    );
}

// ── Connected ─────────────────────────────────────────────────

#[test]
fn connected_releases_radio_and_modem_exactly_once() {
    let mut rig = Rig::new(SimLink::AssociateAfter { ms: 0 });
    rig.to_awaiting_credentials();
    rig.ble.inject_write(b"home:pw");
    rig.steps(2, false);
    assert_eq!(rig.app.state(), StateId::Connected);

    rig.long_press();
    rig.ble.inject_write(b"other:pw");
    rig.steps(500, false);

    assert_eq!(rig.app.state(), StateId::Connected);
    assert_eq!(rig.ble.stats().releases, 1);
    assert_eq!(rig.modem.count_line("AT+QPOWD"), 1);
    assert_eq!(rig.wifi.join_calls(), 1);
    assert_eq!(rig.led.level(), Some(true));
}
