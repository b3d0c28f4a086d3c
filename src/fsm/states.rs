//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers.  No closures, no heap.
//! Handlers receive the context blackboard and a [`Board`] of borrowed
//! ports, so blocking calls (modem power pulse, AT windows, the network
//! join) run synchronously inside the tick that issues them.
//!
//! ```text
//!  IDLE ──[long press]──▶ PAIRING_ENABLED ──▶ MODEM_POWERING_ON ──▶ IDENTITY_QUERY
//!                                                                      │      │
//!                                                            [len >= 15]  [len < 15]
//!                                                                      ▼      │
//!  AWAITING_CREDENTIALS ◀──[peer connected]── AWAITING_PEER ◀──────────┘      │
//!          │                                                                  │
//!  [credentials]                                                              │
//!          ▼                                                                  ▼
//!  JOINING_NETWORK ──[associated]──▶ CONNECTED        [timeout]──────────▶ FAILED
//! ```
//!
//! CONNECTED and FAILED are sticky until power cycle.

use log::{info, warn};

use super::context::{FailureCause, FsmContext};
use super::{StateDescriptor, StateId};
use crate::app::ports::Board;
use crate::drivers::led_patterns::LedPattern;
use crate::modem::{self, PowerSequence};
use crate::network;
use crate::session::DeviceIdentity;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: PairingEnabled
        StateDescriptor {
            id: StateId::PairingEnabled,
            name: "PairingEnabled",
            on_enter: None,
            on_exit: None,
            on_update: pairing_enabled_update,
        },
        // Index 2: ModemPoweringOn
        StateDescriptor {
            id: StateId::ModemPoweringOn,
            name: "ModemPoweringOn",
            on_enter: None,
            on_exit: None,
            on_update: modem_powering_on_update,
        },
        // Index 3: IdentityQuery
        StateDescriptor {
            id: StateId::IdentityQuery,
            name: "IdentityQuery",
            on_enter: None,
            on_exit: None,
            on_update: identity_query_update,
        },
        // Index 4: AwaitingPeer
        StateDescriptor {
            id: StateId::AwaitingPeer,
            name: "AwaitingPeer",
            on_enter: Some(awaiting_peer_enter),
            on_exit: None,
            on_update: awaiting_peer_update,
        },
        // Index 5: AwaitingCredentials
        StateDescriptor {
            id: StateId::AwaitingCredentials,
            name: "AwaitingCredentials",
            on_enter: Some(awaiting_credentials_enter),
            on_exit: None,
            on_update: awaiting_credentials_update,
        },
        // Index 6: JoiningNetwork
        StateDescriptor {
            id: StateId::JoiningNetwork,
            name: "JoiningNetwork",
            on_enter: None,
            on_exit: None,
            on_update: joining_network_update,
        },
        // Index 7: Connected
        StateDescriptor {
            id: StateId::Connected,
            name: "Connected",
            on_enter: Some(connected_enter),
            on_exit: None,
            on_update: terminal_update,
        },
        // Index 8: Failed
        StateDescriptor {
            id: StateId::Failed,
            name: "Failed",
            on_enter: Some(failed_enter),
            on_exit: None,
            on_update: terminal_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE: waiting for the long-press gesture
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext, _board: &mut Board<'_>) {
    ctx.led = LedPattern::Off;
    info!("IDLE: hold the button for {} ms to start pairing", ctx.config.long_press_ms);
}

fn idle_update(ctx: &mut FsmContext, _board: &mut Board<'_>) -> Option<StateId> {
    ctx.gesture.take().map(|()| StateId::PairingEnabled)
}

// ═══════════════════════════════════════════════════════════════════════════
//  PAIRING_ENABLED: start advertising the credential service
// ═══════════════════════════════════════════════════════════════════════════

fn pairing_enabled_update(_ctx: &mut FsmContext, board: &mut Board<'_>) -> Option<StateId> {
    match board.pairing.enable() {
        Ok(()) => info!("PAIRING: advertising credential service"),
        // The sequence has no retry path; the peer simply never appears.
        Err(e) => warn!("PAIRING: {}", e),
    }
    Some(StateId::ModemPoweringOn)
}

// ═══════════════════════════════════════════════════════════════════════════
//  MODEM_POWERING_ON: power-key pulse and boot wait (blocking)
// ═══════════════════════════════════════════════════════════════════════════

fn modem_powering_on_update(ctx: &mut FsmContext, board: &mut Board<'_>) -> Option<StateId> {
    let seq = PowerSequence {
        low_ms: ctx.config.modem_power_low_ms,
        settle_ms: ctx.config.modem_power_settle_ms,
        boot_ms: ctx.config.modem_boot_ms,
    };
    modem::power_on(board.modem, board.clock, seq);
    Some(StateId::IdentityQuery)
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDENTITY_QUERY: read the modem identity; length is the only check
// ═══════════════════════════════════════════════════════════════════════════

fn identity_query_update(ctx: &mut FsmContext, board: &mut Board<'_>) -> Option<StateId> {
    let raw = modem::send_command(
        board.modem,
        board.clock,
        &ctx.config.identity_command,
        ctx.config.identity_window_ms,
    );

    match DeviceIdentity::from_response(&raw, ctx.config.min_identity_len) {
        Some(identity) => {
            info!("IDENTITY: {}", identity);
            ctx.identity = Some(identity);
            Some(StateId::AwaitingPeer)
        }
        None => {
            let len = raw.trim_ascii().len();
            ctx.failure = Some(FailureCause::IdentityInvalid { len });
            Some(StateId::Failed)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAITING_PEER: advertising, slow blink
// ═══════════════════════════════════════════════════════════════════════════

fn awaiting_peer_enter(ctx: &mut FsmContext, _board: &mut Board<'_>) {
    ctx.led = LedPattern::SlowBlink;
}

fn awaiting_peer_update(ctx: &mut FsmContext, _board: &mut Board<'_>) -> Option<StateId> {
    ctx.peer_connected.then_some(StateId::AwaitingCredentials)
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAITING_CREDENTIALS: peer connected, waiting for a valid payload
// ═══════════════════════════════════════════════════════════════════════════

fn awaiting_credentials_enter(ctx: &mut FsmContext, _board: &mut Board<'_>) {
    ctx.led = LedPattern::Solid;
}

/// Malformed payloads never raise the token, so this can wait forever.
fn awaiting_credentials_update(ctx: &mut FsmContext, _board: &mut Board<'_>) -> Option<StateId> {
    let credentials = ctx.credentials.take()?;
    info!("CREDENTIALS: received for network '{}'", credentials.name);
    ctx.network = Some(credentials);
    Some(StateId::JoiningNetwork)
}

// ═══════════════════════════════════════════════════════════════════════════
//  JOINING_NETWORK: bounded blocking join
// ═══════════════════════════════════════════════════════════════════════════

fn joining_network_update(ctx: &mut FsmContext, board: &mut Board<'_>) -> Option<StateId> {
    let Some(credentials) = ctx.network.as_ref() else {
        // Only reachable through force_transition.
        warn!("JOIN: no credentials on record");
        return None;
    };

    match network::join(
        board.network,
        board.clock,
        credentials,
        ctx.config.join_bound_ms,
        ctx.config.join_poll_ms,
    ) {
        Ok(_) => Some(StateId::Connected),
        Err(e) => {
            ctx.failure = Some(FailureCause::JoinFailed(e));
            Some(StateId::Failed)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Terminal states
// ═══════════════════════════════════════════════════════════════════════════

fn connected_enter(ctx: &mut FsmContext, board: &mut Board<'_>) {
    board.pairing.disable();
    modem::power_down(
        board.modem,
        board.clock,
        &ctx.config.power_down_command,
        ctx.config.power_down_window_ms,
    );
    ctx.led = LedPattern::Solid;
    info!("CONNECTED: provisioning complete, pairing released, modem off");
}

fn failed_enter(ctx: &mut FsmContext, _board: &mut Board<'_>) {
    ctx.led = LedPattern::FastBlink;
    match ctx.failure {
        Some(cause) => warn!("FAILED: {} (power cycle to retry)", cause),
        None => warn!("FAILED: power cycle to retry"),
    }
}

fn terminal_update(_ctx: &mut FsmContext, _board: &mut Board<'_>) -> Option<StateId> {
    None
}
