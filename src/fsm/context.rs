//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to.  It holds the provisioning session (captured identity,
//! received credentials), the one-shot input tokens raised by the main
//! loop, the LED pattern requested by the current state, configuration,
//! and timing.  Think of it as the "blackboard" in a blackboard
//! architecture.

use core::fmt;

use crate::config::CollarConfig;
use crate::drivers::led_patterns::LedPattern;
use crate::error::JoinError;
use crate::session::{CredentialPair, DeviceIdentity, InputToken};

// ---------------------------------------------------------------------------
// Failure cause (recorded on entry to Failed)
// ---------------------------------------------------------------------------

/// Why provisioning ended in `Failed`.  Diagnostic only: the user sees
/// the same fast blink for every cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
    /// The identity response was shorter than the minimum after trimming.
    IdentityInvalid { len: usize },
    /// The network join did not complete.
    JoinFailed(JoinError),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdentityInvalid { len } => {
                write!(f, "identity response too short ({} bytes)", len)
            }
            Self::JoinFailed(e) => write!(f, "{}", e),
        }
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Inputs (written by AppService before each tick) --
    /// Raised by a long press; consumed only by Idle.
    pub gesture: InputToken<()>,
    /// Raised when a well-formed payload arrives; consumed only by
    /// AwaitingCredentials.
    pub credentials: InputToken<CredentialPair>,
    /// Mirrors the pairing peer's connection state.
    pub peer_connected: bool,

    // -- Session --
    pub identity: Option<DeviceIdentity>,
    /// Credentials handed to the join primitive.
    pub network: Option<CredentialPair>,
    pub failure: Option<FailureCause>,

    // -- Outputs --
    /// LED pattern requested by the current state.
    pub led: LedPattern,

    // -- Configuration --
    pub config: CollarConfig,
}

impl FsmContext {
    /// Create a new context with the given configuration.
    pub fn new(config: CollarConfig) -> Self {
        Self {
            gesture: InputToken::empty(),
            credentials: InputToken::empty(),
            peer_connected: false,
            identity: None,
            network: None,
            failure: None,
            led: LedPattern::Off,
            config,
        }
    }
}
