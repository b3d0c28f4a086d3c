//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them; the firmware only logs them.

use crate::fsm::context::FailureCause;
use crate::fsm::StateId;
use crate::session::DeviceIdentity;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(StateId),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// The button was held long enough to count as a gesture.
    LongPress,

    PeerConnected,
    PeerDisconnected,

    /// A well-formed credential payload arrived.  The secret is never
    /// carried in an event.
    CredentialsReceived { network: heapless::String<32> },

    /// The modem identity was accepted.
    IdentityCaptured(DeviceIdentity),

    /// Provisioning ended in `Failed`.
    ProvisioningFailed(FailureCause),

    /// Provisioning ended in `Connected`.
    Provisioned { network: heapless::String<32> },

    /// Geofence: the pet crossed the home-zone boundary.
    ZoneChanged(crate::tracker::Zone),

    /// Geofence: a location report was submitted by SMS.
    LocationReported { latitude: f64, longitude: f64 },
}
