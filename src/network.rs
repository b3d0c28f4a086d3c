//! Network join primitive.
//!
//! Starts association and then polls the station status at a fixed
//! interval until it reports associated or the bound elapses.  The
//! status is always checked before the deadline is, so an association
//! observed on the final poll still counts.

use log::{info, warn};

use crate::app::ports::{Clock, NetworkPort};
use crate::error::JoinError;
use crate::session::CredentialPair;

/// Join the network described by `credentials`.
///
/// Blocks for at most `bound_ms` (plus one poll when the bound is not a
/// multiple of `poll_ms`).  Returns the association time on success.
pub fn join(
    network: &mut dyn NetworkPort,
    clock: &mut dyn Clock,
    credentials: &CredentialPair,
    bound_ms: u32,
    poll_ms: u32,
) -> Result<u64, JoinError> {
    info!("WiFi: joining '{}' (bound {} ms)", credentials.name, bound_ms);
    network.begin_join(credentials)?;

    let start = clock.now_ms();
    let bound = u64::from(bound_ms);
    loop {
        let elapsed = clock.now_ms().saturating_sub(start);
        if network.is_associated() {
            info!("WiFi: associated after {} ms", elapsed);
            return Ok(elapsed);
        }
        if elapsed >= bound {
            warn!("WiFi: association timed out after {} ms", elapsed);
            return Err(JoinError::Timeout { waited_ms: elapsed });
        }
        clock.delay_ms(poll_ms);
    }
}
