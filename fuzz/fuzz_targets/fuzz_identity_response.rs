//! Fuzz target: `DeviceIdentity::from_response`
//!
//! cargo fuzz run fuzz_identity_response

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartcollar::session::{DeviceIdentity, MAX_IDENTITY_LEN};

fuzz_target!(|data: &[u8]| {
    if let Some(id) = DeviceIdentity::from_response(data, 15) {
        assert!(id.as_str().len() >= 15);
        assert!(id.as_str().len() <= MAX_IDENTITY_LEN);
    }
});
