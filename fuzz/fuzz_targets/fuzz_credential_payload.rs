//! Fuzz target: `CredentialPair::parse`
//!
//! Feeds arbitrary characteristic writes to the credential parser and
//! checks that an accepted payload reassembles to the original bytes.
//!
//! cargo fuzz run fuzz_credential_payload

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartcollar::session::CredentialPair;

fuzz_target!(|data: &[u8]| {
    if let Some(pair) = CredentialPair::parse(data) {
        assert!(!pair.name.contains(':'), "name must stop at the first colon");
        let rebuilt = format!("{}:{}", pair.name, pair.secret);
        assert_eq!(rebuilt.as_bytes(), data);
    }
});
