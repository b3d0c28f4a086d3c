//! Fuzz target: `NmeaLineReader::push`
//!
//! Splits arbitrary receiver bytes into two chunks and feeds them to the
//! line reader.  It must never panic and never hold more than its cap.
//!
//! cargo fuzz run fuzz_nmea_reader

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartcollar::tracker::gps::{MAX_LINE_BUFFER, NmeaLineReader};

fuzz_target!(|data: &[u8]| {
    let mut reader = NmeaLineReader::new();
    let cut = data.first().map_or(0, |b| usize::from(*b)).min(data.len());
    let (head, tail) = data.split_at(cut);

    let _ = reader.push(head);
    let _ = reader.push(tail);
    assert!(reader.pending() <= MAX_LINE_BUFFER);
});
