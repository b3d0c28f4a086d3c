//! NMEA line assembly and RMC position extraction.
//!
//! Receiver bytes arrive in arbitrary chunks.  [`NmeaLineReader`] keeps
//! the unterminated tail between reads, hands every complete `\r\n`
//! line to the `nmea` parser and reports the newest RMC position.

use log::debug;
use nmea::{Nmea, SentenceType};

/// Tail kept without a terminator before the buffer is discarded.
pub const MAX_LINE_BUFFER: usize = 4096;

/// A position fix in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
}

/// Parse one sentence.  Only RMC sentences with both coordinates count.
pub fn parse_rmc(line: &str) -> Option<Fix> {
    let mut parser = Nmea::default();
    match parser.parse(line) {
        Ok(SentenceType::RMC) => Some(Fix {
            latitude: parser.latitude()?,
            longitude: parser.longitude()?,
        }),
        Ok(_) => None,
        Err(e) => {
            debug!("GPS: unparsed sentence: {:?}", e);
            None
        }
    }
}

#[derive(Debug, Default)]
pub struct NmeaLineReader {
    buffer: String,
}

impl NmeaLineReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append received bytes and parse every line they complete.
    /// Returns the last fix among those lines.
    pub fn push(&mut self, bytes: &[u8]) -> Option<Fix> {
        if bytes.is_empty() {
            return None;
        }
        self.buffer.push_str(&String::from_utf8_lossy(bytes));

        let mut fix = None;
        if let Some(last) = self.buffer.rfind("\r\n") {
            let end = last + 2;
            for line in self.buffer[..end].split("\r\n") {
                if line.trim().is_empty() {
                    continue;
                }
                if let Some(f) = parse_rmc(line) {
                    fix = Some(f);
                }
            }
            self.buffer.drain(..end);
        }

        if self.buffer.len() > MAX_LINE_BUFFER {
            debug!("GPS: discarding {} unterminated bytes", self.buffer.len());
            self.buffer.clear();
        }
        fix
    }

    /// Bytes waiting for a terminator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
