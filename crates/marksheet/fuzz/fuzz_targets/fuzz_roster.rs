//! Fuzz target for roster parsing and validation.
//!
//! Arbitrary bytes are parsed as delimited text and, when that succeeds,
//! validated. Neither step may panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use marksheet::{Parser, RosterValidator};

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    let parser = Parser::new();
    for delimiter in [b',', b'\t', b';'] {
        if let Ok(table) = parser.parse_bytes(data, delimiter) {
            let _ = RosterValidator::new().validate(&table);
        }
    }
});
