//! Fuzz target for PDF assembly.
//!
//! Untrusted bytes posing as a rendered marksheet must produce an error,
//! never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use marksheet::{merge, RenderedDocument};

fuzz_target!(|data: &[u8]| {
    if data.len() > 200_000 {
        return;
    }

    let doc = RenderedDocument {
        name: "fuzz".to_string(),
        bytes: data.to_vec(),
        page_count: 1,
    };
    let _ = merge(&[doc]);
});
