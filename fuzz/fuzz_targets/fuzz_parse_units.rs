//! Fuzz target: decimal amount parsing
//!
//! Arbitrary strings must parse or fail cleanly, and anything that parses
//! must render back to the same value.
//!
//! Run: cargo +nightly fuzz run fuzz_parse_units

#![no_main]
use libfuzzer_sys::fuzz_target;
use simpledex_core::units::{format_units, parse_units};

fuzz_target!(|data: (&str, u8)| {
    let (input, decimals) = data;
    let decimals = decimals % 19;
    if let Ok(value) = parse_units(input, decimals) {
        let rendered = format_units(value, decimals);
        assert_eq!(parse_units(&rendered, decimals).ok(), Some(value));
    }
});
