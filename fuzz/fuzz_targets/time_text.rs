#![no_main]

use libfuzzer_sys::fuzz_target;
use ortrend::time_codec::{format_minutes, parse_time_text};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Any accepted text must format back to something that parses to the same minute
        if let Ok(minutes) = parse_time_text(input) {
            assert_eq!(parse_time_text(&format_minutes(minutes)).ok(), Some(minutes));
        }
    }
});
