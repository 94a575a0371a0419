#![no_main]

use libfuzzer_sys::fuzz_target;
use research_advisor::sources::arxiv;

fuzz_target!(|data: &[u8]| {
    if let Ok(body) = std::str::from_utf8(data) {
        let _ = arxiv::parse_response(body);
    }
});
