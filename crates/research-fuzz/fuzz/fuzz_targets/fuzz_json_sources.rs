#![no_main]

use libfuzzer_sys::fuzz_target;
use research_advisor::normalize::MAX_ABSTRACT_CHARS;
use research_advisor::sources::{crossref, semantic_scholar};

fuzz_target!(|data: &[u8]| {
    let Ok(body) = std::str::from_utf8(data) else {
        return;
    };

    for papers in [semantic_scholar::parse_response(body), crossref::parse_response(body)]
        .into_iter()
        .flatten()
    {
        for paper in papers {
            assert!(!paper.title.trim().is_empty());
            assert!(paper.r#abstract.chars().count() <= MAX_ABSTRACT_CHARS + 3);
        }
    }
});
