#![no_main]

use libfuzzer_sys::fuzz_target;
use research_advisor::models::{DebugSourcesQuery, ResearchRequest};

fuzz_target!(|data: &[u8]| {
    if let Ok(request) = serde_json::from_slice::<ResearchRequest>(data) {
        let _ = request.validate();
    }
    if let Ok(query) = serde_json::from_slice::<DebugSourcesQuery>(data) {
        assert!(query.search_terms().len() <= 3);
    }
});
