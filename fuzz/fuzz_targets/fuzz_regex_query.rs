#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Compiling must not panic, and the result is already in simplest form
    for ci in [false, true] {
        if let Ok(query) = csearch::query::compile(data, ci) {
            assert_eq!(query.clone().simplify(), query);
        }
    }
});
