#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    entdiff_fuzz::fuzz_diff(data);
});
