#![no_main]

use copapatch_engine::summarize_vex;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(counts) = summarize_vex(data) {
        // 같은 입력이면 같은 집계
        let again = summarize_vex(data).expect("second pass must succeed");
        assert_eq!(counts, again);
    }
});
