#![no_main]

use copapatch_core::Platform;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(platform) = input.parse::<Platform>() {
            // Display 결과는 같은 플랫폼으로 다시 파싱되어야 함
            let shown = platform.to_string();
            let reparsed: Platform = shown.parse().expect("displayed platform must parse");
            assert_eq!(reparsed, platform);
            assert!(reparsed.matches(&platform));
            assert!(!platform.arch_suffix().contains('/'));
        }
    }
});
