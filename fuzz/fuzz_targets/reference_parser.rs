#![no_main]

use copapatch_core::ImageReference;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(reference) = ImageReference::parse(input) {
            // 파싱에 성공한 참조는 레지스트리 형태로 다시 파싱 가능해야 함
            let qualified = reference.registry_reference();
            let reparsed = ImageReference::parse(&qualified)
                .unwrap_or_else(|e| panic!("'{qualified}' from '{input}' failed to reparse: {e}"));
            assert_eq!(reparsed.digest(), reference.digest());
            assert!(!reference.repository().is_empty());
        }
    }
});
