#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use copapatch_core::{platform, ImageReference};
use copapatch_engine::naming::{output_tag, result_image_names};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    image: String,
    tag: Option<String>,
    /// 지원 플랫폼 카탈로그 인덱스
    platforms: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let Ok(reference) = ImageReference::parse(&input.image) else {
        return;
    };

    let catalog = platform::all();
    let selected: Vec<_> = input
        .platforms
        .iter()
        .take(8)
        .map(|i| catalog[*i as usize % catalog.len()].clone())
        .collect();

    let tag = output_tag(&reference, input.tag.as_deref(), "-patched");
    let names = result_image_names(&reference.repository(), &tag, &selected);

    if selected.is_empty() {
        assert_eq!(names.len(), 1);
    } else {
        assert_eq!(names.len(), selected.len());
        for name in &names {
            assert!(name.starts_with(&reference.repository()));
        }
    }
});
