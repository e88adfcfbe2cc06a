//! VEX 문서 집계
//!
//! 패처가 리포트 기반 패치 후 생성하는 OpenVEX 문서에서 수정된 취약점 수와
//! 업데이트된 패키지 수를 계산합니다.
//!
//! # JSON 형식
//!
//! ```json
//! {
//!   "statements": [
//!     {
//!       "vulnerability": { "@id": "CVE-2023-1234" },
//!       "status": "fixed",
//!       "products": [
//!         { "@id": "pkg:oci/alpine", "subcomponents": [{ "@id": "pkg:apk/alpine/libssl3" }] }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! 패키지 수는 중복을 제거하지 않습니다. 두 문장이 같은 패키지를 가리키면 두 번 셉니다.

use std::path::Path;

use serde::Deserialize;
use serde::de::IgnoredAny;

use crate::error::EngineError;

/// VEX 문서 최대 크기 (64 MB)
const MAX_VEX_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// 수정 완료를 나타내는 상태 값
pub const FIXED_STATUS: &str = "fixed";

/// VEX 집계 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VexCounts {
    pub fixed_vulnerability_count: usize,
    pub updated_package_count: usize,
}

#[derive(Deserialize)]
struct VexDocument {
    statements: Vec<Statement>,
}

#[derive(Deserialize)]
struct Statement {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Deserialize)]
struct Product {
    #[serde(default)]
    subcomponents: Vec<IgnoredAny>,
}

/// VEX 문서 바이트를 집계합니다.
///
/// # Errors
///
/// JSON 이 아니거나 최상위 `statements` 배열이 없으면 `EngineError::VexParse`
pub fn summarize_vex(bytes: &[u8]) -> Result<VexCounts, EngineError> {
    let document: VexDocument =
        serde_json::from_slice(bytes).map_err(|e| EngineError::VexParse(e.to_string()))?;

    let counts = document
        .statements
        .iter()
        .filter(|s| s.status.as_deref() == Some(FIXED_STATUS))
        .fold(VexCounts::default(), |mut acc, statement| {
            acc.fixed_vulnerability_count += 1;
            acc.updated_package_count += statement
                .products
                .iter()
                .map(|p| p.subcomponents.len())
                .sum::<usize>();
            acc
        });

    Ok(counts)
}

/// 파일에서 VEX 문서를 읽어 집계합니다.
///
/// # Errors
///
/// - `EngineError::VexRead`: 파일이 없거나 읽을 수 없음, 크기 초과
/// - `EngineError::VexParse`: 형식 오류
pub async fn parse_vex_document(path: &Path) -> Result<VexCounts, EngineError> {
    let read_err = |reason: String| EngineError::VexRead {
        path: path.display().to_string(),
        reason,
    };

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| read_err(e.to_string()))?;
    if metadata.len() > MAX_VEX_FILE_SIZE {
        return Err(read_err(format!(
            "file size {} bytes exceeds maximum {MAX_VEX_FILE_SIZE} bytes",
            metadata.len()
        )));
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| read_err(e.to_string()))?;
    summarize_vex(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "@context": "https://openvex.dev/ns/v0.2.0",
        "statements": [
            {
                "vulnerability": {"@id": "CVE-2023-0001"},
                "status": "fixed",
                "products": [{"@id": "pkg:oci/alpine", "subcomponents": [{"@id": "pkg:apk/libssl3"}]}]
            },
            {
                "vulnerability": {"@id": "CVE-2023-0002"},
                "status": "not_affected",
                "products": [{"@id": "pkg:oci/alpine", "subcomponents": [{"@id": "pkg:apk/zlib"}]}]
            },
            {
                "vulnerability": {"@id": "CVE-2023-0003"},
                "status": "fixed",
                "products": [{"@id": "pkg:oci/alpine", "subcomponents": [
                    {"@id": "pkg:apk/libssl3"}, {"@id": "pkg:apk/libcrypto3"}
                ]}]
            }
        ]
    }"#;

    #[test]
    fn counts_fixed_statements_and_subcomponents() {
        let counts = summarize_vex(SAMPLE.as_bytes()).unwrap();
        assert_eq!(counts.fixed_vulnerability_count, 2);
        // libssl3 는 두 번 셈
        assert_eq!(counts.updated_package_count, 3);
    }

    #[test]
    fn summarizing_twice_gives_same_result() {
        let first = summarize_vex(SAMPLE.as_bytes()).unwrap();
        let second = summarize_vex(SAMPLE.as_bytes()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn subcomponents_sum_across_products() {
        let doc = r#"{"statements": [{"status": "fixed", "products": [
            {"subcomponents": [{}, {}]},
            {"subcomponents": [{}]},
            {}
        ]}]}"#;
        let counts = summarize_vex(doc.as_bytes()).unwrap();
        assert_eq!(counts.fixed_vulnerability_count, 1);
        assert_eq!(counts.updated_package_count, 3);
    }

    #[test]
    fn empty_statements_yield_zero() {
        let counts = summarize_vex(br#"{"statements": []}"#).unwrap();
        assert_eq!(counts, VexCounts::default());
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            summarize_vex(b"{\"statements\": [").unwrap_err(),
            EngineError::VexParse(_)
        ));
    }

    #[test]
    fn missing_statements_is_parse_error() {
        assert!(matches!(
            summarize_vex(br#"{"@context": "x"}"#).unwrap_err(),
            EngineError::VexParse(_)
        ));
    }

    #[tokio::test]
    async fn parse_vex_document_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vex.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let counts = parse_vex_document(&path).await.unwrap();
        assert_eq!(counts.fixed_vulnerability_count, 2);
    }

    #[tokio::test]
    async fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_vex_document(&dir.path().join("vex.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::VexRead { .. }));
    }
}
