//! 플랫폼 타입 및 패처 지원 플랫폼 카탈로그
//!
//! [`Platform`]은 `os/architecture[/variant]` 튜플입니다. 비교는 모든 필드에 대해
//! 정확히 일치해야 하며, variant 생략을 와일드카드로 취급하지 않습니다.
//! 예외는 [`DEFAULT_VARIANTS`] 테이블에 명시된 아키텍처뿐입니다
//! (`linux/arm64` 와 `linux/arm64/v8` 은 같은 플랫폼으로 봅니다).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ReferenceError;

/// variant 생략 시 암묵적으로 적용되는 기본 variant
///
/// `(architecture, variant)` 쌍입니다. 새 동치 규칙은 이 테이블에 항목을 추가합니다.
pub const DEFAULT_VARIANTS: &[(&str, &str)] = &[("arm64", "v8")];

/// 패처가 지원하는 플랫폼 (순서 유지)
const SUPPORTED_PLATFORMS: &[(&str, &str, Option<&str>)] = &[
    ("linux", "amd64", None),
    ("linux", "arm64", None),
    ("linux", "arm", Some("v7")),
    ("linux", "arm", Some("v6")),
    ("linux", "386", None),
    ("linux", "ppc64le", None),
    ("linux", "s390x", None),
    ("linux", "riscv64", None),
];

/// 이미지 플랫폼 튜플
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    os: String,
    architecture: String,
    variant: Option<String>,
}

impl Platform {
    /// 새 플랫폼을 생성합니다. 빈 variant 는 `None` 으로 정규화됩니다.
    pub fn new(
        os: impl Into<String>,
        architecture: impl Into<String>,
        variant: Option<impl Into<String>>,
    ) -> Self {
        let variant = variant.map(Into::into).filter(|v: &String| !v.is_empty());
        Self {
            os: os.into(),
            architecture: architecture.into(),
            variant,
        }
    }

    /// 현재 빌드 타겟의 플랫폼
    ///
    /// 레지스트리가 사용할 수 있는 플랫폼을 하나도 알려주지 않을 때의 기본값으로 쓰입니다.
    pub fn host() -> Self {
        Self::from_rust_target(
            std::env::consts::OS,
            std::env::consts::ARCH,
            cfg!(target_endian = "little"),
        )
    }

    /// Rust 타깃 이름(`std::env::consts`)을 OCI 플랫폼 이름으로 바꿉니다.
    fn from_rust_target(os: &str, arch: &str, little_endian: bool) -> Self {
        let os = match os {
            "macos" => "darwin",
            other => other,
        };
        let architecture = match arch {
            "x86_64" => "amd64",
            "x86" => "386",
            "aarch64" => "arm64",
            "powerpc64" if little_endian => "ppc64le",
            "powerpc64" => "ppc64",
            "mips64" if little_endian => "mips64le",
            other => other,
        };
        let variant = (arch == "arm").then_some("v7");
        Self::new(os, architecture, variant)
    }

    pub fn os(&self) -> &str {
        &self.os
    }

    pub fn architecture(&self) -> &str {
        &self.architecture
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// os 또는 architecture 가 비어 있거나 `unknown` 인지 여부
    ///
    /// 어테스테이션 매니페스트 등은 `unknown/unknown` 으로 광고됩니다.
    pub fn is_unknown(&self) -> bool {
        self.os.is_empty()
            || self.architecture.is_empty()
            || self.os == "unknown"
            || self.architecture == "unknown"
    }

    /// 결과 이미지 태그 접미사 (`linux/arm/v7` → `arm-v7`)
    pub fn arch_suffix(&self) -> String {
        match &self.variant {
            Some(variant) => format!("{}-{}", self.architecture, variant),
            None => self.architecture.clone(),
        }
    }

    /// 동치 테이블을 적용한 비교
    ///
    /// `linux/arm64` 와 `linux/arm64/v8` 은 서로 일치합니다.
    pub fn matches(&self, other: &Platform) -> bool {
        self.os == other.os
            && self.architecture == other.architecture
            && self.effective_variant() == other.effective_variant()
    }

    fn effective_variant(&self) -> Option<&str> {
        self.variant.as_deref().or_else(|| {
            DEFAULT_VARIANTS
                .iter()
                .find(|(arch, _)| *arch == self.architecture)
                .map(|(_, variant)| *variant)
        })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            Some(variant) => write!(f, "{}/{}/{}", self.os, self.architecture, variant),
            None => write!(f, "{}/{}", self.os, self.architecture),
        }
    }
}

impl FromStr for Platform {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ReferenceError::InvalidPlatform {
            platform: s.to_owned(),
            reason: reason.to_owned(),
        };

        let parts: Vec<&str> = s.trim().split('/').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(invalid("expected os/architecture[/variant]"));
        }
        if parts.iter().any(|p| p.is_empty()) {
            return Err(invalid("empty segment"));
        }
        if parts
            .iter()
            .any(|p| !p.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
        {
            return Err(invalid("segments must be alphanumeric"));
        }

        Ok(Self::new(parts[0], parts[1], parts.get(2).copied()))
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// --- 카탈로그 ---

/// 지원 플랫폼 전체 목록 (매 호출마다 새로 생성)
pub fn all() -> Vec<Platform> {
    SUPPORTED_PLATFORMS
        .iter()
        .map(|(os, arch, variant)| Platform::new(*os, *arch, *variant))
        .collect()
}

/// 패처가 해당 플랫폼을 지원하는지 여부
pub fn is_supported(platform: &Platform) -> bool {
    SUPPORTED_PLATFORMS.iter().any(|(os, arch, variant)| {
        platform.matches(&Platform::new(*os, *arch, *variant))
    })
}

/// 지원 플랫폼만 남깁니다 (입력 순서 유지)
pub fn filter_supported(platforms: &[Platform]) -> Vec<Platform> {
    platforms.iter().filter(|p| is_supported(p)).cloned().collect()
}

/// 지원되지 않는 플랫폼만 남깁니다 (입력 순서 유지)
pub fn unsupported(platforms: &[Platform]) -> Vec<Platform> {
    platforms.iter().filter(|p| !is_supported(p)).cloned().collect()
}

/// 순서를 유지하며 중복을 제거합니다.
///
/// 동치 플랫폼(`linux/arm64` 와 `linux/arm64/v8`)도 중복으로 보고 첫 항목만 남깁니다.
pub fn dedup_ordered(platforms: impl IntoIterator<Item = Platform>) -> Vec<Platform> {
    let mut out: Vec<Platform> = Vec::new();
    for platform in platforms {
        if !out.iter().any(|seen| seen.matches(&platform)) {
            out.push(platform);
        }
    }
    out
}
