//! 이미지 참조 파싱
//!
//! `repo`, `repo:tag`, `repo@digest` 형식을 받아 [`ImageReference`]로 변환합니다.
//!
//! Docker Hub 이미지는 표시용 저장소 이름에서 `docker.io/` 도메인과 `library/`
//! 접두어가 제거됩니다 (`alpine`). 레지스트리 조회에는 항상
//! [`ImageReference::registry_reference`]의 완전한 이름을 사용해야 합니다.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ReferenceError;

/// Docker Hub 정규 도메인
pub const DOCKER_HUB_DOMAIN: &str = "docker.io";

/// Docker Hub 공식 이미지 접두어
const OFFICIAL_PREFIX: &str = "library/";

/// 태그가 없을 때 적용되는 기본 태그
pub const DEFAULT_TAG: &str = "latest";

const MAX_NAME_LEN: usize = 255;
const MAX_TAG_LEN: usize = 128;

/// 파싱된 이미지 참조
///
/// `tag` 와 `digest` 중 정확히 하나만 설정됩니다. 생성 이후 변경할 수 없습니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ImageReference {
    registry: String,
    path: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageReference {
    /// 이미지 참조 문자열을 파싱합니다.
    ///
    /// 태그와 다이제스트가 모두 주어지면 (`repo:tag@sha256:...`) 다이제스트만 남습니다.
    pub fn parse(reference: &str) -> Result<Self, ReferenceError> {
        if reference.is_empty() {
            return Err(ReferenceError::Empty);
        }

        let invalid = |reason: &str| ReferenceError::InvalidReference {
            reference: reference.to_owned(),
            reason: reason.to_owned(),
        };

        if reference.chars().any(char::is_whitespace) {
            return Err(invalid("must not contain whitespace"));
        }

        let (name_and_tag, digest) = match reference.split_once('@') {
            Some((name, digest)) => {
                validate_digest(digest).map_err(|r| invalid(&r))?;
                (name, Some(digest.to_owned()))
            }
            None => (reference, None),
        };

        // 마지막 ':' 가 마지막 '/' 뒤에 있을 때만 태그 구분자 (레지스트리 포트와 구분)
        let last_slash = name_and_tag.rfind('/');
        let (name, tag) = match name_and_tag.rfind(':') {
            Some(idx) if last_slash.is_none_or(|slash| idx > slash) => {
                let tag = &name_and_tag[idx + 1..];
                validate_tag(tag).map_err(|r| invalid(&r))?;
                (&name_and_tag[..idx], Some(tag.to_owned()))
            }
            _ => (name_and_tag, None),
        };

        if name.is_empty() {
            return Err(invalid("missing repository name"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(invalid("repository name exceeds 255 characters"));
        }

        let (registry, path) = split_domain(name);
        validate_domain(registry).map_err(|r| invalid(&r))?;
        for component in path.split('/') {
            validate_component(component).map_err(|r| invalid(&r))?;
        }

        let registry = if registry == "index.docker.io" {
            DOCKER_HUB_DOMAIN
        } else {
            registry
        };
        let path = if registry == DOCKER_HUB_DOMAIN && !path.contains('/') {
            format!("{OFFICIAL_PREFIX}{path}")
        } else {
            path.to_owned()
        };

        let tag = match (&digest, tag) {
            (Some(_), _) => None,
            (None, Some(tag)) => Some(tag),
            (None, None) => Some(DEFAULT_TAG.to_owned()),
        };

        Ok(Self {
            registry: registry.to_owned(),
            path,
            tag,
            digest,
        })
    }

    /// 표시용 저장소 이름 (Docker Hub 도메인과 `library/` 접두어 제거)
    pub fn repository(&self) -> String {
        if self.registry == DOCKER_HUB_DOMAIN {
            self.path
                .strip_prefix(OFFICIAL_PREFIX)
                .unwrap_or(&self.path)
                .to_owned()
        } else {
            format!("{}/{}", self.registry, self.path)
        }
    }

    /// 레지스트리 도메인 (`docker.io`, `ghcr.io`, `localhost:5000` ...)
    pub fn registry(&self) -> &str {
        &self.registry
    }

    /// 레지스트리 내 경로 (`library/alpine`)
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// 레지스트리 조회용 완전한 참조 (`docker.io/library/alpine:3.17`)
    pub fn registry_reference(&self) -> String {
        format!("{}/{}{}", self.registry, self.path, self.suffix())
    }

    /// 같은 저장소의 다이제스트 고정 참조를 만듭니다.
    pub fn with_digest(&self, digest: impl Into<String>) -> Self {
        Self {
            registry: self.registry.clone(),
            path: self.path.clone(),
            tag: None,
            digest: Some(digest.into()),
        }
    }

    fn suffix(&self) -> String {
        match (&self.digest, &self.tag) {
            (Some(digest), _) => format!("@{digest}"),
            (None, Some(tag)) => format!(":{tag}"),
            (None, None) => String::new(),
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.repository(), self.suffix())
    }
}

impl FromStr for ImageReference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn split_domain(name: &str) -> (&str, &str) {
    match name.split_once('/') {
        Some((first, rest))
            if first.contains('.') || first.contains(':') || first == "localhost" =>
        {
            (first, rest)
        }
        _ => (DOCKER_HUB_DOMAIN, name),
    }
}

fn validate_domain(domain: &str) -> Result<(), String> {
    let (host, port) = match domain.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (domain, None),
    };
    if host.is_empty() {
        return Err("empty registry host".to_owned());
    }
    for label in host.split('.') {
        let valid = !label.is_empty()
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-');
        if !valid {
            return Err(format!("invalid registry host '{host}'"));
        }
    }
    if let Some(port) = port {
        if port.is_empty() || !port.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("invalid registry port '{port}'"));
        }
    }
    Ok(())
}

/// 경로 컴포넌트: 소문자 영숫자, 구분자는 `.`, `_`, `__`, `-` 반복만 허용
fn validate_component(component: &str) -> Result<(), String> {
    let err = || format!("invalid path component '{component}'");
    let is_alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();

    let mut chars = component.chars().peekable();
    match chars.peek() {
        Some(&c) if is_alnum(c) => {}
        _ => return Err(err()),
    }

    let mut separator = String::new();
    for c in chars {
        if is_alnum(c) {
            if !separator.is_empty() {
                let valid = separator == "."
                    || separator == "_"
                    || separator == "__"
                    || separator.chars().all(|s| s == '-');
                if !valid {
                    return Err(err());
                }
                separator.clear();
            }
        } else if matches!(c, '.' | '_' | '-') {
            separator.push(c);
        } else {
            return Err(err());
        }
    }

    if separator.is_empty() { Ok(()) } else { Err(err()) }
}

fn validate_tag(tag: &str) -> Result<(), String> {
    let mut chars = tag.chars();
    let first_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if !first_ok || !rest_ok || tag.len() > MAX_TAG_LEN {
        return Err(format!("invalid tag '{tag}'"));
    }
    Ok(())
}

fn validate_digest(digest: &str) -> Result<(), String> {
    let err = || format!("invalid digest '{digest}'");
    let (algorithm, encoded) = digest.split_once(':').ok_or_else(err)?;

    let algorithm_ok = algorithm
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        && algorithm
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '.' | '_' | '-'));
    if !algorithm_ok || !encoded.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(err());
    }

    if algorithm == "sha256" {
        if encoded.len() != 64 || encoded.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(format!("sha256 digest must be 64 lowercase hex characters: '{digest}'"));
        }
    } else if encoded.len() < 32 {
        return Err(err());
    }
    Ok(())
}
