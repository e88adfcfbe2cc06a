//! 플랫폼별 다이제스트 해석
//!
//! 멀티 플랫폼 인덱스에서 요청한 플랫폼의 자식 매니페스트 다이제스트를 찾아
//! `repository@digest` 형태의 고정 참조를 만듭니다.
//!
//! 해석 실패는 요청 전체를 중단시키지 않습니다. 호출자는 경고를 남기고
//! 원래 참조로 계속 진행해야 합니다.

use std::sync::Arc;

use copapatch_core::platform::Platform;
use copapatch_core::reference::ImageReference;
use tracing::debug;

use crate::error::InspectorError;
use crate::registry::{ManifestSource, RemoteDescriptor};

/// 디스크립터에서 플랫폼에 해당하는 다이제스트를 고릅니다.
///
/// 단일 이미지면 그 다이제스트를, 인덱스면 선언 순서상 첫 번째로 일치하는
/// 자식의 다이제스트를 반환합니다.
pub fn select_platform_digest<'a>(
    descriptor: &'a RemoteDescriptor,
    platform: &Platform,
) -> Option<&'a str> {
    match descriptor {
        RemoteDescriptor::Image { digest } => Some(digest.as_str()),
        RemoteDescriptor::Index { entries } => entries
            .iter()
            .find(|entry| entry.platform.as_ref().is_some_and(|p| p.matches(platform)))
            .map(|entry| entry.digest.as_str()),
    }
}

/// 매니페스트 소스를 이용한 다이제스트 해석기
pub struct DigestResolver<M: ManifestSource> {
    source: Arc<M>,
}

impl<M: ManifestSource> DigestResolver<M> {
    pub fn new(source: Arc<M>) -> Self {
        Self { source }
    }

    /// 플랫폼 전용 다이제스트로 고정된 참조를 반환합니다.
    ///
    /// # Errors
    ///
    /// - `InspectorError::ManifestUnavailable`: 원격 디스크립터 조회 실패
    /// - `InspectorError::PlatformNotFound`: 인덱스에 일치하는 자식이 없음
    pub async fn resolve_platform_digest(
        &self,
        reference: &ImageReference,
        platform: &Platform,
    ) -> Result<ImageReference, InspectorError> {
        // 이미 다이제스트로 고정된 참조
        if reference.digest().is_some() {
            return Ok(reference.clone());
        }

        let descriptor = self.source.fetch_descriptor(reference).await?;
        let digest = select_platform_digest(&descriptor, platform).ok_or_else(|| {
            InspectorError::PlatformNotFound {
                image: reference.to_string(),
                platform: platform.to_string(),
            }
        })?;

        let resolved = reference.with_digest(digest);
        debug!(image = %reference, %platform, resolved = %resolved, "resolved platform digest");
        Ok(resolved)
    }
}
