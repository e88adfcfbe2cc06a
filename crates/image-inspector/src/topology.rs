//! 이미지 토폴로지 조회
//!
//! 이미지가 로컬에 있는지, 멀티 플랫폼 인덱스인지, 어떤 플랫폼을 제공하는지
//! 판단합니다. 로컬 조회를 먼저 시도하고, 실패하면 원격 디스크립터를 조회합니다.
//! 로컬 조회가 성공하면 원격 조회는 하지 않습니다.
//!
//! 결과는 요청마다 새로 계산하며 캐시하지 않습니다.

use std::sync::Arc;

use copapatch_core::platform::{Platform, dedup_ordered};
use copapatch_core::types::ImageTopology;
use tracing::{debug, info};

use crate::docker::ImageStore;
use crate::error::InspectorError;
use crate::registry::is_index_media_type;

/// 이미지 토폴로지 조회기
///
/// `default_platform` 은 레지스트리가 사용 가능한 플랫폼을 하나도 알려주지 않을 때
/// 사용됩니다. 보통 호출 호스트의 플랫폼이며 설정으로 바꿀 수 있습니다.
pub struct TopologyInspector<S: ImageStore> {
    store: Arc<S>,
    default_platform: Platform,
}

impl<S: ImageStore> TopologyInspector<S> {
    pub fn new(store: Arc<S>, default_platform: Platform) -> Self {
        Self {
            store,
            default_platform,
        }
    }

    pub fn default_platform(&self) -> &Platform {
        &self.default_platform
    }

    /// 이미지 토폴로지를 조회합니다.
    ///
    /// # Errors
    ///
    /// 로컬과 원격 조회가 모두 실패하면 `InspectorError::InspectionFailed` 를 반환합니다.
    pub async fn inspect(&self, reference: &str) -> Result<ImageTopology, InspectorError> {
        let local_err = match self.store.inspect_local(reference).await {
            Ok(local) => {
                let is_multi_platform = local
                    .media_type
                    .as_deref()
                    .is_some_and(is_index_media_type);
                let topology = ImageTopology {
                    is_local: true,
                    is_multi_platform,
                    available_platforms: vec![local.platform()],
                };
                info!(
                    image = reference,
                    multi_platform = is_multi_platform,
                    platform = %local.platform(),
                    "image found locally"
                );
                return Ok(topology);
            }
            Err(e) => e,
        };

        debug!(image = reference, error = %local_err, "local inspection failed, trying registry");

        let remote = self
            .store
            .inspect_distribution(reference)
            .await
            .map_err(|remote_err| InspectorError::InspectionFailed {
                image: reference.to_owned(),
                reason: format!("local: {local_err}; remote: {remote_err}"),
            })?;

        let is_multi_platform = remote
            .media_type
            .as_deref()
            .is_some_and(is_index_media_type);

        let mut available_platforms =
            dedup_ordered(remote.platforms.into_iter().filter(|p| !p.is_unknown()));
        if available_platforms.is_empty() {
            debug!(
                image = reference,
                default = %self.default_platform,
                "registry reported no usable platforms, using default"
            );
            available_platforms.push(self.default_platform.clone());
        }

        info!(
            image = reference,
            multi_platform = is_multi_platform,
            platforms = available_platforms.len(),
            "image found in registry"
        );

        Ok(ImageTopology {
            is_local: false,
            is_multi_platform,
            available_platforms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docker::{DistributionDescriptor, LocalImage, MockImageStore};
    use crate::registry::{DOCKER_MANIFEST_LIST, OCI_IMAGE_INDEX};

    fn p(s: &str) -> Platform {
        s.parse().unwrap()
    }

    fn inspector(store: MockImageStore) -> TopologyInspector<MockImageStore> {
        TopologyInspector::new(Arc::new(store), p("linux/riscv64"))
    }

    fn local(arch: &str, media_type: Option<&str>) -> LocalImage {
        LocalImage {
            os: "linux".to_owned(),
            architecture: arch.to_owned(),
            variant: None,
            media_type: media_type.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn local_single_platform_image() {
        let store = MockImageStore::new().with_local("alpine:3.17", local("arm64", None));
        let topology = inspector(store).inspect("alpine:3.17").await.unwrap();
        assert!(topology.is_local);
        assert!(!topology.is_multi_platform);
        assert_eq!(topology.available_platforms, vec![p("linux/arm64")]);
    }

    #[tokio::test]
    async fn local_index_media_type_counts_as_multi_platform() {
        let store = MockImageStore::new()
            .with_local("alpine:3.17", local("amd64", Some(OCI_IMAGE_INDEX)));
        let topology = inspector(store).inspect("alpine:3.17").await.unwrap();
        assert!(topology.is_local);
        assert!(topology.is_multi_platform);
        assert_eq!(topology.available_platforms, vec![p("linux/amd64")]);
    }

    #[tokio::test]
    async fn local_success_short_circuits_remote() {
        let store = MockImageStore::new()
            .with_local("alpine:3.17", local("amd64", None))
            .with_remote(
                "alpine:3.17",
                DistributionDescriptor {
                    media_type: Some(DOCKER_MANIFEST_LIST.to_owned()),
                    platforms: vec![p("linux/amd64"), p("linux/arm64")],
                },
            );
        let topology = inspector(store).inspect("alpine:3.17").await.unwrap();
        assert!(topology.is_local);
        assert_eq!(topology.available_platforms.len(), 1);
    }

    #[tokio::test]
    async fn remote_index_filters_unknown_and_duplicates() {
        let store = MockImageStore::new().with_remote(
            "nginx:1.25",
            DistributionDescriptor {
                media_type: Some(OCI_IMAGE_INDEX.to_owned()),
                platforms: vec![
                    p("linux/amd64"),
                    Platform::new("unknown", "unknown", None::<String>),
                    p("linux/arm64/v8"),
                    Platform::new("linux", "", None::<String>),
                    p("linux/amd64"),
                ],
            },
        );
        let topology = inspector(store).inspect("nginx:1.25").await.unwrap();
        assert!(!topology.is_local);
        assert!(topology.is_multi_platform);
        assert_eq!(
            topology.available_platforms,
            vec![p("linux/amd64"), p("linux/arm64/v8")]
        );
    }

    #[tokio::test]
    async fn remote_without_usable_platforms_uses_default() {
        let store = MockImageStore::new().with_remote(
            "nginx:1.25",
            DistributionDescriptor {
                media_type: Some("application/vnd.docker.distribution.manifest.v2+json".to_owned()),
                platforms: vec![Platform::new("unknown", "unknown", None::<String>)],
            },
        );
        let topology = inspector(store).inspect("nginx:1.25").await.unwrap();
        assert!(!topology.is_multi_platform);
        assert_eq!(topology.available_platforms, vec![p("linux/riscv64")]);
    }

    #[tokio::test]
    async fn both_lookups_failing_is_inspection_failed() {
        let err = inspector(MockImageStore::new())
            .inspect("missing:1.0")
            .await
            .unwrap_err();
        match err {
            InspectorError::InspectionFailed { image, reason } => {
                assert_eq!(image, "missing:1.0");
                assert!(reason.contains("local:"));
                assert!(reason.contains("remote:"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
