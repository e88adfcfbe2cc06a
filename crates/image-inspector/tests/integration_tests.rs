//! 통합 테스트 -- 토폴로지 조회 + 플랫폼별 다이제스트 해석
//!
//! 레지스트리가 돌려주는 멀티 아키텍처 인덱스(어테스테이션 매니페스트 포함)를
//! 흉내 내어, 토폴로지 조회와 다이제스트 해석이 같은 데이터에서 일관된 결과를
//! 내는지 확인합니다.

use std::sync::Arc;

use copapatch_core::platform::{self, Platform};
use copapatch_core::reference::ImageReference;
use copapatch_image_inspector::{
    DigestResolver, DistributionDescriptor, ImageStore, IndexEntry, InspectorError, LocalImage,
    ManifestSource, RemoteDescriptor, TopologyInspector,
};
use tokio::sync::Mutex;

const OCI_INDEX: &str = "application/vnd.oci.image.index.v1+json";

// Mock registry / daemon for integration tests
mod mock {
    use super::*;

    /// 레지스트리 하나를 흉내 내는 저장소: 인덱스 하나와 선택적 로컬 이미지
    pub struct TestRegistry {
        pub index: Vec<(String, Platform)>,
        pub local: Mutex<Option<LocalImage>>,
        pub lookups: Mutex<Vec<String>>,
    }

    impl TestRegistry {
        pub fn with_index(entries: &[(&str, &str)]) -> Self {
            Self {
                index: entries
                    .iter()
                    .map(|(digest, platform)| {
                        let platform = match *platform {
                            "unknown/unknown" => {
                                Platform::new("unknown", "unknown", None::<String>)
                            }
                            other => other.parse().unwrap(),
                        };
                        ((*digest).to_owned(), platform)
                    })
                    .collect(),
                local: Mutex::new(None),
                lookups: Mutex::new(Vec::new()),
            }
        }
    }

    impl ImageStore for TestRegistry {
        async fn inspect_local(&self, image: &str) -> Result<LocalImage, InspectorError> {
            self.lookups.lock().await.push(format!("local:{image}"));
            self.local
                .lock()
                .await
                .clone()
                .ok_or_else(|| InspectorError::ImageNotFound(image.to_owned()))
        }

        async fn inspect_distribution(
            &self,
            image: &str,
        ) -> Result<DistributionDescriptor, InspectorError> {
            self.lookups.lock().await.push(format!("remote:{image}"));
            Ok(DistributionDescriptor {
                media_type: Some(OCI_INDEX.to_owned()),
                platforms: self.index.iter().map(|(_, p)| p.clone()).collect(),
            })
        }
    }

    impl ManifestSource for TestRegistry {
        async fn fetch_descriptor(
            &self,
            reference: &ImageReference,
        ) -> Result<RemoteDescriptor, InspectorError> {
            self.lookups
                .lock()
                .await
                .push(format!("manifest:{}", reference.registry_reference()));
            Ok(RemoteDescriptor::Index {
                entries: self
                    .index
                    .iter()
                    .map(|(digest, platform)| IndexEntry {
                        digest: digest.clone(),
                        platform: Some(platform.clone()),
                    })
                    .collect(),
            })
        }
    }
}

use mock::TestRegistry;

fn digest(c: char) -> String {
    format!("sha256:{}", c.to_string().repeat(64))
}

fn nginx_registry() -> Arc<TestRegistry> {
    let amd64 = digest('1');
    let arm64 = digest('2');
    let armv7 = digest('3');
    let attest = digest('4');
    let mips = digest('5');
    Arc::new(TestRegistry::with_index(&[
        (amd64.as_str(), "linux/amd64"),
        (attest.as_str(), "unknown/unknown"),
        (arm64.as_str(), "linux/arm64/v8"),
        (armv7.as_str(), "linux/arm/v7"),
        (mips.as_str(), "linux/mips64le"),
    ]))
}

#[tokio::test]
async fn remote_topology_and_resolution_agree() {
    let registry = nginx_registry();
    let inspector = TopologyInspector::new(Arc::clone(&registry), Platform::host());
    let resolver = DigestResolver::new(Arc::clone(&registry));

    let topology = inspector.inspect("nginx:1.25").await.unwrap();
    assert!(!topology.is_local);
    assert!(topology.is_multi_platform);
    assert_eq!(topology.available_platforms.len(), 4);

    // 지원 플랫폼만 해석 대상으로 삼으면 모두 해석되어야 함
    let reference = ImageReference::parse("nginx:1.25").unwrap();
    for platform in platform::filter_supported(&topology.available_platforms) {
        let resolved = resolver
            .resolve_platform_digest(&reference, &platform)
            .await
            .unwrap();
        assert!(resolved.to_string().starts_with("nginx@sha256:"));
    }
}

#[tokio::test]
async fn arm64_request_resolves_v8_child() {
    let registry = nginx_registry();
    let resolver = DigestResolver::new(Arc::clone(&registry));
    let reference = ImageReference::parse("nginx:1.25").unwrap();

    let resolved = resolver
        .resolve_platform_digest(&reference, &"linux/arm64".parse().unwrap())
        .await
        .unwrap();
    assert_eq!(resolved.digest(), Some(digest('2').as_str()));
}

#[tokio::test]
async fn resolver_uses_fully_qualified_reference() {
    let registry = nginx_registry();
    let resolver = DigestResolver::new(Arc::clone(&registry));
    let reference = ImageReference::parse("nginx:1.25").unwrap();

    resolver
        .resolve_platform_digest(&reference, &"linux/amd64".parse().unwrap())
        .await
        .unwrap();

    let lookups = registry.lookups.lock().await;
    assert_eq!(
        lookups.as_slice(),
        ["manifest:docker.io/library/nginx:1.25".to_owned()]
    );
}

#[tokio::test]
async fn unsupported_platform_in_index_is_still_resolvable() {
    let registry = nginx_registry();
    let resolver = DigestResolver::new(Arc::clone(&registry));
    let reference = ImageReference::parse("nginx:1.25").unwrap();

    let resolved = resolver
        .resolve_platform_digest(&reference, &"linux/mips64le".parse().unwrap())
        .await
        .unwrap();
    assert_eq!(resolved.digest(), Some(digest('5').as_str()));

    let err = resolver
        .resolve_platform_digest(&reference, &"linux/s390x".parse().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, InspectorError::PlatformNotFound { .. }));
}

#[tokio::test]
async fn local_image_skips_registry() {
    let registry = nginx_registry();
    *registry.local.lock().await = Some(LocalImage {
        os: "linux".to_owned(),
        architecture: "amd64".to_owned(),
        variant: None,
        media_type: None,
    });
    let inspector = TopologyInspector::new(Arc::clone(&registry), Platform::host());

    let topology = inspector.inspect("nginx:1.25").await.unwrap();
    assert!(topology.is_local);
    assert!(!topology.is_multi_platform);

    let lookups = registry.lookups.lock().await;
    assert_eq!(lookups.as_slice(), ["local:nginx:1.25".to_owned()]);
}
