//! Local image store abstraction for testability.
//!
//! The [`ImageStore`] trait abstracts the two Docker daemon calls the topology
//! inspector needs: inspecting a locally stored image and asking the daemon for
//! the registry's distribution descriptor. Production code uses
//! [`BollardImageStore`]; tests use `MockImageStore`.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐
//! │ TopologyInspector │
//! └─────────┬─────────┘
//!           │
//!           ▼
//!     ┌───────────┐
//!     │ImageStore │ (trait)
//!     └───────────┘
//!        │     │
//!        ▼     ▼
//!   ┌───────┐ ┌────┐
//!   │Bollard│ │Mock│
//!   └───┬───┘ └────┘
//!       │
//!       ▼
//!   Docker Daemon ──> Registry (distribution inspect)
//! ```
//!
//! # Examples
//!
//! ```ignore
//! use copapatch_image_inspector::{BollardImageStore, ImageStore};
//!
//! let store = BollardImageStore::connect_local()?;
//! let image = store.inspect_local("alpine:3.17").await?;
//! println!("{}/{}", image.os, image.architecture);
//! # Ok::<(), copapatch_image_inspector::InspectorError>(())
//! ```

use std::future::Future;
use std::sync::Arc;

use bollard::models::{DistributionInspect, ImageInspect};
use copapatch_core::platform::Platform;

use crate::error::InspectorError;

/// A locally stored image as reported by the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
    pub os: String,
    pub architecture: String,
    pub variant: Option<String>,
    /// Media type of the descriptor the image was pulled from. The daemon only
    /// reports it with the containerd image store; `None` otherwise.
    pub media_type: Option<String>,
}

impl LocalImage {
    pub fn platform(&self) -> Platform {
        Platform::new(&self.os, &self.architecture, self.variant.as_deref())
    }
}

/// Registry distribution descriptor for an image reference.
///
/// `platforms` is passed through unfiltered; entries may carry empty or
/// `unknown` os/architecture (attestation manifests).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionDescriptor {
    pub media_type: Option<String>,
    pub platforms: Vec<Platform>,
}

/// Trait abstracting local image store operations.
///
/// The trait is `Send + Sync + 'static`, allowing safe sharing across async contexts.
///
/// # Implementations
///
/// - [`BollardImageStore`]: Production implementation using the `bollard` library
/// - `MockImageStore`: Test implementation with configurable responses (available in tests only)
///
/// # Error Handling
///
/// - **404 errors**: Converted to `InspectorError::ImageNotFound`
/// - **Registry errors**: Wrapped as `InspectorError::ManifestUnavailable`
/// - **Other API errors**: Wrapped as `InspectorError::DockerApi`
pub trait ImageStore: Send + Sync + 'static {
    /// Inspects an image in the local store.
    ///
    /// # Errors
    ///
    /// - `InspectorError::ImageNotFound`: The image is not stored locally (404)
    /// - `InspectorError::DockerApi`: Other API errors
    fn inspect_local(
        &self,
        image: &str,
    ) -> impl Future<Output = Result<LocalImage, InspectorError>> + Send;

    /// Fetches the registry's distribution descriptor through the daemon.
    ///
    /// # Errors
    ///
    /// Returns `InspectorError::ManifestUnavailable` if the registry lookup fails.
    fn inspect_distribution(
        &self,
        image: &str,
    ) -> impl Future<Output = Result<DistributionDescriptor, InspectorError>> + Send;
}

/// Production image store implementation using `bollard`.
///
/// Internally uses `Arc<bollard::Docker>` for safe sharing across async tasks.
pub struct BollardImageStore {
    docker: Arc<bollard::Docker>,
}

impl BollardImageStore {
    /// Connects to Docker using the default local socket.
    ///
    /// # Errors
    ///
    /// Returns `InspectorError::DockerConnection` if the connection fails
    /// (e.g., socket not found, permission denied, daemon not running).
    pub fn connect_local() -> Result<Self, InspectorError> {
        let docker = bollard::Docker::connect_with_local_defaults().map_err(|e| {
            InspectorError::DockerConnection(format!("failed to connect to docker: {e}"))
        })?;
        Ok(Self {
            docker: Arc::new(docker),
        })
    }

    /// Connects to Docker using a specific socket path.
    ///
    /// # Errors
    ///
    /// Returns `InspectorError::DockerConnection` if the connection fails.
    pub fn connect_with_socket(socket_path: &str, timeout_secs: u64) -> Result<Self, InspectorError> {
        let docker = bollard::Docker::connect_with_socket(
            socket_path,
            timeout_secs,
            bollard::API_DEFAULT_VERSION,
        )
        .map_err(|e| {
            InspectorError::DockerConnection(format!(
                "failed to connect to docker at {socket_path}: {e}"
            ))
        })?;
        Ok(Self {
            docker: Arc::new(docker),
        })
    }

    /// Connects according to [`InspectorConfig`](crate::config::InspectorConfig):
    /// an empty socket path means the local defaults.
    pub fn from_config(config: &crate::config::InspectorConfig) -> Result<Self, InspectorError> {
        if config.docker_socket.is_empty() {
            Self::connect_local()
        } else {
            Self::connect_with_socket(&config.docker_socket, config.docker_timeout_secs)
        }
    }
}

impl ImageStore for BollardImageStore {
    async fn inspect_local(&self, image: &str) -> Result<LocalImage, InspectorError> {
        let details = self.docker.inspect_image(image).await.map_err(|e| {
            if e.to_string().contains("404") {
                InspectorError::ImageNotFound(image.to_owned())
            } else {
                InspectorError::DockerApi(format!("inspect image failed: {e}"))
            }
        })?;
        Ok(local_image_from(details))
    }

    async fn inspect_distribution(
        &self,
        image: &str,
    ) -> Result<DistributionDescriptor, InspectorError> {
        let inspect = self
            .docker
            .inspect_registry_image(image, None)
            .await
            .map_err(|e| InspectorError::ManifestUnavailable {
                image: image.to_owned(),
                reason: format!("distribution inspect failed: {e}"),
            })?;
        Ok(descriptor_from(inspect))
    }
}

fn local_image_from(details: ImageInspect) -> LocalImage {
    LocalImage {
        os: details.os.unwrap_or_default(),
        architecture: details.architecture.unwrap_or_default(),
        variant: details.variant.filter(|v| !v.is_empty()),
        // 인덱스에서 pull 한 이미지면 index / manifest list 미디어 타입
        media_type: details.descriptor.and_then(|d| d.media_type),
    }
}

fn descriptor_from(inspect: DistributionInspect) -> DistributionDescriptor {
    let platforms = inspect
        .platforms
        .into_iter()
        .map(|p| {
            Platform::new(
                p.os.unwrap_or_default(),
                p.architecture.unwrap_or_default(),
                p.variant,
            )
        })
        .collect();

    DistributionDescriptor {
        media_type: inspect.descriptor.media_type,
        platforms,
    }
}

/// 테스트용 Mock 이미지 저장소
///
/// 설정 가능한 응답을 반환하여 Docker 없이도 테스트할 수 있습니다.
#[cfg(test)]
#[derive(Default)]
pub struct MockImageStore {
    /// inspect_local 이 반환할 로컬 이미지 (이미지 이름 → 이미지)
    pub local: std::collections::HashMap<String, LocalImage>,
    /// inspect_distribution 이 반환할 디스크립터 (이미지 이름 → 디스크립터)
    pub remote: std::collections::HashMap<String, DistributionDescriptor>,
}

#[cfg(test)]
impl MockImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 로컬 이미지를 추가합니다.
    pub fn with_local(mut self, image: &str, local: LocalImage) -> Self {
        self.local.insert(image.to_owned(), local);
        self
    }

    /// 원격 디스크립터를 추가합니다.
    pub fn with_remote(mut self, image: &str, descriptor: DistributionDescriptor) -> Self {
        self.remote.insert(image.to_owned(), descriptor);
        self
    }
}

#[cfg(test)]
impl ImageStore for MockImageStore {
    async fn inspect_local(&self, image: &str) -> Result<LocalImage, InspectorError> {
        self.local
            .get(image)
            .cloned()
            .ok_or_else(|| InspectorError::ImageNotFound(image.to_owned()))
    }

    async fn inspect_distribution(
        &self,
        image: &str,
    ) -> Result<DistributionDescriptor, InspectorError> {
        self.remote
            .get(image)
            .cloned()
            .ok_or_else(|| InspectorError::ManifestUnavailable {
                image: image.to_owned(),
                reason: "mock: no such manifest".to_owned(),
            })
    }
}
