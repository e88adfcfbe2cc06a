//! Registry manifest client.
//!
//! [`ManifestSource`] returns the remote descriptor for a reference: either a
//! single image manifest (with its digest) or an image index listing one child
//! manifest per platform. [`OciManifestSource`] talks to the registry directly
//! with `oci-client` using anonymous auth.

use std::future::Future;

use copapatch_core::platform::Platform;
use copapatch_core::reference::ImageReference;
use oci_client::client::{ClientConfig, ClientProtocol};
use oci_client::manifest::OciManifest;
use oci_client::secrets::RegistryAuth;
use oci_client::{Client, Reference};
use tracing::debug;

use crate::error::InspectorError;

/// Docker manifest list media type
pub const DOCKER_MANIFEST_LIST: &str = "application/vnd.docker.distribution.manifest.list.v2+json";

/// OCI image index media type
pub const OCI_IMAGE_INDEX: &str = "application/vnd.oci.image.index.v1+json";

/// Whether a descriptor media type denotes a multi-platform index.
pub fn is_index_media_type(media_type: &str) -> bool {
    media_type == DOCKER_MANIFEST_LIST || media_type == OCI_IMAGE_INDEX
}

/// One child manifest of an image index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub digest: String,
    pub platform: Option<Platform>,
}

/// Remote descriptor of an image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteDescriptor {
    /// Single-platform image manifest
    Image { digest: String },
    /// Manifest list / OCI index, children in declaration order
    Index { entries: Vec<IndexEntry> },
}

/// Source of remote manifest descriptors.
pub trait ManifestSource: Send + Sync + 'static {
    /// Fetches the top-level descriptor for `reference`.
    ///
    /// # Errors
    ///
    /// Returns `InspectorError::ManifestUnavailable` when the registry cannot be
    /// reached or the manifest cannot be decoded.
    fn fetch_descriptor(
        &self,
        reference: &ImageReference,
    ) -> impl Future<Output = Result<RemoteDescriptor, InspectorError>> + Send;
}

/// Production manifest source backed by `oci-client`.
#[derive(Clone)]
pub struct OciManifestSource {
    client: Client,
}

impl OciManifestSource {
    /// Creates a client using HTTPS for every registry except `insecure_registries`.
    pub fn new(insecure_registries: &[String]) -> Self {
        let protocol = if insecure_registries.is_empty() {
            ClientProtocol::Https
        } else {
            ClientProtocol::HttpsExcept(insecure_registries.to_vec())
        };
        let client = Client::new(ClientConfig {
            protocol,
            ..Default::default()
        });
        Self { client }
    }

    pub fn from_config(config: &crate::config::InspectorConfig) -> Self {
        Self::new(&config.insecure_registries)
    }
}

impl ManifestSource for OciManifestSource {
    async fn fetch_descriptor(
        &self,
        reference: &ImageReference,
    ) -> Result<RemoteDescriptor, InspectorError> {
        let full = reference.registry_reference();
        let unavailable = |reason: String| InspectorError::ManifestUnavailable {
            image: reference.to_string(),
            reason,
        };

        let oci_reference: Reference = full
            .parse()
            .map_err(|e| unavailable(format!("invalid registry reference {full}: {e}")))?;

        let (manifest, digest) = self
            .client
            .pull_manifest(&oci_reference, &RegistryAuth::Anonymous)
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let descriptor = match manifest {
            OciManifest::Image(_) => RemoteDescriptor::Image { digest },
            OciManifest::ImageIndex(index) => RemoteDescriptor::Index {
                entries: index
                    .manifests
                    .into_iter()
                    .map(|entry| IndexEntry {
                        digest: entry.digest,
                        platform: entry.platform.map(|p| {
                            Platform::new(p.os.to_string(), p.architecture.to_string(), p.variant)
                        }),
                    })
                    .collect(),
            },
        };

        debug!(
            image = %reference,
            index = matches!(descriptor, RemoteDescriptor::Index { .. }),
            "fetched remote descriptor"
        );
        Ok(descriptor)
    }
}
