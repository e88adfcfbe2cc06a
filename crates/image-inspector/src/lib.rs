#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`InspectorError`)
//! - [`config`]: Inspector configuration (`InspectorConfig`, builder)
//! - [`docker`]: Local image store abstraction (`ImageStore` trait, `BollardImageStore`)
//! - [`registry`]: Registry manifest client (`ManifestSource` trait, `OciManifestSource`)
//! - [`resolver`]: Per-platform digest resolution (`DigestResolver`)
//! - [`topology`]: Local/remote, single/multi-platform detection (`TopologyInspector`)
//!
//! # Architecture
//!
//! ```text
//! image ref ──> TopologyInspector ──> ImageStore (local, then distribution inspect)
//!                                          |
//!                                     ImageTopology
//!
//! image ref + platform ──> DigestResolver ──> ManifestSource (index)
//!                                          |
//!                                   repository@digest
//! ```

pub mod config;
pub mod docker;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod topology;

// --- Public API Re-exports ---

// Configuration
pub use config::{InspectorConfig, InspectorConfigBuilder};

// Error
pub use error::InspectorError;

// Local image store
pub use docker::{BollardImageStore, DistributionDescriptor, ImageStore, LocalImage};

// Registry
pub use registry::{IndexEntry, ManifestSource, OciManifestSource, RemoteDescriptor};

// Resolution
pub use resolver::{DigestResolver, select_platform_digest};
pub use topology::TopologyInspector;
