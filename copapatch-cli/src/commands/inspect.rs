//! `copapatch inspect` command handler

use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use copapatch_core::platform;
use copapatch_core::types::ImageTopology;
use copapatch_core::{CopapatchConfig, ImageReference, Platform};
use copapatch_image_inspector::{BollardImageStore, InspectorConfig, TopologyInspector};

use crate::cli::InspectArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `inspect` command.
///
/// Prints where the image was found, whether it is multi-platform, and which
/// of its platforms the patcher supports.
pub async fn execute(
    args: InspectArgs,
    config: &CopapatchConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let image = args.image.trim();
    if image.is_empty() {
        return Err(CliError::InvalidInput("image parameter is required".to_owned()));
    }
    ImageReference::parse(image).map_err(|e| CliError::InvalidInput(e.to_string()))?;

    let inspector_config = InspectorConfig::from_core(&config.registry);
    inspector_config.validate()?;
    let store = Arc::new(BollardImageStore::from_config(&inspector_config)?);
    let inspector = TopologyInspector::new(store, inspector_config.default_platform);

    info!(image, "inspecting image");
    let topology = inspector.inspect(image).await?;

    writer.render(&InspectReport::new(image, topology))
}

/// Image topology report.
#[derive(Serialize)]
pub struct InspectReport {
    pub image: String,
    pub topology: ImageTopology,
    pub supported_platforms: Vec<Platform>,
    pub unsupported_platforms: Vec<Platform>,
}

impl InspectReport {
    pub fn new(image: &str, topology: ImageTopology) -> Self {
        Self {
            image: image.to_owned(),
            supported_platforms: platform::filter_supported(&topology.available_platforms),
            unsupported_platforms: platform::unsupported(&topology.available_platforms),
            topology,
        }
    }
}

impl Render for InspectReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Image: {}", self.image.bold())?;
        let location = if self.topology.is_local { "local" } else { "registry" };
        writeln!(w, "  Source:         {location}")?;
        writeln!(
            w,
            "  Multi-platform: {}",
            if self.topology.is_multi_platform { "yes" } else { "no" }
        )?;
        writeln!(w, "  Platforms:")?;
        for p in &self.topology.available_platforms {
            if platform::is_supported(p) {
                writeln!(w, "    {:<16} {}", p.to_string(), "supported".green())?;
            } else {
                writeln!(w, "    {:<16} {}", p.to_string(), "unsupported".red())?;
            }
        }
        Ok(())
    }
}
