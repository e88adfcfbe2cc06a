//! `copapatch version` command handler

use std::io::Write;

use serde::Serialize;

use copapatch_core::CopapatchConfig;

use crate::commands::build_orchestrator;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `version` command.
///
/// Reports the CLI version together with the patcher's `--version` output.
pub async fn execute(config: &CopapatchConfig, writer: &OutputWriter) -> Result<(), CliError> {
    let orchestrator = build_orchestrator(config)?;
    let patcher = orchestrator.version().await?;

    writer.render(&VersionReport {
        cli: env!("CARGO_PKG_VERSION").to_owned(),
        patcher_binary: config.patcher.binary.clone(),
        patcher,
    })
}

/// Version information.
#[derive(Serialize)]
pub struct VersionReport {
    pub cli: String,
    pub patcher_binary: String,
    pub patcher: String,
}

impl Render for VersionReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "copapatch {}", self.cli)?;
        writeln!(w, "{}: {}", self.patcher_binary, self.patcher)?;
        Ok(())
    }
}
