//! copapatch CLI -- container image vulnerability patching
//!
//! Dispatches subcommands to [`commands`] and maps failures to exit codes
//! through [`error::CliError`].

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;

use copapatch_core::CopapatchConfig;
use copapatch_core::types::EntryPoint;

use cli::{Cli, Commands};
use commands::config::ConfigSource;
use error::CliError;
use output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let writer = OutputWriter::new(cli.output);

    // 기본 경로의 파일만 없어도 되며, --config 로 지정한 파일은 반드시 있어야 함
    let source = ConfigSource::from_arg(cli.config.clone());
    let loaded = source.load().await;

    let general = loaded
        .as_ref()
        .map(|c| c.general.clone())
        .unwrap_or_default();
    if let Err(e) = logging::init_tracing(&general, cli.log_level.as_deref()) {
        eprintln!("warning: {e}");
    }
    copapatch_core::metrics::describe_all();

    tracing::debug!(config = %source.path.display(), "copapatch starting");

    if let Err(e) = run(cli, &source, loaded, &writer).await {
        writer.render_error(&e);
        std::process::exit(e.exit_code());
    }
}

async fn run(
    cli: Cli,
    source: &ConfigSource,
    loaded: Result<CopapatchConfig, copapatch_core::CopapatchError>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match cli.command {
        // config 명령은 설정 파일을 직접 다시 읽어 에러를 보고합니다.
        Commands::Config(args) => commands::config::execute(args, source, writer).await,
        Commands::Version => commands::version::execute(&loaded?, writer).await,
        Commands::Patch(args) => {
            let request = commands::patch::legacy_request(args);
            commands::patch::execute(request, EntryPoint::Generic, &loaded?, writer).await
        }
        Commands::PatchComprehensive(args) => {
            let request = commands::patch::comprehensive_request(args);
            commands::patch::execute(request, EntryPoint::Comprehensive, &loaded?, writer).await
        }
        Commands::PatchPlatforms(args) => {
            let request = commands::patch::platforms_request(args);
            commands::patch::execute(request, EntryPoint::PlatformSelective, &loaded?, writer)
                .await
        }
        Commands::PatchVulnerabilities(args) => {
            let request = commands::patch::vulnerabilities_request(args);
            commands::patch::execute(request, EntryPoint::Vulnerabilities, &loaded?, writer)
                .await
        }
        Commands::Inspect(args) => commands::inspect::execute(args, &loaded?, writer).await,
    }
}
