//! CLI-specific error types and exit code mapping

use copapatch_core::error::CopapatchError;
use copapatch_engine::EngineError;
use copapatch_image_inspector::InspectorError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// Request rejected before any tool ran.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Docker daemon or registry lookup failed.
    #[error("inspection error: {0}")]
    Inspection(String),

    /// Scanner or patcher failed.
    #[error("{0}")]
    Tool(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from copapatch-core.
    #[error("{0}")]
    Core(#[from] CopapatchError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                   |
    /// |------|-------------------------------------------|
    /// | 0    | Success                                   |
    /// | 1    | General / command error                   |
    /// | 2    | Configuration error                       |
    /// | 3    | Invalid input (nothing was executed)      |
    /// | 4    | Image inspection failed                   |
    /// | 5    | Scanner / patcher / VEX failure           |
    /// | 10   | IO error                                  |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::InvalidInput(_) => 3,
            Self::Inspection(_) => 4,
            Self::Tool(_) => 5,
            Self::Io(_) => 10,
            Self::Core(e) => match e {
                CopapatchError::Config(_) => 2,
                CopapatchError::InvalidInput(_) | CopapatchError::Reference(_) => 3,
                CopapatchError::Inspection(_) => 4,
                CopapatchError::Tool(_) | CopapatchError::Document(_) => 5,
                CopapatchError::Io(_) => 10,
            },
            Self::JsonSerialize(_) | Self::Command(_) => 1,
        }
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::InvalidInput(msg) => Self::InvalidInput(msg),
            EngineError::Reference(_) => Self::InvalidInput(e.to_string()),
            EngineError::Inspection(_) => Self::Inspection(e.to_string()),
            EngineError::ToolSpawn { .. }
            | EngineError::ToolFailed { .. }
            | EngineError::VexRead { .. }
            | EngineError::VexParse(_) => Self::Tool(e.to_string()),
            EngineError::Config { .. } => Self::Config(e.to_string()),
            EngineError::Workspace(_) => Self::Command(e.to_string()),
        }
    }
}

impl From<InspectorError> for CliError {
    fn from(e: InspectorError) -> Self {
        match e {
            InspectorError::Config { .. } => Self::Config(e.to_string()),
            InspectorError::Reference(_) => Self::InvalidInput(e.to_string()),
            _ => Self::Inspection(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("test error".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = CliError::Io(io_err);
        assert_eq!(err.exit_code(), 10, "io error should return exit code 10");
    }

    #[test]
    fn test_engine_invalid_input_maps_to_exit_3() {
        let err: CliError =
            EngineError::InvalidInput("image parameter is required".to_owned()).into();
        assert!(matches!(err, CliError::InvalidInput(_)));
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "invalid input: image parameter is required");
    }

    #[test]
    fn test_engine_tool_failure_keeps_message() {
        let err: CliError = EngineError::ToolFailed {
            tool: "trivy".to_owned(),
            command: "trivy image alpine".to_owned(),
            exit_code: 1,
            stderr: "FATAL: no such image".to_owned(),
        }
        .into();
        assert_eq!(err.exit_code(), 5);
        let msg = err.to_string();
        assert!(msg.contains("trivy command failed (exit code 1)"));
        assert!(msg.contains("FATAL: no such image"));
    }

    #[test]
    fn test_engine_vex_parse_is_tool_category() {
        let err: CliError = EngineError::VexParse("expected value".to_owned()).into();
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_inspector_error_maps_to_inspection() {
        let err: CliError = InspectorError::ImageNotFound("alpine".to_owned()).into();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_core_config_error_exit_code() {
        use copapatch_core::error::ConfigError;
        let core_err = CopapatchError::Config(ConfigError::FileNotFound {
            path: "copapatch.toml".to_owned(),
        });
        let err: CliError = core_err.into();
        assert!(matches!(err, CliError::Core(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_command_error() {
        let err = CliError::Command("execution failed".to_owned());
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "execution failed");
    }
}
