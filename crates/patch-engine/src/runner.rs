//! 외부 도구 실행 추상화
//!
//! 스캐너(trivy)와 패처(copa)는 모두 [`ToolRunner`] 트레이트를 통해 실행됩니다.
//! 운영 환경에서는 [`ProcessRunner`]가 `tokio::process` 로 프로세스를 띄우고,
//! 테스트에서는 호출을 기록하고 결과 파일을 흉내 내는 러너를 주입합니다.
//!
//! 러너는 종료 코드를 해석하지 않습니다. 0이 아닌 종료 코드를
//! `EngineError::ToolFailed` 로 바꾸는 것은 [`run_checked`]의 역할입니다.

use std::future::Future;
use std::process::Stdio;
use std::time::Instant;

use copapatch_core::metrics as m;
use tokio::process::Command;
use tracing::debug;

use crate::error::EngineError;

/// 시그널로 종료되어 종료 코드가 없을 때 보고하는 값
pub const SIGNAL_EXIT_CODE: i32 = -1;

/// 외부 도구 호출 하나
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// 도구 이름 (로그, 메트릭, 에러 메시지용)
    pub tool: String,
    /// 실행 파일 경로 또는 이름
    pub program: String,
    /// 인자 목록
    pub args: Vec<String>,
}

impl ToolInvocation {
    pub fn new(tool: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// 인자 하나를 추가합니다.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// 인자 여러 개를 추가합니다.
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// 에러 메시지와 로그에 쓰이는 명령줄
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `--flag value` 쌍에서 값을 찾습니다.
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    /// 인자에 `flag` 가 있는지 확인합니다.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }
}

/// 종료된 프로세스의 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// 종료 코드 (시그널로 종료되면 `None`)
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// 외부 도구 실행 트레이트
///
/// `Send + Sync + 'static` 이므로 오케스트레이터가 `Arc` 로 공유할 수 있습니다.
pub trait ToolRunner: Send + Sync + 'static {
    /// 프로세스를 실행하고 종료될 때까지 기다립니다.
    ///
    /// # Errors
    ///
    /// 프로세스를 시작하지 못하면 `EngineError::ToolSpawn` 을 반환합니다.
    /// 0이 아닌 종료 코드는 에러가 아닙니다.
    fn run(
        &self,
        invocation: &ToolInvocation,
    ) -> impl Future<Output = Result<ToolOutput, EngineError>> + Send;
}

/// `tokio::process` 기반 운영용 러너
///
/// stdin 은 닫고 stdout/stderr 는 캡처합니다.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ToolRunner for ProcessRunner {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, EngineError> {
        debug!(tool = %invocation.tool, command = %invocation.command_line(), "executing");

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| EngineError::ToolSpawn {
                tool: invocation.tool.clone(),
                reason: format!("{}: {e}", invocation.program),
            })?;

        Ok(ToolOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// 도구를 실행하고 0이 아닌 종료를 `EngineError::ToolFailed` 로 바꿉니다.
///
/// 호출 횟수와 실행 시간을 메트릭으로 기록합니다. 재시도는 하지 않습니다.
pub async fn run_checked<R: ToolRunner>(
    runner: &R,
    invocation: &ToolInvocation,
) -> Result<ToolOutput, EngineError> {
    let started = Instant::now();
    let result = runner.run(invocation).await;
    let elapsed = started.elapsed().as_secs_f64();

    metrics::histogram!(m::TOOL_DURATION_SECONDS, m::LABEL_TOOL => invocation.tool.clone())
        .record(elapsed);

    let outcome = match &result {
        Ok(output) if output.success() => "success",
        _ => "failure",
    };
    metrics::counter!(
        m::TOOL_INVOCATIONS_TOTAL,
        m::LABEL_TOOL => invocation.tool.clone(),
        m::LABEL_RESULT => outcome
    )
    .increment(1);

    let output = result?;
    if output.success() {
        debug!(tool = %invocation.tool, elapsed_secs = elapsed, "tool finished");
        return Ok(output);
    }

    let exit_code = output.exit_code.unwrap_or(SIGNAL_EXIT_CODE);
    debug!(tool = %invocation.tool, exit_code, "tool failed");
    Err(EngineError::ToolFailed {
        tool: invocation.tool.clone(),
        command: invocation.command_line(),
        exit_code,
        stderr: output.stderr,
    })
}
