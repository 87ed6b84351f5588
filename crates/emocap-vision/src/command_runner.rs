//! `tokio::process` 기반 명령 실행기.

use async_trait::async_trait;
use emocap_core::error::CoreError;
use emocap_core::ports::command::{CommandOutput, CommandRunner, CommandSpec};
use std::process::Stdio;
use std::time::Duration;
use tracing::{debug, warn};

/// 기본 명령 타임아웃: 장치가 응답하지 않을 때 ffmpeg가 멈추는 것을 방지
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// 실제 서브프로세스 실행기
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// 명령별 타임아웃 설정
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for TokioCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CoreError> {
        debug!(command = %command, "명령 실행");

        let child = tokio::process::Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(result) => result.map_err(|e| CoreError::CommandSpawn {
                program: command.program.clone(),
                message: e.to_string(),
            })?,
            Err(_) => {
                // kill_on_drop으로 자식 프로세스 정리됨
                warn!(command = %command, timeout = ?self.timeout, "명령 타임아웃");
                return Ok(CommandOutput {
                    success: false,
                    code: None,
                    stdout: String::new(),
                    stderr: format!("timed out after {}ms", self.timeout.as_millis()),
                });
            }
        };

        let result = CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(
            program = %command.program,
            success = result.success,
            code = ?result.code,
            "명령 종료"
        );
        Ok(result)
    }
}
