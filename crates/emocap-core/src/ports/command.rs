//! 외부 명령 실행 포트.
//!
//! 캡처 도구, 패키지 매니저 탐지, PowerShell 폴백 등 모든 서브프로세스 호출은
//! 이 포트를 통한다. 테스트에서는 가짜 실행기로 교체한다.
//!
//! 구현: `emocap-vision` crate (`tokio::process`)

use async_trait::async_trait;
use std::fmt;

use crate::error::CoreError;

/// 실행할 명령 (프로그램 + 인자)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.contains(' ') || arg.is_empty() {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// 명령 실행 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// 종료 코드 0 여부
    pub success: bool,
    /// 종료 코드 (시그널 종료 시 None)
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// stdout + stderr 결합 (ffmpeg는 장치 목록을 stderr로 출력)
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }

    /// 실패 사유 요약 (stderr 마지막 줄 우선)
    pub fn failure_summary(&self) -> String {
        let last_line = self
            .stderr
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .map(|l| l.trim().to_string());

        match (last_line, self.code) {
            (Some(line), Some(code)) => format!("exit code {code}: {line}"),
            (Some(line), None) => line,
            (None, Some(code)) => format!("exit code {code}"),
            (None, None) => "terminated by signal".to_string(),
        }
    }
}

/// 명령 실행기
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// 명령을 실행하고 종료까지 대기한다.
    ///
    /// 프로세스가 실행됐다면 종료 코드와 무관하게 `Ok`를 반환한다.
    /// 실행 파일이 없는 등 spawn 자체가 실패하면 `Err`.
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CoreError>;

    /// 실행 파일이 PATH에 있는지 확인
    ///
    /// `locator`는 Unix에서 `which`, Windows에서 `where`.
    async fn is_installed(&self, locator: &str, program: &str) -> bool {
        let probe = CommandSpec::new(locator).arg(program);
        matches!(self.run(&probe).await, Ok(output) if output.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_spaced_args() {
        let cmd = CommandSpec::new("ffmpeg")
            .args(["-f", "dshow", "-i"])
            .arg("video=Integrated Camera");
        assert_eq!(
            cmd.to_string(),
            "ffmpeg -f dshow -i \"video=Integrated Camera\""
        );
    }

    #[test]
    fn failure_summary_prefers_last_stderr_line() {
        let output = CommandOutput {
            success: false,
            code: Some(1),
            stdout: String::new(),
            stderr: "line one\n/dev/video0: No such device\n\n".to_string(),
        };
        assert_eq!(
            output.failure_summary(),
            "exit code 1: /dev/video0: No such device"
        );
    }

    #[test]
    fn combined_joins_streams() {
        let output = CommandOutput {
            success: true,
            code: Some(0),
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };
        assert_eq!(output.combined(), "out\nerr");
    }
}
