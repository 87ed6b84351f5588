//! 스크립트 명령 실행기.
//!
//! 실제 서브프로세스 없이 폴백/의존성 로직을 검증하기 위한 `CommandRunner`.
//! 규칙은 등록 순서대로 검사하고 처음 일치한 규칙의 응답을 돌려준다.
//! 일치하는 규칙이 없으면 종료 코드 1로 실패한다.

use async_trait::async_trait;
use emocap_core::error::CoreError;
use emocap_core::ports::command::{CommandOutput, CommandRunner, CommandSpec};
use parking_lot::Mutex;
use std::path::PathBuf;

type Matcher = Box<dyn Fn(&CommandSpec) -> bool + Send + Sync>;

enum Response {
    Output(CommandOutput),
    /// 성공 + 마지막 인자 경로에 PNG 생성
    ProduceFile,
    /// 성공 + 지정 경로에 PNG 생성
    ProduceFileAt(PathBuf),
    /// 실행 파일 없음
    SpawnError,
}

struct Rule {
    matcher: Matcher,
    response: Response,
}

/// 기록형 가짜 명령 실행기
#[derive(Default)]
pub struct ScriptedCommandRunner {
    rules: Vec<Rule>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl ScriptedCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn rule(
        mut self,
        matcher: impl Fn(&CommandSpec) -> bool + Send + Sync + 'static,
        response: Response,
    ) -> Self {
        self.rules.push(Rule {
            matcher: Box::new(matcher),
            response,
        });
        self
    }

    /// 조건에 맞는 명령은 빈 출력으로 성공
    pub fn succeed_when(
        self,
        matcher: impl Fn(&CommandSpec) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.rule(
            matcher,
            Response::Output(CommandOutput {
                success: true,
                code: Some(0),
                ..Default::default()
            }),
        )
    }

    /// 조건에 맞는 명령은 주어진 출력 반환
    pub fn respond_when(
        self,
        matcher: impl Fn(&CommandSpec) -> bool + Send + Sync + 'static,
        output: CommandOutput,
    ) -> Self {
        self.rule(matcher, Response::Output(output))
    }

    /// 조건에 맞는 명령은 성공하고 마지막 인자 경로에 이미지를 쓴다
    pub fn produce_file_when(
        self,
        matcher: impl Fn(&CommandSpec) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.rule(matcher, Response::ProduceFile)
    }

    /// 조건에 맞는 명령은 성공하고 `path`에 이미지를 쓴다
    pub fn produce_file_at_when(
        self,
        matcher: impl Fn(&CommandSpec) -> bool + Send + Sync + 'static,
        path: impl Into<PathBuf>,
    ) -> Self {
        self.rule(matcher, Response::ProduceFileAt(path.into()))
    }

    /// `program` 실행 시 spawn 실패
    pub fn missing_program(self, program: &str) -> Self {
        let program = program.to_string();
        self.rule(move |c| c.program == program, Response::SpawnError)
    }

    /// `which`/`where` 조회에서 `program`을 찾은 것으로 응답
    pub fn with_installed(self, program: &str) -> Self {
        let program = program.to_string();
        self.succeed_when(move |c| {
            (c.program == "which" || c.program == "where")
                && c.args.first().map(String::as_str) == Some(program.as_str())
        })
    }

    /// 지금까지 실행된 명령 (순서대로)
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().clone()
    }

    /// 특정 프로그램 호출만
    pub fn calls_to(&self, program: &str) -> Vec<CommandSpec> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.program == program)
            .cloned()
            .collect()
    }
}

fn write_placeholder_image(path: &std::path::Path) -> Result<(), CoreError> {
    image::RgbImage::new(4, 3)
        .save(path)
        .map_err(|e| CoreError::Internal(format!("failed to write test image: {e}")))
}

#[async_trait]
impl CommandRunner for ScriptedCommandRunner {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CoreError> {
        self.calls.lock().push(command.clone());

        let Some(rule) = self.rules.iter().find(|r| (r.matcher)(command)) else {
            return Ok(CommandOutput {
                success: false,
                code: Some(1),
                stdout: String::new(),
                stderr: format!("unscripted command: {command}"),
            });
        };

        let success = CommandOutput {
            success: true,
            code: Some(0),
            ..Default::default()
        };

        match &rule.response {
            Response::Output(output) => Ok(output.clone()),
            Response::ProduceFile => {
                if let Some(last) = command.args.last() {
                    write_placeholder_image(std::path::Path::new(last))?;
                }
                Ok(success)
            }
            Response::ProduceFileAt(path) => {
                write_placeholder_image(path)?;
                Ok(success)
            }
            Response::SpawnError => Err(CoreError::CommandSpawn {
                program: command.program.clone(),
                message: "No such file or directory (os error 2)".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unscripted_commands_fail() {
        let runner = ScriptedCommandRunner::new();
        let output = runner.run(&CommandSpec::new("ffmpeg")).await.unwrap();
        assert!(!output.success);
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn first_matching_rule_wins() {
        let runner = ScriptedCommandRunner::new()
            .missing_program("ffmpeg")
            .succeed_when(|_| true);
        assert!(runner.run(&CommandSpec::new("ffmpeg")).await.is_err());
        assert!(runner.run(&CommandSpec::new("fswebcam")).await.unwrap().success);
    }

    #[tokio::test]
    async fn installed_probe() {
        let runner = ScriptedCommandRunner::new().with_installed("ffmpeg");
        assert!(runner.is_installed("which", "ffmpeg").await);
        assert!(!runner.is_installed("which", "fswebcam").await);
        assert_eq!(runner.calls_to("which").len(), 2);
    }

    #[tokio::test]
    async fn produce_file_writes_last_arg() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.png");
        let runner = ScriptedCommandRunner::new().produce_file_when(|c| c.program == "ffmpeg");

        let cmd = CommandSpec::new("ffmpeg").arg(dest.to_string_lossy());
        assert!(runner.run(&cmd).await.unwrap().success);
        assert!(dest.exists());
    }
}
