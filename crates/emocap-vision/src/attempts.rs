//! 순서 있는 캡처 시도 목록.
//!
//! 폴백 체인은 분기 코드가 아니라 `CaptureAttempt` 목록(데이터)으로 표현한다.
//! 앞에서부터 실행하고 첫 성공에서 멈춘다.

use emocap_core::ports::command::{CommandRunner, CommandSpec};
use tracing::{info, warn};

/// 캡처 시도 하나 (사람이 읽는 라벨 + 명령)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureAttempt {
    pub label: String,
    pub command: CommandSpec,
}

impl CaptureAttempt {
    pub fn new(label: impl Into<String>, command: CommandSpec) -> Self {
        Self {
            label: label.into(),
            command,
        }
    }
}

/// 모든 시도가 실패했을 때의 시도별 사유
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptsExhausted {
    /// (라벨, 실패 사유)
    pub failures: Vec<(String, String)>,
}

impl AttemptsExhausted {
    /// "라벨: 사유; 라벨: 사유" 형식 요약
    pub fn summary(&self) -> String {
        self.failures
            .iter()
            .map(|(label, reason)| format!("{label}: {reason}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// 시도 목록을 순서대로 실행. 성공한 시도의 인덱스를 반환한다.
///
/// 성공은 프로세스 종료 코드 0을 뜻한다. 출력 파일 확인은 호출부에서 한다.
pub async fn run_attempts(
    runner: &dyn CommandRunner,
    attempts: &[CaptureAttempt],
) -> Result<usize, AttemptsExhausted> {
    let mut exhausted = AttemptsExhausted::default();

    for (index, attempt) in attempts.iter().enumerate() {
        info!(
            attempt = index + 1,
            total = attempts.len(),
            label = %attempt.label,
            "캡처 시도"
        );

        let reason = match runner.run(&attempt.command).await {
            Ok(output) if output.success => {
                info!(label = %attempt.label, "캡처 시도 성공");
                return Ok(index);
            }
            Ok(output) => output.failure_summary(),
            Err(e) => e.to_string(),
        };

        warn!(label = %attempt.label, reason = %reason, "캡처 시도 실패");
        exhausted.failures.push((attempt.label.clone(), reason));
    }

    Err(exhausted)
}
