//! emocap 핵심 에러 타입.
//!
//! 캡처/분석 어댑터는 모든 실패를 `CoreError`로 매핑한다.
//! 공개 캡처/분석 연산은 이 에러를 결과 레코드(`CaptureOutcome`,
//! `AnalysisOutcome`)로 접어서 반환하므로, 메시지는 사용자에게 그대로 노출된다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O 에러
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 지원하지 않는 운영체제
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// 캡처 도구 미설치: 메시지는 설치 안내 문구
    #[error("{0}")]
    MissingDependency(String),

    /// 카메라 장치를 찾을 수 없음
    #[error("{0}")]
    DeviceNotFound(String),

    /// 모든 캡처 명령 실패
    #[error("{0}")]
    CaptureFailed(String),

    /// 캡처 명령은 성공했지만 이미지 파일이 없음
    #[error("Image file was not created: {path}")]
    ImageNotCreated {
        /// 기대한 출력 경로
        path: String,
    },

    /// 외부 명령 실행 자체가 불가능 (spawn 실패)
    #[error("Failed to run `{program}`: {message}")]
    CommandSpawn {
        /// 실행하려던 프로그램
        program: String,
        /// 실패 사유
        message: String,
    },

    /// 분석 대상 파일 없음
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// 지원하지 않는 이미지 형식
    #[error("Unsupported file format: {0}. Supported formats: PNG, JPG, JPEG")]
    UnsupportedFormat(String),

    /// 네트워크 에러 (연결 실패 등)
    #[error("Network error: {0}")]
    Network(String),

    /// 2xx가 아닌 HTTP 응답
    #[error("API error ({status}): {body}")]
    HttpStatus {
        /// HTTP 상태 코드
        status: u16,
        /// 응답 본문 원문
        body: String,
    },

    /// 응답 형식 오류
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// 요청 타임아웃
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout {
        /// 설정된 타임아웃 (밀리초)
        timeout_ms: u64,
    },

    /// 얼굴 미검출 (정상 응답이지만 분석 실패)
    #[error("No face detected")]
    NoFaceDetected,

    /// 내부 에러 (예상치 못한 상황)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// 타임아웃 에러 여부 (일반 전송 실패와 구분)
    pub fn is_timeout(&self) -> bool {
        matches!(self, CoreError::Timeout { .. })
    }
}
