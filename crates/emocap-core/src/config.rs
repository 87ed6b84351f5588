//! 애플리케이션 설정 구조체.
//!
//! 분석 서버 URL/타임아웃, 캡처 해상도/지연/저장 경로 등 런타임 설정을 정의한다.
//! `ConfigManager`가 JSON 파일 + 환경변수에서 로드한다.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 분석 서버 연결 설정
    #[serde(default)]
    pub analysis: AnalysisClientConfig,
    /// 웹캠 캡처 설정
    #[serde(default)]
    pub capture: CaptureConfig,
}

// ============================================================
// 분석 서버 설정
// ============================================================

/// 분석 클라이언트 설정: 클라이언트 생성 시 한 번 고정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisClientConfig {
    /// 분석 서버 기본 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 요청 타임아웃 (밀리초)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for AnalysisClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AnalysisClientConfig {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ============================================================
// 캡처 설정
// ============================================================

/// 웹캠 캡처 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// 캡처 이미지 저장 디렉토리 (None이면 플랫폼 데이터 디렉토리의 `captures`)
    #[serde(default)]
    pub captures_dir: Option<PathBuf>,
    /// 캡처 직전 대기 시간 (밀리초)
    #[serde(default)]
    pub capture_delay_ms: u64,
    /// 카메라 장치 지정 (Linux: 장치 경로, Windows: dshow 이름, macOS: 인덱스)
    #[serde(default)]
    pub device: Option<String>,
    /// 캡처 너비 (픽셀)
    #[serde(default = "default_width")]
    pub width: u32,
    /// 캡처 높이 (픽셀)
    #[serde(default = "default_height")]
    pub height: u32,
    /// 프레임레이트 (avfoundation 입력에 필요)
    #[serde(default = "default_framerate")]
    pub framerate: u32,
    /// 보관할 최대 캡처 수 (None이면 정리하지 않음)
    #[serde(default)]
    pub max_retained_captures: Option<usize>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            captures_dir: None,
            capture_delay_ms: 0,
            device: None,
            width: default_width(),
            height: default_height(),
            framerate: default_framerate(),
            max_retained_captures: None,
        }
    }
}

impl CaptureConfig {
    pub fn capture_delay(&self) -> Duration {
        Duration::from_millis(self.capture_delay_ms)
    }

    /// ffmpeg `-video_size` 형식 (예: "1280x720")
    pub fn video_size(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

// ============================================================
// AppConfig impl
// ============================================================

impl AppConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self {
            analysis: AnalysisClientConfig::default(),
            capture: CaptureConfig::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_timeout_ms() -> u64 {
    30_000
}
fn default_width() -> u32 {
    1280
}
fn default_height() -> u32 {
    720
}
fn default_framerate() -> u32 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"analysis":{"base_url":"http://gpu-box:9000"}}"#).unwrap();
        assert_eq!(config.analysis.base_url, "http://gpu-box:9000");
        assert_eq!(config.analysis.timeout_ms, 30_000);
        assert_eq!(config.capture.video_size(), "1280x720");
    }

    #[test]
    fn durations() {
        let config = AppConfig::default_config();
        assert_eq!(config.analysis.timeout(), Duration::from_secs(30));
        assert_eq!(config.capture.capture_delay(), Duration::ZERO);
    }
}
