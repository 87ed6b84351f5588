//! 캡처 결과 모델.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 단일 프레임 캡처 결과
///
/// `succeeded`가 true면 `image_path`만, false면 `error_message`만 채워진다.
/// 생성자 외의 방법으로 만들지 않는다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureOutcome {
    pub succeeded: bool,
    pub image_path: Option<PathBuf>,
    pub error_message: Option<String>,
}

impl CaptureOutcome {
    /// 캡처 성공
    pub fn success(image_path: impl Into<PathBuf>) -> Self {
        Self {
            succeeded: true,
            image_path: Some(image_path.into()),
            error_message: None,
        }
    }

    /// 캡처 실패
    pub fn failure(error_message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            image_path: None,
            error_message: Some(error_message.into()),
        }
    }

    /// 성공 시 이미지 경로
    pub fn path(&self) -> Option<&Path> {
        self.image_path.as_deref()
    }
}

/// 캡처 도구 설치 상태
///
/// 캡처 시도마다 새로 계산한다 (캐시하지 않음).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyStatus {
    pub available: bool,
    /// 사용 가능 시 확인 문구, 아니면 설치 안내
    pub message: String,
}

impl DependencyStatus {
    pub fn available(message: impl Into<String>) -> Self {
        Self {
            available: true,
            message: message.into(),
        }
    }

    pub fn missing(install_hint: impl Into<String>) -> Self {
        Self {
            available: false,
            message: install_hint.into(),
        }
    }
}
