//! 단일 프레임 캡처 포트.
//!
//! 구현: `emocap-vision` crate (macOS avfoundation, Linux v4l2, Windows dshow)

use async_trait::async_trait;
use std::path::Path;

use crate::error::CoreError;
use crate::models::capture::DependencyStatus;

/// 플랫폼별 프레임 캡처기
///
/// 플랫폼 감지는 생성 시 한 번만 수행되고, 호출부는 플랫폼 분기를 하지 않는다.
#[async_trait]
pub trait FrameCapturer: Send + Sync {
    /// 플랫폼 이름 (macos, linux, windows)
    fn platform(&self) -> &str;

    /// 캡처 도구 설치 여부 확인. 설치돼 있지 않으면 설치 안내를 담아 반환한다.
    async fn check_dependency(&self) -> DependencyStatus;

    /// 감지된 카메라 장치 목록 (best-effort)
    async fn list_devices(&self) -> Result<Vec<String>, CoreError>;

    /// 기본 카메라에서 한 프레임을 `destination`에 PNG로 저장
    ///
    /// `devices`는 호출부가 직전에 조회한 `list_devices` 결과 (실패 시 빈 목록).
    /// 폴백 순서는 구현체가 결정한다. 파일 생성 검증은 호출부 책임.
    async fn capture_frame(
        &self,
        destination: &Path,
        devices: &[String],
    ) -> Result<(), CoreError>;
}
