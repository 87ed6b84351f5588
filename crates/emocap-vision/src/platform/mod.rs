//! 플랫폼별 `FrameCapturer` 어댑터.
//!
//! - macOS: ffmpeg avfoundation
//! - Linux: ffmpeg v4l2 + MJPEG/저해상도/fswebcam/streamer 폴백
//! - Windows: ffmpeg dshow + avicap32 PowerShell 폴백
//!
//! 어댑터는 명령 구성만 하므로 모든 타깃에서 컴파일된다.
//! 어느 것을 쓸지는 `create_platform_capturer`가 생성 시 한 번 결정한다.

mod linux;
mod macos;
mod windows;

pub use linux::LinuxCapturer;
pub use macos::MacOsCapturer;
pub use windows::WindowsCapturer;

use emocap_core::config::CaptureConfig;
use emocap_core::error::CoreError;
use emocap_core::models::platform::Platform;
use emocap_core::ports::command::{CommandRunner, CommandSpec};
use emocap_core::ports::frame_capturer::FrameCapturer;
use std::path::Path;
use std::sync::Arc;

use crate::install_hint::CAPTURE_TOOL;

/// 플랫폼에 맞는 캡처 어댑터 생성
///
/// 미지원 플랫폼은 `CoreError::UnsupportedPlatform`.
pub fn create_platform_capturer(
    platform: &Platform,
    runner: Arc<dyn CommandRunner>,
    config: &CaptureConfig,
) -> Result<Arc<dyn FrameCapturer>, CoreError> {
    match platform {
        Platform::MacOs => Ok(Arc::new(MacOsCapturer::new(runner, config.clone()))),
        Platform::Linux => Ok(Arc::new(LinuxCapturer::new(runner, config.clone()))),
        Platform::Windows => Ok(Arc::new(WindowsCapturer::new(runner, config.clone()))),
        Platform::Unsupported(os) => {
            tracing::warn!(os = %os, "미지원 플랫폼");
            Err(CoreError::UnsupportedPlatform(os.clone()))
        }
    }
}

/// ffmpeg 단일 프레임 캡처 명령
///
/// `input`은 `-f <format> ... -i <device>` 까지의 입력 인자.
fn ffmpeg_single_frame<I, S>(input: I, destination: &Path) -> CommandSpec
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    CommandSpec::new(CAPTURE_TOOL)
        .args(["-hide_banner", "-loglevel", "error"])
        .args(input)
        .args(["-frames:v", "1", "-y"])
        .arg(destination.to_string_lossy())
}
