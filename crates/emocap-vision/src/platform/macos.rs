//! macOS 캡처: ffmpeg avfoundation.

use async_trait::async_trait;
use emocap_core::config::CaptureConfig;
use emocap_core::error::CoreError;
use emocap_core::models::capture::DependencyStatus;
use emocap_core::ports::command::{CommandRunner, CommandSpec};
use emocap_core::ports::frame_capturer::FrameCapturer;
use std::path::Path;
use std::sync::Arc;

use super::ffmpeg_single_frame;
use crate::install_hint::{macos_install_hint, CAPTURE_TOOL};

/// avfoundation 기본 카메라 인덱스
const DEFAULT_DEVICE_INDEX: &str = "0";

/// macOS avfoundation 캡처기
pub struct MacOsCapturer {
    runner: Arc<dyn CommandRunner>,
    config: CaptureConfig,
}

impl MacOsCapturer {
    pub fn new(runner: Arc<dyn CommandRunner>, config: CaptureConfig) -> Self {
        Self { runner, config }
    }

    fn capture_command(&self, destination: &Path) -> CommandSpec {
        let device = self
            .config
            .device
            .clone()
            .unwrap_or_else(|| DEFAULT_DEVICE_INDEX.to_string());

        ffmpeg_single_frame(
            [
                "-f".to_string(),
                "avfoundation".to_string(),
                "-video_size".to_string(),
                self.config.video_size(),
                "-framerate".to_string(),
                self.config.framerate.to_string(),
                "-i".to_string(),
                device,
            ],
            destination,
        )
    }
}

/// `ffmpeg -f avfoundation -list_devices true -i ""` 출력에서 비디오 장치 추출
///
/// 결과 형식: `"<index>: <name>"`
pub fn parse_avfoundation_devices(output: &str) -> Vec<String> {
    let mut devices = Vec::new();
    let mut in_video_section = false;

    for line in output.lines() {
        if line.contains("AVFoundation video devices") {
            in_video_section = true;
            continue;
        }
        if line.contains("AVFoundation audio devices") {
            in_video_section = false;
            continue;
        }
        if !in_video_section {
            continue;
        }

        // "[AVFoundation indev @ 0x7f8] [0] FaceTime HD Camera"
        if let Some((_, entry)) = line.rsplit_once("] [") {
            if let Some((index, name)) = entry.split_once("] ") {
                if index.chars().all(|c| c.is_ascii_digit()) {
                    devices.push(format!("{index}: {}", name.trim()));
                }
            }
        }
    }

    devices
}

#[async_trait]
impl FrameCapturer for MacOsCapturer {
    fn platform(&self) -> &str {
        "macos"
    }

    async fn check_dependency(&self) -> DependencyStatus {
        if self.runner.is_installed("which", CAPTURE_TOOL).await {
            DependencyStatus::available("FFmpeg is installed")
        } else {
            DependencyStatus::missing(macos_install_hint())
        }
    }

    async fn list_devices(&self) -> Result<Vec<String>, CoreError> {
        let cmd = CommandSpec::new(CAPTURE_TOOL).args([
            "-hide_banner",
            "-f",
            "avfoundation",
            "-list_devices",
            "true",
            "-i",
            "",
        ]);
        // 장치 목록 출력 후 항상 비정상 종료하므로 종료 코드는 무시
        let output = self.runner.run(&cmd).await?;
        Ok(parse_avfoundation_devices(&output.combined()))
    }

    async fn capture_frame(
        &self,
        destination: &Path,
        _devices: &[String],
    ) -> Result<(), CoreError> {
        let cmd = self.capture_command(destination);
        let output = self.runner.run(&cmd).await?;
        if output.success {
            Ok(())
        } else {
            Err(CoreError::CaptureFailed(format!(
                "Camera capture failed: {}",
                output.failure_summary()
            )))
        }
    }
}
