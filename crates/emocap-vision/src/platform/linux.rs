//! Linux 캡처: ffmpeg v4l2 + 폴백 체인.
//!
//! ## 시도 순서
//! 1. ffmpeg v4l2, 설정 해상도 (기본 1280x720)
//! 2. ffmpeg v4l2, MJPEG 입력 포맷
//! 3. ffmpeg v4l2, 640x480
//! 4. fswebcam
//! 5. streamer (xawtv)
//!
//! 장치는 `/dev/video0`, 없으면 `/dev/video*` 중 번호가 가장 작은 것.

use async_trait::async_trait;
use emocap_core::config::CaptureConfig;
use emocap_core::error::CoreError;
use emocap_core::models::capture::DependencyStatus;
use emocap_core::ports::command::{CommandRunner, CommandSpec};
use emocap_core::ports::frame_capturer::FrameCapturer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::ffmpeg_single_frame;
use crate::attempts::{run_attempts, CaptureAttempt};
use crate::install_hint::{gather_distro_probe, linux_install_hint, CAPTURE_TOOL};

const DEFAULT_DEVICE: &str = "video0";
const FALLBACK_VIDEO_SIZE: &str = "640x480";

/// Linux v4l2 캡처기
pub struct LinuxCapturer {
    runner: Arc<dyn CommandRunner>,
    config: CaptureConfig,
    /// 장치 디렉토리 (기본 `/dev`)
    dev_dir: PathBuf,
    /// 배포판 식별 파일 디렉토리 (기본 `/etc`)
    etc_dir: PathBuf,
}

impl LinuxCapturer {
    pub fn new(runner: Arc<dyn CommandRunner>, config: CaptureConfig) -> Self {
        Self {
            runner,
            config,
            dev_dir: PathBuf::from("/dev"),
            etc_dir: PathBuf::from("/etc"),
        }
    }

    /// 장치 디렉토리 교체
    pub fn with_dev_dir(mut self, dev_dir: impl Into<PathBuf>) -> Self {
        self.dev_dir = dev_dir.into();
        self
    }

    /// 배포판 식별 파일 디렉토리 교체
    pub fn with_etc_dir(mut self, etc_dir: impl Into<PathBuf>) -> Self {
        self.etc_dir = etc_dir.into();
        self
    }

    /// `video<N>` 장치 노드 목록 (번호 오름차순)
    fn video_nodes(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(&self.dev_dir) else {
            return Vec::new();
        };

        let mut nodes: Vec<(u32, PathBuf)> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name();
                let index = name.to_str()?.strip_prefix("video")?.parse::<u32>().ok()?;
                Some((index, entry.path()))
            })
            .collect();
        nodes.sort_by_key(|(index, _)| *index);
        nodes.into_iter().map(|(_, path)| path).collect()
    }

    /// 캡처 대상 장치 결정
    pub fn resolve_device(&self) -> Result<PathBuf, CoreError> {
        if let Some(device) = &self.config.device {
            return Ok(PathBuf::from(device));
        }

        let primary = self.dev_dir.join(DEFAULT_DEVICE);
        if primary.exists() {
            return Ok(primary);
        }

        let device = self.video_nodes().into_iter().next().ok_or_else(|| {
            CoreError::DeviceNotFound("No video devices found".to_string())
        })?;
        info!(device = %device.display(), "기본 장치 없음: 대체 장치 사용");
        Ok(device)
    }

    /// 장치 + 출력 경로에 대한 시도 목록
    pub fn attempts(&self, device: &Path, destination: &Path) -> Vec<CaptureAttempt> {
        let device = device.to_string_lossy().to_string();
        let device = device.as_str();
        let size = self.config.video_size();
        let size = size.as_str();
        let dest = destination.to_string_lossy().to_string();
        let dest = dest.as_str();

        vec![
            CaptureAttempt::new(
                format!("ffmpeg v4l2 {size}"),
                ffmpeg_single_frame(
                    ["-f", "v4l2", "-video_size", size, "-i", device],
                    destination,
                ),
            ),
            CaptureAttempt::new(
                format!("ffmpeg v4l2 mjpeg {size}"),
                ffmpeg_single_frame(
                    [
                        "-f",
                        "v4l2",
                        "-input_format",
                        "mjpeg",
                        "-video_size",
                        size,
                        "-i",
                        device,
                    ],
                    destination,
                ),
            ),
            CaptureAttempt::new(
                format!("ffmpeg v4l2 {FALLBACK_VIDEO_SIZE}"),
                ffmpeg_single_frame(
                    ["-f", "v4l2", "-video_size", FALLBACK_VIDEO_SIZE, "-i", device],
                    destination,
                ),
            ),
            CaptureAttempt::new(
                "fswebcam",
                CommandSpec::new("fswebcam").args([
                    "-d",
                    device,
                    "-r",
                    size,
                    "--no-banner",
                    "--png",
                    "9",
                    dest,
                ]),
            ),
            CaptureAttempt::new(
                "streamer",
                CommandSpec::new("streamer").args(["-c", device, "-s", size, "-o", dest]),
            ),
        ]
    }
}

/// `v4l2-ctl --list-devices` 출력에서 장치 이름 + 노드 추출
///
/// ```text
/// Integrated Camera: Integrated C (usb-0000:00:14.0-8):
///         /dev/video0
///         /dev/video1
/// ```
/// → `["Integrated Camera: Integrated C (/dev/video0)"]` (이름마다 첫 노드)
pub fn parse_v4l2_devices(output: &str) -> Vec<String> {
    let mut devices = Vec::new();
    let mut current: Option<String> = None;

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if !line.starts_with(char::is_whitespace) {
            let name = line.trim().trim_end_matches(':');
            let name = match name.rfind(" (") {
                Some(pos) => &name[..pos],
                None => name,
            };
            current = Some(name.to_string());
        } else if let Some(name) = current.take() {
            devices.push(format!("{name} ({})", line.trim()));
        }
    }

    devices
}

#[async_trait]
impl FrameCapturer for LinuxCapturer {
    fn platform(&self) -> &str {
        "linux"
    }

    async fn check_dependency(&self) -> DependencyStatus {
        if self.runner.is_installed("which", CAPTURE_TOOL).await {
            return DependencyStatus::available("FFmpeg is installed");
        }

        let probe = gather_distro_probe(self.runner.as_ref(), &self.etc_dir).await;
        debug!(family = ?probe.family(), "배포판 추정");
        DependencyStatus::missing(linux_install_hint(&probe))
    }

    async fn list_devices(&self) -> Result<Vec<String>, CoreError> {
        let cmd = CommandSpec::new("v4l2-ctl").arg("--list-devices");
        if let Ok(output) = self.runner.run(&cmd).await {
            if output.success {
                let devices = parse_v4l2_devices(&output.stdout);
                if !devices.is_empty() {
                    return Ok(devices);
                }
            }
        }

        // v4l2-ctl 미설치 시 장치 노드만
        Ok(self
            .video_nodes()
            .into_iter()
            .map(|p| p.display().to_string())
            .collect())
    }

    async fn capture_frame(
        &self,
        destination: &Path,
        _devices: &[String],
    ) -> Result<(), CoreError> {
        let device = self.resolve_device()?;
        info!(device = %device.display(), "Linux 캡처 장치");

        let attempts = self.attempts(&device, destination);
        run_attempts(self.runner.as_ref(), &attempts)
            .await
            .map(|_| ())
            .map_err(|exhausted| {
                CoreError::CaptureFailed(format!(
                    "All capture methods failed. Please ensure your webcam is connected and \
                     ffmpeg/fswebcam is installed. ({})",
                    exhausted.summary()
                ))
            })
    }
}
