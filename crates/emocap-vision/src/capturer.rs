//! 웹캠 캡처 오케스트레이션.
//!
//! 의존성 확인 → 출력 디렉토리 준비 → 파일명 결정 → (지연) → 플랫폼 캡처 → 파일 검증.
//! 각 단계는 실패 시 이후 단계를 실행하지 않는다. 공개 API는 에러를 반환하지 않고
//! `CaptureOutcome`으로 접어서 돌려준다.

use chrono::{DateTime, SecondsFormat, Utc};
use emocap_core::config::CaptureConfig;
use emocap_core::error::CoreError;
use emocap_core::models::capture::CaptureOutcome;
use emocap_core::models::platform::Platform;
use emocap_core::ports::command::CommandRunner;
use emocap_core::ports::frame_capturer::FrameCapturer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::platform::create_platform_capturer;

/// 캡처 파일명 접두사
pub const CAPTURE_FILE_PREFIX: &str = "capture-";

/// 단일 프레임 웹캠 캡처기
pub struct WebcamCapturer {
    frame_capturer: Arc<dyn FrameCapturer>,
    capture_delay: Duration,
}

impl WebcamCapturer {
    pub fn new(frame_capturer: Arc<dyn FrameCapturer>) -> Self {
        Self {
            frame_capturer,
            capture_delay: Duration::ZERO,
        }
    }

    /// 카메라 명령 실행 전 대기 시간
    pub fn with_capture_delay(mut self, delay: Duration) -> Self {
        self.capture_delay = delay;
        self
    }

    /// 플랫폼 어댑터를 선택해 생성. 미지원 플랫폼이면 에러.
    pub fn for_platform(
        platform: &Platform,
        runner: Arc<dyn CommandRunner>,
        config: &CaptureConfig,
    ) -> Result<Self, CoreError> {
        let frame_capturer = create_platform_capturer(platform, runner, config)?;
        Ok(Self::new(frame_capturer).with_capture_delay(config.capture_delay()))
    }

    /// 사용 중인 플랫폼 어댑터
    pub fn frame_capturer(&self) -> &Arc<dyn FrameCapturer> {
        &self.frame_capturer
    }

    /// `output_dir`에 한 프레임 캡처
    pub async fn capture(&self, output_dir: &Path) -> CaptureOutcome {
        match self.try_capture(output_dir).await {
            Ok(path) => {
                info!(path = %path.display(), "캡처 완료");
                CaptureOutcome::success(path)
            }
            Err(e) => {
                error!(platform = self.frame_capturer.platform(), "캡처 실패: {e}");
                CaptureOutcome::failure(e.to_string())
            }
        }
    }

    async fn try_capture(&self, output_dir: &Path) -> Result<PathBuf, CoreError> {
        let dependency = self.frame_capturer.check_dependency().await;
        if !dependency.available {
            return Err(CoreError::MissingDependency(dependency.message));
        }
        debug!("{}", dependency.message);

        tokio::fs::create_dir_all(output_dir).await?;
        let destination = output_dir.join(capture_file_name(Utc::now()));

        if !self.capture_delay.is_zero() {
            debug!(delay_ms = self.capture_delay.as_millis() as u64, "캡처 지연");
            tokio::time::sleep(self.capture_delay).await;
        }

        // 조회 결과는 어댑터에 그대로 넘겨 장치 선택에 재사용한다
        let devices = match self.frame_capturer.list_devices().await {
            Ok(devices) => {
                if devices.is_empty() {
                    debug!("감지된 카메라 장치 없음");
                } else {
                    info!(devices = ?devices, "카메라 장치");
                }
                devices
            }
            Err(e) => {
                debug!("장치 목록 조회 실패 (무시): {e}");
                Vec::new()
            }
        };

        self.frame_capturer.capture_frame(&destination, &devices).await?;

        if !tokio::fs::try_exists(&destination).await.unwrap_or(false) {
            return Err(CoreError::ImageNotCreated {
                path: destination.display().to_string(),
            });
        }

        match image::image_dimensions(&destination) {
            Ok((width, height)) => debug!(width, height, "캡처 이미지 크기"),
            Err(e) => warn!("캡처 이미지 헤더 확인 실패: {e}"),
        }

        Ok(destination)
    }
}

/// 플랫폼 선택부터 캡처까지 한 번에 수행. 미지원 플랫폼도 실패 결과로 돌려준다.
pub async fn capture_once(
    platform: &Platform,
    runner: Arc<dyn CommandRunner>,
    config: &CaptureConfig,
    output_dir: &Path,
) -> CaptureOutcome {
    match WebcamCapturer::for_platform(platform, runner, config) {
        Ok(capturer) => capturer.capture(output_dir).await,
        Err(e) => {
            error!("캡처기 생성 실패: {e}");
            CaptureOutcome::failure(e.to_string())
        }
    }
}

/// `capture-<UTC ISO8601 밀리초>.png` (`:`, `.` → `-`)
///
/// 예: `capture-2024-05-01T12-30-45-123Z.png`
pub fn capture_file_name(at: DateTime<Utc>) -> String {
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{CAPTURE_FILE_PREFIX}{stamp}.png")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{LinuxCapturer, WindowsCapturer};
    use crate::scripted::ScriptedCommandRunner;
    use chrono::TimeZone;
    use emocap_core::ports::command::CommandSpec;

    fn is_ffmpeg_capture(c: &CommandSpec) -> bool {
        c.program == "ffmpeg" && c.args.iter().any(|a| a == "-frames:v")
    }

    fn linux(runner: Arc<ScriptedCommandRunner>, dev: &Path) -> WebcamCapturer {
        let adapter = LinuxCapturer::new(runner, CaptureConfig::default()).with_dev_dir(dev);
        WebcamCapturer::new(Arc::new(adapter))
    }

    fn dev_with_video0() -> tempfile::TempDir {
        let dev = tempfile::tempdir().unwrap();
        std::fs::write(dev.path().join("video0"), b"").unwrap();
        dev
    }

    #[test]
    fn file_name_format() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap()
            + chrono::Duration::milliseconds(123);
        assert_eq!(capture_file_name(at), "capture-2024-05-01T12-30-45-123Z.png");
    }

    #[tokio::test]
    async fn success_returns_existing_png() {
        let dev = dev_with_video0();
        let out = tempfile::tempdir().unwrap();
        let runner = Arc::new(
            ScriptedCommandRunner::new()
                .with_installed("ffmpeg")
                .produce_file_when(is_ffmpeg_capture),
        );

        let outcome = linux(runner, dev.path())
            .capture(&out.path().join("captures"))
            .await;

        assert!(outcome.succeeded, "{outcome:?}");
        let path = outcome.path().unwrap();
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("capture-") && name.ends_with(".png"));
        assert!(!name.contains(':'));
    }

    #[tokio::test]
    async fn missing_tool_runs_no_camera_command() {
        let dev = dev_with_video0();
        let out = tempfile::tempdir().unwrap();
        let etc = tempfile::tempdir().unwrap();
        std::fs::write(etc.path().join("os-release"), "ID=fedora\n").unwrap();
        let runner = Arc::new(ScriptedCommandRunner::new());
        let adapter = LinuxCapturer::new(runner.clone(), CaptureConfig::default())
            .with_dev_dir(dev.path())
            .with_etc_dir(etc.path());

        let outcome = WebcamCapturer::new(Arc::new(adapter))
            .capture(out.path())
            .await;

        assert!(!outcome.succeeded);
        assert!(outcome
            .error_message
            .as_deref()
            .unwrap()
            .contains("sudo dnf install"));
        assert!(runner.calls_to("ffmpeg").is_empty());
        assert!(runner.calls_to("fswebcam").is_empty());
    }

    #[tokio::test]
    async fn zero_exit_without_file_fails() {
        let dev = dev_with_video0();
        let out = tempfile::tempdir().unwrap();
        let runner = Arc::new(
            ScriptedCommandRunner::new()
                .with_installed("ffmpeg")
                .succeed_when(is_ffmpeg_capture),
        );

        let outcome = linux(runner, dev.path()).capture(out.path()).await;

        assert!(!outcome.succeeded);
        assert!(outcome
            .error_message
            .unwrap()
            .starts_with("Image file was not created"));
    }

    #[tokio::test]
    async fn output_dir_is_created() {
        let dev = dev_with_video0();
        let out = tempfile::tempdir().unwrap();
        let nested = out.path().join("a").join("b");
        let runner = Arc::new(
            ScriptedCommandRunner::new()
                .with_installed("ffmpeg")
                .produce_file_when(is_ffmpeg_capture),
        );

        let outcome = linux(runner, dev.path()).capture(&nested).await;
        assert!(outcome.succeeded);
        assert!(nested.is_dir());
    }

    #[tokio::test(start_paused = true)]
    async fn capture_delay_is_applied() {
        let dev = dev_with_video0();
        let out = tempfile::tempdir().unwrap();
        let runner = Arc::new(
            ScriptedCommandRunner::new()
                .with_installed("ffmpeg")
                .produce_file_when(is_ffmpeg_capture),
        );

        let start = tokio::time::Instant::now();
        let outcome = linux(runner, dev.path())
            .with_capture_delay(Duration::from_millis(1500))
            .capture(out.path())
            .await;

        assert!(outcome.succeeded);
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn windows_lists_devices_once_per_capture() {
        let out = tempfile::tempdir().unwrap();
        let is_list = |c: &CommandSpec| c.args.iter().any(|a| a == "-list_devices");
        let runner = Arc::new(
            ScriptedCommandRunner::new()
                .with_installed("ffmpeg")
                .respond_when(
                    is_list,
                    emocap_core::ports::command::CommandOutput {
                        success: false,
                        code: Some(1),
                        stdout: String::new(),
                        stderr: r#"[dshow @ 01] "HD Webcam" (video)"#.to_string(),
                    },
                )
                .produce_file_when(is_ffmpeg_capture),
        );
        let adapter = WindowsCapturer::new(runner.clone(), CaptureConfig::default());

        let outcome = WebcamCapturer::new(Arc::new(adapter))
            .capture(out.path())
            .await;

        assert!(outcome.succeeded, "{outcome:?}");
        let ffmpeg = runner.calls_to("ffmpeg");
        assert_eq!(ffmpeg.iter().filter(|c| is_list(c)).count(), 1);
        let capture = ffmpeg.iter().find(|c| is_ffmpeg_capture(c)).unwrap();
        assert!(capture.args.contains(&"video=HD Webcam".to_string()));
    }

    #[tokio::test]
    async fn unsupported_platform_is_a_failed_outcome() {
        let out = tempfile::tempdir().unwrap();
        let runner: Arc<dyn CommandRunner> = Arc::new(ScriptedCommandRunner::new());

        let outcome = capture_once(
            &Platform::Unsupported("freebsd".to_string()),
            runner,
            &CaptureConfig::default(),
            out.path(),
        )
        .await;

        assert!(!outcome.succeeded);
        assert_eq!(
            outcome.error_message.as_deref(),
            Some("Unsupported platform: freebsd")
        );
    }
}
