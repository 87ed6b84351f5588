//! Windows 캡처: ffmpeg dshow, 실패 시 avicap32 PowerShell 폴백.
//!
//! 폴백 스크립트는 Video for Windows 캡처 창을 만들어 기본 드라이버에 연결하고,
//! 현재 프레임을 클립보드로 복사한 뒤 PNG로 저장한다. 더 이상의 폴백은 없다.

use async_trait::async_trait;
use emocap_core::config::CaptureConfig;
use emocap_core::error::CoreError;
use emocap_core::models::capture::DependencyStatus;
use emocap_core::ports::command::{CommandRunner, CommandSpec};
use emocap_core::ports::frame_capturer::FrameCapturer;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::ffmpeg_single_frame;
use crate::attempts::{run_attempts, CaptureAttempt};
use crate::install_hint::{windows_install_hint, CAPTURE_TOOL};

/// 장치 자동 감지 실패 시 사용하는 이름
pub const DEFAULT_DSHOW_DEVICE: &str = "Integrated Camera";

/// 드라이버 연결 대기 (밀리초)
const DRIVER_CONNECT_WAIT_MS: u32 = 1000;

const AVICAP_SCRIPT: &str = r#"$ErrorActionPreference = 'Stop'
Add-Type -AssemblyName System.Windows.Forms
Add-Type -AssemblyName System.Drawing
Add-Type @"
using System;
using System.Runtime.InteropServices;
public static class EmocapAvicap {
    [DllImport("avicap32.dll", CharSet = CharSet.Unicode)]
    public static extern IntPtr capCreateCaptureWindowW(string lpszWindowName, int dwStyle, int x, int y, int nWidth, int nHeight, IntPtr hWndParent, int nID);
    [DllImport("user32.dll")]
    public static extern IntPtr SendMessage(IntPtr hWnd, uint Msg, IntPtr wParam, IntPtr lParam);
    [DllImport("user32.dll")]
    public static extern bool DestroyWindow(IntPtr hWnd);
}
"@
$WM_CAP_START = 0x400
$WM_CAP_DRIVER_CONNECT = $WM_CAP_START + 10
$WM_CAP_DRIVER_DISCONNECT = $WM_CAP_START + 11
$WM_CAP_EDIT_COPY = $WM_CAP_START + 30
$WM_CAP_GRAB_FRAME = $WM_CAP_START + 60
$hwnd = [EmocapAvicap]::capCreateCaptureWindowW('emocap', 0, 0, 0, __WIDTH__, __HEIGHT__, [IntPtr]::Zero, 0)
if ($hwnd -eq [IntPtr]::Zero) { throw 'Failed to create capture window' }
try {
    [void][EmocapAvicap]::SendMessage($hwnd, $WM_CAP_DRIVER_CONNECT, [IntPtr]::Zero, [IntPtr]::Zero)
    Start-Sleep -Milliseconds __WAIT_MS__
    [void][EmocapAvicap]::SendMessage($hwnd, $WM_CAP_GRAB_FRAME, [IntPtr]::Zero, [IntPtr]::Zero)
    [void][EmocapAvicap]::SendMessage($hwnd, $WM_CAP_EDIT_COPY, [IntPtr]::Zero, [IntPtr]::Zero)
    $image = [System.Windows.Forms.Clipboard]::GetImage()
    if ($image -eq $null) { throw 'No frame on clipboard' }
    $image.Save('__DEST__', [System.Drawing.Imaging.ImageFormat]::Png)
    $image.Dispose()
} finally {
    [void][EmocapAvicap]::SendMessage($hwnd, $WM_CAP_DRIVER_DISCONNECT, [IntPtr]::Zero, [IntPtr]::Zero)
    [void][EmocapAvicap]::DestroyWindow($hwnd)
}
"#;

/// Windows dshow 캡처기
pub struct WindowsCapturer {
    runner: Arc<dyn CommandRunner>,
    config: CaptureConfig,
}

impl WindowsCapturer {
    pub fn new(runner: Arc<dyn CommandRunner>, config: CaptureConfig) -> Self {
        Self { runner, config }
    }

    fn list_devices_command() -> CommandSpec {
        CommandSpec::new(CAPTURE_TOOL).args([
            "-hide_banner",
            "-list_devices",
            "true",
            "-f",
            "dshow",
            "-i",
            "dummy",
        ])
    }

    /// 설정값 → 감지된 첫 장치 → 기본 이름 순으로 dshow 장치 이름 결정
    fn resolve_device_name(&self, devices: &[String]) -> String {
        if let Some(device) = &self.config.device {
            return device.clone();
        }
        if let Some(name) = devices.first() {
            return name.clone();
        }

        info!("dshow 장치 감지 실패: 기본 이름 사용: {DEFAULT_DSHOW_DEVICE}");
        DEFAULT_DSHOW_DEVICE.to_string()
    }

    /// ffmpeg dshow → PowerShell avicap32 순서의 시도 목록
    pub fn attempts(&self, device_name: &str, destination: &Path) -> Vec<CaptureAttempt> {
        let input = format!("video={device_name}");
        let size = self.config.video_size();

        vec![
            CaptureAttempt::new(
                format!("ffmpeg dshow \"{device_name}\""),
                ffmpeg_single_frame(
                    ["-f", "dshow", "-video_size", size.as_str(), "-i", input.as_str()],
                    destination,
                ),
            ),
            CaptureAttempt::new(
                "powershell avicap32",
                CommandSpec::new("powershell").args([
                    "-NoProfile".to_string(),
                    "-NonInteractive".to_string(),
                    "-Sta".to_string(),
                    "-ExecutionPolicy".to_string(),
                    "Bypass".to_string(),
                    "-Command".to_string(),
                    avicap_script(destination, self.config.width, self.config.height),
                ]),
            ),
        ]
    }
}

/// avicap32 클립보드 캡처 PowerShell 스크립트 생성
///
/// 경로는 작은따옴표 문자열에 들어가므로 `'`를 `''`로 이스케이프한다.
pub fn avicap_script(destination: &Path, width: u32, height: u32) -> String {
    let dest = destination.to_string_lossy().replace('\'', "''");
    AVICAP_SCRIPT
        .replace("__WIDTH__", &width.to_string())
        .replace("__HEIGHT__", &height.to_string())
        .replace("__WAIT_MS__", &DRIVER_CONNECT_WAIT_MS.to_string())
        .replace("__DEST__", &dest)
}

/// `ffmpeg -list_devices true -f dshow -i dummy` 출력에서 비디오 장치 이름 추출
///
/// `[dshow @ 0000020f] "Integrated Camera" (video)` 형식의 줄만 인식한다.
pub fn parse_dshow_video_devices(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.contains("(video)"))
        .filter_map(|line| {
            let start = line.find('"')? + 1;
            let len = line[start..].find('"')?;
            let name = &line[start..start + len];
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

#[async_trait]
impl FrameCapturer for WindowsCapturer {
    fn platform(&self) -> &str {
        "windows"
    }

    async fn check_dependency(&self) -> DependencyStatus {
        if self.runner.is_installed("where", CAPTURE_TOOL).await {
            DependencyStatus::available("FFmpeg is installed")
        } else {
            DependencyStatus::missing(windows_install_hint())
        }
    }

    async fn list_devices(&self) -> Result<Vec<String>, CoreError> {
        // 장치 목록 출력 후 항상 비정상 종료하므로 종료 코드는 무시
        let output = self.runner.run(&Self::list_devices_command()).await?;
        Ok(parse_dshow_video_devices(&output.combined()))
    }

    async fn capture_frame(
        &self,
        destination: &Path,
        devices: &[String],
    ) -> Result<(), CoreError> {
        let device_name = self.resolve_device_name(devices);
        info!(device = %device_name, "Windows 캡처 장치");

        let attempts = self.attempts(&device_name, destination);
        run_attempts(self.runner.as_ref(), &attempts)
            .await
            .map(|_| ())
            .map_err(|exhausted| {
                CoreError::CaptureFailed(format!(
                    "Windows camera capture failed ({})",
                    exhausted.summary()
                ))
            })
    }
}
