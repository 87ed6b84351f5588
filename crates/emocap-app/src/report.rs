//! 터미널 출력 렌더링.

use emocap_core::models::analysis::{AnalysisOutcome, HealthResponse};
use emocap_core::error::CoreError;
use emocap_core::models::capture::CaptureOutcome;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::pipeline::PipelineReport;

/// 확률 막대 최대 길이
const BAR_WIDTH: usize = 20;

pub fn render_capture(outcome: &CaptureOutcome) -> String {
    match (outcome.path(), outcome.error_message.as_deref()) {
        (Some(path), _) if outcome.succeeded => format!("✅ Captured: {}", path.display()),
        (_, Some(error)) => format!("❌ Capture failed: {error}"),
        _ => "❌ Capture failed".to_string(),
    }
}

pub fn render_analysis(outcome: &AnalysisOutcome) -> String {
    if !outcome.succeeded {
        let mut out = format!(
            "❌ Analysis failed: {}",
            outcome.error_message.as_deref().unwrap_or("unknown error")
        );
        if let Some(message) = outcome.message.as_deref() {
            if Some(message) != outcome.error_message.as_deref() {
                let _ = write!(out, " ({message})");
            }
        }
        return out;
    }

    let mut out = String::new();
    let label = outcome.emotion_label.as_deref().unwrap_or("?");
    let marker = match outcome.emotion() {
        Some(e) if e.is_negative() => "😟",
        Some(_) => "🙂",
        None => "❔",
    };
    let _ = writeln!(out, "{marker} Emotion: {label}");
    if let (Some(v), Some(a)) = (outcome.valence, outcome.arousal) {
        let _ = writeln!(out, "   Valence: {v:+.3}  Arousal: {a:+.3}");
    }
    if let Some([x1, y1, x2, y2]) = outcome.face_bbox {
        let _ = writeln!(out, "   Face: ({x1}, {y1}) - ({x2}, {y2})");
    }

    let ranked = outcome.ranked_probabilities();
    if !ranked.is_empty() {
        let _ = writeln!(out, "   Probabilities:");
        for (label, p) in ranked {
            let filled = (p.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
            let _ = writeln!(
                out,
                "     {label:<9} {:<width$} {:5.1}%",
                "█".repeat(filled),
                p * 100.0,
                width = BAR_WIDTH
            );
        }
    }

    out.trim_end().to_string()
}

pub fn render_pipeline(report: &PipelineReport) -> String {
    let mut out = render_capture(&report.capture);
    if let Some(analysis) = &report.analysis {
        out.push('\n');
        out.push_str(&render_analysis(analysis));
    }
    out
}

pub fn render_health(health: &HealthResponse) -> String {
    let icon = if health.is_healthy() { "✅" } else { "❌" };
    let mut out = format!(
        "{icon} Server status: {} (model loaded: {})",
        if health.status.is_empty() { "unknown" } else { health.status.as_str() },
        health.model_loaded
    );
    if let Some(device) = &health.device {
        let _ = write!(out, ", device: {device}");
    }
    if let Some(n) = health.n_classes {
        let _ = write!(out, ", classes: {n}");
    }
    out
}

pub fn render_devices(platform: &str, devices: &[String]) -> String {
    if devices.is_empty() {
        return format!("No cameras detected ({platform})");
    }
    let mut out = format!("Cameras ({platform}):");
    for device in devices {
        let _ = write!(out, "\n  - {device}");
    }
    out
}

/// 설정 파일 위치 + 캡처 디렉토리. 디렉토리를 정할 수 없어도 출력은 계속한다.
pub fn render_config_paths(
    config_path: Option<&Path>,
    captures_dir: &Result<PathBuf, CoreError>,
) -> String {
    let file = match config_path {
        Some(path) => path.display().to_string(),
        None => "(defaults, not persisted)".to_string(),
    };
    let dir = match captures_dir {
        Ok(dir) => dir.display().to_string(),
        Err(e) => format!("(unavailable: {e})"),
    };
    format!("Config file: {file}\nCaptures dir: {dir}")
}
