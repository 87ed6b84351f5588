//! 캡처 → 분석 파이프라인.

use emocap_core::models::analysis::AnalysisOutcome;
use emocap_core::models::capture::CaptureOutcome;
use emocap_core::ports::analyzer::EmotionAnalyzer;
use emocap_vision::capturer::WebcamCapturer;
use emocap_vision::retention::prune_captures;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// 파이프라인 한 번 실행 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub capture: CaptureOutcome,
    /// 캡처 실패 시 `None` (분석 미실행)
    pub analysis: Option<AnalysisOutcome>,
}

impl PipelineReport {
    /// 캡처와 분석 모두 성공
    pub fn succeeded(&self) -> bool {
        self.capture.succeeded && self.analysis.as_ref().is_some_and(|a| a.succeeded)
    }

    /// 캡처 단계 실패만 담은 보고
    pub fn capture_failed(capture: CaptureOutcome) -> Self {
        Self {
            capture,
            analysis: None,
        }
    }
}

/// 캡처 후 분석
pub struct CapturePipeline {
    capturer: WebcamCapturer,
    analyzer: Arc<dyn EmotionAnalyzer>,
    max_retained: Option<usize>,
}

impl CapturePipeline {
    pub fn new(capturer: WebcamCapturer, analyzer: Arc<dyn EmotionAnalyzer>) -> Self {
        Self {
            capturer,
            analyzer,
            max_retained: None,
        }
    }

    /// 캡처 성공 후 최신 `keep`개만 남기도록 정리
    pub fn with_retention(mut self, keep: Option<usize>) -> Self {
        self.max_retained = keep;
        self
    }

    /// 한 프레임 캡처 (보관 정리 포함)
    pub async fn capture(&self, output_dir: &Path) -> CaptureOutcome {
        let outcome = self.capturer.capture(output_dir).await;
        if outcome.succeeded {
            self.apply_retention(output_dir);
        }
        outcome
    }

    /// 캡처 후 성공 시에만 분석
    pub async fn run(&self, output_dir: &Path) -> PipelineReport {
        let capture = self.capture(output_dir).await;

        let Some(image_path) = capture.path() else {
            warn!("캡처 실패로 분석 생략");
            return PipelineReport::capture_failed(capture);
        };

        info!(path = %image_path.display(), "캡처 이미지 분석");
        let analysis = self.analyzer.detect_emotion(image_path).await;

        PipelineReport {
            capture,
            analysis: Some(analysis),
        }
    }

    fn apply_retention(&self, output_dir: &Path) {
        let Some(keep) = self.max_retained else {
            return;
        };
        if let Err(e) = prune_captures(output_dir, keep) {
            warn!("캡처 보관 정리 실패: {e}");
        }
    }
}
