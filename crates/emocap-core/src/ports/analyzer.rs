//! 감정 분석 포트.
//!
//! 구현: `emocap-network` crate (reqwest)

use async_trait::async_trait;
use std::path::Path;

use crate::models::analysis::AnalysisOutcome;

/// 감정 분석 클라이언트
///
/// 모든 연산은 실패를 결과 레코드에 담아 반환하며 에러를 던지지 않는다.
#[async_trait]
pub trait EmotionAnalyzer: Send + Sync {
    /// 이미지 파일을 업로드하여 분석
    async fn detect_emotion(&self, image_path: &Path) -> AnalysisOutcome;

    /// base64 인코딩 이미지를 전송하여 분석 (파일 전제조건 검사 없음)
    async fn detect_emotion_from_base64(&self, image_base64: &str) -> AnalysisOutcome;

    /// 서버가 정상이고 모델이 로드됐으면 true
    async fn check_health(&self) -> bool;
}
