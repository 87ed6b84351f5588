//! 감정 분석 서버 HTTP 클라이언트.
//!
//! `EmotionAnalyzer` 포트 구현. 엔드포인트:
//! - `POST /detect_emotion` (multipart `file`)
//! - `POST /detect_emotion_base64` (`{"image": "<base64>"}`)
//! - `GET /health`
//! - `GET /` (서비스 정보)

use async_trait::async_trait;
use emocap_core::config::AnalysisClientConfig;
use emocap_core::error::CoreError;
use emocap_core::models::analysis::{AnalysisOutcome, EmotionResponse, HealthResponse, ServiceInfo};
use emocap_core::ports::analyzer::EmotionAnalyzer;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::image_payload::validate_image_path;

// ============================================================
// 응답 매핑
// ============================================================

/// 상태 코드 + 본문 → 분석 결과
///
/// - 2xx 아님 → `HttpStatus`
/// - 본문 파싱 실패 → `Serialization`
/// - `face_detected == false` → 얼굴 미검출 결과
pub fn map_emotion_response(status: u16, body: &str) -> Result<AnalysisOutcome, CoreError> {
    if !(200..300).contains(&status) {
        return Err(CoreError::HttpStatus {
            status,
            body: body.to_string(),
        });
    }

    let response: EmotionResponse = serde_json::from_str(body)?;
    AnalysisOutcome::from_response(response)
}

// ============================================================
// HttpAnalysisClient
// ============================================================

/// 분석 서버 클라이언트: `EmotionAnalyzer` 포트 구현
///
/// 설정은 생성 시 고정된다.
pub struct HttpAnalysisClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpAnalysisClient {
    /// 새 분석 클라이언트 생성
    pub fn new(config: &AnalysisClientConfig) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CoreError::Network(format!("failed to build HTTP client: {e}")))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        debug!(base_url = %base_url, timeout_ms = config.timeout_ms, "분석 클라이언트 초기화");

        Ok(Self {
            client,
            base_url,
            timeout: config.timeout(),
        })
    }

    /// 끝 슬래시가 제거된 기본 URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn timeout_error(&self) -> CoreError {
        CoreError::Timeout {
            timeout_ms: self.timeout.as_millis() as u64,
        }
    }

    fn map_transport(&self, e: reqwest::Error) -> CoreError {
        if e.is_timeout() {
            self.timeout_error()
        } else {
            CoreError::Network(e.to_string())
        }
    }

    /// 요청 전체(전송 + 본문 수신)를 하나의 기한으로 감싼다
    async fn with_deadline<T>(
        &self,
        request: impl Future<Output = Result<T, CoreError>>,
    ) -> Result<T, CoreError> {
        tokio::time::timeout(self.timeout, request)
            .await
            .unwrap_or_else(|_| Err(self.timeout_error()))
    }

    /// 상태 코드와 본문 원문
    async fn read_response(&self, response: reqwest::Response) -> Result<(u16, String), CoreError> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.map_transport(e))?;
        if !(200..300).contains(&status) {
            warn!(status, "분석 서버 오류 응답");
        }
        Ok((status, body))
    }

    async fn upload_file(&self, image_path: &Path) -> Result<AnalysisOutcome, CoreError> {
        let format = validate_image_path(image_path)?;
        let bytes = tokio::fs::read(image_path).await?;
        let file_name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        debug!(file = %file_name, size = bytes.len(), mime = format.mime(), "이미지 업로드");

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(format.mime())
            .map_err(|e| CoreError::Internal(format!("invalid multipart MIME: {e}")))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        self.with_deadline(async {
            let response = self
                .client
                .post(self.url("/detect_emotion"))
                .multipart(form)
                .send()
                .await
                .map_err(|e| self.map_transport(e))?;
            let (status, body) = self.read_response(response).await?;
            map_emotion_response(status, &body)
        })
        .await
    }

    async fn upload_base64(&self, image_base64: &str) -> Result<AnalysisOutcome, CoreError> {
        let payload = serde_json::json!({ "image": image_base64 });

        self.with_deadline(async {
            let response = self
                .client
                .post(self.url("/detect_emotion_base64"))
                .json(&payload)
                .send()
                .await
                .map_err(|e| self.map_transport(e))?;
            let (status, body) = self.read_response(response).await?;
            map_emotion_response(status, &body)
        })
        .await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, CoreError> {
        self.with_deadline(async {
            let response = self
                .client
                .get(self.url(path))
                .send()
                .await
                .map_err(|e| self.map_transport(e))?;
            let (status, body) = self.read_response(response).await?;
            if !(200..300).contains(&status) {
                return Err(CoreError::HttpStatus { status, body });
            }
            Ok(serde_json::from_str(&body)?)
        })
        .await
    }

    /// `GET /health` 상세 (장치, 클래스 수 표시용)
    pub async fn fetch_health(&self) -> Result<HealthResponse, CoreError> {
        self.get_json("/health").await
    }

    /// `GET /` 서비스 정보
    pub async fn service_info(&self) -> Result<ServiceInfo, CoreError> {
        self.get_json("/").await
    }

    fn fold(result: Result<AnalysisOutcome, CoreError>) -> AnalysisOutcome {
        match result {
            Ok(outcome) => {
                if outcome.succeeded {
                    info!(emotion = ?outcome.emotion_label, "감정 분석 완료");
                } else {
                    info!("얼굴 미검출");
                }
                outcome
            }
            Err(e) => {
                warn!("감정 분석 실패: {e}");
                AnalysisOutcome::from_error(&e)
            }
        }
    }
}

#[async_trait]
impl EmotionAnalyzer for HttpAnalysisClient {
    async fn detect_emotion(&self, image_path: &Path) -> AnalysisOutcome {
        Self::fold(self.upload_file(image_path).await)
    }

    async fn detect_emotion_from_base64(&self, image_base64: &str) -> AnalysisOutcome {
        Self::fold(self.upload_base64(image_base64).await)
    }

    async fn check_health(&self) -> bool {
        match self.fetch_health().await {
            Ok(health) => {
                debug!(status = %health.status, model_loaded = health.model_loaded, "헬스 체크");
                health.is_healthy()
            }
            Err(e) => {
                debug!("헬스 체크 실패: {e}");
                false
            }
        }
    }
}

// ============================================================
// 테스트
// ============================================================
