//! 감정 분석 모델.
//!
//! 분석 서버의 응답 와이어 타입(`EmotionResponse`, `HealthResponse`,
//! `ServiceInfo`)과 호출자에게 돌려주는 `AnalysisOutcome`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::CoreError;

/// `POST /detect_emotion`, `POST /detect_emotion_base64` 응답 본문
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionResponse {
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub valence: Option<f64>,
    #[serde(default)]
    pub arousal: Option<f64>,
    #[serde(default)]
    pub emotion_probabilities: Option<BTreeMap<String, f64>>,
    pub face_detected: bool,
    /// `[x1, y1, x2, y2]`
    #[serde(default)]
    pub face_bbox: Option<[i32; 4]>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /health` 응답 본문
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
    /// 추론 장치 (예: "cuda:0", "cpu")
    #[serde(default)]
    pub device: Option<String>,
    /// 감정 클래스 수 (5 또는 8)
    #[serde(default)]
    pub n_classes: Option<u32>,
}

impl HealthResponse {
    /// `status == "healthy"` 이고 모델이 로드된 상태
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy" && self.model_loaded
    }
}

/// `GET /` 서비스 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    /// 경로 → 설명
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}

/// 분석 서버의 감정 클래스 표
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emotion {
    Neutral,
    Happy,
    Sad,
    Surprise,
    Fear,
    Disgust,
    Anger,
    Contempt,
}

impl Emotion {
    /// 서버 클래스 인덱스 순서
    pub const ALL: [Emotion; 8] = [
        Emotion::Neutral,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Surprise,
        Emotion::Fear,
        Emotion::Disgust,
        Emotion::Anger,
        Emotion::Contempt,
    ];

    /// 라벨 문자열에서 변환 (대소문자 무시). 표에 없으면 `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(label.trim()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Neutral => "Neutral",
            Emotion::Happy => "Happy",
            Emotion::Sad => "Sad",
            Emotion::Surprise => "Surprise",
            Emotion::Fear => "Fear",
            Emotion::Disgust => "Disgust",
            Emotion::Anger => "Anger",
            Emotion::Contempt => "Contempt",
        }
    }

    /// 부정적 감정 여부 (리포트 표시용)
    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            Emotion::Sad | Emotion::Fear | Emotion::Disgust | Emotion::Anger | Emotion::Contempt
        )
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 감정 분석 결과
///
/// 불변식:
/// - `face_detected == Some(false)` 이면 `succeeded == false`, `error_message` 설정
/// - `succeeded == true` 이면 `face_detected == Some(true)` 이고
///   `emotion_label`/`valence`/`arousal` 모두 존재
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub succeeded: bool,
    pub emotion_label: Option<String>,
    pub valence: Option<f64>,
    pub arousal: Option<f64>,
    pub emotion_probabilities: Option<BTreeMap<String, f64>>,
    pub face_detected: Option<bool>,
    pub face_bbox: Option<[i32; 4]>,
    pub message: Option<String>,
    pub error_message: Option<String>,
}

impl AnalysisOutcome {
    /// 일반 실패 (전송/전제조건/타임아웃)
    pub fn failure(error_message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            error_message: Some(error_message.into()),
            ..Default::default()
        }
    }

    /// `CoreError`를 실패 레코드로 변환
    pub fn from_error(error: &CoreError) -> Self {
        Self::failure(error.to_string())
    }

    /// 얼굴 미검출: 서버 메시지가 없으면 기본 문구 사용
    pub fn no_face(server_message: Option<String>) -> Self {
        let error = CoreError::NoFaceDetected.to_string();
        Self {
            succeeded: false,
            face_detected: Some(false),
            message: Some(server_message.unwrap_or_else(|| error.clone())),
            error_message: Some(error),
            ..Default::default()
        }
    }

    /// 2xx 응답 본문을 결과로 매핑
    ///
    /// 얼굴이 검출됐다고 하면서 라벨/valence/arousal 중 하나라도 빠지면
    /// 형식 오류로 취급한다.
    pub fn from_response(response: EmotionResponse) -> Result<Self, CoreError> {
        if !response.face_detected {
            return Ok(Self::no_face(response.message));
        }

        let (Some(label), Some(valence), Some(arousal)) =
            (response.emotion, response.valence, response.arousal)
        else {
            return Err(CoreError::InvalidResponse(
                "face_detected is true but emotion, valence or arousal is missing".to_string(),
            ));
        };

        Ok(Self {
            succeeded: true,
            emotion_label: Some(label),
            valence: Some(valence),
            arousal: Some(arousal),
            emotion_probabilities: response.emotion_probabilities,
            face_detected: Some(true),
            face_bbox: response.face_bbox,
            message: response.message,
            error_message: None,
        })
    }

    /// 라벨이 알려진 클래스면 변환
    pub fn emotion(&self) -> Option<Emotion> {
        self.emotion_label.as_deref().and_then(Emotion::from_label)
    }

    /// 확률 내림차순 (라벨, 확률) 목록
    pub fn ranked_probabilities(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .emotion_probabilities
            .iter()
            .flatten()
            .map(|(label, p)| (label.as_str(), *p))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_response() -> EmotionResponse {
        EmotionResponse {
            emotion: Some("Happy".to_string()),
            valence: Some(0.8),
            arousal: Some(0.4),
            emotion_probabilities: Some(BTreeMap::from([
                ("Happy".to_string(), 0.7),
                ("Neutral".to_string(), 0.2),
                ("Sad".to_string(), 0.1),
            ])),
            face_detected: true,
            face_bbox: Some([1, 2, 3, 4]),
            message: None,
        }
    }

    #[test]
    fn face_detected_copies_fields() {
        let outcome = AnalysisOutcome::from_response(face_response()).unwrap();
        assert!(outcome.succeeded);
        assert_eq!(outcome.face_detected, Some(true));
        assert_eq!(outcome.emotion_label.as_deref(), Some("Happy"));
        assert_eq!(outcome.valence, Some(0.8));
        assert_eq!(outcome.arousal, Some(0.4));
        assert_eq!(outcome.face_bbox, Some([1, 2, 3, 4]));
        assert!(outcome.error_message.is_none());
        assert_eq!(outcome.emotion(), Some(Emotion::Happy));
    }

    #[test]
    fn absent_optional_fields_stay_unset() {
        let mut response = face_response();
        response.emotion_probabilities = None;
        response.face_bbox = None;
        let outcome = AnalysisOutcome::from_response(response).unwrap();
        assert!(outcome.emotion_probabilities.is_none());
        assert!(outcome.face_bbox.is_none());
    }

    #[test]
    fn no_face_uses_server_message() {
        let json = r#"{"face_detected": false, "message": "no face"}"#;
        let response: EmotionResponse = serde_json::from_str(json).unwrap();
        let outcome = AnalysisOutcome::from_response(response).unwrap();
        assert!(!outcome.succeeded);
        assert_eq!(outcome.face_detected, Some(false));
        assert_eq!(outcome.message.as_deref(), Some("no face"));
        assert_eq!(outcome.error_message.as_deref(), Some("No face detected"));
    }

    #[test]
    fn no_face_default_message() {
        let outcome = AnalysisOutcome::no_face(None);
        assert_eq!(outcome.message.as_deref(), Some("No face detected"));
    }

    #[test]
    fn face_without_label_is_invalid() {
        let mut response = face_response();
        response.valence = None;
        let err = AnalysisOutcome::from_response(response).unwrap_err();
        assert!(matches!(err, CoreError::InvalidResponse(_)));
    }

    #[test]
    fn ranked_probabilities_descending() {
        let outcome = AnalysisOutcome::from_response(face_response()).unwrap();
        let ranked = outcome.ranked_probabilities();
        assert_eq!(ranked[0].0, "Happy");
        assert_eq!(ranked[2].0, "Sad");
    }

    #[test]
    fn emotion_from_label_case_insensitive() {
        assert_eq!(Emotion::from_label("anger"), Some(Emotion::Anger));
        assert_eq!(Emotion::from_label(" Contempt "), Some(Emotion::Contempt));
        assert_eq!(Emotion::from_label("Bored"), None);
        assert!(Emotion::Fear.is_negative());
        assert!(!Emotion::Surprise.is_negative());
    }

    #[test]
    fn health_requires_status_and_model() {
        let healthy: HealthResponse =
            serde_json::from_str(r#"{"status":"healthy","model_loaded":true,"device":"cpu","n_classes":8}"#)
                .unwrap();
        assert!(healthy.is_healthy());
        assert_eq!(healthy.n_classes, Some(8));

        let no_model: HealthResponse = serde_json::from_str(r#"{"status":"healthy"}"#).unwrap();
        assert!(!no_model.is_healthy());
    }
}
