//! # emocap-network
//!
//! 감정 분석 서버 HTTP 어댑터.
//! `EmotionAnalyzer` 포트를 reqwest로 구현한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use emocap_core::config::AnalysisClientConfig;
//! use emocap_network::analysis_client::HttpAnalysisClient;
//!
//! let client = HttpAnalysisClient::new(&AnalysisClientConfig::default())?;
//! let outcome = client.detect_emotion(Path::new("face.png")).await;
//! ```

pub mod analysis_client;
pub mod image_payload;
