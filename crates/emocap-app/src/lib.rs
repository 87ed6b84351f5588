//! # emocap-app
//!
//! 캡처 → 분석 파이프라인과 CLI 보조 모듈. 바이너리(`emocap`)는 `main.rs`.

pub mod overrides;
pub mod pipeline;
pub mod report;
