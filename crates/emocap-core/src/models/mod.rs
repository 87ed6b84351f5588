//! 도메인 모델.
//!
//! 캡처/분석 호출마다 한 번 생성되는 불변 값 레코드와
//! 분석 서버의 JSON 와이어 타입을 정의한다.

pub mod analysis;
pub mod capture;
pub mod platform;
