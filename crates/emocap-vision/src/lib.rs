//! # emocap-vision
//!
//! 웹캠 단일 프레임 캡처 크레이트.
//! 외부 캡처 도구(ffmpeg) 의존성 확인, OS별 명령 구성, 폴백 체인 실행,
//! 출력 파일 검증, 캡처 보관 정리를 담당한다.
//!
//! ## 구조
//!
//! - [`capturer`]: `WebcamCapturer` 캡처 오케스트레이션 (공개 진입점)
//! - [`platform`]: `FrameCapturer` 플랫폼 어댑터 + 팩토리
//! - [`attempts`]: 순서 있는 캡처 시도 목록 실행기
//! - [`install_hint`]: 설치 안내 문구 생성 (Linux 배포판 감지)
//! - [`command_runner`]: `tokio::process` 기반 `CommandRunner`
//! - `scripted`: 테스트용 스크립트 명령 실행기 (`test-support` feature)
//! - [`retention`]: 오래된 캡처 정리

pub mod attempts;
pub mod capturer;
pub mod command_runner;
pub mod install_hint;
pub mod platform;
pub mod retention;
#[cfg(any(test, feature = "test-support"))]
pub mod scripted;
