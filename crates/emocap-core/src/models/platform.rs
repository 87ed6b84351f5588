//! 운영체제 계열 감지.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 캡처 어댑터 선택 기준이 되는 OS 계열
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    MacOs,
    Linux,
    Windows,
    /// 지원하지 않는 OS (원래 식별자 보존)
    Unsupported(String),
}

impl Platform {
    /// 현재 프로세스가 실행 중인 OS 계열
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// `std::env::consts::OS` 형식의 식별자에서 변환
    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" => Platform::MacOs,
            "linux" => Platform::Linux,
            "windows" => Platform::Windows,
            other => Platform::Unsupported(other.to_string()),
        }
    }

    /// 지원 플랫폼 여부
    pub fn is_supported(&self) -> bool {
        !matches!(self, Platform::Unsupported(_))
    }

    /// 로그/메시지용 이름
    pub fn name(&self) -> &str {
        match self {
            Platform::MacOs => "macos",
            Platform::Linux => "linux",
            Platform::Windows => "windows",
            Platform::Unsupported(os) => os,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_os_known_families() {
        assert_eq!(Platform::from_os("macos"), Platform::MacOs);
        assert_eq!(Platform::from_os("linux"), Platform::Linux);
        assert_eq!(Platform::from_os("windows"), Platform::Windows);
    }

    #[test]
    fn from_os_unsupported_keeps_name() {
        let platform = Platform::from_os("freebsd");
        assert!(!platform.is_supported());
        assert_eq!(platform.to_string(), "freebsd");
    }

    #[test]
    fn detect_matches_build_target() {
        let platform = Platform::detect();
        assert_eq!(platform.name(), std::env::consts::OS);
    }
}
