//! CLI 플래그 → 설정 오버라이드.
//!
//! 우선순위: 기본값 < 설정 파일 < `EMOCAP__*` 환경변수 < CLI 플래그

use emocap_core::config::AppConfig;
use std::path::PathBuf;

/// 설정을 덮어쓰는 CLI 플래그 모음
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub server: Option<String>,
    pub timeout_ms: Option<u64>,
    pub captures_dir: Option<PathBuf>,
}

impl CliOverrides {
    /// 지정된 값만 덮어쓴다
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(server) = &self.server {
            config.analysis.base_url = server.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.analysis.timeout_ms = timeout_ms;
        }
        if let Some(dir) = &self.captures_dir {
            config.capture.captures_dir = Some(dir.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_overrides_keep_config() {
        let mut config = AppConfig::default_config();
        CliOverrides::default().apply(&mut config);
        assert_eq!(config, AppConfig::default_config());
    }

    #[test]
    fn flags_replace_values() {
        let mut config = AppConfig::default_config();
        CliOverrides {
            server: Some("http://gpu-box:9000".to_string()),
            timeout_ms: Some(5000),
            captures_dir: Some(PathBuf::from("/tmp/caps")),
        }
        .apply(&mut config);

        assert_eq!(config.analysis.base_url, "http://gpu-box:9000");
        assert_eq!(config.analysis.timeout_ms, 5000);
        assert_eq!(config.capture.captures_dir, Some(PathBuf::from("/tmp/caps")));
    }
}
