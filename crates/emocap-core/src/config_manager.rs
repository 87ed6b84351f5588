//! 설정 파일 관리.
//!
//! 플랫폼별 설정 디렉토리에 JSON 파일로 설정을 저장/로드한다.
//! 로드 시 `EMOCAP__<섹션>__<키>` 환경변수가 파일 값을 덮어쓴다
//! (예: `EMOCAP__ANALYSIS__BASE_URL`).

use crate::config::AppConfig;
use crate::error::CoreError;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 설정 파일 이름
const CONFIG_FILE_NAME: &str = "config.json";

/// 환경변수 오버라이드 접두사
const ENV_PREFIX: &str = "EMOCAP";

/// 캡처 이미지 하위 디렉토리 이름
const CAPTURES_DIR_NAME: &str = "captures";

/// 설정 관리자
///
/// 설정 파일의 로드/저장을 담당한다. 호출자가 소유하며 전역 상태는 없다.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// 현재 설정
    config: AppConfig,
    /// 설정 파일 경로
    config_path: PathBuf,
    /// 환경변수 접두사
    env_prefix: String,
}

impl ConfigManager {
    /// 플랫폼 기본 경로로 설정 관리자 생성
    ///
    /// 설정 파일이 없으면 기본 설정을 생성하고 저장한다.
    pub fn new() -> Result<Self, CoreError> {
        let config_path = Self::config_dir()?.join(CONFIG_FILE_NAME);
        Self::with_path(config_path)
    }

    /// 지정된 경로로 설정 관리자 생성
    pub fn with_path(config_path: PathBuf) -> Result<Self, CoreError> {
        Self::with_env_prefix(config_path, ENV_PREFIX)
    }

    fn with_env_prefix(config_path: PathBuf, env_prefix: &str) -> Result<Self, CoreError> {
        // 설정 디렉토리 생성
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    CoreError::Config(format!(
                        "failed to create config directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
                info!("설정 디렉토리 생성: {}", parent.display());
            }
        }

        // 설정 파일이 없으면 기본값으로 생성
        if !config_path.exists() {
            Self::save_to_file(&config_path, &AppConfig::default_config())?;
            info!("기본 설정 파일 생성: {}", config_path.display());
        }

        let config = Self::load_layered(&config_path, env_prefix)?;

        Ok(Self {
            config,
            config_path,
            env_prefix: env_prefix.to_string(),
        })
    }

    /// 현재 설정 반환 (복제본)
    pub fn get(&self) -> AppConfig {
        self.config.clone()
    }

    /// 설정 업데이트 및 파일 저장
    pub fn update(&mut self, new_config: AppConfig) -> Result<(), CoreError> {
        Self::save_to_file(&self.config_path, &new_config)?;
        self.config = new_config;
        debug!("설정 저장 완료: {}", self.config_path.display());
        Ok(())
    }

    /// 특정 필드만 업데이트
    pub fn update_with<F>(&mut self, updater: F) -> Result<AppConfig, CoreError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.get();
        updater(&mut config);
        self.update(config.clone())?;
        Ok(config)
    }

    /// 설정 파일 경로 반환
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// 설정 다시 로드 (파일 + 환경변수)
    pub fn reload(&mut self) -> Result<(), CoreError> {
        self.config = Self::load_layered(&self.config_path, &self.env_prefix)?;
        info!("설정 다시 로드 완료");
        Ok(())
    }

    /// 플랫폼별 설정 디렉토리 경로
    ///
    /// - macOS: `~/Library/Application Support/dev.emocap.emocap/`
    /// - Windows: `%APPDATA%\emocap\emocap\config\`
    /// - Linux: `~/.config/emocap/`
    pub fn config_dir() -> Result<PathBuf, CoreError> {
        Self::project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// 데이터 디렉토리 경로 (캡처 이미지 등)
    pub fn data_dir() -> Result<PathBuf, CoreError> {
        Self::project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// 캡처 이미지 디렉토리: 설정값 우선, 없으면 데이터 디렉토리 하위
    pub fn captures_dir(config: &AppConfig) -> Result<PathBuf, CoreError> {
        match &config.capture.captures_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::data_dir().map(|d| d.join(CAPTURES_DIR_NAME)),
        }
    }

    fn project_dirs() -> Result<ProjectDirs, CoreError> {
        ProjectDirs::from("dev", "emocap", "emocap")
            .ok_or_else(|| CoreError::Config("home directory could not be determined".to_string()))
    }

    /// 파일 + 환경변수 레이어로 설정 로드
    fn load_layered(path: &Path, env_prefix: &str) -> Result<AppConfig, CoreError> {
        let layered = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Json))
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| {
                CoreError::Config(format!("failed to read config {}: {}", path.display(), e))
            })?;

        let config: AppConfig = layered.try_deserialize().map_err(|e| {
            CoreError::Config(format!("failed to parse config {}: {}", path.display(), e))
        })?;

        debug!("설정 파일 로드 완료: {}", path.display());
        Ok(config)
    }

    /// 파일에 설정 저장
    fn save_to_file(path: &Path, config: &AppConfig) -> Result<(), CoreError> {
        let content = serde_json::to_string_pretty(config)?;

        fs::write(path, content).map_err(|e| {
            CoreError::Config(format!(
                "failed to write config {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn create_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.json");

        // 새 관리자 생성 (기본 설정 파일 생성됨)
        let manager = ConfigManager::with_env_prefix(config_path.clone(), "EMOCAP_T1").unwrap();
        assert!(config_path.exists());

        let config = manager.get();
        assert_eq!(config.analysis.base_url, "http://localhost:8000");
    }

    #[test]
    fn update_and_persist_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let mut manager =
            ConfigManager::with_env_prefix(config_path.clone(), "EMOCAP_T2").unwrap();

        manager
            .update_with(|c| {
                c.analysis.timeout_ms = 5_000;
                c.capture.max_retained_captures = Some(20);
            })
            .unwrap();

        // 새 관리자로 다시 로드
        let manager2 = ConfigManager::with_env_prefix(config_path, "EMOCAP_T2").unwrap();
        let config = manager2.get();

        assert_eq!(config.analysis.timeout_ms, 5_000);
        assert_eq!(config.capture.max_retained_captures, Some(20));
    }

    #[test]
    fn reload_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let mut manager =
            ConfigManager::with_env_prefix(config_path.clone(), "EMOCAP_T3").unwrap();

        // 파일 직접 수정
        let mut config = manager.get();
        config.capture.width = 640;
        let content = serde_json::to_string_pretty(&config).unwrap();
        fs::write(&config_path, content).unwrap();

        manager.reload().unwrap();
        assert_eq!(manager.get().capture.width, 640);
    }

    #[test]
    fn env_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        std::env::set_var("EMOCAP_T4__ANALYSIS__BASE_URL", "http://10.0.0.5:8000");
        std::env::set_var("EMOCAP_T4__ANALYSIS__TIMEOUT_MS", "1234");
        let manager = ConfigManager::with_env_prefix(config_path, "EMOCAP_T4").unwrap();
        std::env::remove_var("EMOCAP_T4__ANALYSIS__BASE_URL");
        std::env::remove_var("EMOCAP_T4__ANALYSIS__TIMEOUT_MS");

        let config = manager.get();
        assert_eq!(config.analysis.base_url, "http://10.0.0.5:8000");
        assert_eq!(config.analysis.timeout_ms, 1234);
    }

    #[test]
    fn broken_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(&config_path, "{ not json").unwrap();

        let err = ConfigManager::with_env_prefix(config_path, "EMOCAP_T5").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn captures_dir_prefers_config() {
        let mut config = AppConfig::default_config();
        config.capture.captures_dir = Some(PathBuf::from("/srv/captures"));
        assert_eq!(
            ConfigManager::captures_dir(&config).unwrap(),
            PathBuf::from("/srv/captures")
        );
    }
}
