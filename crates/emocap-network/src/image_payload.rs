//! 업로드 이미지 전제조건과 인코딩.

use base64::Engine;
use emocap_core::error::CoreError;
use std::path::Path;

/// 업로드 가능한 이미지 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Png,
    Jpeg,
}

impl UploadFormat {
    /// 확장자에서 판별 (대소문자 무시)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(UploadFormat::Png),
            "jpg" | "jpeg" => Some(UploadFormat::Jpeg),
            _ => None,
        }
    }

    /// multipart 파트 MIME: 서버는 `image/*`가 아닌 파트를 거부한다
    pub fn mime(&self) -> &'static str {
        match self {
            UploadFormat::Png => "image/png",
            UploadFormat::Jpeg => "image/jpeg",
        }
    }
}

/// 파일 존재 → 확장자 순으로 검사
pub fn validate_image_path(path: &Path) -> Result<UploadFormat, CoreError> {
    if !path.is_file() {
        return Err(CoreError::FileNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    UploadFormat::from_extension(&ext).ok_or(CoreError::UnsupportedFormat(ext))
}

/// 이미지 파일 검증 후 base64(표준 알파벳, 패딩 포함)로 인코딩
pub async fn encode_file_base64(path: &Path) -> Result<String, CoreError> {
    validate_image_path(path)?;
    let bytes = tokio::fs::read(path).await?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}
