//! 캡처 파일 보관 정리.
//!
//! 캡처 파일명은 UTC 타임스탬프라 이름순이 곧 시간순이다.

use emocap_core::error::CoreError;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::capturer::CAPTURE_FILE_PREFIX;

/// `dir`의 `capture-*.png` 중 최신 `keep`개만 남기고 삭제. 삭제한 경로를 반환한다.
///
/// 개별 파일 삭제 실패는 경고만 남기고 계속 진행한다.
pub fn prune_captures(dir: &Path, keep: usize) -> Result<Vec<PathBuf>, CoreError> {
    let pattern = format!(
        "{}/{CAPTURE_FILE_PREFIX}*.png",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let entries =
        glob::glob(&pattern).map_err(|e| CoreError::Internal(format!("glob pattern: {e}")))?;

    let mut captures: Vec<PathBuf> = entries.flatten().filter(|p| p.is_file()).collect();
    captures.sort();

    if captures.len() <= keep {
        debug!(count = captures.len(), keep, "정리할 캡처 없음");
        return Ok(Vec::new());
    }

    let excess = captures.len() - keep;
    let mut removed = Vec::with_capacity(excess);
    for path in captures.into_iter().take(excess) {
        match std::fs::remove_file(&path) {
            Ok(()) => removed.push(path),
            Err(e) => warn!(path = %path.display(), "캡처 삭제 실패: {e}"),
        }
    }

    info!(removed = removed.len(), keep, "오래된 캡처 정리");
    Ok(removed)
}
