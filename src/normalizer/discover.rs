use super::error::NormalizeError;
use crate::scenario::NativeMatch;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 디렉터리를 재귀 탐색해 네이티브 시나리오 파일 목록을 모은다.
///
/// 디렉터리마다 파일명 순으로 정렬해 탐색하므로 결과 순서가 실행마다 같다.
/// 디렉터리가 없으면 빈 목록을 반환한다.
///
/// # 인자
/// - `directory`: 탐색을 시작할 변환 결과 디렉터리
/// - `policy`: 파일명 매칭 기준
pub fn discover_native_files(
    directory: &Path,
    policy: NativeMatch,
) -> Result<Vec<PathBuf>, NormalizeError> {
    if !directory.exists() {
        return Ok(Vec::new());
    }
    let mut found = Vec::new();
    for entry in WalkDir::new(directory).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        if policy.matches(&entry.file_name().to_string_lossy()) {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}
