use std::path::{Path, PathBuf};

/// 런처 루트 아래 변환 결과가 놓이는 상대 경로이다.
const CONVERTED_ROOT: &str = "test/scenario/converted";

/// 변환 로그 파일 이름이다.
const LOG_FILE_NAME: &str = "converted.log";

/// 작성용 시나리오 하나에 대한 변환 출력 위치이다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPaths {
    /// 변환 결과를 쓸 디렉터리.
    pub output_dir: PathBuf,
    /// 변환 로그 파일 경로.
    pub log_path: PathBuf,
}

/// 런처 루트, 시나리오 기본 이름, 입력 인덱스로 출력 위치를 계산한다.
///
/// 결과는 `<launcher_root>/test/scenario/converted/<stem>/<stem>-<index>`이고, 로그는
/// 그 상위 디렉터리의 `converted.log`이다. 기본 이름이 같은 시나리오끼리 결과가
/// 섞이지 않도록 인덱스를 디렉터리 이름에 넣는다.
pub fn conversion_paths(launcher_root: &Path, scenario: &Path, index: usize) -> ConversionPaths {
    let stem = scenario
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let base_dir = launcher_root.join(CONVERTED_ROOT).join(&stem);
    let output_dir = base_dir.join(format!("{stem}-{index}"));
    let log_path = base_dir.join(LOG_FILE_NAME);
    ConversionPaths {
        output_dir,
        log_path,
    }
}
