use crate::converter::{CommandConverter, SharedConverter};
use crate::scenario::NativeMatch;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 정규화 실행 전체 설정이다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// 변환 결과와 로그를 둘 런처 루트 디렉터리.
    #[serde(default = "default_launcher_root")]
    pub launcher_root: PathBuf,
    /// 변환 결과 탐색 시 사용할 매칭 기준.
    #[serde(default)]
    pub native_match: NativeMatch,
    /// 외부 변환기 실행 설정.
    #[serde(default)]
    pub converter: ConverterConfig,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            launcher_root: default_launcher_root(),
            native_match: NativeMatch::default(),
            converter: ConverterConfig::default(),
        }
    }
}

/// 외부 시나리오 변환기 실행 설정이다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// 실행할 변환기 프로그램.
    #[serde(alias = "command", default = "default_program")]
    pub program: String,
    /// 프로그램 인자. `${INPUT}`, `${OUTPUT_DIR}`, `${LOG_PATH}`를 치환한다.
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// 추가 환경 변수.
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// 실행 전 변경할 작업 디렉터리.
    pub working_dir: Option<PathBuf>,
    /// 변환 제한 시간(초 단위).
    #[serde(default = "default_timeout")]
    pub timeout_sec: u64,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            env: HashMap::new(),
            working_dir: None,
            timeout_sec: default_timeout(),
        }
    }
}

impl ConverterConfig {
    /// 설정 값이 실행 가능한지 확인한다.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.program.trim().is_empty() {
            anyhow::bail!("converter.program이 비어 있습니다.");
        }
        if self.timeout_sec == 0 {
            anyhow::bail!("converter.timeout_sec는 1 이상이어야 합니다.");
        }
        Ok(())
    }

    /// 설정으로 명령 기반 변환기를 생성한다.
    pub fn build(&self) -> SharedConverter {
        Arc::new(CommandConverter::from_config(self)) as SharedConverter
    }
}

fn default_launcher_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_program() -> String {
    "scenario_converter".to_string()
}

fn default_args() -> Vec<String> {
    vec![
        "${INPUT}".to_string(),
        "${OUTPUT_DIR}".to_string(),
        "${LOG_PATH}".to_string(),
    ]
}

fn default_timeout() -> u64 {
    300
}

/// YAML 파일을 읽어 NormalizerConfig로 역직렬화한다.
pub fn load_config_from_file(path: &Path) -> anyhow::Result<NormalizerConfig> {
    let mut file = File::open(path)
        .with_context(|| format!("설정 파일을 열 수 없습니다: {}", path.display()))?;
    load_config_from_reader(&mut file)
}

/// Reader에서 YAML을 읽어 NormalizerConfig로 파싱한다.
pub fn load_config_from_reader<R: Read>(reader: &mut R) -> anyhow::Result<NormalizerConfig> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    let config: NormalizerConfig = serde_yaml::from_str(&buf)?;
    config.converter.validate()?;
    Ok(config)
}
