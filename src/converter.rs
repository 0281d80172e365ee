mod command;
mod utils;

pub use command::CommandConverter;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// ScenarioConverter는 작성용 시나리오를 네이티브 형식으로 바꾸는 외부 변환기 계층을 정의한다.
///
/// 구현체는 `output_dir`(필요하면 상위 디렉터리 포함)를 만들고, 그 아래 어디든
/// 0개 이상의 `.xosc` 파일을 쓸 수 있으며, `log_path`에 로그를 남겨야 한다.
#[async_trait]
pub trait ScenarioConverter: Send + Sync {
    /// `input` 시나리오를 변환해 `output_dir` 아래에 결과를 쓴다.
    async fn convert(&self, input: &Path, output_dir: &Path, log_path: &Path)
    -> anyhow::Result<()>;
}

/// ScenarioConverter를 공유하기 위한 Arc 타입 별칭이다.
pub type SharedConverter = Arc<dyn ScenarioConverter>;
