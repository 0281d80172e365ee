mod discover;
mod error;
mod events;
mod paths;

pub use discover::discover_native_files;
pub use error::NormalizeError;
pub use events::NormalizeEvent;
pub use paths::{ConversionPaths, conversion_paths};

use crate::converter::SharedConverter;
use crate::scenario::{Expect, NativeMatch, ScenarioFormat, Workflow, WorkflowEntry};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedSender;

/// 정규화 결과인 세 개의 병렬 목록이다. 세 목록의 길이는 항상 같다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedScenarios<E> {
    /// 네이티브 시나리오 경로 목록.
    pub scenarios: Vec<PathBuf>,
    /// 각 시나리오의 기대값.
    pub expects: Vec<E>,
    /// 각 시나리오의 스텝 시간(ms).
    pub step_times_ms: Vec<u64>,
}

impl<E> NormalizedScenarios<E> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            scenarios: Vec::with_capacity(capacity),
            expects: Vec::with_capacity(capacity),
            step_times_ms: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, scenario: PathBuf, expect: E, step_time_ms: u64) {
        self.scenarios.push(scenario);
        self.expects.push(expect);
        self.step_times_ms.push(step_time_ms);
    }

    /// 결과 행 수를 반환한다.
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// 결과가 비었는지 확인한다.
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// 세 목록을 튜플로 분해한다.
    pub fn into_parts(self) -> (Vec<PathBuf>, Vec<E>, Vec<u64>) {
        (self.scenarios, self.expects, self.step_times_ms)
    }
}

impl NormalizedScenarios<Expect> {
    /// 정규화 결과를 다시 워크플로 형태로 묶는다.
    pub fn to_workflow(&self) -> Workflow {
        let scenarios = self
            .scenarios
            .iter()
            .zip(&self.expects)
            .zip(&self.step_times_ms)
            .map(|((path, expect), step_time_ms)| WorkflowEntry {
                path: path.clone(),
                expect: *expect,
                step_time_ms: *step_time_ms,
            })
            .collect();
        Workflow { scenarios }
    }
}

/// 작성용 시나리오를 변환해 네이티브 시나리오 목록으로 펼치는 정규화기이다.
#[derive(Clone)]
pub struct Normalizer {
    /// 외부 변환기.
    converter: SharedConverter,
    /// 변환 결과를 둘 런처 루트.
    launcher_root: PathBuf,
    /// 변환 결과 매칭 기준.
    match_policy: NativeMatch,
    /// 진행 이벤트 송신자.
    sender: Option<UnboundedSender<NormalizeEvent>>,
}

impl Normalizer {
    /// 변환기와 런처 루트로 정규화기를 만든다.
    pub fn new(converter: SharedConverter, launcher_root: impl Into<PathBuf>) -> Self {
        Self {
            converter,
            launcher_root: launcher_root.into(),
            match_policy: NativeMatch::default(),
            sender: None,
        }
    }

    /// 변환 결과 매칭 기준을 지정한다.
    pub fn with_match_policy(mut self, policy: NativeMatch) -> Self {
        self.match_policy = policy;
        self
    }

    /// 진행 이벤트를 받을 채널을 연결한다.
    pub fn with_events(mut self, sender: UnboundedSender<NormalizeEvent>) -> Self {
        self.sender = Some(sender);
        self
    }

    /// 런처 루트를 반환한다.
    pub fn launcher_root(&self) -> &Path {
        &self.launcher_root
    }

    /// 시나리오 목록을 네이티브 형식 목록으로 정규화한다.
    ///
    /// 네이티브 시나리오는 그대로 통과시키고, 작성용 시나리오는 변환기로 변환한 뒤
    /// 찾은 파일마다 한 행씩 추가하며 기대값과 스텝 시간을 복사한다. 입력 순서대로
    /// 하나씩 처리한다.
    ///
    /// # 인자
    /// - `scenarios`: 시나리오 경로 목록
    /// - `expects`: 시나리오별 기대값
    /// - `step_times_ms`: 시나리오별 스텝 시간(ms)
    ///
    /// # 반환값
    /// 세 목록의 길이가 다르면 변환기를 호출하기 전에 `LengthMismatch`를 반환한다.
    /// 변환기 오류는 그대로 전달된다.
    pub async fn normalize<E: Clone>(
        &self,
        scenarios: &[PathBuf],
        expects: &[E],
        step_times_ms: &[u64],
    ) -> Result<NormalizedScenarios<E>, NormalizeError> {
        if scenarios.len() != expects.len() || scenarios.len() != step_times_ms.len() {
            return Err(NormalizeError::LengthMismatch {
                scenarios: scenarios.len(),
                expects: expects.len(),
                step_times: step_times_ms.len(),
            });
        }

        let mut normalized = NormalizedScenarios::with_capacity(scenarios.len());
        for (index, scenario) in scenarios.iter().enumerate() {
            let expect = &expects[index];
            let step_time_ms = step_times_ms[index];
            if ScenarioFormat::of(scenario) == ScenarioFormat::Native {
                self.emit(NormalizeEvent::PassThrough {
                    index,
                    path: scenario.clone(),
                });
                normalized.push(scenario.clone(), expect.clone(), step_time_ms);
                continue;
            }

            let output_dir = self.convert_one(index, scenario).await?;
            let converted = discover_native_files(&output_dir, self.match_policy)?;
            if converted.is_empty() {
                tracing::warn!(
                    "변환 결과에 네이티브 시나리오가 없습니다: {} ({})",
                    scenario.display(),
                    output_dir.display()
                );
                self.emit(NormalizeEvent::EmptyConversion {
                    index,
                    input: scenario.clone(),
                });
                continue;
            }
            tracing::info!(
                "{} 변환 완료: {}개 파일",
                scenario.display(),
                converted.len()
            );
            self.emit(NormalizeEvent::ConversionFinished {
                index,
                produced: converted.len(),
            });
            for path in converted {
                normalized.push(path, expect.clone(), step_time_ms);
            }
        }
        Ok(normalized)
    }

    /// 작성용 시나리오 하나를 변환하고 출력 디렉터리를 반환한다.
    pub async fn convert_one(
        &self,
        index: usize,
        scenario: &Path,
    ) -> Result<PathBuf, NormalizeError> {
        let ConversionPaths {
            output_dir,
            log_path,
        } = conversion_paths(&self.launcher_root, scenario, index);
        tracing::info!(
            "[{index}] {} 변환 -> {}",
            scenario.display(),
            output_dir.display()
        );
        self.emit(NormalizeEvent::ConversionStarted {
            index,
            input: scenario.to_path_buf(),
            output_dir: output_dir.clone(),
        });
        self.converter
            .convert(scenario, &output_dir, &log_path)
            .await
            .map_err(NormalizeError::Convert)?;
        Ok(output_dir)
    }

    /// 이벤트를 전송한다. 수신 측이 닫혀 있어도 정규화는 계속된다.
    fn emit(&self, event: NormalizeEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }
}
