//! 작성용 시나리오와 네이티브(`.xosc`) 시나리오가 섞인 목록을 네이티브 시나리오
//! 목록으로 정규화한다.

pub mod config;
pub mod context;
pub mod converter;
pub mod normalizer;
pub mod scenario;

pub use config::{ConverterConfig, NormalizerConfig};
pub use converter::{CommandConverter, ScenarioConverter, SharedConverter};
pub use normalizer::{NormalizeError, NormalizeEvent, NormalizedScenarios, Normalizer};
pub use scenario::{Expect, NativeMatch, ScenarioFormat, Workflow, WorkflowEntry};
