use crate::context::Placeholders;
use anyhow::Context;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// 시뮬레이터가 직접 실행하는 시나리오 파일 확장자이다.
pub const NATIVE_EXTENSION: &str = "xosc";

/// 파일명 비교에 사용하는 점 포함 확장자이다.
pub const NATIVE_SUFFIX: &str = ".xosc";

/// 시나리오 파일 형식을 표현한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioFormat {
    /// 변환 없이 실행 가능한 `.xosc` 파일.
    Native,
    /// 실행 전에 변환이 필요한 상위 수준 정의(YAML 등).
    Authoring,
}

impl ScenarioFormat {
    /// 경로의 확장자로 형식을 판별한다.
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(NATIVE_EXTENSION) => ScenarioFormat::Native,
            _ => ScenarioFormat::Authoring,
        }
    }
}

/// 변환 결과 디렉터리에서 네이티브 파일을 골라내는 기준이다.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NativeMatch {
    /// 파일명에 `.xosc`가 포함되면 매칭한다.
    #[default]
    Substring,
    /// 파일명이 `.xosc`로 끝나야 매칭한다.
    Suffix,
}

impl NativeMatch {
    /// 파일명이 기준에 맞는지 확인한다.
    pub fn matches(self, file_name: &str) -> bool {
        match self {
            NativeMatch::Substring => file_name.contains(NATIVE_SUFFIX),
            NativeMatch::Suffix => file_name.ends_with(NATIVE_SUFFIX),
        }
    }
}

impl<'de> Deserialize<'de> for NativeMatch {
    /// 대소문자 구분 없이 문자열 값을 받아들인다.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        match value.to_ascii_lowercase().as_str() {
            "substring" | "contains" => Ok(NativeMatch::Substring),
            "suffix" | "strict" => Ok(NativeMatch::Suffix),
            other => Err(de::Error::custom(format!(
                "알 수 없는 native_match 값: {other}"
            ))),
        }
    }
}

/// 시나리오 실행 결과에 대한 기대값이다.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Expect {
    /// 시나리오가 성공해야 한다.
    #[default]
    Success,
    /// 시나리오가 실패해야 한다.
    Failure,
    /// 결과를 판정하지 않는다.
    Ambiguous,
}

/// 워크플로 파일의 시나리오 한 줄이다.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkflowEntry {
    /// 시나리오 파일 경로. `${VAR}`와 glob 패턴을 사용할 수 있다.
    pub path: PathBuf,
    /// 기대 결과.
    #[serde(default)]
    pub expect: Expect,
    /// 시뮬레이션 스텝 시간(ms).
    #[serde(default = "default_step_time_ms")]
    pub step_time_ms: u64,
}

/// 한 번의 테스트 실행에 포함되는 시나리오 목록이다.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Workflow {
    /// 시나리오 목록.
    #[serde(alias = "Scenario", default)]
    pub scenarios: Vec<WorkflowEntry>,
}

impl Workflow {
    /// 시나리오 수를 반환한다.
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// 시나리오가 비었는지 확인한다.
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// 경로의 플레이스홀더를 치환하고 상대 경로를 `base_dir` 기준으로 바꾼다.
    ///
    /// glob 패턴이 포함된 경로는 매칭된 파일마다 한 줄로 펼친다.
    ///
    /// # 인자
    /// - `base_dir`: 상대 경로의 기준 디렉터리(보통 워크플로 파일이 있는 곳)
    /// - `vars`: 치환에 사용할 변수 저장소
    pub fn resolve_paths(&self, base_dir: &Path, vars: &Placeholders) -> anyhow::Result<Self> {
        let mut scenarios = Vec::with_capacity(self.scenarios.len());
        for entry in &self.scenarios {
            let raw = vars.expand_required(&entry.path.to_string_lossy(), "scenario.path")?;
            let raw_path = PathBuf::from(&raw);
            let relative = raw_path.is_relative();
            let path = if relative {
                base_dir.join(&raw_path)
            } else {
                raw_path
            };
            // 기준 디렉터리 이름의 메타 문자는 패턴으로 보지 않는다.
            if path.exists() || !is_glob_pattern(&raw) {
                scenarios.push(WorkflowEntry {
                    path,
                    ..entry.clone()
                });
                continue;
            }
            let pattern = if relative {
                let escaped_base = glob::Pattern::escape(&base_dir.to_string_lossy());
                PathBuf::from(escaped_base)
                    .join(&raw)
                    .to_string_lossy()
                    .to_string()
            } else {
                raw.clone()
            };
            let mut matched: Vec<PathBuf> = Vec::new();
            for found in glob::glob(&pattern).context("glob 패턴 파싱 실패")? {
                matched.push(found?);
            }
            if matched.is_empty() {
                anyhow::bail!("패턴에 해당하는 시나리오가 없습니다: {pattern}");
            }
            scenarios.extend(matched.into_iter().map(|path| WorkflowEntry {
                path,
                ..entry.clone()
            }));
        }
        Ok(Self { scenarios })
    }

    /// 정규화기에 전달할 세 개의 병렬 목록으로 분리한다.
    pub fn columns(&self) -> (Vec<PathBuf>, Vec<Expect>, Vec<u64>) {
        let paths = self.scenarios.iter().map(|s| s.path.clone()).collect();
        let expects = self.scenarios.iter().map(|s| s.expect).collect();
        let step_times = self.scenarios.iter().map(|s| s.step_time_ms).collect();
        (paths, expects, step_times)
    }
}

fn is_glob_pattern(path: &str) -> bool {
    path.contains(['*', '?', '['])
}

fn default_step_time_ms() -> u64 {
    2
}

/// YAML 파일을 읽어 Workflow로 역직렬화한다.
pub fn load_workflow_from_file(path: &Path) -> anyhow::Result<Workflow> {
    let mut file = File::open(path)
        .with_context(|| format!("워크플로 파일을 열 수 없습니다: {}", path.display()))?;
    load_workflow_from_reader(&mut file)
}

/// Reader에서 YAML을 읽어 Workflow 구조체로 파싱한다.
pub fn load_workflow_from_reader<R: Read>(reader: &mut R) -> anyhow::Result<Workflow> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    let workflow: Workflow = serde_yaml::from_str(&buf)?;
    Ok(workflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("시스템 시간이 UTC epoch 이전입니다.")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("{prefix}_{timestamp}"));
        std::fs::create_dir_all(&dir).expect("임시 디렉터리 생성 실패");
        dir
    }

    #[test]
    fn format_is_inferred_from_extension() {
        assert_eq!(ScenarioFormat::of(Path::new("/a/s1.xosc")), ScenarioFormat::Native);
        assert_eq!(ScenarioFormat::of(Path::new("/a/s2.yaml")), ScenarioFormat::Authoring);
        assert_eq!(ScenarioFormat::of(Path::new("/a/s3.xosc.bak")), ScenarioFormat::Authoring);
        assert_eq!(ScenarioFormat::of(Path::new("/a/noext")), ScenarioFormat::Authoring);
    }

    #[test]
    fn native_match_policies_differ_on_trailing_text() {
        assert!(NativeMatch::Substring.matches("foo.xosc"));
        assert!(NativeMatch::Substring.matches("foo.xosc.bak"));
        assert!(NativeMatch::Suffix.matches("foo.xosc"));
        assert!(!NativeMatch::Suffix.matches("foo.xosc.bak"));
        assert!(!NativeMatch::Substring.matches("foo.yaml"));
    }

    #[test]
    fn native_match_parses_aliases() {
        let strict: NativeMatch = serde_yaml::from_str("Strict").unwrap();
        assert_eq!(strict, NativeMatch::Suffix);
        let loose: NativeMatch = serde_yaml::from_str("substring").unwrap();
        assert_eq!(loose, NativeMatch::Substring);
        assert!(serde_yaml::from_str::<NativeMatch>("regex").is_err());
    }

    #[test]
    fn workflow_applies_defaults_and_alias() {
        let yaml = r#"
Scenario:
  - path: /a/s1.xosc
  - path: /a/s2.yaml
    expect: failure
    step_time_ms: 20
"#;
        let workflow = load_workflow_from_reader(&mut yaml.as_bytes()).expect("파싱 실패");
        assert_eq!(workflow.len(), 2);
        assert_eq!(workflow.scenarios[0].expect, Expect::Success);
        assert_eq!(workflow.scenarios[0].step_time_ms, 2);
        assert_eq!(workflow.scenarios[1].expect, Expect::Failure);

        let (paths, expects, steps) = workflow.columns();
        assert_eq!(paths, vec![PathBuf::from("/a/s1.xosc"), PathBuf::from("/a/s2.yaml")]);
        assert_eq!(expects, vec![Expect::Success, Expect::Failure]);
        assert_eq!(steps, vec![2, 20]);
    }

    #[test]
    fn resolve_paths_expands_vars_and_relative_paths() {
        let workflow = Workflow {
            scenarios: vec![
                WorkflowEntry {
                    path: PathBuf::from("${SCENARIO_DIR}/cut_in.yaml"),
                    expect: Expect::Success,
                    step_time_ms: 2,
                },
                WorkflowEntry {
                    path: PathBuf::from("local/lane_change.xosc"),
                    expect: Expect::Ambiguous,
                    step_time_ms: 5,
                },
            ],
        };
        let vars = Placeholders::new().with_var("SCENARIO_DIR", "/opt/scenarios");
        let resolved = workflow
            .resolve_paths(Path::new("/work"), &vars)
            .expect("경로 해석 실패");
        assert_eq!(resolved.scenarios[0].path, PathBuf::from("/opt/scenarios/cut_in.yaml"));
        assert_eq!(resolved.scenarios[1].path, PathBuf::from("/work/local/lane_change.xosc"));
        assert_eq!(resolved.scenarios[1].expect, Expect::Ambiguous);
    }

    #[test]
    fn resolve_paths_expands_glob_entries_in_sorted_order() {
        let dir = unique_temp_dir("workflow_glob_test");
        std::fs::write(dir.join("b.yaml"), "b").expect("파일 작성 실패");
        std::fs::write(dir.join("a.yaml"), "a").expect("파일 작성 실패");
        std::fs::write(dir.join("c.xosc"), "c").expect("파일 작성 실패");

        let workflow = Workflow {
            scenarios: vec![WorkflowEntry {
                path: PathBuf::from("*.yaml"),
                expect: Expect::Failure,
                step_time_ms: 7,
            }],
        };
        let resolved = workflow
            .resolve_paths(&dir, &Placeholders::new())
            .expect("경로 해석 실패");
        let paths: Vec<PathBuf> = resolved.scenarios.iter().map(|s| s.path.clone()).collect();
        assert_eq!(paths, vec![dir.join("a.yaml"), dir.join("b.yaml")]);
        assert!(resolved.scenarios.iter().all(|s| s.expect == Expect::Failure));
        assert!(resolved.scenarios.iter().all(|s| s.step_time_ms == 7));

        let empty = Workflow {
            scenarios: vec![WorkflowEntry {
                path: PathBuf::from("*.json"),
                expect: Expect::Success,
                step_time_ms: 2,
            }],
        };
        assert!(empty.resolve_paths(&dir, &Placeholders::new()).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    /// 대괄호가 들어간 디렉터리/파일명도 실제 경로로 해석된다.
    #[test]
    fn bracketed_paths_are_taken_literally() {
        let dir = unique_temp_dir("workflow_run[1]");
        std::fs::create_dir_all(dir.join("sub")).expect("디렉터리 생성 실패");
        std::fs::write(dir.join("cut_in.yaml"), "c").expect("파일 작성 실패");
        std::fs::write(dir.join("scenario[v2].yaml"), "v").expect("파일 작성 실패");
        std::fs::write(dir.join("sub/b.xosc"), "b").expect("파일 작성 실패");
        std::fs::write(dir.join("sub/a.xosc"), "a").expect("파일 작성 실패");

        let entry = |path: PathBuf| WorkflowEntry {
            path,
            expect: Expect::Success,
            step_time_ms: 2,
        };
        let workflow = Workflow {
            scenarios: vec![
                entry(PathBuf::from("cut_in.yaml")),
                entry(dir.join("scenario[v2].yaml")),
                entry(PathBuf::from("sub/*.xosc")),
            ],
        };
        let resolved = workflow
            .resolve_paths(&dir, &Placeholders::new())
            .expect("경로 해석 실패");
        let paths: Vec<PathBuf> = resolved.scenarios.iter().map(|s| s.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                dir.join("cut_in.yaml"),
                dir.join("scenario[v2].yaml"),
                dir.join("sub/a.xosc"),
                dir.join("sub/b.xosc"),
            ]
        );

        let _ = std::fs::remove_dir_all(&dir);
    }
}
