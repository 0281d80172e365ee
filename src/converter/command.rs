use super::ScenarioConverter;
use super::utils::{append_log, collect_lines, display_path};
use crate::config::ConverterConfig;
use crate::context::Placeholders;
use anyhow::Context;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// 외부 변환기 프로그램을 실행하는 ScenarioConverter 구현이다.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    /// 실행할 프로그램.
    program: String,
    /// 치환 전 인자 템플릿.
    args: Vec<String>,
    /// 치환 전 환경 변수 템플릿.
    env: HashMap<String, String>,
    /// 작업 디렉터리.
    working_dir: Option<PathBuf>,
    /// 변환 최대 대기 시간.
    timeout: Duration,
}

impl CommandConverter {
    /// 기본 인자(`${INPUT} ${OUTPUT_DIR} ${LOG_PATH}`)로 변환기를 만든다.
    pub fn new(program: impl Into<String>) -> Self {
        let defaults = ConverterConfig::default();
        Self {
            program: program.into(),
            args: defaults.args,
            env: HashMap::new(),
            working_dir: None,
            timeout: Duration::from_secs(defaults.timeout_sec),
        }
    }

    /// 설정 값으로 변환기를 만든다.
    ///
    /// `load_config_from_reader`는 `timeout_sec: 0`을 거부하지만, 직접 만든 설정의 0은
    /// 1초로 올린다.
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            env: config.env.clone(),
            working_dir: config.working_dir.clone(),
            timeout: Duration::from_secs(config.timeout_sec.max(1)),
        }
    }

    /// 인자 템플릿을 교체한다.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// 제한 시간을 교체한다.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ScenarioConverter for CommandConverter {
    /// 변환기를 실행하고 표준 출력/에러를 로그 파일에 남긴다.
    ///
    /// # 반환값
    /// 종료 코드가 0이면 `Ok(())`, 실행 실패나 비정상 종료, 시간 초과 시 에러를 반환한다.
    async fn convert(
        &self,
        input: &Path,
        output_dir: &Path,
        log_path: &Path,
    ) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .with_context(|| format!("출력 디렉터리 생성 실패: {}", output_dir.display()))?;
        if let Some(parent) = log_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("로그 디렉터리 생성 실패: {}", parent.display()))?;
        }

        let vars = Placeholders::new()
            .with_var("INPUT", display_path(input))
            .with_var("OUTPUT_DIR", display_path(output_dir))
            .with_var("LOG_PATH", display_path(log_path));
        let args = self
            .args
            .iter()
            .map(|arg| vars.expand_required(arg, "converter.args"))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let mut env_map = HashMap::new();
        for (key, value) in &self.env {
            env_map.insert(key.clone(), vars.expand_required(value, "converter.env")?);
        }

        let mut command = Command::new(&self.program);
        command.args(&args);
        if !env_map.is_empty() {
            command.envs(&env_map);
        }
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        command.kill_on_drop(true);

        tracing::info!(
            "시나리오 변환 시작: {} -> {}",
            input.display(),
            output_dir.display()
        );
        let mut child = command
            .spawn()
            .with_context(|| format!("변환기 실행 실패: {} {}", self.program, args.join(" ")))?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let run = async {
            tokio::join!(
                collect_lines(stdout, "STDOUT"),
                collect_lines(stderr, "STDERR"),
                child.wait()
            )
        };
        let outcome = timeout(self.timeout, run).await;
        let Ok((out_lines, err_lines, status)) = outcome else {
            let _ = child.start_kill();
            let message = format!(
                "변환 시간 초과({}초): {}",
                self.timeout.as_secs(),
                input.display()
            );
            let header = format!("== {} -> {} (timeout)", input.display(), output_dir.display());
            append_log(log_path, &header, std::slice::from_ref(&message))
                .await
                .with_context(|| format!("변환 로그 기록 실패: {}", log_path.display()))?;
            return Err(anyhow::anyhow!(message));
        };
        let status = status.with_context(|| "변환기 프로세스 대기 실패".to_string())?;

        let header = format!(
            "== {} -> {} ({status})",
            input.display(),
            output_dir.display()
        );
        let mut lines = out_lines;
        lines.extend(err_lines);
        append_log(log_path, &header, &lines)
            .await
            .with_context(|| format!("변환 로그 기록 실패: {}", log_path.display()))?;

        if status.success() {
            Ok(())
        } else {
            Err(anyhow::anyhow!(format!(
                "변환기 종료 코드: {status} ({})",
                input.display()
            )))
        }
    }
}
