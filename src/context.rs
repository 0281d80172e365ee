use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z0-9_]+)\}").expect("정규식 컴파일 실패"));

/// `${VAR}` 치환에 사용할 변수 저장소이다.
#[derive(Debug, Default, Clone)]
pub struct Placeholders {
    /// 문자열 기반 변수 저장소이다.
    vars: HashMap<String, String>,
}

impl Placeholders {
    /// 비어 있는 변수 저장소를 생성한다.
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    /// 변수 값을 설정한다.
    ///
    /// # 매개변수
    /// - `key`: 저장할 변수명.
    /// - `value`: 저장할 문자열 값.
    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// 변수 값을 설정한 자신을 반환한다.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_var(key, value);
        self
    }

    /// 변수 값을 조회한다.
    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|s| s.as_str())
    }

    /// `${VAR}` 패턴을 실제 값으로 치환한다.
    ///
    /// 저장소에 없는 변수는 환경 변수에서 찾는다.
    ///
    /// # 반환값
    /// 모든 플레이스홀더가 치환되면 결과 문자열을, 하나라도 남으면 에러를 반환한다.
    pub fn expand(&self, template: &str) -> anyhow::Result<String> {
        let mut missing: Vec<String> = Vec::new();
        let result = PLACEHOLDER.replace_all(template, |caps: &regex::Captures| {
            let key = &caps[1];
            if let Some(val) = self.get_var(key) {
                return val.to_string();
            }
            if let Ok(env_val) = std::env::var(key) {
                return env_val;
            }
            missing.push(key.to_string());
            format!("${{{key}}}")
        });
        if !missing.is_empty() {
            anyhow::bail!("플레이스홀더 치환 실패: {} ({})", result, missing.join(", "));
        }
        Ok(result.into_owned())
    }

    /// `template`을 치환하되 실패 시 필드명을 포함한 오류를 반환한다.
    pub fn expand_required(&self, template: &str, field: &str) -> anyhow::Result<String> {
        self.expand(template)
            .with_context(|| format!("{field} 필드의 플레이스홀더를 치환할 수 없습니다."))
    }
}
