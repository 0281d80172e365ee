/// 시나리오 정규화 중 발생 가능한 오류를 표현한다.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// 세 입력 목록의 길이가 서로 다른 경우이다.
    #[error(
        "입력 목록 길이가 일치하지 않습니다: scenarios={scenarios}, expects={expects}, step_times={step_times}"
    )]
    LengthMismatch {
        scenarios: usize,
        expects: usize,
        step_times: usize,
    },
    /// 변환기에서 올라온 오류이다.
    #[error(transparent)]
    Convert(anyhow::Error),
    /// 변환 결과 디렉터리 탐색 중 발생한 오류이다.
    #[error("변환 결과 탐색 실패: {0}")]
    Scan(#[from] walkdir::Error),
}
