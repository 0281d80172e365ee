use std::path::PathBuf;

/// 정규화 진행 상황을 외부로 알리는 이벤트 모델이다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeEvent {
    /// 네이티브 시나리오를 그대로 통과시켰다.
    PassThrough { index: usize, path: PathBuf },
    /// 작성용 시나리오 변환을 시작했다.
    ConversionStarted {
        index: usize,
        input: PathBuf,
        output_dir: PathBuf,
    },
    /// 변환이 끝나고 네이티브 파일을 찾았다.
    ConversionFinished { index: usize, produced: usize },
    /// 변환 결과에서 네이티브 파일을 하나도 찾지 못했다.
    EmptyConversion { index: usize, input: PathBuf },
}
