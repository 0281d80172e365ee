use futures::StreamExt;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio_util::codec::{FramedRead, LinesCodec};

/// 프로세스 파이프를 끝까지 읽어 `TAG: line` 형태의 줄 목록으로 돌려준다.
pub(super) async fn collect_lines<R>(reader: Option<R>, tag: &'static str) -> Vec<String>
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return Vec::new();
    };
    let mut collected = Vec::new();
    let mut lines = FramedRead::new(reader, LinesCodec::new());
    while let Some(line_result) = lines.next().await {
        match line_result {
            Ok(line) => {
                tracing::debug!("{tag}: {line}");
                collected.push(format!("{tag}: {line}"));
            }
            Err(err) => {
                collected.push(format!("{tag} 읽기 오류: {err}"));
                break;
            }
        }
    }
    collected
}

/// 변환 로그 파일 끝에 한 번의 변환 기록을 덧붙인다.
///
/// 같은 기본 이름을 가진 시나리오들이 하나의 로그를 공유하므로 항상 append 모드로 연다.
pub(super) async fn append_log(
    log_path: &Path,
    header: &str,
    lines: &[String],
) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .await?;
    let mut buf = String::new();
    buf.push_str(header);
    buf.push('\n');
    for line in lines {
        buf.push_str(line);
        buf.push('\n');
    }
    file.write_all(buf.as_bytes()).await?;
    file.flush().await
}

/// 경로 정보를 보기 좋게 변환한다.
pub(super) fn display_path(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
