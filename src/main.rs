use anyhow::Context;
use clap::Parser;
use scenario_normalizer::config::{NormalizerConfig, load_config_from_file};
use scenario_normalizer::context::Placeholders;
use scenario_normalizer::scenario::load_workflow_from_file;
use scenario_normalizer::{NativeMatch, NormalizeEvent, Normalizer};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "scenario-normalizer")]
#[command(about = "Convert authoring-format scenarios in a workflow into native .xosc scenarios", long_about = None)]
struct Cli {
    /// Normalizer config (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Workflow file listing scenarios, expects and step times
    #[arg(short, long)]
    workflow: PathBuf,

    /// Launcher root for converted output (overrides config)
    #[arg(long)]
    launcher_root: Option<PathBuf>,

    /// Only accept file names ending in .xosc when sweeping converted output
    #[arg(long, default_value_t = false)]
    strict_suffix: bool,

    /// Write the normalized workflow here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    }

    let mut config = match &cli.config {
        Some(path) => load_config_from_file(path)?,
        None => NormalizerConfig::default(),
    };
    if let Some(root) = cli.launcher_root {
        config.launcher_root = root;
    }
    if cli.strict_suffix {
        config.native_match = NativeMatch::Suffix;
    }

    let workflow = load_workflow_from_file(&cli.workflow)?;
    let base_dir = cli
        .workflow
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let workflow = workflow
        .resolve_paths(&base_dir, &Placeholders::new())
        .context("워크플로 경로 해석 실패")?;
    let (scenarios, expects, step_times) = workflow.columns();

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let normalizer = Normalizer::new(config.converter.build(), &config.launcher_root)
        .with_match_policy(config.native_match)
        .with_events(tx);
    let normalized = normalizer
        .normalize(&scenarios, &expects, &step_times)
        .await?;
    drop(normalizer);

    let mut converted = 0usize;
    let mut dropped = 0usize;
    while let Some(event) = rx.recv().await {
        match event {
            NormalizeEvent::ConversionFinished { .. } => converted += 1,
            NormalizeEvent::EmptyConversion { .. } => dropped += 1,
            _ => {}
        }
    }
    tracing::info!(
        "정규화 완료: 입력 {}개 -> 출력 {}개 (변환 {}개, 결과 없음 {}개)",
        scenarios.len(),
        normalized.len(),
        converted,
        dropped
    );

    let yaml = serde_yaml::to_string(&normalized.to_workflow())?;
    match cli.output {
        Some(path) => std::fs::write(&path, yaml)
            .with_context(|| format!("결과 파일 기록 실패: {}", path.display()))?,
        None => print!("{yaml}"),
    }
    Ok(())
}
