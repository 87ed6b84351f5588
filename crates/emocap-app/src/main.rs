//! # emocap
//!
//! 웹캠 한 프레임 캡처 + 감정 분석 CLI 진입점.
//! 설정 로드, 어댑터 생성(DI), 서브커맨드 실행을 담당한다.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use emocap_app::overrides::CliOverrides;
use emocap_app::pipeline::{CapturePipeline, PipelineReport};
use emocap_app::report;
use emocap_core::config::AppConfig;
use emocap_core::config_manager::ConfigManager;
use emocap_core::models::analysis::AnalysisOutcome;
use emocap_core::models::capture::CaptureOutcome;
use emocap_core::models::platform::Platform;
use emocap_core::ports::analyzer::EmotionAnalyzer;
use emocap_core::ports::command::CommandRunner;
use emocap_network::analysis_client::HttpAnalysisClient;
use emocap_network::image_payload::encode_file_base64;
use emocap_vision::capturer::WebcamCapturer;
use emocap_vision::command_runner::TokioCommandRunner;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// 웹캠 감정 분석 클라이언트
///
/// 기본 카메라에서 한 프레임을 캡처하여 감정 분석 서버로 전송한다.
#[derive(Parser, Debug)]
#[command(name = "emocap")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 분석 서버 URL (기본: http://localhost:8000)
    #[arg(long, short = 's', global = true)]
    server: Option<String>,

    /// 분석 요청 타임아웃 (밀리초)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// 캡처 저장 디렉토리
    #[arg(long, global = true)]
    captures_dir: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', global = true, default_value = "info")]
    log_level: String,

    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 결과를 JSON으로 출력
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// 한 프레임 캡처
    Capture,
    /// 기존 이미지 분석
    Analyze {
        /// 이미지 경로 (PNG, JPG, JPEG)
        image: PathBuf,
        /// multipart 대신 base64 JSON으로 전송
        #[arg(long)]
        base64: bool,
    },
    /// 캡처 후 분석 (기본)
    Run,
    /// 분석 서버 상태 확인
    Health,
    /// 카메라 장치 목록
    Devices,
    /// 적용된 설정 출력
    Config,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            server: self.server.clone(),
            timeout_ms: self.timeout_ms,
            captures_dir: self.captures_dir.clone(),
        }
    }
}

/// 설정 로드 (파일 + 환경변수) 후 CLI 플래그 적용
///
/// 설정 파일을 열 수 없으면 기본 설정으로 계속한다.
fn load_config(args: &Args) -> (AppConfig, Option<PathBuf>) {
    let manager = match &args.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    let (mut config, path) = match manager {
        Ok(manager) => {
            info!("설정 파일: {:?}", manager.config_path());
            (manager.get(), Some(manager.config_path().to_path_buf()))
        }
        Err(e) => {
            warn!("설정 관리자 초기화 실패, 기본 설정 사용: {e}");
            (AppConfig::default_config(), None)
        }
    };

    args.overrides().apply(&mut config);
    (config, path)
}

fn print_output<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

fn exit_code(succeeded: bool) -> ExitCode {
    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// 캡처 디렉토리는 캡처하는 명령에서만 결정한다
fn resolve_captures_dir(config: &AppConfig) -> Result<PathBuf> {
    ConfigManager::captures_dir(config).context("캡처 디렉토리를 결정할 수 없음")
}

fn build_capturer(config: &AppConfig) -> Result<WebcamCapturer, CaptureOutcome> {
    let runner: Arc<dyn CommandRunner> = Arc::new(TokioCommandRunner::new());
    let platform = Platform::detect();
    debug!(platform = %platform, "플랫폼 감지");

    WebcamCapturer::for_platform(&platform, runner, &config.capture)
        .map_err(|e| CaptureOutcome::failure(e.to_string()))
}

fn build_analyzer(config: &AppConfig) -> Result<Arc<HttpAnalysisClient>> {
    let client = HttpAnalysisClient::new(&config.analysis).context("분석 클라이언트 생성 실패")?;
    Ok(Arc::new(client))
}

fn build_pipeline(config: &AppConfig) -> Result<Result<CapturePipeline, CaptureOutcome>> {
    let analyzer = build_analyzer(config)?;
    Ok(build_capturer(config).map(|capturer| {
        CapturePipeline::new(capturer, analyzer)
            .with_retention(config.capture.max_retained_captures)
    }))
}

async fn analyze_file(
    analyzer: &HttpAnalysisClient,
    image: &Path,
    base64: bool,
) -> AnalysisOutcome {
    if !base64 {
        return analyzer.detect_emotion(image).await;
    }
    match encode_file_base64(image).await {
        Ok(encoded) => analyzer.detect_emotion_from_base64(&encoded).await,
        Err(e) => AnalysisOutcome::from_error(&e),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let log_filter = format!(
        "emocap={level},emocap_app={level},emocap_core={level},emocap_vision={level},emocap_network={level}",
        level = args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let (config, config_path) = load_config(&args);
    let command = args.command.clone().unwrap_or(Command::Run);
    debug!(?command, "명령 실행");

    match command {
        Command::Capture => {
            let captures_dir = resolve_captures_dir(&config)?;
            let outcome = match build_pipeline(&config)? {
                Ok(pipeline) => pipeline.capture(&captures_dir).await,
                Err(outcome) => outcome,
            };
            print_output(args.json, &outcome, || report::render_capture(&outcome))?;
            Ok(exit_code(outcome.succeeded))
        }

        Command::Analyze { image, base64 } => {
            let analyzer = build_analyzer(&config)?;
            let outcome = analyze_file(&analyzer, &image, base64).await;
            print_output(args.json, &outcome, || report::render_analysis(&outcome))?;
            Ok(exit_code(outcome.succeeded))
        }

        Command::Run => {
            let captures_dir = resolve_captures_dir(&config)?;
            let result = match build_pipeline(&config)? {
                Ok(pipeline) => pipeline.run(&captures_dir).await,
                Err(outcome) => PipelineReport::capture_failed(outcome),
            };
            print_output(args.json, &result, || report::render_pipeline(&result))?;
            Ok(exit_code(result.succeeded()))
        }

        Command::Health => {
            let analyzer = build_analyzer(&config)?;
            match analyzer.fetch_health().await {
                Ok(health) => {
                    if let Ok(info) = analyzer.service_info().await {
                        debug!(name = %info.name, version = %info.version, "서비스 정보");
                    }
                    print_output(args.json, &health, || report::render_health(&health))?;
                    Ok(exit_code(health.is_healthy()))
                }
                Err(e) => {
                    eprintln!("❌ Analysis server unreachable at {}: {e}", analyzer.base_url());
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Command::Devices => {
            let capturer = match build_capturer(&config) {
                Ok(capturer) => capturer,
                Err(outcome) => {
                    print_output(args.json, &outcome, || report::render_capture(&outcome))?;
                    return Ok(ExitCode::FAILURE);
                }
            };
            let frame_capturer = capturer.frame_capturer();
            let dependency = frame_capturer.check_dependency().await;
            if !dependency.available {
                eprintln!("⚠️  {}", dependency.message);
            }
            let devices = frame_capturer.list_devices().await.unwrap_or_else(|e| {
                warn!("장치 목록 조회 실패: {e}");
                Vec::new()
            });
            let platform = frame_capturer.platform().to_string();
            print_output(args.json, &devices, || {
                report::render_devices(&platform, &devices)
            })?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Config => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                let captures_dir = ConfigManager::captures_dir(&config);
                println!(
                    "{}",
                    report::render_config_paths(config_path.as_deref(), &captures_dir)
                );
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
