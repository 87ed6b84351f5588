//! 캡처 → 분석 파이프라인 통합 테스트.
//!
//! 스크립트 명령 실행기(가짜 ffmpeg) + mockito 분석 서버.

use emocap_app::pipeline::CapturePipeline;
use emocap_core::config::{AnalysisClientConfig, AppConfig, CaptureConfig};
use emocap_core::ports::command::{CommandOutput, CommandSpec};
use emocap_network::analysis_client::HttpAnalysisClient;
use emocap_vision::capturer::WebcamCapturer;
use emocap_vision::platform::{LinuxCapturer, MacOsCapturer};
use emocap_vision::scripted::ScriptedCommandRunner;
use std::sync::Arc;

fn is_ffmpeg_capture(c: &CommandSpec) -> bool {
    c.program == "ffmpeg" && c.args.iter().any(|a| a == "-frames:v")
}

fn analyzer(url: &str) -> Arc<HttpAnalysisClient> {
    Arc::new(HttpAnalysisClient::new(&AnalysisClientConfig::new(url, 5000)).unwrap())
}

#[tokio::test]
async fn capture_then_analyze() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/detect_emotion")
        .match_body(mockito::Matcher::Regex(r#"filename="capture-.*\.png""#.to_string()))
        .with_status(200)
        .with_body(
            r#"{"emotion":"Surprise","valence":0.1,"arousal":0.7,"face_detected":true}"#,
        )
        .create_async()
        .await;

    let out = tempfile::tempdir().unwrap();
    let runner = Arc::new(
        ScriptedCommandRunner::new()
            .with_installed("ffmpeg")
            .produce_file_when(is_ffmpeg_capture),
    );
    let capturer = WebcamCapturer::new(Arc::new(MacOsCapturer::new(
        runner.clone(),
        CaptureConfig::default(),
    )));

    let report = CapturePipeline::new(capturer, analyzer(&server.url()))
        .run(out.path())
        .await;

    assert!(report.succeeded(), "{report:?}");
    let analysis = report.analysis.unwrap();
    assert_eq!(analysis.emotion_label.as_deref(), Some("Surprise"));
    assert!(analysis.emotion_probabilities.is_none());
    assert!(report.capture.path().unwrap().starts_with(out.path()));
    mock.assert_async().await;
}

#[tokio::test]
async fn linux_fallback_capture_is_analyzed() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/detect_emotion")
        .with_status(200)
        .with_body(r#"{"face_detected":false}"#)
        .create_async()
        .await;

    let dev = tempfile::tempdir().unwrap();
    std::fs::write(dev.path().join("video2"), b"").unwrap();
    let out = tempfile::tempdir().unwrap();
    let runner = Arc::new(
        ScriptedCommandRunner::new()
            .with_installed("ffmpeg")
            .respond_when(
                |c| c.program == "ffmpeg" && c.args.iter().any(|a| a == "1280x720"),
                CommandOutput {
                    success: false,
                    code: Some(1),
                    stdout: String::new(),
                    stderr: "Device or resource busy".to_string(),
                },
            )
            .produce_file_when(|c| c.program == "fswebcam"),
    );
    let adapter = LinuxCapturer::new(runner.clone(), CaptureConfig::default())
        .with_dev_dir(dev.path());

    let pipeline = CapturePipeline::new(
        WebcamCapturer::new(Arc::new(adapter)),
        analyzer(&server.url()),
    );
    let report = pipeline.run(out.path()).await;

    assert!(report.capture.succeeded, "{:?}", report.capture);
    assert_eq!(runner.calls_to("fswebcam").len(), 1);
    assert!(runner.calls_to("streamer").is_empty());

    let analysis = report.analysis.unwrap();
    assert!(!analysis.succeeded);
    assert_eq!(analysis.error_message.as_deref(), Some("No face detected"));
    mock.assert_async().await;
}

#[tokio::test]
async fn missing_ffmpeg_sends_nothing() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/detect_emotion")
        .expect(0)
        .create_async()
        .await;

    let out = tempfile::tempdir().unwrap();
    let runner = Arc::new(ScriptedCommandRunner::new());
    let capturer = WebcamCapturer::new(Arc::new(MacOsCapturer::new(
        runner.clone(),
        CaptureConfig::default(),
    )));

    let report = CapturePipeline::new(capturer, analyzer(&server.url()))
        .run(out.path())
        .await;

    assert!(!report.capture.succeeded);
    assert!(report
        .capture
        .error_message
        .as_deref()
        .unwrap()
        .contains("brew install ffmpeg"));
    assert!(report.analysis.is_none());
    assert_eq!(runner.calls().len(), 1);
    mock.assert_async().await;
}

#[test]
fn default_config_wires_adapters() {
    let config = AppConfig::default_config();
    let client = HttpAnalysisClient::new(&config.analysis).unwrap();
    assert_eq!(client.base_url(), "http://localhost:8000");
    assert_eq!(config.capture.video_size(), "1280x720");
}
