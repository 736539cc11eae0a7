//! End-to-end pipeline tests: real fetcher over a local HTTP stub, real
//! compositor, recording sink.

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use vouchmark::fetcher::AssetFetcher;
use vouchmark::gate::GateConfig;
use vouchmark::metrics::Metrics;
use vouchmark::pipeline::SubmissionService;
use vouchmark::platform::{
    Attachment, OutgoingFile, PlatformError, ResponseSink, SubmissionRequest,
};
use vouchmark::watermark::WatermarkParams;

/// Serve canned (status, body) responses keyed by request path.
async fn stub_server(routes: HashMap<String, (u16, Vec<u8>)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let routes = Arc::clone(&routes);
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let mut head = Vec::new();
                loop {
                    let Ok(n) = stream.read(&mut buf).await else {
                        return;
                    };
                    if n == 0 {
                        return;
                    }
                    head.extend_from_slice(&buf[..n]);
                    if head.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                let request_line = String::from_utf8_lossy(&head);
                let path = request_line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("/")
                    .to_string();

                let (status, body) = routes
                    .get(&path)
                    .cloned()
                    .unwrap_or((404, b"not found".to_vec()));

                let response = format!(
                    "HTTP/1.1 {} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status,
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.write_all(&body).await;
            });
        }
    });

    format!("http://{addr}")
}

fn png_bytes(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, color);
    vouchmark::watermark::compositor::encode_png(&img).unwrap()
}

#[derive(Debug)]
enum Delivery {
    Ephemeral(String),
    Failure(String),
    Success { caption: String, file: OutgoingFile },
}

#[derive(Default)]
struct RecordingSink {
    deliveries: Mutex<Vec<Delivery>>,
}

#[async_trait]
impl ResponseSink for RecordingSink {
    async fn send_ephemeral(&self, text: String) -> Result<(), PlatformError> {
        self.deliveries.lock().unwrap().push(Delivery::Ephemeral(text));
        Ok(())
    }

    async fn send_failure(&self, text: String) -> Result<(), PlatformError> {
        self.deliveries.lock().unwrap().push(Delivery::Failure(text));
        Ok(())
    }

    async fn send_success(&self, caption: String, file: OutgoingFile) -> Result<(), PlatformError> {
        self.deliveries
            .lock()
            .unwrap()
            .push(Delivery::Success { caption, file });
        Ok(())
    }
}

fn service(metrics: Arc<Metrics>) -> SubmissionService<AssetFetcher> {
    let fetcher = AssetFetcher::new(std::time::Duration::from_secs(5)).unwrap();
    SubmissionService::new(
        GateConfig {
            allowed_channel: 100,
            required_role: None,
        },
        WatermarkParams::default(),
        Arc::new(fetcher),
        metrics,
    )
}

fn request(base: &str) -> SubmissionRequest {
    SubmissionRequest {
        attachment: Attachment {
            url: format!("{base}/proof.png"),
            filename: "proof.png".to_string(),
            content_type: Some("image/png".to_string()),
        },
        note: Some("refund came through".to_string()),
        channel_id: 100,
        caller_id: 42,
        caller_roles: vec![],
        emblem_url: Some(format!("{base}/emblem.png")),
    }
}

#[tokio::test]
async fn test_end_to_end_success_preserves_dimensions() {
    let mut routes = HashMap::new();
    routes.insert(
        "/proof.png".to_string(),
        (200, png_bytes(900, 600, Rgba([255, 255, 255, 255]))),
    );
    routes.insert(
        "/emblem.png".to_string(),
        (200, png_bytes(128, 128, Rgba([220, 30, 30, 255]))),
    );
    let base = stub_server(routes).await;

    let metrics = Arc::new(Metrics::new());
    let svc = service(Arc::clone(&metrics));
    let sink = RecordingSink::default();

    svc.handle(&request(&base), &sink).await;

    let deliveries = sink.deliveries.lock().unwrap();
    assert_eq!(deliveries.len(), 1);
    match &deliveries[0] {
        Delivery::Success { caption, file } => {
            assert!(caption.contains("<@42>"));
            assert!(caption.contains("refund came through"));
            assert_eq!(file.filename, "vouched_proof.png");

            let decoded = image::load_from_memory(&file.data).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (900, 600));
        }
        other => panic!("expected success, got {other:?}"),
    }
    assert_eq!(metrics.composite_count(), 1);
}

#[tokio::test]
async fn test_end_to_end_is_deterministic() {
    let mut routes = HashMap::new();
    routes.insert(
        "/proof.png".to_string(),
        (200, png_bytes(300, 200, Rgba([40, 90, 160, 255]))),
    );
    routes.insert(
        "/emblem.png".to_string(),
        (200, png_bytes(64, 64, Rgba([250, 250, 250, 220]))),
    );
    let base = stub_server(routes).await;

    let svc = service(Arc::new(Metrics::new()));

    let first = svc.run(&request(&base)).await.unwrap();
    let second = svc.run(&request(&base)).await.unwrap();

    assert_eq!(first.data, second.data);
}

#[tokio::test]
async fn test_emblem_404_reports_failure_without_partial_output() {
    let mut routes = HashMap::new();
    routes.insert(
        "/proof.png".to_string(),
        (200, png_bytes(300, 200, Rgba([255, 255, 255, 255]))),
    );
    routes.insert("/emblem.png".to_string(), (404, Vec::new()));
    let base = stub_server(routes).await;

    let metrics = Arc::new(Metrics::new());
    let svc = service(Arc::clone(&metrics));
    let sink = RecordingSink::default();

    svc.handle(&request(&base), &sink).await;

    let deliveries = sink.deliveries.lock().unwrap();
    assert_eq!(deliveries.len(), 1);
    assert!(matches!(deliveries[0], Delivery::Failure(_)));
    assert_eq!(metrics.failure_count("fetch_emblem"), 1);
    assert_eq!(metrics.composite_count(), 0);
}

#[tokio::test]
async fn test_denied_content_type_makes_no_network_call() {
    // No stub server at all: a denied request must never touch the network.
    let metrics = Arc::new(Metrics::new());
    let svc = service(Arc::clone(&metrics));
    let sink = RecordingSink::default();

    let mut req = request("http://127.0.0.1:1");
    req.attachment.content_type = Some("application/pdf".to_string());

    svc.handle(&req, &sink).await;

    let deliveries = sink.deliveries.lock().unwrap();
    assert_eq!(deliveries.len(), 1);
    match &deliveries[0] {
        Delivery::Ephemeral(text) => assert!(text.contains("Invalid file type")),
        other => panic!("expected ephemeral denial, got {other:?}"),
    }
    assert_eq!(metrics.denial_count("bad_content_type"), 1);
}
