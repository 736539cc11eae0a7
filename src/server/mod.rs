//! Liveness and metrics HTTP listener.
//!
//! A minimal HTTP/1 endpoint for deployment plumbing: `/` answers liveness
//! probes (and keep-alive pingers), `/metrics` serves the Prometheus text
//! exposition. This is deliberately not a framework: two routes, no state
//! beyond the shared metrics registry.

use crate::metrics::Metrics;
use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Bind the listener. Split from [`serve`] so tests can bind port 0 and
/// read the assigned address.
pub async fn bind(address: &str, port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind((address, port)).await
}

/// Accept loop. Runs until the task is dropped.
pub async fn serve(listener: TcpListener, metrics: Arc<Metrics>) -> std::io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let metrics = Arc::clone(&metrics);

        tokio::spawn(async move {
            let service =
                service_fn(move |req| handle(req, Arc::clone(&metrics)));
            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                tracing::debug!(peer = %peer, error = %e, "health connection error");
            }
        });
    }
}

async fn handle(
    request: Request<Incoming>,
    metrics: Arc<Metrics>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let response = match request.uri().path() {
        "/" | "/health" => text_response(StatusCode::OK, "I am alive!"),
        "/metrics" => text_response(StatusCode::OK, &metrics.export_prometheus()),
        _ => text_response(StatusCode::NOT_FOUND, "not found"),
    };
    Ok(response)
}

fn text_response(status: StatusCode, body: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("content-type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from(body.to_string())))
        .expect("static response construction cannot fail")
}
