//! Submission pipeline: gate → fetch → composite → deliver.
//!
//! One [`SubmissionService`] handles arbitrarily many submissions in
//! parallel; submissions share nothing but the read-only configuration and
//! the metrics registry. The two asset fetches have no data dependency on
//! each other and run concurrently; the compositor is the join point and
//! short-circuits if either fetch fails. Nothing is retried.

use crate::error::SubmissionError;
use crate::fetcher::{Asset, FetchBytes, FetchError};
use crate::gate::{self, GateConfig};
use crate::metrics::Metrics;
use crate::platform::{OutgoingFile, ResponseSink, SubmissionRequest, UserId};
use crate::watermark::{self, CompositeResult, WatermarkParams};
use bytes::Bytes;
use image::DynamicImage;
use std::sync::Arc;
use std::time::Instant;

/// Per-process submission handler. Cheap to clone; all state is shared and
/// read-only (or internally synchronized, for metrics).
#[derive(Clone)]
pub struct SubmissionService<F: FetchBytes> {
    gate: GateConfig,
    params: WatermarkParams,
    fetcher: Arc<F>,
    metrics: Arc<Metrics>,
}

impl<F: FetchBytes> SubmissionService<F> {
    pub fn new(
        gate: GateConfig,
        params: WatermarkParams,
        fetcher: Arc<F>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            gate,
            params,
            fetcher,
            metrics,
        }
    }

    /// Handle one submission end to end, delivering the outcome through the
    /// sink. Sink failures are logged, not propagated: by the time delivery
    /// fails there is nothing left for the core to unwind.
    pub async fn handle(&self, request: &SubmissionRequest, sink: &dyn ResponseSink) {
        let decision = gate::check(request, &self.gate);
        if let Some(notice) = decision.notice() {
            self.metrics.record_denial(decision.reason());
            tracing::info!(
                channel = request.channel_id,
                caller = request.caller_id,
                reason = decision.reason(),
                "submission denied by gate"
            );
            if let Err(e) = sink.send_ephemeral(notice).await {
                tracing::warn!(error = %e, "failed to deliver denial notice");
            }
            return;
        }

        self.metrics.record_submission();
        let started = Instant::now();

        match self.run(request).await {
            Ok(result) => {
                self.metrics.record_composite(started.elapsed());
                let caption = caption(request.caller_id, request.note.as_deref());
                let file = OutgoingFile {
                    filename: result.filename,
                    data: result.data,
                };
                if let Err(e) = sink.send_success(caption, file).await {
                    tracing::warn!(error = %e, "failed to deliver composite");
                }
            }
            Err(err) => {
                self.metrics.record_failure(err.kind());
                tracing::error!(
                    channel = request.channel_id,
                    caller = request.caller_id,
                    kind = err.kind(),
                    error = %err,
                    "submission pipeline failed"
                );
                if let Err(e) = sink.send_failure(err.user_message()).await {
                    tracing::warn!(error = %e, "failed to deliver failure notice");
                }
            }
        }
    }

    /// The pipeline proper: fetch both assets concurrently, decode, and
    /// composite. Pure with respect to the request; no delivery here.
    pub async fn run(&self, request: &SubmissionRequest) -> Result<CompositeResult, SubmissionError> {
        // An absent emblem is a configuration gap, checked before any
        // network I/O so neither fetch is attempted.
        let emblem_url = request
            .emblem_url
            .as_deref()
            .ok_or(SubmissionError::MissingEmblem)?;

        let (submission, emblem) = tokio::join!(
            self.fetch(Asset::Submission, &request.attachment.url),
            self.fetch(Asset::Emblem, emblem_url),
        );
        let (submission, emblem) = (submission?, emblem?);

        let base = decode(Asset::Submission, &submission)?;
        let emblem = decode(Asset::Emblem, &emblem)?;

        Ok(watermark::watermark(
            &base,
            &emblem,
            &self.params,
            &request.attachment.filename,
        )?)
    }

    async fn fetch(&self, asset: Asset, url: &str) -> Result<Bytes, SubmissionError> {
        self.fetcher
            .fetch(url)
            .await
            .map_err(|cause: FetchError| SubmissionError::Fetch { asset, cause })
    }
}

/// Success caption: caller mention plus the optional note.
pub fn caption(caller: UserId, note: Option<&str>) -> String {
    let mut text = format!("✅ **Vouch recorded by <@{caller}>**");
    if let Some(note) = note {
        text.push_str(&format!("\n📝 **Note:** {note}"));
    }
    text
}

fn decode(asset: Asset, data: &[u8]) -> Result<DynamicImage, SubmissionError> {
    image::load_from_memory(data).map_err(|e| SubmissionError::Decode {
        asset,
        cause: e.to_string(),
    })
}
