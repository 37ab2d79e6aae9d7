//! State-of-the-World delivery for one resource kind on one stream.
//!
//! A [`SotwWorker`] answers each request with at most one response. It
//! blocks on its cache until a version newer than the one it last sent
//! exists, then sends every subscribed resource of that version. A request
//! that changes the subscribed names is answered at once from the current
//! contents, since the proxy is waiting for resources it has not seen.

use std::sync::Arc;

use prost::Message;
use tokio::sync::mpsc;
use tonic::Status;
use tracing::{debug, error, info, trace, warn};
use xds_cache::{ResourceAdapter, Watch, WatchId};
use xds_core::{ResourceVersion, XdsError, XdsResult};
use xds_types::discovery::{DiscoveryRequest, DiscoveryResponse};

use crate::metrics::XdsMetrics;
use crate::stream::StreamContext;
use crate::utils::generate_nonce;

/// Sender half of a stream's response channel.
pub(crate) type ResponseSender = mpsc::Sender<Result<DiscoveryResponse, Status>>;

/// Build a response from the adapter's current contents.
///
/// Fails with [`XdsError::EncodingError`] when the encoded response would
/// exceed `max_message_size`; the version it would have carried is
/// returned alongside so the caller can move past it.
pub(crate) fn build_response(
    adapter: &dyn ResourceAdapter,
    names: &[String],
    max_message_size: usize,
) -> (u64, XdsResult<DiscoveryResponse>) {
    let (version, resources) = adapter.fetch(names);
    let response = DiscoveryResponse {
        version_info: ResourceVersion::new(version).to_string(),
        resources,
        type_url: adapter.type_url().to_string(),
        nonce: generate_nonce(),
        ..Default::default()
    };

    let size = response.encoded_len();
    if size > max_message_size {
        let err = XdsError::EncodingError {
            type_url: response.type_url,
            message: format!(
                "response of {} bytes exceeds limit of {} bytes",
                size, max_message_size
            ),
        };
        return (version, Err(err));
    }
    (version, Ok(response))
}

/// Outcome of one attempt to answer the proxy.
enum Delivery {
    /// A response is on its way; wait for the proxy's next request.
    Sent,
    /// Nothing was sent; wait for the next version instead.
    Skipped,
    /// The proxy stopped reading responses.
    Closed,
}

/// Cancels the worker's registration when the worker goes away.
struct Registration {
    adapter: Arc<dyn ResourceAdapter>,
    id: WatchId,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.adapter.cancel(self.id);
    }
}

/// Delivery loop for one resource kind.
pub(crate) struct SotwWorker {
    adapter: Arc<dyn ResourceAdapter>,
    ctx: Arc<StreamContext>,
    responses: ResponseSender,
    metrics: XdsMetrics,
    max_message_size: usize,
    /// Sorted, deduplicated subscription. Empty subscribes to everything.
    names: Vec<String>,
    /// Version of the last response sent, or skipped as unencodable.
    last_version: u64,
}

impl SotwWorker {
    pub(crate) fn new(
        adapter: Arc<dyn ResourceAdapter>,
        ctx: Arc<StreamContext>,
        responses: ResponseSender,
        metrics: XdsMetrics,
        max_message_size: usize,
    ) -> Self {
        Self {
            adapter,
            ctx,
            responses,
            metrics,
            max_message_size,
            names: Vec::new(),
            last_version: 0,
        }
    }

    /// Serve requests until the request channel closes or the proxy stops
    /// reading responses.
    pub(crate) async fn run(mut self, mut requests: mpsc::Receiver<DiscoveryRequest>) {
        let mut watch = Watch::new();
        let _registration = Registration {
            adapter: Arc::clone(&self.adapter),
            id: watch.id(),
        };
        let mut registered = false;

        debug!(
            stream = %self.ctx.id(),
            type_url = self.adapter.type_url(),
            watch = %watch.id(),
            "delivery worker started"
        );

        loop {
            tokio::select! {
                request = requests.recv() => {
                    let Some(request) = request else { break };

                    self.adapter.cancel(watch.id());
                    watch.clear();
                    registered = false;

                    let changed = self.on_request(request);
                    let delivery = if changed && self.last_version > 0 {
                        self.respond().await
                    } else {
                        Delivery::Skipped
                    };
                    match delivery {
                        Delivery::Sent => {}
                        Delivery::Skipped => {
                            self.adapter.register(watch.id(), watch.notifier(), self.last_version);
                            registered = true;
                        }
                        Delivery::Closed => break,
                    }
                }
                Some(_) = watch.recv(), if registered => {
                    // A route adapter may still hold a registration in the
                    // cache that did not fire.
                    self.adapter.cancel(watch.id());
                    registered = false;

                    let delivery = if self.adapter.version() > self.last_version {
                        self.respond().await
                    } else {
                        trace!(stream = %self.ctx.id(), type_url = self.adapter.type_url(), "spurious wake");
                        Delivery::Skipped
                    };
                    match delivery {
                        Delivery::Sent => {}
                        Delivery::Skipped => {
                            self.adapter.register(watch.id(), watch.notifier(), self.last_version);
                            registered = true;
                        }
                        Delivery::Closed => break,
                    }
                }
            }
        }

        debug!(
            stream = %self.ctx.id(),
            type_url = self.adapter.type_url(),
            "delivery worker stopped"
        );
    }

    /// Log the ACK or NACK a request carries and adopt its subscription.
    ///
    /// Returns whether the subscribed names changed.
    fn on_request(&mut self, request: DiscoveryRequest) -> bool {
        let type_url = self.adapter.type_url();
        self.ctx.record_request();
        self.metrics.record_request(type_url);

        if let Some(detail) = &request.error_detail {
            let nack = XdsError::NackReceived {
                node_id: self.ctx.node_id().to_string(),
                type_url: type_url.to_string(),
                nonce: request.response_nonce.clone(),
                error_message: detail.message.clone(),
            };
            warn!(
                stream = %self.ctx.id(),
                type_url,
                version = %request.version_info,
                error = %nack,
                "configuration rejected by proxy"
            );
            self.metrics.record_nack(type_url);
        } else if !request.response_nonce.is_empty() {
            debug!(
                stream = %self.ctx.id(),
                type_url,
                version = %request.version_info,
                nonce = %request.response_nonce,
                "received ACK"
            );
            self.metrics.record_ack(type_url);
        }

        let mut names = request.resource_names;
        names.sort_unstable();
        names.dedup();
        if names == self.names {
            return false;
        }

        trace!(
            stream = %self.ctx.id(),
            type_url,
            resources = ?names,
            "subscription changed"
        );
        self.names = names;
        true
    }

    /// Send the current contents.
    async fn respond(&mut self) -> Delivery {
        let type_url = self.adapter.type_url();
        let (version, built) = build_response(self.adapter.as_ref(), &self.names, self.max_message_size);
        self.last_version = version;

        let response = match built {
            Ok(response) => response,
            Err(e) => {
                error!(stream = %self.ctx.id(), type_url, version, error = %e, "response dropped");
                self.metrics.record_encoding_error(type_url);
                return Delivery::Skipped;
            }
        };

        let count = response.resources.len();
        let bytes = response.encoded_len();
        info!(
            stream = %self.ctx.id(),
            node = %self.ctx.node_hash(),
            type_url,
            version = %response.version_info,
            nonce = %response.nonce,
            count,
            "sending response"
        );

        if self.responses.send(Ok(response)).await.is_err() {
            return Delivery::Closed;
        }
        self.ctx.record_response();
        self.metrics.record_response(type_url, count, bytes);
        Delivery::Sent
    }
}
