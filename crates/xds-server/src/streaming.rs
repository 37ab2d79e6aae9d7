//! Stream reader shared by every discovery service.
//!
//! The reader takes requests off the gRPC stream, checks that the first one
//! identifies the proxy, and hands each request to the delivery worker of
//! its resource kind. Per-kind services pin one type URL; the aggregated
//! service starts a worker per type URL on first use. All workers of a
//! stream write into the same response channel.

use std::collections::HashMap;
use std::sync::Arc;

use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_stream::StreamExt;
use tonic::Status;
use tracing::{debug, info, warn};
use xds_cache::ResourceRegistry;
use xds_core::XdsError;
use xds_types::discovery::DiscoveryRequest;

use crate::config::ServerConfig;
use crate::metrics::{StreamTracker, XdsMetrics};
use crate::shutdown::ShutdownController;
use crate::sotw::{ResponseSender, SotwWorker};
use crate::stream::StreamContext;

/// Requests queued per worker before the reader waits.
const WORKER_QUEUE: usize = 4;

/// Everything a stream needs from the server.
#[derive(Debug, Clone)]
pub(crate) struct StreamEnv {
    pub registry: Arc<ResourceRegistry>,
    pub config: Arc<ServerConfig>,
    pub metrics: XdsMetrics,
    pub shutdown: ShutdownController,
}

/// Which requests a stream accepts.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StreamScope {
    /// Short service name for logs and metrics.
    pub service: &'static str,
    /// The only type URL served, or `None` for the aggregated service.
    pub type_url: Option<&'static str>,
}

/// Serve one discovery stream until the proxy hangs up or shutdown begins.
pub(crate) async fn run_stream<S>(
    mut inbound: S,
    responses: ResponseSender,
    env: StreamEnv,
    scope: StreamScope,
) where
    S: Stream<Item = Result<DiscoveryRequest, Status>> + Send + Unpin + 'static,
{
    let _operation = env.shutdown.register_operation();
    let mut shutdown = env.shutdown.signal();

    let first = tokio::select! {
        first = inbound.next() => first,
        _ = shutdown.recv() => {
            let _ = responses.send(Err(XdsError::Shutdown.into())).await;
            return;
        }
    };
    let first = match first {
        Some(Ok(request)) => request,
        Some(Err(status)) => {
            debug!(service = scope.service, error = %status, "stream failed before first request");
            return;
        }
        None => return,
    };
    let Some(node) = first.node.as_ref() else {
        warn!(service = scope.service, "first request missing node information");
        let _ = responses.send(Err(XdsError::MissingNode.into())).await;
        return;
    };

    let ctx = Arc::new(StreamContext::new(scope.service, node));
    let _tracker = StreamTracker::new(env.metrics.clone(), scope.service);
    info!(
        stream = %ctx.id(),
        service = scope.service,
        node_id = ctx.node_id(),
        node_cluster = ctx.node_cluster(),
        node = %ctx.node_hash(),
        "stream opened"
    );

    let mut demux = Demux {
        ctx: Arc::clone(&ctx),
        env: &env,
        scope,
        responses: responses.clone(),
        workers: HashMap::new(),
        tasks: JoinSet::new(),
    };

    let mut next = Some(first);
    loop {
        if let Some(request) = next.take() {
            if let Err(status) = demux.dispatch(request).await {
                let _ = responses.send(Err(status)).await;
                break;
            }
        }

        tokio::select! {
            request = inbound.next() => match request {
                Some(Ok(request)) => next = Some(request),
                Some(Err(status)) => {
                    debug!(stream = %ctx.id(), error = %status, "stream error");
                    break;
                }
                None => break,
            },
            _ = shutdown.recv() => {
                debug!(stream = %ctx.id(), "closing stream for shutdown");
                let _ = responses.send(Err(XdsError::Shutdown.into())).await;
                break;
            }
        }
    }

    // Closing the request queues stops the workers.
    let mut tasks = demux.close();
    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result {
            warn!(stream = %ctx.id(), error = %e, "delivery worker failed");
        }
    }

    info!(
        stream = %ctx.id(),
        service = scope.service,
        requests = ctx.request_count(),
        responses = ctx.response_count(),
        duration = ?ctx.duration(),
        "stream closed"
    );
}

/// Routes requests of one stream to per-kind workers.
struct Demux<'a> {
    ctx: Arc<StreamContext>,
    env: &'a StreamEnv,
    scope: StreamScope,
    responses: ResponseSender,
    workers: HashMap<&'static str, mpsc::Sender<DiscoveryRequest>>,
    tasks: JoinSet<()>,
}

impl Demux<'_> {
    /// Hand a request to its worker, starting the worker if needed.
    ///
    /// Requests for kinds this stream does not serve are ignored. An error
    /// closes the stream.
    async fn dispatch(&mut self, mut request: DiscoveryRequest) -> Result<(), Status> {
        let type_url = match self.scope.type_url {
            Some(pinned) => {
                if request.type_url.is_empty() {
                    request.type_url = pinned.to_string();
                } else if request.type_url != pinned {
                    warn!(
                        stream = %self.ctx.id(),
                        expected = pinned,
                        got = %request.type_url,
                        "ignoring request for another type"
                    );
                    return Ok(());
                }
                pinned
            }
            None => {
                if request.type_url.is_empty() {
                    warn!(stream = %self.ctx.id(), "ignoring aggregated request without type URL");
                    return Ok(());
                }
                let Some(adapter) = self.env.registry.get(&request.type_url) else {
                    warn!(
                        stream = %self.ctx.id(),
                        type_url = %request.type_url,
                        "ignoring request for unserved type"
                    );
                    return Ok(());
                };
                adapter.type_url()
            }
        };

        if !self.workers.contains_key(type_url) {
            let adapter = self.env.registry.require(type_url)?;
            let (tx, rx) = mpsc::channel(WORKER_QUEUE);
            let worker = SotwWorker::new(
                adapter,
                Arc::clone(&self.ctx),
                self.responses.clone(),
                self.env.metrics.clone(),
                self.env.config.max_message_size,
            );
            self.tasks.spawn(worker.run(rx));
            self.workers.insert(type_url, tx);
        }

        if let Some(worker) = self.workers.get(type_url) {
            if worker.send(request).await.is_err() {
                // The worker only stops early when the proxy stopped reading.
                return Err(XdsError::StreamClosed {
                    reason: "response stream closed".into(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn close(self) -> JoinSet<()> {
        drop(self.workers);
        self.tasks
    }
}
