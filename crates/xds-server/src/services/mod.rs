//! gRPC services for the discovery protocol.
//!
//! One generic [`DiscoveryServer`] serves every discovery service; the
//! [`DiscoveryKind`] marker decides its gRPC name, its methods and the type
//! URL it pins:
//!
//! - Aggregated Discovery Service (ADS), every type on one stream
//! - Cluster Discovery Service (CDS)
//! - Endpoint Discovery Service (EDS)
//! - Listener Discovery Service (LDS)
//! - Route Discovery Service (RDS)
//! - Secret Discovery Service (SDS)
//!
//! The per-kind services also answer the unary `Fetch*` method with the
//! current contents.

use std::marker::PhantomData;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::codec::ProstCodec;
use tonic::codegen::{BoxFuture, StdError};
use tonic::server::{Grpc, NamedService, StreamingService, UnaryService};
use tonic::Status;
use tracing::{debug, instrument};
use xds_core::{TypeUrl, XdsError};
use xds_types::discovery::{DiscoveryRequest, DiscoveryResponse};

use crate::sotw::build_response;
use crate::streaming::{run_stream, StreamEnv, StreamScope};

/// Stream of responses handed to tonic.
pub type ResponseStream = ReceiverStream<Result<DiscoveryResponse, Status>>;

/// Static description of one discovery service.
pub trait DiscoveryKind: Send + Sync + 'static {
    /// Fully qualified gRPC service name.
    const SERVICE: &'static str;
    /// Short name for logs and metrics.
    const LABEL: &'static str;
    /// Bidirectional streaming method.
    const STREAM_METHOD: &'static str;
    /// Unary fetch method, if the service has one.
    const FETCH_METHOD: Option<&'static str>;
    /// Type URL served, or `None` for the aggregated service.
    const TYPE_URL: Option<&'static str>;
}

macro_rules! discovery_kind {
    ($(#[$doc:meta])* $kind:ident, $label:literal, $service:literal, $stream:literal, $fetch:expr, $type_url:expr) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub enum $kind {}

        impl DiscoveryKind for $kind {
            const SERVICE: &'static str = $service;
            const LABEL: &'static str = $label;
            const STREAM_METHOD: &'static str = $stream;
            const FETCH_METHOD: Option<&'static str> = $fetch;
            const TYPE_URL: Option<&'static str> = $type_url;
        }
    };
}

discovery_kind!(
    /// Every resource type over one stream.
    Aggregated,
    "ADS",
    "envoy.service.discovery.v3.AggregatedDiscoveryService",
    "StreamAggregatedResources",
    None,
    None
);
discovery_kind!(
    Clusters,
    "CDS",
    "envoy.service.cluster.v3.ClusterDiscoveryService",
    "StreamClusters",
    Some("FetchClusters"),
    Some(TypeUrl::CLUSTER)
);
discovery_kind!(
    Endpoints,
    "EDS",
    "envoy.service.endpoint.v3.EndpointDiscoveryService",
    "StreamEndpoints",
    Some("FetchEndpoints"),
    Some(TypeUrl::ENDPOINT)
);
discovery_kind!(
    Listeners,
    "LDS",
    "envoy.service.listener.v3.ListenerDiscoveryService",
    "StreamListeners",
    Some("FetchListeners"),
    Some(TypeUrl::LISTENER)
);
discovery_kind!(
    Routes,
    "RDS",
    "envoy.service.route.v3.RouteDiscoveryService",
    "StreamRoutes",
    Some("FetchRoutes"),
    Some(TypeUrl::ROUTE)
);
discovery_kind!(
    Secrets,
    "SDS",
    "envoy.service.secret.v3.SecretDiscoveryService",
    "StreamSecrets",
    Some("FetchSecrets"),
    Some(TypeUrl::SECRET)
);

pub type AdsServer = DiscoveryServer<Aggregated>;
pub type CdsServer = DiscoveryServer<Clusters>;
pub type EdsServer = DiscoveryServer<Endpoints>;
pub type LdsServer = DiscoveryServer<Listeners>;
pub type RdsServer = DiscoveryServer<Routes>;
pub type SdsServer = DiscoveryServer<Secrets>;

/// A discovery service, mountable on a tonic router.
pub struct DiscoveryServer<K> {
    env: StreamEnv,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Clone for DiscoveryServer<K> {
    fn clone(&self) -> Self {
        Self {
            env: self.env.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K: DiscoveryKind> std::fmt::Debug for DiscoveryServer<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryServer")
            .field("service", &K::SERVICE)
            .finish()
    }
}

impl<K: DiscoveryKind> DiscoveryServer<K> {
    pub(crate) fn new(env: StreamEnv) -> Self {
        Self {
            env,
            _kind: PhantomData,
        }
    }

    /// Serve a stream of requests, returning the stream of responses.
    ///
    /// This is what the streaming gRPC method runs; it takes any request
    /// stream so the protocol can be driven without a transport.
    pub fn open_stream<S>(&self, inbound: S) -> ResponseStream
    where
        S: Stream<Item = Result<DiscoveryRequest, Status>> + Send + Unpin + 'static,
    {
        let (tx, rx) = mpsc::channel(self.env.config.response_buffer);
        let scope = StreamScope {
            service: K::LABEL,
            type_url: K::TYPE_URL,
        };
        tokio::spawn(run_stream(inbound, tx, self.env.clone(), scope));
        ReceiverStream::new(rx)
    }

    /// Answer a unary fetch with the current contents.
    #[instrument(skip(self, request), fields(service = K::LABEL))]
    pub fn fetch(&self, request: DiscoveryRequest) -> Result<DiscoveryResponse, Status> {
        let Some(type_url) = K::TYPE_URL else {
            return Err(Status::unimplemented("the aggregated service has no fetch method"));
        };
        if request.node.is_none() {
            return Err(XdsError::MissingNode.into());
        }
        if !request.type_url.is_empty() && request.type_url != type_url {
            return Err(XdsError::InvalidTypeUrl {
                type_url: request.type_url,
                reason: format!("{} serves {}", K::LABEL, type_url),
            }
            .into());
        }

        let adapter = self.env.registry.require(type_url)?;
        let mut names = request.resource_names;
        names.sort_unstable();
        names.dedup();

        self.env.metrics.record_request(type_url);
        let (_, built) = build_response(adapter.as_ref(), &names, self.env.config.max_message_size);
        let response = built.map_err(|e| {
            self.env.metrics.record_encoding_error(type_url);
            Status::from(e)
        })?;

        debug!(
            type_url,
            version = %response.version_info,
            count = response.resources.len(),
            "answering fetch"
        );
        self.env
            .metrics
            .record_response(type_url, response.resources.len(), prost::Message::encoded_len(&response));
        Ok(response)
    }

    fn grpc(&self) -> Grpc<ProstCodec<DiscoveryResponse, DiscoveryRequest>> {
        Grpc::new(ProstCodec::default()).apply_max_message_size_config(
            Some(self.env.config.max_request_size),
            Some(self.env.config.max_message_size),
        )
    }
}

impl<K: DiscoveryKind> NamedService for DiscoveryServer<K> {
    const NAME: &'static str = K::SERVICE;
}

enum Method {
    Stream,
    Fetch,
    Unknown,
}

fn method<K: DiscoveryKind>(path: &str) -> Method {
    let name = path
        .strip_prefix('/')
        .and_then(|p| p.strip_prefix(K::SERVICE))
        .and_then(|p| p.strip_prefix('/'));
    match name {
        Some(name) if name == K::STREAM_METHOD => Method::Stream,
        Some(name) if K::FETCH_METHOD == Some(name) => Method::Fetch,
        _ => Method::Unknown,
    }
}

struct StreamMethod<K>(DiscoveryServer<K>);

impl<K: DiscoveryKind> StreamingService<DiscoveryRequest> for StreamMethod<K> {
    type Response = DiscoveryResponse;
    type ResponseStream = ResponseStream;
    type Future = BoxFuture<tonic::Response<Self::ResponseStream>, Status>;

    fn call(&mut self, request: tonic::Request<tonic::Streaming<DiscoveryRequest>>) -> Self::Future {
        let responses = self.0.open_stream(request.into_inner());
        Box::pin(async move { Ok(tonic::Response::new(responses)) })
    }
}

struct FetchMethod<K>(DiscoveryServer<K>);

impl<K: DiscoveryKind> UnaryService<DiscoveryRequest> for FetchMethod<K> {
    type Response = DiscoveryResponse;
    type Future = BoxFuture<tonic::Response<Self::Response>, Status>;

    fn call(&mut self, request: tonic::Request<DiscoveryRequest>) -> Self::Future {
        let result = self.0.fetch(request.into_inner()).map(tonic::Response::new);
        Box::pin(async move { result })
    }
}

impl<K, B> tonic::codegen::Service<http::Request<B>> for DiscoveryServer<K>
where
    K: DiscoveryKind,
    B: tonic::codegen::Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
{
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = std::convert::Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        match method::<K>(req.uri().path()) {
            Method::Stream => {
                let mut grpc = self.grpc();
                let service = StreamMethod(self.clone());
                Box::pin(async move { Ok(grpc.streaming(service, req).await) })
            }
            Method::Fetch => {
                let mut grpc = self.grpc();
                let service = FetchMethod(self.clone());
                Box::pin(async move { Ok(grpc.unary(service, req).await) })
            }
            Method::Unknown => Box::pin(async move {
                let mut response = http::Response::new(tonic::body::empty_body());
                let headers = response.headers_mut();
                headers.insert(
                    Status::GRPC_STATUS,
                    (tonic::Code::Unimplemented as i32).into(),
                );
                headers.insert(
                    http::header::CONTENT_TYPE,
                    tonic::metadata::GRPC_CONTENT_TYPE,
                );
                Ok(response)
            }),
        }
    }
}

/// The discovery services of one server.
#[derive(Debug, Clone)]
pub struct DiscoveryServices {
    pub ads: AdsServer,
    pub cds: CdsServer,
    pub eds: EdsServer,
    pub lds: LdsServer,
    pub rds: RdsServer,
    pub sds: SdsServer,
}

impl DiscoveryServices {
    pub(crate) fn new(env: StreamEnv) -> Self {
        Self {
            ads: DiscoveryServer::new(env.clone()),
            cds: DiscoveryServer::new(env.clone()),
            eds: DiscoveryServer::new(env.clone()),
            lds: DiscoveryServer::new(env.clone()),
            rds: DiscoveryServer::new(env.clone()),
            sds: DiscoveryServer::new(env),
        }
    }
}
