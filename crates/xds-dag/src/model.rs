//! Graph node types.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// A listener root. The plaintext listener carries [`VirtualHost`]s, the
/// TLS listener carries [`SecureVirtualHost`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listener {
    pub name: String,
    pub port: u16,
    pub virtual_hosts: Vec<VirtualHost>,
    pub secure_virtual_hosts: Vec<SecureVirtualHost>,
}

impl Listener {
    pub fn new(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            port,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_virtual_host(mut self, vhost: VirtualHost) -> Self {
        self.virtual_hosts.push(vhost);
        self
    }

    #[must_use]
    pub fn with_secure_virtual_host(mut self, vhost: SecureVirtualHost) -> Self {
        self.secure_virtual_hosts.push(vhost);
        self
    }
}

/// A named virtual host and its routes. The name is the fully qualified
/// host name, or `*`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualHost {
    pub name: String,
    pub routes: Vec<Route>,
}

impl VirtualHost {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            routes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }
}

/// TLS protocol versions a virtual host can request as its minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TlsVersion {
    V1_1,
    V1_2,
    V1_3,
}

/// A virtual host served on the TLS listener, selected by SNI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecureVirtualHost {
    pub virtual_host: VirtualHost,
    /// Serving certificate. Without one the host is left off the listener.
    pub secret: Option<Arc<Secret>>,
    /// Requested minimum TLS version; the process floor still applies.
    pub min_tls_version: Option<TlsVersion>,
    /// Whether clients without a matching SNI may reach this host through
    /// the fallback certificate.
    pub fallback_certificate: bool,
    /// When set, TLS is terminated and the stream is proxied at L4 instead
    /// of routed.
    pub tcp_proxy: Option<TcpProxy>,
}

impl SecureVirtualHost {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            virtual_host: VirtualHost::new(name),
            secret: None,
            min_tls_version: None,
            fallback_certificate: false,
            tcp_proxy: None,
        }
    }

    /// The SNI server name of this host.
    pub fn name(&self) -> &str {
        &self.virtual_host.name
    }

    #[must_use]
    pub fn with_secret(mut self, secret: Arc<Secret>) -> Self {
        self.secret = Some(secret);
        self
    }

    #[must_use]
    pub fn with_min_tls_version(mut self, version: TlsVersion) -> Self {
        self.min_tls_version = Some(version);
        self
    }

    #[must_use]
    pub fn with_fallback_certificate(mut self) -> Self {
        self.fallback_certificate = true;
        self
    }

    #[must_use]
    pub fn with_tcp_proxy(mut self, proxy: TcpProxy) -> Self {
        self.tcp_proxy = Some(proxy);
        self
    }

    #[must_use]
    pub fn with_route(mut self, route: Route) -> Self {
        self.virtual_host.routes.push(route);
        self
    }
}

/// How a route matches the request path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathMatch {
    Prefix(String),
    Exact(String),
    Regex(String),
}

impl Default for PathMatch {
    fn default() -> Self {
        Self::Prefix("/".into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HeaderMatchKind {
    Exact(String),
    Contains(String),
    Present,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeaderMatch {
    pub name: String,
    pub kind: HeaderMatchKind,
    pub invert: bool,
}

/// Timeouts applied to a route. `None` leaves the proxy default in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeoutPolicy {
    pub response: Option<Duration>,
    pub idle: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Envoy `retry_on` conditions, e.g. `5xx` or `gateway-error`.
    pub retry_on: String,
    pub num_retries: u32,
    pub per_try_timeout: Option<Duration>,
    pub retriable_status_codes: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadersPolicy {
    /// Headers to set, replacing existing values. Sorted by name on output.
    pub set: Vec<(String, String)>,
    pub remove: Vec<String>,
}

impl HeadersPolicy {
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.remove.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitUnit {
    Second,
    Minute,
    Hour,
}

impl RateLimitUnit {
    pub fn as_duration(self) -> Duration {
        match self {
            Self::Second => Duration::from_secs(1),
            Self::Minute => Duration::from_secs(60),
            Self::Hour => Duration::from_secs(3600),
        }
    }
}

/// Token-bucket rate limit enforced by the proxy per route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRateLimit {
    pub requests: u32,
    pub unit: RateLimitUnit,
    pub burst: u32,
    /// Status returned to limited requests; 429 when unset.
    pub response_status: Option<u16>,
}

/// A route within a virtual host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    pub path: PathMatch,
    pub headers: Vec<HeaderMatch>,
    pub clusters: Vec<Cluster>,
    /// Redirect plaintext requests to HTTPS instead of forwarding.
    pub https_upgrade: bool,
    pub websocket: bool,
    pub prefix_rewrite: Option<String>,
    pub timeout_policy: TimeoutPolicy,
    pub retry_policy: Option<RetryPolicy>,
    pub request_headers: HeadersPolicy,
    pub response_headers: HeadersPolicy,
    pub rate_limit: Option<LocalRateLimit>,
}

impl Route {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            path: PathMatch::Prefix(prefix.into()),
            ..Default::default()
        }
    }

    pub fn exact(path: impl Into<String>) -> Self {
        Self {
            path: PathMatch::Exact(path.into()),
            ..Default::default()
        }
    }

    pub fn regex(regex: impl Into<String>) -> Self {
        Self {
            path: PathMatch::Regex(regex.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_cluster(mut self, cluster: Cluster) -> Self {
        self.clusters.push(cluster);
        self
    }

    #[must_use]
    pub fn with_header(mut self, header: HeaderMatch) -> Self {
        self.headers.push(header);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LoadBalancerStrategy {
    #[default]
    RoundRobin,
    WeightedLeastRequest,
    Random,
    /// Ring hash keyed on a session affinity cookie.
    Cookie,
}

impl LoadBalancerStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RoundRobin => "RoundRobin",
            Self::WeightedLeastRequest => "WeightedLeastRequest",
            Self::Random => "Random",
            Self::Cookie => "Cookie",
        }
    }
}

/// Upstream application protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// HTTP/2 over TLS.
    H2,
    /// HTTP/2 cleartext.
    H2c,
    /// HTTP/1 over TLS.
    Tls,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::H2 => "h2",
            Self::H2c => "h2c",
            Self::Tls => "tls",
        }
    }
}

/// CA bundle and expected subject name for upstream TLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamValidation {
    /// Secret whose certificate chain is the CA bundle.
    pub ca: Arc<Secret>,
    pub subject_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckPolicy {
    pub path: String,
    pub host: Option<String>,
    pub interval: Duration,
    pub timeout: Duration,
    pub unhealthy_threshold: u32,
    pub healthy_threshold: u32,
}

impl Default for HealthCheckPolicy {
    fn default() -> Self {
        Self {
            path: "/".into(),
            host: None,
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(2),
            unhealthy_threshold: 3,
            healthy_threshold: 2,
        }
    }
}

/// A weighted reference to a backend with the policies used to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub upstream: Arc<Service>,
    pub weight: u32,
    pub load_balancer: LoadBalancerStrategy,
    pub protocol: Option<Protocol>,
    pub upstream_validation: Option<UpstreamValidation>,
    pub health_check: Option<HealthCheckPolicy>,
    /// SNI sent to TLS upstreams.
    pub sni: Option<String>,
}

impl Cluster {
    pub fn new(upstream: Arc<Service>) -> Self {
        Self {
            upstream,
            weight: 0,
            load_balancer: LoadBalancerStrategy::default(),
            protocol: None,
            upstream_validation: None,
            health_check: None,
            sni: None,
        }
    }

    #[must_use]
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    #[must_use]
    pub fn with_load_balancer(mut self, strategy: LoadBalancerStrategy) -> Self {
        self.load_balancer = strategy;
        self
    }

    #[must_use]
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }
}

/// Connection thresholds applied as circuit breakers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CircuitBreakerThresholds {
    pub max_connections: Option<u32>,
    pub max_pending_requests: Option<u32>,
    pub max_requests: Option<u32>,
    pub max_retries: Option<u32>,
}

impl CircuitBreakerThresholds {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A resolved backend port.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Service {
    pub namespace: String,
    pub name: String,
    pub port: u16,
    /// Name of the port; empty for unnamed single-port services.
    pub port_name: String,
    /// DNS name for services that resolve outside the cluster.
    pub external_name: Option<String>,
    pub endpoints: Vec<SocketAddr>,
    pub thresholds: CircuitBreakerThresholds,
}

impl Service {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, port: u16) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            port,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_port_name(mut self, port_name: impl Into<String>) -> Self {
        self.port_name = port_name.into();
        self
    }

    #[must_use]
    pub fn with_endpoints(mut self, endpoints: impl IntoIterator<Item = SocketAddr>) -> Self {
        self.endpoints.extend(endpoints);
        self
    }

    #[must_use]
    pub fn with_external_name(mut self, host: impl Into<String>) -> Self {
        self.external_name = Some(host.into());
        self
    }
}

/// Certificate material referenced by TLS hosts and upstream validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Secret {
    pub namespace: String,
    pub name: String,
    pub certificate_chain: Vec<u8>,
    pub private_key: Vec<u8>,
}

impl Secret {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        certificate_chain: impl Into<Vec<u8>>,
        private_key: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            certificate_chain: certificate_chain.into(),
            private_key: private_key.into(),
        }
    }

    /// A serving certificate needs both a chain and a key.
    pub fn is_valid(&self) -> bool {
        !self.certificate_chain.is_empty() && !self.private_key.is_empty()
    }
}

/// L4 proxying to one or more weighted clusters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TcpProxy {
    pub clusters: Vec<Cluster>,
}

impl TcpProxy {
    #[must_use]
    pub fn with_cluster(mut self, cluster: Cluster) -> Self {
        self.clusters.push(cluster);
        self
    }
}
