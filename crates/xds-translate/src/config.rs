//! Translator configuration.

use std::time::Duration;

use xds_core::{XdsError, XdsResult};
use xds_dag::TlsVersion;

/// Settings applied to the generated listeners.
///
/// # Example
///
/// ```rust
/// use xds_translate::ListenerConfig;
/// use xds_dag::TlsVersion;
///
/// let config = ListenerConfig::default()
///     .with_minimum_tls_version(TlsVersion::V1_3)
///     .with_proxy_protocol();
/// assert_eq!(config.https.port, 8443);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Plaintext listener.
    pub http: ListenerParams,
    /// TLS listener.
    pub https: ListenerParams,
    /// Expect a PROXY protocol header on every connection.
    pub use_proxy_protocol: bool,
    /// Lowest TLS version any secure host may negotiate.
    pub minimum_tls_version: TlsVersion,
    /// Connection manager timeouts.
    pub timeouts: TimeoutParameters,
    /// File access log path, `None` disables access logging.
    pub access_log_path: Option<String>,
    /// Static cluster in the proxy bootstrap that points back at this
    /// server; RDS, EDS and SDS config sources reference it.
    pub xds_cluster: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            http: ListenerParams::new("0.0.0.0", 8080),
            https: ListenerParams::new("0.0.0.0", 8443),
            use_proxy_protocol: false,
            minimum_tls_version: TlsVersion::V1_2,
            timeouts: TimeoutParameters::default(),
            access_log_path: Some("/dev/stdout".into()),
            xds_cluster: "ingress_xds".into(),
        }
    }
}

impl ListenerConfig {
    #[must_use]
    pub fn with_minimum_tls_version(mut self, version: TlsVersion) -> Self {
        self.minimum_tls_version = version;
        self
    }

    #[must_use]
    pub fn with_proxy_protocol(mut self) -> Self {
        self.use_proxy_protocol = true;
        self
    }

    #[must_use]
    pub fn with_timeouts(mut self, timeouts: TimeoutParameters) -> Self {
        self.timeouts = timeouts;
        self
    }

    #[must_use]
    pub fn without_access_log(mut self) -> Self {
        self.access_log_path = None;
        self
    }

    /// Check the settings can produce a loadable configuration.
    pub fn validate(&self) -> XdsResult<()> {
        if self.http.address == self.https.address && self.http.port == self.https.port {
            return Err(XdsError::Configuration(format!(
                "http and https listeners both bind {}:{}",
                self.http.address, self.http.port
            )));
        }
        if self.xds_cluster.is_empty() {
            return Err(XdsError::Configuration("xds cluster name must not be empty".into()));
        }
        if matches!(&self.access_log_path, Some(path) if path.is_empty()) {
            return Err(XdsError::Configuration("access log path must not be empty".into()));
        }
        Ok(())
    }

    /// Whether `params` expects PROXY protocol, after its override.
    pub(crate) fn proxy_protocol(&self, params: &ListenerParams) -> bool {
        params.use_proxy_protocol.unwrap_or(self.use_proxy_protocol)
    }

    /// Timeouts for `params`, after its override.
    pub(crate) fn timeouts<'a>(&'a self, params: &'a ListenerParams) -> &'a TimeoutParameters {
        params.timeouts.as_ref().unwrap_or(&self.timeouts)
    }
}

/// Bind address and per-listener overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerParams {
    pub address: String,
    pub port: u16,
    pub use_proxy_protocol: Option<bool>,
    pub timeouts: Option<TimeoutParameters>,
}

impl ListenerParams {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
            use_proxy_protocol: None,
            timeouts: None,
        }
    }
}

/// HTTP connection manager timeouts. `None` leaves Envoy's default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutParameters {
    pub connection_idle: Option<Duration>,
    pub stream_idle: Option<Duration>,
    pub max_connection_duration: Option<Duration>,
    /// Drain time between the first GOAWAY and connection close.
    pub connection_shutdown_grace_period: Option<Duration>,
    pub request: Option<Duration>,
}

impl Default for TimeoutParameters {
    fn default() -> Self {
        Self {
            connection_idle: Some(Duration::from_secs(60)),
            stream_idle: Some(Duration::from_secs(300)),
            max_connection_duration: None,
            connection_shutdown_grace_period: Some(Duration::from_secs(5)),
            request: None,
        }
    }
}
