//! Virtual hosts and routes.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use xds_core::TypedMessage;
use xds_dag::{self as dag, HeaderMatchKind, LoadBalancerStrategy, PathMatch};
use xds_types::base::{HeaderValueOption, HttpStatus, RuntimeFractionalPercent, TokenBucket};
use xds_types::filters::LocalRateLimit;
use xds_types::matcher::{RegexMatcher, StringMatcher};
use xds_types::route::{
    header_matcher::HeaderMatchSpecifier, redirect_action, route, route_action, route_match,
    weighted_cluster, HeaderMatcher, RedirectAction, RetryPolicy, Route, RouteAction, RouteMatch,
    VirtualHost, WeightedCluster,
};
use xds_types::wellknown;

use super::duration;
use crate::names::cluster_name;

/// Cookie carrying the session affinity hash.
pub const SESSION_AFFINITY_COOKIE: &str = "X-Ingress-Session-Affinity";

/// Status returned by rate limited routes unless they choose another.
pub const DEFAULT_RATE_LIMIT_STATUS: u16 = 429;

pub fn virtual_host(name: &str, routes: Vec<Route>) -> VirtualHost {
    VirtualHost {
        name: name.to_string(),
        domains: domains(name),
        routes,
        typed_per_filter_config: BTreeMap::new(),
    }
}

/// `*` matches everything; other names also match with any port appended.
pub fn domains(name: &str) -> Vec<String> {
    if name == "*" {
        vec!["*".into()]
    } else {
        vec![name.to_string(), format!("{name}:*")]
    }
}

/// Order routes so that the first match Envoy picks is the most specific:
/// exact before regex before prefix, then longer match strings, then larger
/// strings, then routes with more header conditions.
pub fn compare_routes(a: &dag::Route, b: &dag::Route) -> Ordering {
    fn rank(path: &PathMatch) -> (u8, &str) {
        match path {
            PathMatch::Exact(s) => (0, s.as_str()),
            PathMatch::Regex(s) => (1, s.as_str()),
            PathMatch::Prefix(s) => (2, s.as_str()),
        }
    }
    let (rank_a, path_a) = rank(&a.path);
    let (rank_b, path_b) = rank(&b.path);
    rank_a
        .cmp(&rank_b)
        .then_with(|| path_b.len().cmp(&path_a.len()))
        .then_with(|| path_b.cmp(path_a))
        .then_with(|| b.headers.len().cmp(&a.headers.len()))
}

pub fn route_match(source: &dag::Route) -> RouteMatch {
    let path_specifier = match &source.path {
        PathMatch::Prefix(p) => route_match::PathSpecifier::Prefix(p.clone()),
        PathMatch::Exact(p) => route_match::PathSpecifier::Path(p.clone()),
        PathMatch::Regex(r) => route_match::PathSpecifier::SafeRegex(RegexMatcher::new(r)),
    };

    let mut headers: Vec<_> = source
        .headers
        .iter()
        .map(|h| HeaderMatcher {
            name: h.name.clone(),
            header_match_specifier: Some(match &h.kind {
                HeaderMatchKind::Exact(v) => HeaderMatchSpecifier::StringMatch(StringMatcher::exact(v)),
                HeaderMatchKind::Contains(v) => {
                    HeaderMatchSpecifier::StringMatch(StringMatcher::contains(v))
                }
                HeaderMatchKind::Present => HeaderMatchSpecifier::PresentMatch(true),
            }),
            invert_match: h.invert,
        })
        .collect();
    headers.sort_by(|a, b| a.name.cmp(&b.name));

    RouteMatch {
        path_specifier: Some(path_specifier),
        headers,
    }
}

/// Permanent redirect of the same request to HTTPS.
pub fn https_redirect(source: &dag::Route) -> Route {
    Route {
        r#match: Some(route_match(source)),
        action: Some(route::Action::Redirect(RedirectAction {
            response_code: redirect_action::RedirectResponseCode::MovedPermanently as i32,
            scheme_rewrite_specifier: Some(redirect_action::SchemeRewriteSpecifier::HttpsRedirect(
                true,
            )),
            ..Default::default()
        })),
        ..Default::default()
    }
}

/// Route forwarding to `source`'s clusters, or `None` when it has none.
///
/// `stat_prefix` names the rate limit statistics of the owning host.
pub fn forward(source: &dag::Route, stat_prefix: &str) -> Option<Route> {
    let action = route_action(source)?;

    let mut out = Route {
        r#match: Some(route_match(source)),
        action: Some(route::Action::Route(action)),
        request_headers_to_add: headers_to_set(&source.request_headers),
        request_headers_to_remove: headers_to_remove(&source.request_headers),
        response_headers_to_add: headers_to_set(&source.response_headers),
        response_headers_to_remove: headers_to_remove(&source.response_headers),
        ..Default::default()
    };

    if let Some(limit) = &source.rate_limit {
        out.typed_per_filter_config.insert(
            wellknown::LOCAL_RATE_LIMIT.into(),
            local_rate_limit(limit, stat_prefix).to_any(),
        );
    }

    Some(out)
}

fn route_action(source: &dag::Route) -> Option<RouteAction> {
    let cluster_specifier = match source.clusters.as_slice() {
        [] => return None,
        [single] => route_action::ClusterSpecifier::Cluster(cluster_name(single)),
        many => route_action::ClusterSpecifier::WeightedClusters(weighted_clusters(many)),
    };

    let hash_policy = if source
        .clusters
        .iter()
        .any(|c| c.load_balancer == LoadBalancerStrategy::Cookie)
    {
        vec![route_action::HashPolicy {
            policy_specifier: Some(route_action::hash_policy::PolicySpecifier::Cookie(
                route_action::hash_policy::Cookie {
                    name: SESSION_AFFINITY_COOKIE.into(),
                    ttl: Some(prost_types::Duration::default()),
                    path: "/".into(),
                },
            )),
            terminal: true,
        }]
    } else {
        Vec::new()
    };

    let upgrade_configs = if source.websocket {
        vec![route_action::UpgradeConfig {
            upgrade_type: "websocket".into(),
            enabled: None,
        }]
    } else {
        Vec::new()
    };

    Some(RouteAction {
        cluster_specifier: Some(cluster_specifier),
        prefix_rewrite: source.prefix_rewrite.clone().unwrap_or_default(),
        timeout: source.timeout_policy.response.map(duration),
        idle_timeout: source.timeout_policy.idle.map(duration),
        retry_policy: source.retry_policy.as_ref().map(retry_policy),
        hash_policy,
        upgrade_configs,
    })
}

/// Clusters sorted by name; when no weight is set every cluster gets one.
fn weighted_clusters(clusters: &[dag::Cluster]) -> WeightedCluster {
    let total = clusters.iter().fold(0u32, |acc, c| acc.saturating_add(c.weight));
    let mut weights: Vec<_> = clusters
        .iter()
        .map(|c| weighted_cluster::ClusterWeight {
            name: cluster_name(c),
            weight: Some(if total == 0 { 1 } else { c.weight }),
        })
        .collect();
    weights.sort_by(|a, b| a.name.cmp(&b.name));
    WeightedCluster { clusters: weights }
}

fn retry_policy(policy: &dag::RetryPolicy) -> RetryPolicy {
    RetryPolicy {
        retry_on: policy.retry_on.clone(),
        num_retries: Some(policy.num_retries),
        per_try_timeout: policy.per_try_timeout.map(duration),
        retriable_status_codes: policy.retriable_status_codes.clone(),
    }
}

fn headers_to_set(policy: &dag::HeadersPolicy) -> Vec<HeaderValueOption> {
    let mut set: Vec<_> = policy.set.iter().collect();
    set.sort_by(|a, b| a.0.cmp(&b.0));
    set.into_iter()
        .map(|(k, v)| HeaderValueOption::overwrite(k, v))
        .collect()
}

fn headers_to_remove(policy: &dag::HeadersPolicy) -> Vec<String> {
    let mut remove = policy.remove.clone();
    remove.sort();
    remove.dedup();
    remove
}

pub fn local_rate_limit(limit: &dag::LocalRateLimit, stat_prefix: &str) -> LocalRateLimit {
    LocalRateLimit {
        stat_prefix: stat_prefix.to_string(),
        status: Some(HttpStatus {
            code: i32::from(limit.response_status.unwrap_or(DEFAULT_RATE_LIMIT_STATUS)),
        }),
        token_bucket: Some(TokenBucket {
            max_tokens: limit.requests.saturating_add(limit.burst),
            tokens_per_fill: Some(limit.requests),
            fill_interval: Some(duration(limit.unit.as_duration())),
        }),
        filter_enabled: Some(RuntimeFractionalPercent::always("local_rate_limit_enabled")),
        filter_enforced: Some(RuntimeFractionalPercent::always("local_rate_limit_enforced")),
    }
}
