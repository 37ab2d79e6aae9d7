//! `envoy.config.route.v3` messages.

use std::collections::BTreeMap;

use prost_types::{Any, Duration};

use crate::base::HeaderValueOption;
use crate::matcher::{RegexMatcher, StringMatcher};

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RouteConfiguration {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, repeated, tag = "2")]
    pub virtual_hosts: Vec<VirtualHost>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VirtualHost {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, repeated, tag = "2")]
    pub domains: Vec<String>,
    #[prost(message, repeated, tag = "3")]
    pub routes: Vec<Route>,
    #[prost(btree_map = "string, message", tag = "15")]
    pub typed_per_filter_config: BTreeMap<String, Any>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Route {
    #[prost(string, tag = "14")]
    pub name: String,
    #[prost(message, optional, tag = "1")]
    pub r#match: Option<RouteMatch>,
    #[prost(oneof = "route::Action", tags = "2, 3")]
    pub action: Option<route::Action>,
    #[prost(message, repeated, tag = "9")]
    pub request_headers_to_add: Vec<HeaderValueOption>,
    #[prost(message, repeated, tag = "10")]
    pub response_headers_to_add: Vec<HeaderValueOption>,
    #[prost(string, repeated, tag = "11")]
    pub response_headers_to_remove: Vec<String>,
    #[prost(string, repeated, tag = "12")]
    pub request_headers_to_remove: Vec<String>,
    #[prost(btree_map = "string, message", tag = "13")]
    pub typed_per_filter_config: BTreeMap<String, Any>,
}

pub mod route {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Action {
        #[prost(message, tag = "2")]
        Route(super::RouteAction),
        #[prost(message, tag = "3")]
        Redirect(super::RedirectAction),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RouteMatch {
    #[prost(oneof = "route_match::PathSpecifier", tags = "1, 2, 10")]
    pub path_specifier: Option<route_match::PathSpecifier>,
    #[prost(message, repeated, tag = "6")]
    pub headers: Vec<HeaderMatcher>,
}

pub mod route_match {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum PathSpecifier {
        #[prost(string, tag = "1")]
        Prefix(String),
        #[prost(string, tag = "2")]
        Path(String),
        #[prost(message, tag = "10")]
        SafeRegex(super::RegexMatcher),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HeaderMatcher {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(oneof = "header_matcher::HeaderMatchSpecifier", tags = "7, 13")]
    pub header_match_specifier: Option<header_matcher::HeaderMatchSpecifier>,
    #[prost(bool, tag = "8")]
    pub invert_match: bool,
}

pub mod header_matcher {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum HeaderMatchSpecifier {
        #[prost(bool, tag = "7")]
        PresentMatch(bool),
        #[prost(message, tag = "13")]
        StringMatch(super::StringMatcher),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RouteAction {
    #[prost(oneof = "route_action::ClusterSpecifier", tags = "1, 3")]
    pub cluster_specifier: Option<route_action::ClusterSpecifier>,
    #[prost(string, tag = "5")]
    pub prefix_rewrite: String,
    #[prost(message, optional, tag = "8")]
    pub timeout: Option<Duration>,
    #[prost(message, optional, tag = "9")]
    pub retry_policy: Option<RetryPolicy>,
    #[prost(message, repeated, tag = "15")]
    pub hash_policy: Vec<route_action::HashPolicy>,
    #[prost(message, optional, tag = "24")]
    pub idle_timeout: Option<Duration>,
    #[prost(message, repeated, tag = "25")]
    pub upgrade_configs: Vec<route_action::UpgradeConfig>,
}

pub mod route_action {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ClusterSpecifier {
        #[prost(string, tag = "1")]
        Cluster(String),
        #[prost(message, tag = "3")]
        WeightedClusters(super::WeightedCluster),
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct UpgradeConfig {
        #[prost(string, tag = "1")]
        pub upgrade_type: String,
        #[prost(message, optional, tag = "2")]
        pub enabled: Option<bool>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct HashPolicy {
        #[prost(oneof = "hash_policy::PolicySpecifier", tags = "2")]
        pub policy_specifier: Option<hash_policy::PolicySpecifier>,
        #[prost(bool, tag = "4")]
        pub terminal: bool,
    }

    pub mod hash_policy {
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Cookie {
            #[prost(string, tag = "1")]
            pub name: String,
            #[prost(message, optional, tag = "2")]
            pub ttl: Option<::prost_types::Duration>,
            #[prost(string, tag = "3")]
            pub path: String,
        }

        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum PolicySpecifier {
            #[prost(message, tag = "2")]
            Cookie(Cookie),
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WeightedCluster {
    #[prost(message, repeated, tag = "1")]
    pub clusters: Vec<weighted_cluster::ClusterWeight>,
}

pub mod weighted_cluster {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ClusterWeight {
        #[prost(string, tag = "1")]
        pub name: String,
        #[prost(message, optional, tag = "2")]
        pub weight: Option<u32>,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RetryPolicy {
    #[prost(string, tag = "1")]
    pub retry_on: String,
    #[prost(message, optional, tag = "2")]
    pub num_retries: Option<u32>,
    #[prost(message, optional, tag = "3")]
    pub per_try_timeout: Option<Duration>,
    #[prost(uint32, repeated, tag = "7")]
    pub retriable_status_codes: Vec<u32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RedirectAction {
    #[prost(string, tag = "1")]
    pub host_redirect: String,
    #[prost(enumeration = "redirect_action::RedirectResponseCode", tag = "3")]
    pub response_code: i32,
    #[prost(oneof = "redirect_action::SchemeRewriteSpecifier", tags = "4")]
    pub scheme_rewrite_specifier: Option<redirect_action::SchemeRewriteSpecifier>,
}

pub mod redirect_action {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum RedirectResponseCode {
        MovedPermanently = 0,
        Found = 1,
        SeeOther = 2,
        TemporaryRedirect = 3,
        PermanentRedirect = 4,
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum SchemeRewriteSpecifier {
        #[prost(bool, tag = "4")]
        HttpsRedirect(bool),
    }
}

impl Route {
    /// The route action, if this route forwards.
    pub fn route_action(&self) -> Option<&RouteAction> {
        match &self.action {
            Some(route::Action::Route(action)) => Some(action),
            _ => None,
        }
    }
}
