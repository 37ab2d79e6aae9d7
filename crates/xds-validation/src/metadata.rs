//! Naming rules for object metadata and hostnames.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::errors::{FieldError, FieldErrors, FieldPath};

const DNS_LABEL_MAX: usize = 63;
const DNS_SUBDOMAIN_MAX: usize = 253;

const DNS_LABEL: &str = r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$";
const DNS_SUBDOMAIN: &str = r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$";
const HOSTNAME: &str = r"^(\*\.)?[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$";
const CONTROLLER_NAME: &str =
    r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*/[A-Za-z0-9/\-._~%!$&'()*+,;=:]+$";

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("pattern is a valid constant regex"))
}

fn matches(cell: &'static OnceLock<Regex>, pattern: &str, value: &str) -> bool {
    compiled(cell, pattern).is_match(value)
}

/// An RFC 1123 label, as used for namespaces and listener names.
pub fn is_dns_label(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    value.len() <= DNS_LABEL_MAX && matches(&RE, DNS_LABEL, value)
}

/// An RFC 1123 subdomain, as used for most object names.
pub fn is_dns_subdomain(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    value.len() <= DNS_SUBDOMAIN_MAX && matches(&RE, DNS_SUBDOMAIN, value)
}

/// A precise or `*.`-prefixed wildcard hostname.
pub fn is_hostname(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    value.len() <= DNS_SUBDOMAIN_MAX
        && value.split('.').all(|label| label.len() <= DNS_LABEL_MAX)
        && matches(&RE, HOSTNAME, value)
}

/// A controller name of the form `example.com/path`.
pub fn is_controller_name(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    value.len() <= DNS_SUBDOMAIN_MAX && matches(&RE, CONTROLLER_NAME, value)
}

/// The parts of object metadata that are validated.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    pub namespace: Option<String>,
    pub generation: Option<i64>,
}

/// Whether an object kind lives in a namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Namespaced,
    Cluster,
}

/// Check name and namespace against the rules for `scope`.
pub fn validate_object_meta(meta: &ObjectMeta, scope: Scope, path: &FieldPath) -> FieldErrors {
    let mut errors = Vec::new();

    let name = path.child("name");
    if meta.name.is_empty() {
        errors.push(FieldError::required(name, "name is required"));
    } else if !is_dns_subdomain(&meta.name) {
        errors.push(FieldError::invalid(
            name,
            &meta.name,
            "must be a lowercase RFC 1123 subdomain",
        ));
    }

    let namespace = path.child("namespace");
    match (scope, meta.namespace.as_deref()) {
        (Scope::Namespaced, None | Some("")) => {
            errors.push(FieldError::required(namespace, "namespace is required"));
        }
        (Scope::Namespaced, Some(ns)) if !is_dns_label(ns) => {
            errors.push(FieldError::invalid(
                namespace,
                ns,
                "must be a lowercase RFC 1123 label",
            ));
        }
        (Scope::Cluster, Some(ns)) if !ns.is_empty() => {
            errors.push(FieldError::forbidden(
                namespace,
                "not allowed on cluster-scoped objects",
            ));
        }
        _ => {}
    }

    errors
}
