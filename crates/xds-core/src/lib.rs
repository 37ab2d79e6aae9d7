//! # xds-core
//!
//! Core types shared by every crate of the ingress control plane:
//!
//! - [`XdsError`] - error type with gRPC status mapping
//! - [`TypeUrl`] - the served resource kinds
//! - [`ResourceVersion`] - version tokens derived from cache counters
//! - [`NodeHash`] - compact proxy identity for logs and metrics
//! - [`Resource`] / [`TypedMessage`] - protobuf messages bound to type URLs
//! - [`naming`] - fixed listener names and content-addressed naming
//!
//! ## Example
//!
//! ```rust
//! use xds_core::{naming, NodeHash, ResourceVersion};
//!
//! let node = NodeHash::from_node("envoy-0", "ingress");
//! let version = ResourceVersion::new(3);
//! assert_eq!(version.to_string(), "3");
//! assert_eq!(naming::HTTPS_LISTENER, "ingress_https");
//! # let _ = node;
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod message;
pub mod naming;
mod node;
mod type_url;
mod version;

pub use error::XdsError;
pub use message::{Resource, TypedMessage};
pub use node::NodeHash;
pub use type_url::TypeUrl;
pub use version::ResourceVersion;

/// Result type alias using [`XdsError`].
pub type Result<T> = std::result::Result<T, XdsError>;

/// Alias for [`Result`].
pub type XdsResult<T> = Result<T>;
