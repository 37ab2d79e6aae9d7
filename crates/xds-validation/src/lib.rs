//! # xds-validation
//!
//! Admission checks for Gateway API objects the control plane is asked to
//! serve.
//!
//! Checks never stop at the first problem: they return every
//! [`FieldError`] found so callers can report them all at once. They hold
//! no state; the only outside input is a [`ClassLookup`] for resolving the
//! class a Gateway references.
//!
//! ```rust
//! use xds_validation::{validate_gateway_class, GatewayClass, GatewayClassSpec, ObjectMeta};
//!
//! let class = GatewayClass {
//!     metadata: ObjectMeta { name: "contour".into(), ..Default::default() },
//!     spec: GatewayClassSpec {
//!         controller_name: "projectcontour.io/contour".into(),
//!         ..Default::default()
//!     },
//!     status: None,
//! };
//! assert!(validate_gateway_class(&class, "projectcontour.io/contour").is_empty());
//! ```

#![deny(unsafe_code)]

mod errors;
mod gateway;
mod metadata;

pub use errors::{FieldError, FieldErrors, FieldPath};
pub use gateway::{
    validate_gateway, validate_gateway_class, ClassLookup, Condition, Gateway, GatewayClass,
    GatewayClassSpec, GatewayClassStatus, GatewaySpec, Listener, ParametersReference,
    SUPPORTED_PROTOCOLS,
};
pub use metadata::{
    is_controller_name, is_dns_label, is_dns_subdomain, is_hostname, validate_object_meta,
    ObjectMeta, Scope,
};
