//! Traits tying protobuf messages to their type URLs.

use prost_types::Any;

/// A protobuf message with a well-known type URL.
///
/// Implemented by every message that travels inside a `google.protobuf.Any`,
/// whether a top-level discovery resource or an embedded filter config.
pub trait TypedMessage: prost::Message + Sized {
    /// Fully qualified type URL.
    const TYPE_URL: &'static str;

    /// Pack this message into an `Any`.
    fn to_any(&self) -> Any {
        Any {
            type_url: Self::TYPE_URL.to_string(),
            value: self.encode_to_vec(),
        }
    }
}

/// A top-level resource served over a discovery stream.
///
/// The resource name is the key proxies subscribe with and the key resource
/// caches sort by.
pub trait Resource: TypedMessage + Clone + Default + Send + Sync + std::fmt::Debug + 'static {
    /// Name of this resource.
    fn name(&self) -> &str;
}
