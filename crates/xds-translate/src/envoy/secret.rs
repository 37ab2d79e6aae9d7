//! SDS secrets.

use xds_dag as dag;
use xds_types::base::DataSource;
use xds_types::tls::{secret, Secret, TlsCertificate};

use crate::names::secret_name;

/// A TLS certificate secret carrying `source`'s key material inline.
pub fn secret(source: &dag::Secret) -> Secret {
    Secret {
        name: secret_name(source),
        r#type: Some(secret::Type::TlsCertificate(TlsCertificate {
            certificate_chain: Some(DataSource::inline_bytes(source.certificate_chain.clone())),
            private_key: Some(DataSource::inline_bytes(source.private_key.clone())),
        })),
    }
}
