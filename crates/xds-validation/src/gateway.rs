//! Admission checks for Gateway and GatewayClass objects.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::errors::{FieldError, FieldErrors, FieldPath};
use crate::metadata::{
    is_controller_name, is_dns_label, is_hostname, validate_object_meta, ObjectMeta, Scope,
};

/// Listener protocols the control plane can program.
pub const SUPPORTED_PROTOCOLS: [&str; 4] = ["HTTP", "HTTPS", "TLS", "TCP"];

/// Condition types that mark a class as taken by its controller.
const ADMITTED_CONDITIONS: [&str; 2] = ["Accepted", "Admitted"];

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
    pub observed_generation: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParametersReference {
    pub group: String,
    pub kind: String,
    pub name: String,
    pub namespace: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GatewayClassSpec {
    #[serde(default)]
    pub controller_name: String,
    pub parameters_ref: Option<ParametersReference>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GatewayClassStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct GatewayClass {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: GatewayClassSpec,
    pub status: Option<GatewayClassStatus>,
}

impl GatewayClass {
    /// Whether a controller has marked this class accepted.
    pub fn is_admitted(&self) -> bool {
        self.status.as_ref().is_some_and(|status| {
            status.conditions.iter().any(|c| {
                ADMITTED_CONDITIONS.contains(&c.type_.as_str()) && c.status == "True"
            })
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Listener {
    #[serde(default)]
    pub name: String,
    pub hostname: Option<String>,
    #[serde(default)]
    pub port: i32,
    #[serde(default)]
    pub protocol: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySpec {
    #[serde(default)]
    pub gateway_class_name: String,
    #[serde(default)]
    pub listeners: Vec<Listener>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Gateway {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: GatewaySpec,
}

/// Read access to GatewayClass objects.
#[async_trait]
pub trait ClassLookup: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch a class by name; `Ok(None)` when it does not exist.
    async fn gateway_class(&self, name: &str) -> Result<Option<GatewayClass>, Self::Error>;
}

/// Check a GatewayClass this controller is asked to own.
pub fn validate_gateway_class(class: &GatewayClass, controller: &str) -> FieldErrors {
    let mut errors = validate_object_meta(&class.metadata, Scope::Cluster, &FieldPath::new("metadata"));
    let spec = FieldPath::new("spec");

    let controller_name = spec.child("controllerName");
    if class.spec.controller_name.is_empty() {
        errors.push(FieldError::required(controller_name, "controller name is required"));
    } else if !is_controller_name(&class.spec.controller_name) {
        errors.push(FieldError::invalid(
            controller_name,
            &class.spec.controller_name,
            "must be a domain prefixed path, such as example.com/controller",
        ));
    } else if class.spec.controller_name != controller {
        errors.push(FieldError::invalid(
            controller_name,
            &class.spec.controller_name,
            format!("must be {controller}"),
        ));
    }

    if class.spec.parameters_ref.is_some() {
        errors.push(FieldError::forbidden(
            spec.child("parametersRef"),
            "parameter references are not supported",
        ));
    }

    errors
}

/// Check a Gateway and the class it references.
///
/// Every violation is reported; a failing lookup is reported as an
/// internal error on `spec.gatewayClassName`.
pub async fn validate_gateway<L>(lookup: &L, gateway: &Gateway, controller: &str) -> FieldErrors
where
    L: ClassLookup + ?Sized,
{
    let mut errors =
        validate_object_meta(&gateway.metadata, Scope::Namespaced, &FieldPath::new("metadata"));
    let spec = FieldPath::new("spec");

    let class_field = spec.child("gatewayClassName");
    let class_name = gateway.spec.gateway_class_name.as_str();
    if class_name.is_empty() {
        errors.push(FieldError::required(class_field, "gateway class name is required"));
    } else {
        match lookup.gateway_class(class_name).await {
            Ok(None) => errors.push(FieldError::not_found(class_field, class_name)),
            Ok(Some(class)) => {
                if class.spec.controller_name != controller {
                    errors.push(FieldError::invalid(
                        class_field,
                        class_name,
                        format!(
                            "gateway class is managed by {:?}, not {controller}",
                            class.spec.controller_name
                        ),
                    ));
                } else if !class.is_admitted() {
                    errors.push(FieldError::invalid(
                        class_field,
                        class_name,
                        "gateway class has not been accepted by its controller",
                    ));
                }
            }
            Err(e) => {
                debug!(class = class_name, error = %e, "gateway class lookup failed");
                errors.push(FieldError::internal(
                    class_field,
                    format!("looking up gateway class: {e}"),
                ));
            }
        }
    }

    errors.extend(validate_listeners(&gateway.spec.listeners, &spec.child("listeners")));
    errors
}

fn validate_listeners(listeners: &[Listener], path: &FieldPath) -> FieldErrors {
    let mut errors = Vec::new();
    if listeners.is_empty() {
        errors.push(FieldError::required(path.clone(), "at least one listener is required"));
        return errors;
    }

    let mut names = HashSet::new();
    for (i, listener) in listeners.iter().enumerate() {
        let path = path.index(i);

        let name = path.child("name");
        if listener.name.is_empty() {
            errors.push(FieldError::required(name, "listener name is required"));
        } else if !is_dns_label(&listener.name) {
            errors.push(FieldError::invalid(
                name,
                &listener.name,
                "must be a lowercase RFC 1123 label",
            ));
        } else if !names.insert(listener.name.as_str()) {
            errors.push(FieldError::duplicate(name, &listener.name));
        }

        if !(1..=65535).contains(&listener.port) {
            errors.push(FieldError::invalid(
                path.child("port"),
                listener.port,
                "must be between 1 and 65535",
            ));
        }

        if !SUPPORTED_PROTOCOLS.contains(&listener.protocol.as_str()) {
            errors.push(FieldError::not_supported(
                path.child("protocol"),
                &listener.protocol,
                &SUPPORTED_PROTOCOLS,
            ));
        }

        if let Some(hostname) = &listener.hostname {
            if !is_hostname(hostname) {
                errors.push(FieldError::invalid(
                    path.child("hostname"),
                    hostname,
                    "must be a lowercase hostname, optionally prefixed with *.",
                ));
            }
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const CONTROLLER: &str = "projectcontour.io/contour";

    #[derive(Debug, thiserror::Error)]
    #[error("api server unavailable")]
    struct Unavailable;

    #[derive(Default)]
    struct Classes {
        classes: HashMap<String, GatewayClass>,
        broken: bool,
    }

    #[async_trait]
    impl ClassLookup for Classes {
        type Error = Unavailable;

        async fn gateway_class(&self, name: &str) -> Result<Option<GatewayClass>, Unavailable> {
            if self.broken {
                return Err(Unavailable);
            }
            Ok(self.classes.get(name).cloned())
        }
    }

    fn class(controller: &str, accepted: bool) -> GatewayClass {
        serde_json::from_value(serde_json::json!({
            "metadata": { "name": "contour" },
            "spec": { "controllerName": controller },
            "status": { "conditions": [
                { "type": "Accepted", "status": if accepted { "True" } else { "False" } }
            ]}
        }))
        .unwrap()
    }

    fn gateway() -> Gateway {
        serde_json::from_value(serde_json::json!({
            "metadata": { "name": "ingress", "namespace": "projectcontour" },
            "spec": {
                "gatewayClassName": "contour",
                "listeners": [
                    { "name": "http", "port": 80, "protocol": "HTTP" },
                    { "name": "https", "port": 443, "protocol": "HTTPS", "hostname": "*.example.com" }
                ]
            }
        }))
        .unwrap()
    }

    fn lookup(class: GatewayClass) -> Classes {
        Classes {
            classes: HashMap::from([(class.metadata.name.clone(), class)]),
            broken: false,
        }
    }

    #[test]
    fn valid_class() {
        assert!(validate_gateway_class(&class(CONTROLLER, true), CONTROLLER).is_empty());
    }

    #[test]
    fn class_for_another_controller() {
        let errors = validate_gateway_class(&class("example.com/other", true), CONTROLLER);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field().as_str(), "spec.controllerName");
    }

    #[test]
    fn class_problems_are_all_reported() {
        let mut class = class("not-a-controller", true);
        class.metadata.name = "Contour".into();
        class.spec.parameters_ref = Some(ParametersReference {
            group: "example.com".into(),
            kind: "Config".into(),
            name: "params".into(),
            namespace: None,
        });

        let errors = validate_gateway_class(&class, CONTROLLER);
        let fields: Vec<_> = errors.iter().map(|e| e.field().as_str()).collect();
        assert_eq!(
            fields,
            ["metadata.name", "spec.controllerName", "spec.parametersRef"]
        );
    }

    #[test]
    fn admission_conditions() {
        assert!(class(CONTROLLER, true).is_admitted());
        assert!(!class(CONTROLLER, false).is_admitted());

        let mut legacy = class(CONTROLLER, false);
        legacy.status = Some(GatewayClassStatus {
            conditions: vec![Condition {
                type_: "Admitted".into(),
                status: "True".into(),
                ..Default::default()
            }],
        });
        assert!(legacy.is_admitted());
        assert!(!GatewayClass::default().is_admitted());
    }

    #[tokio::test]
    async fn valid_gateway() {
        let errors = validate_gateway(&lookup(class(CONTROLLER, true)), &gateway(), CONTROLLER).await;
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[tokio::test]
    async fn missing_class() {
        let errors = validate_gateway(&Classes::default(), &gateway(), CONTROLLER).await;
        assert!(matches!(errors.as_slice(), [FieldError::NotFound { .. }]));
    }

    #[tokio::test]
    async fn class_not_admitted() {
        let errors = validate_gateway(&lookup(class(CONTROLLER, false)), &gateway(), CONTROLLER).await;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field().as_str(), "spec.gatewayClassName");
    }

    #[tokio::test]
    async fn class_owned_elsewhere() {
        let errors =
            validate_gateway(&lookup(class("example.com/other", true)), &gateway(), CONTROLLER).await;
        assert!(matches!(errors.as_slice(), [FieldError::Invalid { .. }]));
    }

    #[tokio::test]
    async fn lookup_failure_is_an_internal_error() {
        let classes = Classes {
            broken: true,
            ..Default::default()
        };
        let errors = validate_gateway(&classes, &gateway(), CONTROLLER).await;
        assert!(matches!(errors.as_slice(), [FieldError::Internal { .. }]));
    }

    #[tokio::test]
    async fn every_listener_problem_is_reported() {
        let mut gw = gateway();
        gw.spec.listeners = vec![
            Listener {
                name: "http".into(),
                port: 0,
                protocol: "UDP".into(),
                hostname: Some("bad_host".into()),
            },
            Listener {
                name: "http".into(),
                port: 80,
                protocol: "HTTP".into(),
                hostname: None,
            },
        ];

        let errors = validate_gateway(&lookup(class(CONTROLLER, true)), &gw, CONTROLLER).await;
        let fields: Vec<_> = errors.iter().map(|e| e.field().as_str()).collect();
        assert_eq!(
            fields,
            [
                "spec.listeners[0].port",
                "spec.listeners[0].protocol",
                "spec.listeners[0].hostname",
                "spec.listeners[1].name",
            ]
        );
    }

    #[tokio::test]
    async fn gateway_without_listeners_or_class() {
        let mut gw = gateway();
        gw.spec.gateway_class_name.clear();
        gw.spec.listeners.clear();

        let errors = validate_gateway(&Classes::default(), &gw, CONTROLLER).await;
        assert!(matches!(
            errors.as_slice(),
            [FieldError::Required { .. }, FieldError::Required { .. }]
        ));
    }
}
