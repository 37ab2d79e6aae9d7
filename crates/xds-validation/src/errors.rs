//! Field-scoped validation errors.

use std::fmt;

use thiserror::Error;

/// Location of a field inside an object, e.g. `spec.listeners[1].port`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(String);

impl FieldPath {
    /// A top-level field.
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    /// A named child of this field.
    pub fn child(&self, name: &str) -> Self {
        if self.0.is_empty() {
            return Self::new(name);
        }
        Self(format!("{}.{}", self.0, name))
    }

    /// An element of this list field.
    pub fn index(&self, i: usize) -> Self {
        Self(format!("{}[{}]", self.0, i))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One violation, tied to the field it concerns.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("{field}: Required value: {detail}")]
    Required { field: FieldPath, detail: String },

    #[error("{field}: Invalid value: {value:?}: {detail}")]
    Invalid {
        field: FieldPath,
        value: String,
        detail: String,
    },

    #[error("{field}: Unsupported value: {value:?}: supported values: {}", .supported.join(", "))]
    NotSupported {
        field: FieldPath,
        value: String,
        supported: Vec<&'static str>,
    },

    #[error("{field}: Not found: {value:?}")]
    NotFound { field: FieldPath, value: String },

    #[error("{field}: Duplicate value: {value:?}")]
    Duplicate { field: FieldPath, value: String },

    #[error("{field}: Forbidden: {detail}")]
    Forbidden { field: FieldPath, detail: String },

    /// The check itself could not be carried out.
    #[error("{field}: Internal error: {detail}")]
    Internal { field: FieldPath, detail: String },
}

impl FieldError {
    pub fn required(field: FieldPath, detail: impl Into<String>) -> Self {
        Self::Required {
            field,
            detail: detail.into(),
        }
    }

    pub fn invalid(field: FieldPath, value: impl fmt::Display, detail: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            value: value.to_string(),
            detail: detail.into(),
        }
    }

    pub fn not_supported(
        field: FieldPath,
        value: impl Into<String>,
        supported: &[&'static str],
    ) -> Self {
        Self::NotSupported {
            field,
            value: value.into(),
            supported: supported.to_vec(),
        }
    }

    pub fn not_found(field: FieldPath, value: impl Into<String>) -> Self {
        Self::NotFound {
            field,
            value: value.into(),
        }
    }

    pub fn duplicate(field: FieldPath, value: impl Into<String>) -> Self {
        Self::Duplicate {
            field,
            value: value.into(),
        }
    }

    pub fn forbidden(field: FieldPath, detail: impl Into<String>) -> Self {
        Self::Forbidden {
            field,
            detail: detail.into(),
        }
    }

    pub fn internal(field: FieldPath, detail: impl Into<String>) -> Self {
        Self::Internal {
            field,
            detail: detail.into(),
        }
    }

    /// The field this error concerns.
    pub fn field(&self) -> &FieldPath {
        match self {
            Self::Required { field, .. }
            | Self::Invalid { field, .. }
            | Self::NotSupported { field, .. }
            | Self::NotFound { field, .. }
            | Self::Duplicate { field, .. }
            | Self::Forbidden { field, .. }
            | Self::Internal { field, .. } => field,
        }
    }
}

/// Every violation found in one object. Empty means valid.
pub type FieldErrors = Vec<FieldError>;
