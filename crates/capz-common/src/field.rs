//! Field-level validation errors
//!
//! Paths render in the dotted form used by Kubernetes API validation,
//! for example `metadata.annotations[some-key]` or `spec.controlPlaneEndpoint.host`.

use std::fmt;

/// A path to a field inside an object
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldPath {
    rendered: String,
}

impl FieldPath {
    /// Start a path at the given root field
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            rendered: root.into(),
        }
    }

    /// Descend into a named child field
    pub fn child(&self, name: &str) -> Self {
        Self {
            rendered: format!("{}.{}", self.rendered, name),
        }
    }

    /// Select a map entry by key
    pub fn key(&self, key: &str) -> Self {
        Self {
            rendered: format!("{}[{}]", self.rendered, key),
        }
    }

    /// The rendered path
    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

/// The category of a field error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldErrorType {
    /// The value is not acceptable
    Invalid,
    /// The change is not allowed
    Forbidden,
}

impl fmt::Display for FieldErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldErrorType::Invalid => write!(f, "Invalid value"),
            FieldErrorType::Forbidden => write!(f, "Forbidden"),
        }
    }
}

/// A single field validation failure
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    /// Path of the offending field
    pub field: FieldPath,
    /// Error category
    pub error_type: FieldErrorType,
    /// The offending value, when there is one
    pub bad_value: Option<String>,
    /// Human-readable reason
    pub detail: String,
}

impl FieldError {
    /// An unacceptable value
    pub fn invalid(field: FieldPath, value: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            field,
            error_type: FieldErrorType::Invalid,
            bad_value: Some(value.into()),
            detail: detail.into(),
        }
    }

    /// A forbidden change, optionally naming the value involved
    pub fn forbidden(field: FieldPath, value: Option<&str>, detail: impl Into<String>) -> Self {
        Self {
            field,
            error_type: FieldErrorType::Forbidden,
            bad_value: value.map(str::to_string),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.bad_value {
            Some(value) => write!(
                f,
                "{}: {}: \"{}\": {}",
                self.field, self.error_type, value, self.detail
            ),
            None => write!(f, "{}: {}: {}", self.field, self.error_type, self.detail),
        }
    }
}

/// An ordered collection of field errors reported together
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrorList(Vec<FieldError>);

impl FieldErrorList {
    /// True when no errors were recorded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the recorded errors
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }
}

impl FromIterator<FieldError> for FieldErrorList {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for FieldErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "[{}]", rendered.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_rendering() {
        let path = FieldPath::new("metadata").child("annotations").key("a/b-c");
        assert_eq!(path.to_string(), "metadata.annotations[a/b-c]");

        let path = FieldPath::new("spec")
            .child("controlPlaneEndpoint")
            .child("port");
        assert_eq!(path.as_str(), "spec.controlPlaneEndpoint.port");
    }

    #[test]
    fn test_invalid_error_display() {
        let err = FieldError::invalid(
            FieldPath::new("metadata").child("annotations").key("k"),
            "false",
            "annotation k is immutable",
        );
        assert_eq!(
            err.to_string(),
            "metadata.annotations[k]: Invalid value: \"false\": annotation k is immutable"
        );
    }

    #[test]
    fn test_forbidden_without_value_display() {
        let err = FieldError::forbidden(FieldPath::new("spec"), None, "not allowed");
        assert_eq!(err.to_string(), "spec: Forbidden: not allowed");
        assert_eq!(err.error_type, FieldErrorType::Forbidden);
    }

    #[test]
    fn test_list_display_and_collect() {
        let list: FieldErrorList = vec![
            FieldError::forbidden(FieldPath::new("a"), Some("1"), "first"),
            FieldError::forbidden(FieldPath::new("b"), None, "second"),
        ]
        .into_iter()
        .collect();

        assert_eq!(list.iter().count(), 2);
        let msg = list.to_string();
        assert!(msg.starts_with('['));
        assert!(msg.ends_with(']'));
        assert_eq!(msg, "[a: Forbidden: \"1\": first, b: Forbidden: second]");
    }

    #[test]
    fn test_empty_list() {
        let list = FieldErrorList::default();
        assert!(list.is_empty());
        assert_eq!(list.to_string(), "[]");

        let list: FieldErrorList = [FieldError::forbidden(FieldPath::new("x"), None, "y")]
            .into_iter()
            .collect();
        assert!(!list.is_empty());
        assert_eq!(list.iter().count(), 1);
    }
}
