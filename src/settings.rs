use serde::{Deserialize, Serialize};

/// Settings for the function declarations produced by the kernel builder.
///
/// Missing fields take their default values when deserializing, so drivers only need to
/// specify what they change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelSettings {
    /// Qualifiers placed in front of the function declaration.
    pub function_qualifiers: Vec<String>,
    pub return_type: String,
}

impl Default for KernelSettings {
    fn default() -> Self {
        Self {
            function_qualifiers: vec!["static".to_string(), "inline".to_string()],
            return_type: "void".to_string(),
        }
    }
}

impl KernelSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_function_qualifiers<S: Into<String>>(self, qualifiers: impl IntoIterator<Item = S>) -> Self {
        Self {
            function_qualifiers: qualifiers.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    pub fn with_return_type(self, return_type: impl Into<String>) -> Self {
        Self {
            return_type: return_type.into(),
            ..self
        }
    }
}
