//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Built-in default settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// AWS region (default: "us-east-1")
    pub region: String,

    /// Declarative input path (default: "example.yaml")
    pub templates_path: String,

    /// Deadline for the whole run in seconds (default: 30)
    pub timeout_seconds: u64,

    /// How identifiers map onto parameter names (default: "broadcast")
    pub assignment: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            templates_path: "example.yaml".to_string(),
            timeout_seconds: 30,
            assignment: "broadcast".to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    ///
    /// There is no default for `parameter_names`; it must come from a later layer.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "region": self.region,
            "templates_path": self.templates_path,
            "timeout_seconds": self.timeout_seconds,
            "assignment": self.assignment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let defaults = BuiltinDefaults::default();
        assert_eq!(defaults.region, "us-east-1");
        assert_eq!(defaults.templates_path, "example.yaml");
        assert_eq!(defaults.timeout_seconds, 30);
    }

    #[test]
    fn test_to_value_has_no_parameter_names() {
        let value = BuiltinDefaults::default().to_value();
        assert_eq!(value["region"], "us-east-1");
        assert_eq!(value["assignment"], "broadcast");
        assert!(value.get("parameter_names").is_none());
    }
}
