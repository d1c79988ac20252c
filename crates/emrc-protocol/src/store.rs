//! PutParameter request payload.

use serde::{Deserialize, Serialize};

/// Value type of a parameter store entry. Identifiers are plain strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    #[default]
    String,
}

/// Write of a single parameter store entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutParameterRequest {
    pub name: String,
    pub value: String,
    #[serde(rename = "Type")]
    pub parameter_type: ParameterType,
    pub overwrite: bool,
}

impl PutParameterRequest {
    /// A plain string write that replaces any existing value.
    pub fn overwrite_string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            parameter_type: ParameterType::String,
            overwrite: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_string_defaults() {
        let req = PutParameterRequest::overwrite_string("/emr/template-id", "abc123");
        assert_eq!(req.parameter_type, ParameterType::String);
        assert!(req.overwrite);

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Name": "/emr/template-id",
                "Value": "abc123",
                "Type": "String",
                "Overwrite": true
            })
        );
    }

    #[test]
    fn test_only_plain_string_type_is_accepted() {
        let req: PutParameterRequest = serde_json::from_value(serde_json::json!({
            "Name": "/a", "Value": "x", "Type": "String", "Overwrite": true
        }))
        .unwrap();
        assert_eq!(req.parameter_type, ParameterType::String);

        let secure = serde_json::from_value::<PutParameterRequest>(serde_json::json!({
            "Name": "/a", "Value": "x", "Type": "SecureString", "Overwrite": true
        }));
        assert!(secure.is_err());
    }
}
