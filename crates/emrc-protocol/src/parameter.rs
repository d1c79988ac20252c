//! Template parameter types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Data type of a job template parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateParameterDataType {
    Number,
    String,
}

impl TemplateParameterDataType {
    /// The wire name of this data type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "NUMBER",
            Self::String => "STRING",
        }
    }
}

impl fmt::Display for TemplateParameterDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a symbolic type name is not a known data type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown parameter type: {0}")]
pub struct ParseDataTypeError(pub String);

impl FromStr for TemplateParameterDataType {
    type Err = ParseDataTypeError;

    /// Case-sensitive: only `STRING` and `NUMBER` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STRING" => Ok(Self::String),
            "NUMBER" => Ok(Self::Number),
            other => Err(ParseDataTypeError(other.to_string())),
        }
    }
}

/// A parameter declared by a job template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateParameterConfiguration {
    #[serde(rename = "type")]
    pub data_type: TemplateParameterDataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!("STRING".parse(), Ok(TemplateParameterDataType::String));
        assert_eq!("NUMBER".parse(), Ok(TemplateParameterDataType::Number));

        let err = "string".parse::<TemplateParameterDataType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown parameter type: string");
    }

    #[test]
    fn test_configuration_wire_shape() {
        let config = TemplateParameterConfiguration {
            data_type: TemplateParameterDataType::Number,
            default_value: Some("4".to_string()),
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json, serde_json::json!({"type": "NUMBER", "defaultValue": "4"}));
    }
}
