//! Parameter type normalization
//!
//! Maps each declared parameter's symbolic type onto the service data type.
//! Type names are case-sensitive and the set is closed: anything other than
//! `STRING` or `NUMBER` fails the whole mapping.

use std::collections::BTreeMap;

use emrc_protocol::{ParseDataTypeError, TemplateParameterConfiguration, TemplateParameterDataType};

use crate::template::TemplateParameterConfiguration as DeclaredParameter;

/// Declared parameter mapping to service parameter mapping
pub trait ParameterConfigurator {
    fn configure(
        &self,
        parameters: &BTreeMap<String, DeclaredParameter>,
    ) -> Result<BTreeMap<String, TemplateParameterConfiguration>, ParseDataTypeError>;
}

/// Production normalizer
#[derive(Debug, Default, Clone, Copy)]
pub struct RealParameterConfigurator;

impl ParameterConfigurator for RealParameterConfigurator {
    fn configure(
        &self,
        parameters: &BTreeMap<String, DeclaredParameter>,
    ) -> Result<BTreeMap<String, TemplateParameterConfiguration>, ParseDataTypeError> {
        parameters
            .iter()
            .map(|(name, declared)| -> Result<_, ParseDataTypeError> {
                let data_type: TemplateParameterDataType = declared.parameter_type.parse()?;
                Ok((
                    name.clone(),
                    TemplateParameterConfiguration {
                        data_type,
                        default_value: declared.default_value.clone(),
                    },
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared(parameter_type: &str, default_value: Option<&str>) -> DeclaredParameter {
        DeclaredParameter {
            parameter_type: parameter_type.to_string(),
            default_value: default_value.map(str::to_string),
        }
    }

    #[test]
    fn test_known_types_map_and_keep_defaults() {
        let input: BTreeMap<_, _> = [
            ("Date".to_string(), declared("STRING", Some("2024-01-01"))),
            ("Executors".to_string(), declared("NUMBER", None)),
        ]
        .into_iter()
        .collect();

        let out = RealParameterConfigurator.configure(&input).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out["Date"].data_type, TemplateParameterDataType::String);
        assert_eq!(out["Date"].default_value.as_deref(), Some("2024-01-01"));
        assert_eq!(out["Executors"].data_type, TemplateParameterDataType::Number);
        assert_eq!(out["Executors"].default_value, None);
    }

    #[test]
    fn test_unknown_type_fails_whole_mapping() {
        let input: BTreeMap<_, _> = [
            ("A".to_string(), declared("STRING", None)),
            ("B".to_string(), declared("BOOLEAN", None)),
        ]
        .into_iter()
        .collect();

        let err = RealParameterConfigurator.configure(&input).unwrap_err();
        assert_eq!(err.to_string(), "unknown parameter type: BOOLEAN");
    }

    #[test]
    fn test_type_names_are_case_sensitive() {
        let input: BTreeMap<_, _> =
            [("A".to_string(), declared("string", None))].into_iter().collect();
        assert!(RealParameterConfigurator.configure(&input).is_err());
    }

    #[test]
    fn test_empty_mapping() {
        let out = RealParameterConfigurator.configure(&BTreeMap::new()).unwrap();
        assert!(out.is_empty());
    }
}
