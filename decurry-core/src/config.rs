//! Which passes run, and how they are parameterized.
//!
//! The configuration is read once per process and shared read-only by every
//! file's pipeline.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::convention::WrapperConvention;
use crate::err_config;
use crate::error::Result;

/// Representation of inlined list literals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InlineLists {
    /// `{ $: 1, a: x, b: tail }` object literals
    #[default]
    AsObjects,
    /// `_List_Cons(x, tail)` calls
    AsCons,
}

/// Replacement for `_Utils_update(record, { ... })`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectUpdateMode {
    /// `{ ...record, field: value }`
    #[default]
    UseSpread,
    /// `Object.assign({}, record, { field: value })`
    UseAssign,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Transforms {
    /// Declaration name -> JavaScript expression source replacing its value.
    pub replacements: IndexMap<String, String>,
    pub variant_shapes: bool,
    pub inline_functions: bool,
    pub inline_equality: bool,
    pub inline_number_to_string: bool,
    /// `None` leaves `_List_fromArray` calls alone.
    pub list_literals: Option<InlineLists>,
    /// `None` leaves `_Utils_update` calls alone.
    pub object_update: Option<ObjectUpdateMode>,
    pub arrow_fns: bool,
    pub unused_values: bool,
    pub convention: WrapperConvention,
}

impl Default for Transforms {
    fn default() -> Self {
        Transforms {
            replacements: IndexMap::new(),
            variant_shapes: true,
            inline_functions: true,
            inline_equality: true,
            inline_number_to_string: true,
            list_literals: Some(InlineLists::AsObjects),
            object_update: None,
            arrow_fns: false,
            unused_values: true,
            convention: WrapperConvention::default(),
        }
    }
}

impl Transforms {
    /// Every rewrite disabled; only parse and print.
    pub fn none() -> Self {
        Transforms {
            replacements: IndexMap::new(),
            variant_shapes: false,
            inline_functions: false,
            inline_equality: false,
            inline_number_to_string: false,
            list_literals: None,
            object_update: None,
            arrow_fns: false,
            unused_values: false,
            convention: WrapperConvention::default(),
        }
    }

    /// Parse a JSON configuration; missing fields take their defaults.
    pub fn from_json(content: &str) -> Result<Self> {
        let transforms: Self =
            serde_json::from_str(content).map_err(|e| err_config!("invalid configuration: {}", e))?;
        transforms.convention.validate()?;
        Ok(transforms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompilerError;

    #[test]
    fn test_empty_object_gives_defaults() {
        assert_eq!(Transforms::from_json("{}").unwrap(), Transforms::default());
    }

    #[test]
    fn test_full_configuration() {
        let transforms = Transforms::from_json(
            r#"{
                "replacements": { "_VirtualDom_nodeNS": "function (namespace) { return namespace; }" },
                "variant_shapes": false,
                "list_literals": "as_cons",
                "object_update": "use_assign",
                "arrow_fns": true,
                "convention": { "curry_prefix": "F", "apply_prefix": "A" }
            }"#,
        )
        .unwrap();

        assert_eq!(transforms.replacements.len(), 1);
        assert!(!transforms.variant_shapes);
        assert!(transforms.inline_functions);
        assert_eq!(transforms.list_literals, Some(InlineLists::AsCons));
        assert_eq!(transforms.object_update, Some(ObjectUpdateMode::UseAssign));
        assert!(transforms.arrow_fns);
        assert_eq!(transforms.convention, WrapperConvention::elm());
    }

    #[test]
    fn test_null_disables_optional_passes() {
        let transforms = Transforms::from_json(r#"{ "list_literals": null }"#).unwrap();
        assert_eq!(transforms.list_literals, None);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = Transforms::from_json(r#"{ "inline_everything": true }"#).unwrap_err();
        assert!(matches!(err, CompilerError::ConfigError(_)));
    }

    #[test]
    fn test_invalid_convention_is_rejected() {
        let err = Transforms::from_json(r#"{ "convention": { "curry_prefix": "A", "apply_prefix": "A" } }"#)
            .unwrap_err();
        assert!(matches!(err, CompilerError::ConfigError(_)));
    }
}
