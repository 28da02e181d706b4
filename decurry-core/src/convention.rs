//! Naming convention of the curry and apply runtime helpers.
//!
//! A curry wrapper is `<curry_prefix><N>` and an apply wrapper is
//! `<apply_prefix><N>`, where `N` is a decimal arity with no leading zero.
//! Arities outside `1..=max_arity` are not treated as wrappers.

use log::warn;
use serde::Deserialize;

use crate::err_config;
use crate::error::Result;

pub const DEFAULT_MAX_ARITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WrapperConvention {
    pub curry_prefix: String,
    pub apply_prefix: String,
    pub max_arity: usize,
}

impl Default for WrapperConvention {
    /// The generic `wrap<N>` / `apply<N>` convention.
    fn default() -> Self {
        WrapperConvention {
            curry_prefix: "wrap".to_string(),
            apply_prefix: "apply".to_string(),
            max_arity: DEFAULT_MAX_ARITY,
        }
    }
}

impl WrapperConvention {
    /// `F<N>` / `A<N>`, as emitted by the Elm compiler.
    pub fn elm() -> Self {
        WrapperConvention {
            curry_prefix: "F".to_string(),
            apply_prefix: "A".to_string(),
            max_arity: DEFAULT_MAX_ARITY,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.curry_prefix.is_empty() || self.apply_prefix.is_empty() {
            return Err(err_config!("wrapper prefixes must not be empty"));
        }
        if self.curry_prefix == self.apply_prefix {
            return Err(err_config!(
                "curry and apply prefixes are both {:?}",
                self.curry_prefix
            ));
        }
        if self.max_arity == 0 {
            return Err(err_config!("max_arity must be at least 1"));
        }
        Ok(())
    }

    /// Arity of `name` if it is a curry wrapper, e.g. `wrap2` -> 2.
    pub fn curry_arity(&self, name: &str) -> Option<usize> {
        self.parse_arity(&self.curry_prefix, name)
    }

    /// Arity of `name` if it is an apply wrapper, e.g. `apply3` -> 3.
    pub fn apply_arity(&self, name: &str) -> Option<usize> {
        self.parse_arity(&self.apply_prefix, name)
    }

    /// Wrapper name for `arity` under the curry prefix.
    pub fn curry_name(&self, arity: usize) -> String {
        format!("{}{}", self.curry_prefix, arity)
    }

    /// Wrapper name for `arity` under the apply prefix.
    pub fn apply_name(&self, arity: usize) -> String {
        format!("{}{}", self.apply_prefix, arity)
    }

    fn parse_arity(&self, prefix: &str, name: &str) -> Option<usize> {
        let digits = name.strip_prefix(prefix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) || digits.starts_with('0') {
            return None;
        }
        // A long digit run overflows usize; that is out of range too
        match digits.parse::<usize>() {
            Ok(arity) if arity <= self.max_arity => Some(arity),
            _ => {
                warn!(
                    "{} looks like a wrapper but its arity is outside 1..={}, leaving it alone",
                    name, self.max_arity
                );
                None
            }
        }
    }
}
