//! Error type shared by every stage of the rewrite pipeline.

use crate::ast::Span;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilerError {
    #[error("Parse error{}: {0}", at(.1))]
    ParseError(String, Option<Span>),

    #[error("Malformed apply call{}: {0}", at(.1))]
    MalformedApply(String, Option<Span>),

    #[error("Name collision{}: {0}", at(.1))]
    NameCollision(String, Option<Span>),

    #[error("Pipeline error: {0}")]
    PipelineError(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, CompilerError>;

fn at(span: &Option<Span>) -> String {
    match span {
        Some(span) if !span.is_generated() => format!(" at {}", span),
        _ => String::new(),
    }
}

impl CompilerError {
    pub fn span(&self) -> Option<Span> {
        match self {
            CompilerError::ParseError(_, span)
            | CompilerError::MalformedApply(_, span)
            | CompilerError::NameCollision(_, span) => *span,
            CompilerError::PipelineError(_) | CompilerError::ConfigError(_) => None,
        }
    }
}

#[macro_export]
macro_rules! err_parse {
    ($($arg:tt)*) => {
        $crate::error::CompilerError::ParseError(format!($($arg)*), None)
    };
}

#[macro_export]
macro_rules! err_parse_at {
    ($span:expr, $($arg:tt)*) => {
        $crate::error::CompilerError::ParseError(format!($($arg)*), Some($span))
    };
}

#[macro_export]
macro_rules! bail_parse {
    ($($arg:tt)*) => {
        return Err($crate::err_parse!($($arg)*))
    };
}

#[macro_export]
macro_rules! bail_parse_at {
    ($span:expr, $($arg:tt)*) => {
        return Err($crate::err_parse_at!($span, $($arg)*))
    };
}

#[macro_export]
macro_rules! err_apply_at {
    ($span:expr, $($arg:tt)*) => {
        $crate::error::CompilerError::MalformedApply(format!($($arg)*), Some($span))
    };
}

#[macro_export]
macro_rules! bail_apply_at {
    ($span:expr, $($arg:tt)*) => {
        return Err($crate::err_apply_at!($span, $($arg)*))
    };
}

#[macro_export]
macro_rules! err_collision_at {
    ($span:expr, $($arg:tt)*) => {
        $crate::error::CompilerError::NameCollision(format!($($arg)*), Some($span))
    };
}

#[macro_export]
macro_rules! err_pipeline {
    ($($arg:tt)*) => {
        $crate::error::CompilerError::PipelineError(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! bail_pipeline {
    ($($arg:tt)*) => {
        return Err($crate::err_pipeline!($($arg)*))
    };
}

#[macro_export]
macro_rules! err_config {
    ($($arg:tt)*) => {
        $crate::error::CompilerError::ConfigError(format!($($arg)*))
    };
}
