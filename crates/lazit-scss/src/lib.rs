//! Typed SCSS builder.
//!
//! Generators assemble a [`Stylesheet`] out of [`Item`]s and [`Expr`]s and
//! render it once at the end. Identifiers and raw literals are validated when
//! they are constructed, so a rendered stylesheet never contains an unescaped
//! string or a stray statement terminator coming from configuration input.

mod ast;
mod render;

pub use ast::{Expr, Ident, Item, Literal, Param, Stylesheet};
pub use render::format_number;

/// Errors raised while building a stylesheet
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScssError {
    #[error("invalid identifier '{0}'")]
    InvalidIdent(String),

    #[error("invalid function name '{0}'")]
    InvalidFunction(String),

    #[error("invalid literal '{0}': must be non-empty and free of ';', '{{', '}}' and line breaks")]
    InvalidLiteral(String),

    #[error("number {0} is not finite")]
    NonFiniteNumber(f64),
}
