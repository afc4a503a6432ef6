//! Stylesheet syntax tree

use crate::ScssError;

/// A validated SCSS identifier (variable, mixin or parameter name)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident(String);

impl Ident {
    /// Validate an identifier: `[A-Za-z_-][A-Za-z0-9_-]*`
    pub fn new(name: impl Into<String>) -> Result<Self, ScssError> {
        let name = name.into();
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_' || first == '-')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            }
            None => false,
        };
        if valid {
            Ok(Self(name))
        } else {
            Err(ScssError::InvalidIdent(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A raw value token emitted verbatim (`16px`, `#f00`, `block`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal(String);

impl Literal {
    pub fn new(raw: impl Into<String>) -> Result<Self, ScssError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed
                .chars()
                .any(|c| matches!(c, ';' | '{' | '}' | '\n' | '\r'))
        {
            return Err(ScssError::InvalidLiteral(raw));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// SCSS expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Quoted string
    Str(String),
    /// Raw token
    Literal(Literal),
    Number(f64),
    /// Variable reference, rendered as `$name`
    Var(Ident),
    /// Ordered map; keys are always quoted
    Map(Vec<(String, Expr)>),
    /// Function call; the function may be module-qualified (`map.get`)
    Call { function: String, args: Vec<Expr> },
    Null,
    /// Backslash-escaped single character (`\_`)
    Escaped(char),
}

impl Expr {
    pub fn str(value: impl Into<String>) -> Self {
        Expr::Str(value.into())
    }

    pub fn literal(raw: impl Into<String>) -> Result<Self, ScssError> {
        Literal::new(raw).map(Expr::Literal)
    }

    pub fn number(value: f64) -> Result<Self, ScssError> {
        if value.is_finite() {
            Ok(Expr::Number(value))
        } else {
            Err(ScssError::NonFiniteNumber(value))
        }
    }

    pub fn var(name: impl Into<String>) -> Result<Self, ScssError> {
        Ident::new(name).map(Expr::Var)
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Expr)>) -> Self {
        Expr::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a call, validating each dot-separated segment of the function name
    pub fn call(function: impl Into<String>, args: Vec<Expr>) -> Result<Self, ScssError> {
        let function = function.into();
        let valid = !function.is_empty()
            && function.split('.').all(|segment| Ident::new(segment).is_ok());
        if !valid {
            return Err(ScssError::InvalidFunction(function));
        }
        Ok(Expr::Call { function, args })
    }
}

/// Mixin parameter with an optional default value
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub default: Option<Expr>,
}

impl Param {
    pub fn new(name: impl Into<String>, default: Option<Expr>) -> Result<Self, ScssError> {
        Ok(Self {
            name: Ident::new(name)?,
            default,
        })
    }
}

/// Top-level or nested statement
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// `@use "<module>";`
    Use(String),
    /// `@import "<path>";`
    Import(String),
    /// `$name: value;`
    Variable { name: Ident, value: Expr },
    Mixin {
        name: Ident,
        params: Vec<Param>,
        body: Vec<Item>,
    },
    Include { name: Ident, args: Vec<Expr> },
    /// Line comment; multi-line text becomes several `//` lines
    Comment(String),
}

impl Item {
    pub fn variable(name: impl Into<String>, value: Expr) -> Result<Self, ScssError> {
        Ok(Item::Variable {
            name: Ident::new(name)?,
            value,
        })
    }

    pub fn include(name: impl Into<String>, args: Vec<Expr>) -> Result<Self, ScssError> {
        Ok(Item::Include {
            name: Ident::new(name)?,
            args,
        })
    }

    pub fn mixin(
        name: impl Into<String>,
        params: Vec<Param>,
        body: Vec<Item>,
    ) -> Result<Self, ScssError> {
        Ok(Item::Mixin {
            name: Ident::new(name)?,
            params,
            body,
        })
    }
}

/// An ordered list of items that renders to one SCSS source file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    items: Vec<Item>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: Item) -> &mut Self {
        self.items.push(item);
        self
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }
}
