//! Query parameter handling.
//!
//! The backend accepts flat mappings of scalar values. Absent entries are
//! dropped before encoding and every retained value is stringified, so a
//! caller can pass `page: 1, q: None` and only `page=1` reaches the wire.

use std::fmt;

/// A scalar value accepted in a query string or multipart form field.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(v) => f.write_str(v),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u64> for Scalar {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<u32> for Scalar {
    fn from(v: u32) -> Self {
        Self::UInt(u64::from(v))
    }
}

impl From<usize> for Scalar {
    fn from(v: usize) -> Self {
        Self::UInt(v as u64)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Ordered flat mapping of query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query(Vec<(String, Option<Scalar>)>);

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter.
    #[must_use]
    pub fn push(mut self, key: &str, value: impl Into<Scalar>) -> Self {
        self.0.push((key.to_string(), Some(value.into())));
        self
    }

    /// Add a parameter that may be absent. `None` is dropped at encode time.
    #[must_use]
    pub fn push_opt(mut self, key: &str, value: Option<impl Into<Scalar>>) -> Self {
        self.0.push((key.to_string(), value.map(Into::into)));
        self
    }

    /// Encode into string pairs: absent values dropped, scalars stringified.
    #[must_use]
    pub fn encode(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter_map(|(key, value)| {
                value
                    .as_ref()
                    .map(|scalar| (key.clone(), scalar.to_string()))
            })
            .collect()
    }

    /// Whether any parameter would survive encoding.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|(_, value)| value.is_none())
    }
}
