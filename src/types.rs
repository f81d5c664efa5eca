//! Core types - the property value representation.
//!
//! Observed properties hold loosely typed primitive values. A key may be
//! written with a value of a different type than it started with; the store
//! imposes no type constraint, only strict equality on writes.

// =============================================================================
// Value
// =============================================================================

/// A property value stored in a [`Store`](crate::reactive::Store).
///
/// Equality is strict: two values are equal only when they have the same
/// variant and the same payload. `Number` uses `f64` comparison, so
/// `NaN != NaN` - writing NaN over NaN always notifies.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A key that was never observed reads as `Absent`.
    Absent,
    Bool(bool),
    Number(f64),
    Str(String),
}

impl Value {
    /// Render the value for a display target.
    ///
    /// `Absent` renders as the empty string - reading an undeclared key
    /// is not an error, the target just shows nothing.
    pub fn display(&self) -> String {
        match self {
            Value::Absent => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Value::Str(s) => s.clone(),
        }
    }

    /// Whether this is the absent value.
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
