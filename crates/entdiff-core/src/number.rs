use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number as JsonNumber;

use crate::CanonicalizeError;

/// A finite IEEE-754 double, the numeric leaf of an entity graph.
#[derive(Clone, Copy, Debug, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Number(f64);

impl Number {
    /// Creates a new [`Number`] after validating finiteness.
    ///
    /// ```
    /// # use entdiff_core::Number;
    /// let num = Number::new(42.0)?;
    /// assert_eq!(num.get(), 42.0);
    /// assert!(Number::new(f64::NAN).is_err());
    /// # Ok::<(), entdiff_core::CanonicalizeError>(())
    /// ```
    pub fn new(value: f64) -> Result<Self, CanonicalizeError> {
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(CanonicalizeError::NotFinite { value })
        }
    }

    /// Returns the raw floating-point value.
    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }

    /// Returns the value as an `i64` when it is integral and in range.
    #[must_use]
    pub fn as_i64(self) -> Option<i64> {
        if self.0.fract() == 0.0 && (i64::MIN as f64) <= self.0 && self.0 <= (i64::MAX as f64) {
            Some(self.0 as i64)
        } else {
            None
        }
    }

    /// Converts the number into a `serde_json::Number` using minimal integer representation when possible.
    pub fn to_json_number(self) -> JsonNumber {
        if !(self.0 == 0.0 && self.0.is_sign_negative()) {
            if let Some(int) = self.as_i64() {
                return JsonNumber::from(int);
            }
        }
        // Finiteness is checked on construction.
        JsonNumber::from_f64(self.0).unwrap_or_else(|| JsonNumber::from(0))
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Self(f64::from(value))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json_number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_values_render_without_fraction() {
        assert_eq!(Number::from(7).to_string(), "7");
        assert_eq!(Number::new(1.5).unwrap().to_string(), "1.5");
    }

    #[test]
    fn negative_zero_keeps_its_sign() {
        let value = Number::new(-0.0).unwrap().to_json_number();
        assert_eq!(serde_json::to_string(&value).unwrap(), "-0.0");
    }

    #[test]
    fn as_i64_rejects_fractions() {
        assert_eq!(Number::new(2.0).unwrap().as_i64(), Some(2));
        assert_eq!(Number::new(2.5).unwrap().as_i64(), None);
    }
}
