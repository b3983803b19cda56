//! Token usage accounting

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Token counts reported for a single provider call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

impl Usage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64, total_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    }

    /// Field-wise sum of two optional usage records; a missing side counts as zero
    pub fn aggregate(a: Option<&Usage>, b: Option<&Usage>) -> Usage {
        let zero = Usage::default();
        *a.unwrap_or(&zero) + *b.unwrap_or(&zero)
    }
}

impl Add for Usage {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            prompt_tokens: self.prompt_tokens.saturating_add(rhs.prompt_tokens),
            completion_tokens: self.completion_tokens.saturating_add(rhs.completion_tokens),
            total_tokens: self.total_tokens.saturating_add(rhs.total_tokens),
        }
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_with_missing_operand() {
        let usage = Usage::new(10, 5, 15);
        assert_eq!(Usage::aggregate(None, Some(&usage)), usage);
        assert_eq!(Usage::aggregate(Some(&usage), None), usage);
        assert_eq!(Usage::aggregate(None, None), Usage::default());
    }

    #[test]
    fn test_aggregate_sums_fields() {
        let a = Usage::new(10, 5, 15);
        let b = Usage::new(7, 3, 10);
        let sum = Usage::aggregate(Some(&a), Some(&b));
        assert_eq!(sum, Usage::new(17, 8, 25));
        assert_eq!(sum.total_tokens, a.total_tokens + b.total_tokens);

        let mut acc = a;
        acc += b;
        assert_eq!(acc, sum);
    }

    #[test]
    fn test_missing_fields_deserialize_as_zero() {
        let usage: Usage = serde_json::from_str(r#"{"prompt_tokens": 4}"#).unwrap();
        assert_eq!(usage, Usage::new(4, 0, 0));
    }
}
