//! Allocation pattern classifier for split contracts

use serde::{Serialize, Serializer};
use std::fmt;

/// How a split contract divides its revenue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitPattern {
    /// Two recipients at exactly 50% each
    FiftyFifty,
    /// Three recipients, at least one holding 33% or 34%
    EqualThreeWay,
    /// Every recipient holds `floor(100 / n)`
    EqualNWay(usize),
    Custom,
}

impl SplitPattern {
    /// Classifies recipients by their percent allocations
    ///
    /// The two- and three-way checks take precedence over the general equal-N check.
    pub fn classify(allocations: &[f64]) -> SplitPattern {
        let n = allocations.len();
        if n == 0 {
            return SplitPattern::Custom;
        }

        if n == 2 && allocations.iter().all(|a| *a == 50.0) {
            return SplitPattern::FiftyFifty;
        }

        if n == 3 && allocations.iter().any(|a| *a == 33.0 || *a == 34.0) {
            return SplitPattern::EqualThreeWay;
        }

        let equal_share = (100 / n) as f64;
        if allocations.iter().all(|a| *a == equal_share) {
            return SplitPattern::EqualNWay(n);
        }

        SplitPattern::Custom
    }
}

impl fmt::Display for SplitPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitPattern::FiftyFifty => f.write_str("50-50 Split"),
            SplitPattern::EqualThreeWay => f.write_str("Equal 3-Way"),
            SplitPattern::EqualNWay(n) => write!(f, "Equal {}-Way", n),
            SplitPattern::Custom => f.write_str("Custom Split"),
        }
    }
}

impl Serialize for SplitPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
