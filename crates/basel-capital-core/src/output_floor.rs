use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// Output floor applied to an IRB exposure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputFloorOutcome {
    pub floor_pct: Rate,
    /// floor_pct × standardized RWA
    pub floor_term: Money,
    pub irb_rwa: Money,
    pub standardized_rwa: Money,
    pub final_rwa: Money,
    /// Floor term strictly above IRB RWA
    pub floor_bound: bool,
}

/// `final = max(irb, pct × standardized)`.
pub fn apply_floor(irb_rwa: Money, standardized_rwa: Money, floor_pct: Rate) -> OutputFloorOutcome {
    let floor_term = floor_pct * standardized_rwa;
    let floor_bound = floor_term > irb_rwa;
    OutputFloorOutcome {
        floor_pct,
        floor_term,
        irb_rwa,
        standardized_rwa,
        final_rwa: if floor_bound { floor_term } else { irb_rwa },
        floor_bound,
    }
}

impl OutputFloorOutcome {
    /// RWA added by the floor (zero when not binding).
    pub fn add_on(&self) -> Money {
        (self.final_rwa - self.irb_rwa).max(Decimal::ZERO)
    }
}
