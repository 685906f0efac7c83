/// Scope id of the aggregate portfolio record
pub const PORTFOLIO_TOTAL_SCOPE_ID: &str = "TOTAL";

/// Decimal precision for return calculations
pub const DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Tolerance (currency units) for the asset-sum vs record cash-flow invariant
pub const CASH_FLOW_TOLERANCE: &str = "0.01";

/// Attributed ledger flow below this magnitude counts as "no recorded flow"
/// when probing for implied cash flows
pub const IMPLIED_FLOW_TRIGGER: &str = "0.01";

/// Unit-count changes below this magnitude are treated as rounding noise
pub const UNITS_EPSILON: &str = "0.00000001";
