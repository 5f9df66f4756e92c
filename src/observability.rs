use crate::model::Determination;

// ── Allocation throughput ───────────────────────────────────────

/// Counter: picks resolved. Labels: determination.
pub const PICKS_RESOLVED_TOTAL: &str = "shiftpick_picks_resolved_total";

/// Counter: runner-up ledger entries recorded.
pub const RUNNER_UPS_TOTAL: &str = "shiftpick_runner_ups_total";

/// Counter: scheduling rounds executed.
pub const ROUNDS_TOTAL: &str = "shiftpick_rounds_total";

/// Histogram: wall time of one allocation run in seconds.
pub const ALLOCATION_DURATION_SECONDS: &str = "shiftpick_allocation_duration_seconds";

// ── Inputs ──────────────────────────────────────────────────────

/// Gauge: shift groups in the last batch.
pub const SHIFT_GROUPS: &str = "shiftpick_shift_groups";

/// Gauge: employees loaded from the roster.
pub const EMPLOYEES_LOADED: &str = "shiftpick_employees_loaded";

/// Short label for a determination.
pub fn determination_label(d: Determination) -> &'static str {
    match d {
        Determination::Unaddressed => "unaddressed",
        Determination::Approved => "approved",
        Determination::Rejected => "rejected",
    }
}
