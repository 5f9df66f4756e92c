//! Fixed policy constants and sanity limits.

/// Grants an employee may receive per round before yielding to the next person.
pub const DEFAULT_ROUND_CAP: usize = 2;

/// People who may be off in one increment.
pub const DEFAULT_CAPACITY: u32 = 5;

/// No leave of any kind before this many days of employment.
pub const PROBATION_NO_LEAVE_DAYS: i64 = 182;

/// End (exclusive) of the restricted probationary window.
pub const PROBATION_END_DAYS: i64 = 365;

/// Approvals allowed inside the restricted probationary window.
pub const PROBATION_HOLIDAY_LIMIT: usize = 4;

/// Combined Captain and Battalion Chief slots per increment.
pub const COMMAND_STAFF_SLOTS: i64 = 3;

/// Battalion Chiefs per increment regardless of Captains.
pub const MAX_BATTALION_CHIEFS: i64 = 2;

pub const MAX_INCREMENTS_PER_DAY: usize = 8;
pub const MAX_ROUND_CAP: usize = 64;
pub const MAX_CAPACITY: u32 = 10_000;
pub const MAX_EMPLOYEES: usize = 100_000;
pub const MAX_PICKS_PER_EMPLOYEE: usize = 1_000;
pub const MAX_GROUP_NAME_LEN: usize = 64;
