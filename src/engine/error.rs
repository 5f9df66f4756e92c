use chrono::NaiveDate;
use ulid::Ulid;

use crate::model::EmployeeId;

/// Input errors that abort a run before any pick is processed, plus the
/// scheduler's own safety net. Rule violations are never errors; they become
/// rejected picks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    DuplicateEmployee(EmployeeId),
    EmptySelection {
        employee: EmployeeId,
        date: NaiveDate,
    },
    SelectionMismatch {
        employee: EmployeeId,
        date: NaiveDate,
        expected: usize,
        actual: usize,
    },
    NegativeBudget(EmployeeId),
    AlreadyResolved {
        employee: EmployeeId,
        pick: Ulid,
    },
    InvalidExclusion {
        employee: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
    },
    InvalidRoundCap(usize),
    InvalidCapacity(u32),
    RoundLimitExceeded(usize),
    LimitExceeded(&'static str),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::DuplicateEmployee(id) => write!(f, "duplicate employee id: {id}"),
            EngineError::EmptySelection { employee, date } => {
                write!(f, "employee {employee}: pick on {date} selects no increments")
            }
            EngineError::SelectionMismatch {
                employee,
                date,
                expected,
                actual,
            } => write!(
                f,
                "employee {employee}: pick on {date} has {actual} increments, day has {expected}"
            ),
            EngineError::NegativeBudget(id) => write!(f, "employee {id}: negative leave budget"),
            EngineError::AlreadyResolved { employee, pick } => {
                write!(f, "employee {employee}: pending pick {pick} is already resolved")
            }
            EngineError::InvalidExclusion { employee, start, end } => {
                write!(f, "employee {employee}: exclusion ends ({end}) before it starts ({start})")
            }
            EngineError::InvalidRoundCap(k) => write!(f, "round cap must be at least 1, got {k}"),
            EngineError::InvalidCapacity(c) => write!(f, "increment capacity must be at least 1, got {c}"),
            EngineError::RoundLimitExceeded(n) => {
                write!(f, "allocation did not finish within {n} rounds")
            }
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
