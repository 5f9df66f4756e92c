use rust_decimal::Decimal;

use crate::limits::*;
use crate::model::*;

use super::PartialGrantPolicy;

/// Why one increment of a request could not be granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SlotFailure {
    pub index: usize,
    pub kind: SlotFailureKind,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotFailureKind {
    Capacity,
    Quota,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Verdict {
    Approve {
        increments: IncrementSet,
        note: Option<String>,
        blocked: Vec<SlotFailure>,
    },
    Deny {
        reason: String,
        blocked: Vec<SlotFailure>,
    },
}

/// Run the rule pipeline for one pick. The first failing employee-level rule
/// wins; slot rules are checked per requested increment. May set the pick's
/// leave type (probationary window forces Holiday).
pub(crate) fn evaluate(
    employee: &Employee,
    pick: &mut Pick,
    day: &CalendarDay,
    policy: PartialGrantPolicy,
) -> Verdict {
    if let Err(reason) = employee_rules(employee, pick, day) {
        return Verdict::Deny {
            reason,
            blocked: Vec::new(),
        };
    }

    let blocked = slot_failures(employee.rank, day, pick.requested);
    if blocked.is_empty() {
        return Verdict::Approve {
            increments: pick.requested,
            note: None,
            blocked,
        };
    }

    let granted = blocked
        .iter()
        .fold(pick.requested, |set, failure| set.without(failure.index));
    if policy == PartialGrantPolicy::GrantAvailable && !granted.is_empty() {
        return Verdict::Approve {
            increments: granted,
            note: Some(format!(
                "Partial grant - only {} available",
                granted.label(day.layout)
            )),
            blocked,
        };
    }

    Verdict::Deny {
        reason: primary_reason(&blocked),
        blocked,
    }
}

/// Capacity failures take precedence over quota failures when reporting.
fn primary_reason(blocked: &[SlotFailure]) -> String {
    blocked
        .iter()
        .find(|f| f.kind == SlotFailureKind::Capacity)
        .or_else(|| blocked.first())
        .map(|f| f.reason.clone())
        .unwrap_or_default()
}

// ── Employee-level rules ─────────────────────────────────

fn employee_rules(employee: &Employee, pick: &mut Pick, day: &CalendarDay) -> Result<(), String> {
    probationary_limitation(employee, pick)?;
    exclusion_window(employee, pick)?;
    leave_budget(employee, pick.requested.shift_value())?;
    duplicate_day(employee, day)
}

pub(crate) fn probationary_limitation(employee: &Employee, pick: &mut Pick) -> Result<(), String> {
    let tenure = employee.days_employed_on(pick.date);
    if tenure < PROBATION_NO_LEAVE_DAYS {
        return Err(format!(
            "No days off allowed within the first {PROBATION_NO_LEAVE_DAYS} days of hire"
        ));
    }
    if tenure < PROBATION_END_DAYS {
        pick.leave_type = LeaveType::Holiday;
        let taken = employee
            .processed
            .iter()
            .filter(|p| p.is_approved())
            .filter(|p| {
                let t = employee.days_employed_on(p.date);
                (PROBATION_NO_LEAVE_DAYS..PROBATION_END_DAYS).contains(&t)
            })
            .count();
        if taken >= PROBATION_HOLIDAY_LIMIT {
            return Err(format!(
                "Reached {PROBATION_HOLIDAY_LIMIT} holidays limit between {PROBATION_NO_LEAVE_DAYS} and {PROBATION_END_DAYS} days"
            ));
        }
    }
    Ok(())
}

pub(crate) fn exclusion_window(employee: &Employee, pick: &Pick) -> Result<(), String> {
    match employee.exclusion_for(pick.date) {
        Some(ex) => Err(format!("Schedule Reassignment: ({})", ex.reason)),
        None => Ok(()),
    }
}

pub(crate) fn leave_budget(employee: &Employee, value: Decimal) -> Result<(), String> {
    let max = employee.max_shifts_off();
    if employee.approved_shifts >= max {
        return Err("Max shifts off already reached".to_string());
    }
    if employee.approved_shifts + value > max {
        return Err("Shift would result in overage of time off".to_string());
    }
    Ok(())
}

pub(crate) fn duplicate_day(employee: &Employee, day: &CalendarDay) -> Result<(), String> {
    if day.has_employee(&employee.id) {
        return Err("Already requested this day off".to_string());
    }
    Ok(())
}

// ── Slot-level rules ─────────────────────────────────────

fn slot_failures(rank: Rank, day: &CalendarDay, requested: IncrementSet) -> Vec<SlotFailure> {
    requested
        .indices()
        .filter_map(|index| {
            let inc = day.increment(index)?;
            let (kind, result) = match increment_capacity(inc) {
                Err(reason) => (SlotFailureKind::Capacity, Err(reason)),
                Ok(()) => (SlotFailureKind::Quota, rank_quota(rank, inc, day.is_holiday)),
            };
            result.err().map(|reason| SlotFailure { index, kind, reason })
        })
        .collect()
}

pub(crate) fn increment_capacity(inc: &Increment) -> Result<(), String> {
    if inc.is_full() {
        return Err("Day already has maximum firefighters off".to_string());
    }
    Ok(())
}

/// Rank-composition limits for one increment. Counts are signed so the
/// derived limits may go negative without wrapping.
pub(crate) fn rank_quota(rank: Rank, inc: &Increment, is_holiday: bool) -> Result<(), String> {
    let captains = i64::from(inc.count(Rank::Captain));
    let chiefs = i64::from(inc.count(Rank::BattalionChief));
    let lieutenants = i64::from(inc.count(Rank::Lieutenant));
    let specialists = i64::from(inc.count(Rank::ApparatusSpecialist));
    let capacity = i64::from(inc.capacity);

    match rank {
        Rank::Captain | Rank::BattalionChief if is_holiday && (captains >= 1 || chiefs >= 1) => Err(format!(
            "Increment is a holiday, and already has {captains} Captains, and {chiefs} Battalion Chiefs off"
        )),
        Rank::Lieutenant if lieutenants >= capacity - captains => Err(format!(
            "Increment already has {lieutenants} Lieutenants and {captains} Captains off"
        )),
        Rank::Captain if captains >= COMMAND_STAFF_SLOTS - chiefs => Err(format!(
            "Increment already has {captains} Captains, {lieutenants} Lieutenants, and {chiefs} Battalion Chiefs off"
        )),
        Rank::BattalionChief if chiefs >= MAX_BATTALION_CHIEFS.min(COMMAND_STAFF_SLOTS - captains) => Err(format!(
            "Increment already has {chiefs} Battalion Chiefs and {captains} Captains off"
        )),
        Rank::ApparatusSpecialist if specialists >= capacity => Err(format!(
            "Increment already has {specialists} Apparatus Specialists off"
        )),
        _ => Ok(()),
    }
}
