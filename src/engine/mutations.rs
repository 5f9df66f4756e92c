use tracing::trace;

use crate::model::*;
use crate::observability::{determination_label, PICKS_RESOLVED_TOTAL, RUNNER_UPS_TOTAL};

use super::validation::{evaluate, SlotFailure, Verdict};
use super::Engine;

impl Engine {
    /// Resolve the head of one employee's queue. `None` when the queue is empty.
    pub(super) fn process_next_pick(&mut self, idx: usize) -> Option<Determination> {
        let employee = self.employees.get_mut(idx)?;
        let mut pick = employee.pending.pop_front()?;
        let day = self.calendar.get_or_create(pick.date);

        match evaluate(employee, &mut pick, day, self.config.partial_grants) {
            Verdict::Approve {
                increments,
                note,
                blocked,
            } => {
                record_runner_ups(day, &employee.id, &pick, &blocked);
                let mut place = None;
                for index in increments.indices() {
                    if let Some(inc) = day.increments.get_mut(&index) {
                        let slot = inc.assign(employee.id.clone(), pick.id, employee.rank);
                        place.get_or_insert(slot);
                    }
                }
                let forced_holiday = pick.leave_type == LeaveType::Holiday;
                let leave_type = employee.draw_shifts(increments.shift_value(), forced_holiday);
                self.approvals += 1;
                pick.approve(increments, place, self.approvals, leave_type, note);
            }
            Verdict::Deny { reason, blocked } => {
                record_runner_ups(day, &employee.id, &pick, &blocked);
                pick.reject(reason);
            }
        }

        trace!(employee = %employee.id, pick = %pick, "resolved pick");
        let determination = pick.determination;
        metrics::counter!(PICKS_RESOLVED_TOTAL, "determination" => determination_label(determination))
            .increment(1);
        employee.processed.push(pick);
        Some(determination)
    }
}

fn record_runner_ups(day: &mut CalendarDay, employee_id: &EmployeeId, pick: &Pick, blocked: &[SlotFailure]) {
    for failure in blocked {
        if let Some(inc) = day.increments.get_mut(&failure.index) {
            inc.record_runner_up(employee_id.clone(), pick.id, failure.reason.clone());
            metrics::counter!(RUNNER_UPS_TOTAL).increment(1);
        }
    }
}
