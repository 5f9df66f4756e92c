use chrono::NaiveDate;

use crate::model::*;

use super::{Allocation, Calendar, Engine};

impl Engine {
    pub fn employee(&self, id: &EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|e| &e.id == id)
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn pending_count(&self) -> usize {
        self.employees.iter().map(|e| e.pending.len()).sum()
    }

    pub fn has_pending(&self) -> bool {
        self.employees.iter().any(Employee::has_pending)
    }

    pub fn next_in_line(&self, date: NaiveDate, index: usize) -> Option<&RunnerUp> {
        next_in_line(&self.calendar, &self.employees, date, index)
    }
}

impl Allocation {
    pub fn employee(&self, id: &EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|e| &e.id == id)
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.calendar.get(date)
    }

    pub fn runner_ups(&self, date: NaiveDate, index: usize) -> &[RunnerUp] {
        self.calendar.runner_ups(date, index)
    }

    pub fn next_in_line(&self, date: NaiveDate, index: usize) -> Option<&RunnerUp> {
        next_in_line(&self.calendar, &self.employees, date, index)
    }
}

/// Earliest runner-up for a slot who could still take it: not already off that
/// date and with budget left for one increment of the day.
fn next_in_line<'a>(
    calendar: &'a Calendar,
    employees: &[Employee],
    date: NaiveDate,
    index: usize,
) -> Option<&'a RunnerUp> {
    let width = calendar.get(date)?.layout.len();
    let value = IncrementSet::only(index, width).shift_value();
    calendar.runner_ups(date, index).iter().find(|r| {
        employees
            .iter()
            .find(|e| e.id == r.employee_id)
            .is_some_and(|e| {
                !calendar.is_employee_off(date, &e.id) && e.approved_shifts + value <= e.max_shifts_off()
            })
    })
}
