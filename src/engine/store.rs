use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ulid::Ulid;

use crate::model::*;

/// Day-indexed slot state. Days are created on first touch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    schedule: ShiftSchedule,
    capacity: u32,
    days: BTreeMap<NaiveDate, CalendarDay>,
}

impl Calendar {
    pub fn new(schedule: ShiftSchedule, capacity: u32) -> Self {
        Self {
            schedule,
            capacity,
            days: BTreeMap::new(),
        }
    }

    pub fn schedule(&self) -> &ShiftSchedule {
        &self.schedule
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn layout_for(&self, date: NaiveDate) -> ShiftLayout {
        self.schedule.layout_for(date)
    }

    // ── Days ─────────────────────────────────────────────────

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    pub fn contains_day(&self, date: NaiveDate) -> bool {
        self.days.contains_key(&date)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.days.get(&date)
    }

    pub fn get_or_create(&mut self, date: NaiveDate) -> &mut CalendarDay {
        let layout = self.schedule.layout_for(date);
        let capacity = self.capacity;
        self.days.entry(date).or_insert_with(|| {
            debug!(%date, ?layout, "creating calendar day");
            CalendarDay::new(date, layout, capacity)
        })
    }

    /// Days in date order.
    pub fn days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.days.values()
    }

    // ── Increments ───────────────────────────────────────────

    pub fn increment(&self, date: NaiveDate, index: usize) -> Option<&Increment> {
        self.days.get(&date).and_then(|d| d.increment(index))
    }

    pub fn runner_ups(&self, date: NaiveDate, index: usize) -> &[RunnerUp] {
        self.increment(date, index)
            .map(|inc| inc.runner_ups.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_employee_off(&self, date: NaiveDate, id: &EmployeeId) -> bool {
        self.days.get(&date).is_some_and(|d| d.has_employee(id))
    }

    // ── Reconciliation ───────────────────────────────────────

    /// Re-derive slot assignments from persisted picks. Assignments within an
    /// increment are ordered by approval sequence. Picks without one fall back
    /// to their place, which only holds for their first approved increment.
    /// Runner-up ledgers are not persisted on picks and come back empty.
    pub fn rebuild(schedule: ShiftSchedule, capacity: u32, employees: &[Employee]) -> Self {
        let mut calendar = Self::new(schedule, capacity);
        let mut slots: HashMap<(NaiveDate, usize), Vec<((u64, usize, usize), &EmployeeId, Ulid, Rank)>> =
            HashMap::new();
        let mut seq = 0;

        for employee in employees {
            for pick in employee.processed.iter().filter(|p| p.is_approved()) {
                let Some(approved) = pick.approved else { continue };
                let first = approved.indices().next();
                for index in approved.indices() {
                    let place = match pick.place {
                        Some(place) if Some(index) == first => place,
                        _ => usize::MAX,
                    };
                    let key = (pick.sequence.unwrap_or(u64::MAX), place, seq);
                    slots
                        .entry((pick.date, index))
                        .or_default()
                        .push((key, &employee.id, pick.id, employee.rank));
                    seq += 1;
                }
            }
        }

        let mut keys: Vec<_> = slots.keys().copied().collect();
        keys.sort();
        for key in keys {
            let Some(mut entries) = slots.remove(&key) else { continue };
            entries.sort_by_key(|(key, ..)| *key);
            let day = calendar.get_or_create(key.0);
            let Some(inc) = day.increments.get_mut(&key.1) else { continue };
            for (_, id, pick_id, rank) in entries {
                inc.assigned.push(Assignment {
                    employee_id: id.clone(),
                    pick_id,
                    rank,
                });
                *inc.rank_counts.entry(rank).or_insert(0) += 1;
            }
        }
        calendar
    }
}
