//! Read-only views over finished allocations: aggregate statistics, printable
//! roster rows, and pick date labels.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::engine::Allocation;
use crate::model::*;

const TOP_REASONS: usize = 10;
const TOP_WEEKS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tally {
    pub processed: usize,
    pub approved: usize,
    pub denied: usize,
    /// Percent of processed picks approved.
    pub approval_rate: f64,
}

impl Tally {
    fn record(&mut self, pick: &Pick) {
        match pick.determination {
            Determination::Approved => self.approved += 1,
            Determination::Rejected => self.denied += 1,
            Determination::Unaddressed => return,
        }
        self.processed += 1;
        self.approval_rate = if self.processed == 0 {
            0.0
        } else {
            self.approved as f64 * 100.0 / self.processed as f64
        };
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonthCounts {
    pub approved: usize,
    pub denied: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekCount {
    pub year: i32,
    pub week: u32,
    pub requests: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub employees: usize,
    pub totals: Tally,
    pub average_picks_per_person: f64,
    pub by_shift: BTreeMap<String, Tally>,
    pub by_rank: BTreeMap<String, Tally>,
    /// Most common denial reasons, most frequent first.
    pub rejection_reasons: Vec<(String, usize)>,
    /// Keyed by "YYYY-MM".
    pub monthly: BTreeMap<String, MonthCounts>,
    /// ISO weeks with the most resolved requests.
    pub busiest_weeks: Vec<WeekCount>,
}

pub fn summarize<'a>(employees: impl IntoIterator<Item = &'a Employee>) -> Summary {
    let mut headcount = 0;
    let mut totals = Tally::default();
    let mut by_shift: BTreeMap<String, Tally> = BTreeMap::new();
    let mut by_rank: BTreeMap<String, Tally> = BTreeMap::new();
    let mut reasons: HashMap<&str, usize> = HashMap::new();
    let mut monthly: BTreeMap<String, MonthCounts> = BTreeMap::new();
    let mut weeks: HashMap<(i32, u32), usize> = HashMap::new();

    for e in employees {
        headcount += 1;
        for pick in e.processed.iter().filter(|p| p.is_resolved()) {
            totals.record(pick);
            by_shift.entry(e.shift.clone()).or_default().record(pick);
            by_rank.entry(e.rank.to_string()).or_default().record(pick);

            let month = monthly.entry(pick.date.format("%Y-%m").to_string()).or_default();
            if pick.is_approved() {
                month.approved += 1;
            } else {
                month.denied += 1;
                if let Some(reason) = &pick.reason {
                    *reasons.entry(reason.as_str()).or_insert(0) += 1;
                }
            }

            let week = pick.date.iso_week();
            *weeks.entry((week.year(), week.week())).or_insert(0) += 1;
        }
    }

    let mut rejection_reasons: Vec<(String, usize)> =
        reasons.into_iter().map(|(r, n)| (r.to_string(), n)).collect();
    rejection_reasons.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rejection_reasons.truncate(TOP_REASONS);

    let mut busiest_weeks: Vec<WeekCount> = weeks
        .into_iter()
        .map(|((year, week), requests)| WeekCount { year, week, requests })
        .collect();
    busiest_weeks.sort_by(|a, b| {
        b.requests
            .cmp(&a.requests)
            .then_with(|| (a.year, a.week).cmp(&(b.year, b.week)))
    });
    busiest_weeks.truncate(TOP_WEEKS);

    let average_picks_per_person = if headcount == 0 {
        0.0
    } else {
        totals.processed as f64 / headcount as f64
    };

    Summary {
        employees: headcount,
        totals,
        average_picks_per_person,
        by_shift,
        by_rank,
        rejection_reasons,
        monthly,
        busiest_weeks,
    }
}

// ── Roster ───────────────────────────────────────────────

/// One printable line per increment: who is off and who is waiting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterRow {
    pub date: NaiveDate,
    pub increment: String,
    pub holiday: bool,
    /// "Doe, J (AM)" in approval order.
    pub off: Vec<String>,
    /// "1. Roe, A" in ledger order.
    pub runner_ups: Vec<String>,
}

pub fn roster_rows(allocation: &Allocation) -> Vec<RosterRow> {
    let people: HashMap<&EmployeeId, &Employee> = allocation.employees.iter().map(|e| (&e.id, e)).collect();
    let picks: HashMap<ulid::Ulid, &Pick> = allocation
        .employees
        .iter()
        .flat_map(|e| e.processed.iter())
        .map(|p| (p.id, p))
        .collect();
    let name = |id: &EmployeeId| people.get(id).map_or_else(|| id.to_string(), |e| e.display_name());

    let mut rows = Vec::new();
    for day in allocation.calendar.days() {
        for inc in day.increments.values() {
            let off = inc
                .assigned
                .iter()
                .map(|a| {
                    let label = picks
                        .get(&a.pick_id)
                        .and_then(|p| p.approved)
                        .map(|set| set.label(day.layout))
                        .unwrap_or_else(|| inc.name.clone());
                    format!("{} ({label})", name(&a.employee_id))
                })
                .collect();
            let runner_ups = inc
                .runner_ups
                .iter()
                .map(|r| format!("{}. {}", r.position, name(&r.employee_id)))
                .collect();
            rows.push(RosterRow {
                date: day.date,
                increment: inc.name.clone(),
                holiday: day.is_holiday,
                off,
                runner_ups,
            });
        }
    }
    rows
}

/// Calendar label for a pick. Two-day layouts span consecutive dates, so a full
/// pick on 10/2 reads "10/2 - 10/3" and a day_2-only pick reads "10/3".
pub fn date_label(pick: &Pick, layout: ShiftLayout) -> String {
    let set = pick.approved.unwrap_or(pick.requested);
    match layout {
        ShiftLayout::TwoDay => {
            let mut indices = set.indices();
            let first = indices.next().unwrap_or(0);
            let last = indices.last().unwrap_or(first);
            let start = pick.date + Days::new(first as u64);
            let end = pick.date + Days::new(last as u64);
            if start == end {
                format!("{}/{}", start.month(), start.day())
            } else {
                format!("{}/{} - {}/{}", start.month(), start.day(), end.month(), end.day())
            }
        }
        ShiftLayout::Full | ShiftLayout::AmPm => pick.date.format("%m/%d").to_string(),
    }
}
