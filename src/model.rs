use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::holiday::is_holiday;
use crate::limits::MAX_INCREMENTS_PER_DAY;

/// Stable employee key. Increments and the runner-up ledger refer to employees by id only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub String);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EmployeeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ── Rank ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "Probationary Firefighter")]
    ProbationaryFirefighter,
    Firefighter,
    #[serde(rename = "Apparatus Specialist")]
    ApparatusSpecialist,
    Lieutenant,
    Captain,
    #[serde(rename = "Battalion Chief")]
    BattalionChief,
}

impl Rank {
    pub const ALL: [Rank; 6] = [
        Rank::ProbationaryFirefighter,
        Rank::Firefighter,
        Rank::ApparatusSpecialist,
        Rank::Lieutenant,
        Rank::Captain,
        Rank::BattalionChief,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::ProbationaryFirefighter => "Probationary Firefighter",
            Rank::Firefighter => "Firefighter",
            Rank::ApparatusSpecialist => "Apparatus Specialist",
            Rank::Lieutenant => "Lieutenant",
            Rank::Captain => "Captain",
            Rank::BattalionChief => "Battalion Chief",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRankError(pub String);

impl fmt::Display for ParseRankError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown rank: {:?}", self.0)
    }
}

impl std::error::Error for ParseRankError {}

/// Lowercase and drop separators so "Battalion Chief", "battalion_chief" and
/// "BattalionChief" all compare equal.
fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for Rank {
    type Err = ParseRankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Rank::ALL
            .into_iter()
            .find(|r| normalize(r.as_str()) == wanted)
            .ok_or_else(|| ParseRankError(s.to_string()))
    }
}

// ── Shift layout ─────────────────────────────────────────

/// How a calendar day is split into allocatable increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftLayout {
    /// One unsplit 24-hour unit.
    Full,
    /// 24-hour shift split into AM and PM halves.
    AmPm,
    /// 48-hour shift split into two 24-hour days.
    TwoDay,
}

impl ShiftLayout {
    pub fn increment_names(&self) -> &'static [&'static str] {
        match self {
            ShiftLayout::Full => &["FULL"],
            ShiftLayout::AmPm => &["AM", "PM"],
            ShiftLayout::TwoDay => &["day_1", "day_2"],
        }
    }

    pub fn len(&self) -> usize {
        self.increment_names().len()
    }

    /// Every increment of the layout selected.
    pub fn all(&self) -> IncrementSet {
        IncrementSet::full(self.len())
    }
}

impl FromStr for ShiftLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "full" | "single" | "24" => Ok(ShiftLayout::Full),
            "ampm" | "halfday" => Ok(ShiftLayout::AmPm),
            "twoday" | "day1day2" | "48" => Ok(ShiftLayout::TwoDay),
            _ => Err(format!("unknown shift layout: {s:?}")),
        }
    }
}

/// Layout switch taking effect on `from` (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutTransition {
    pub from: NaiveDate,
    pub layout: ShiftLayout,
}

/// Which layout applies on which date. Rosters moved from 24-hour AM/PM shifts
/// to 48-hour shifts mid-year, so a single optional transition is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSchedule {
    pub layout: ShiftLayout,
    #[serde(default)]
    pub transition: Option<LayoutTransition>,
}

impl ShiftSchedule {
    pub fn fixed(layout: ShiftLayout) -> Self {
        Self {
            layout,
            transition: None,
        }
    }

    pub fn with_transition(mut self, from: NaiveDate, layout: ShiftLayout) -> Self {
        self.transition = Some(LayoutTransition { from, layout });
        self
    }

    pub fn layout_for(&self, date: NaiveDate) -> ShiftLayout {
        match self.transition {
            Some(t) if date >= t.from => t.layout,
            _ => self.layout,
        }
    }
}

impl Default for ShiftSchedule {
    fn default() -> Self {
        Self::fixed(ShiftLayout::AmPm)
    }
}

// ── Increment selection ──────────────────────────────────

/// Bitset over the increments of one day. Serialized as a list of 0/1 flags,
/// e.g. `[1, 0]` for AM only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<u8>", try_from = "Vec<u8>")]
pub struct IncrementSet {
    bits: u8,
    width: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSelectionError(pub String);

impl fmt::Display for ParseSelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized increment selection: {:?}", self.0)
    }
}

impl std::error::Error for ParseSelectionError {}

impl IncrementSet {
    /// Widths above `MAX_INCREMENTS_PER_DAY` are clamped.
    pub fn empty(width: usize) -> Self {
        Self {
            bits: 0,
            width: width.min(MAX_INCREMENTS_PER_DAY) as u8,
        }
    }

    pub fn full(width: usize) -> Self {
        let mut set = Self::empty(width);
        for i in 0..width {
            set = set.with(i);
        }
        set
    }

    /// Single increment `index` out of `width`.
    pub fn only(index: usize, width: usize) -> Self {
        Self::empty(width).with(index)
    }

    pub fn with(mut self, index: usize) -> Self {
        if index < self.width as usize {
            self.bits |= 1 << index;
        }
        self
    }

    pub fn without(mut self, index: usize) -> Self {
        if let Some(mask) = 1u8.checked_shl(index as u32) {
            self.bits &= !mask;
        }
        self
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.width as usize && self.bits & (1 << index) != 0
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub fn count(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn is_full(&self) -> bool {
        self.width > 0 && self.count() == self.width()
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.width()).filter(move |i| self.contains(*i))
    }

    /// Fraction of a shift this selection represents.
    pub fn shift_value(&self) -> Decimal {
        if self.width == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.count() as u64) / Decimal::from(self.width as u64)
    }

    /// Resolve free-text selections ("AM", "PM", "AMPM", "FULL", "day_1day_2", ...)
    /// against the layout of the requested date.
    pub fn parse(text: &str, layout: ShiftLayout) -> Result<Self, ParseSelectionError> {
        let mut rest = normalize(text);
        if rest == "full" {
            return Ok(layout.all());
        }
        let names: Vec<String> = layout.increment_names().iter().map(|n| normalize(n)).collect();
        let mut set = Self::empty(layout.len());
        while !rest.is_empty() {
            let (index, name) = names
                .iter()
                .enumerate()
                .find(|(_, name)| rest.starts_with(name.as_str()))
                .ok_or_else(|| ParseSelectionError(text.to_string()))?;
            set = set.with(index);
            rest.replace_range(..name.len(), "");
        }
        if set.is_empty() {
            return Err(ParseSelectionError(text.to_string()));
        }
        Ok(set)
    }

    /// Human label: "FULL" when everything is selected, otherwise increment names.
    pub fn label(&self, layout: ShiftLayout) -> String {
        if self.is_full() {
            return "FULL".to_string();
        }
        let names = layout.increment_names();
        self.indices()
            .filter_map(|i| names.get(i).copied())
            .collect::<Vec<_>>()
            .join("")
    }
}

impl From<IncrementSet> for Vec<u8> {
    fn from(set: IncrementSet) -> Self {
        (0..set.width()).map(|i| u8::from(set.contains(i))).collect()
    }
}

impl TryFrom<Vec<u8>> for IncrementSet {
    type Error = String;

    fn try_from(flags: Vec<u8>) -> Result<Self, Self::Error> {
        if flags.len() > MAX_INCREMENTS_PER_DAY {
            return Err(format!("at most {MAX_INCREMENTS_PER_DAY} increments per day"));
        }
        let mut set = Self::empty(flags.len());
        for (i, flag) in flags.into_iter().enumerate() {
            match flag {
                0 => {}
                1 => set = set.with(i),
                other => return Err(format!("increment flag must be 0 or 1, got {other}")),
            }
        }
        Ok(set)
    }
}

// ── Pick ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LeaveType {
    #[default]
    Untyped,
    Vacation,
    Holiday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Determination {
    #[default]
    Unaddressed,
    Approved,
    Rejected,
}

/// One date-off request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    pub id: Ulid,
    pub date: NaiveDate,
    pub requested: IncrementSet,
    #[serde(default)]
    pub leave_type: LeaveType,
    #[serde(default)]
    pub determination: Determination,
    #[serde(default)]
    pub reason: Option<String>,
    /// Set on approval; may be a strict subset of `requested` under partial grants.
    #[serde(default)]
    pub approved: Option<IncrementSet>,
    /// 0-based position within the first approved increment.
    #[serde(default)]
    pub place: Option<usize>,
    /// Run-wide approval counter. Orders assignments in every approved
    /// increment, not just the first.
    #[serde(default)]
    pub sequence: Option<u64>,
    /// Provenance tag (e.g. "primary", "supplemental"); opaque to the engine.
    #[serde(default)]
    pub source: Option<String>,
}

impl Pick {
    pub fn new(date: NaiveDate, requested: IncrementSet) -> Self {
        Self {
            id: Ulid::new(),
            date,
            requested,
            leave_type: LeaveType::Untyped,
            determination: Determination::Unaddressed,
            reason: None,
            approved: None,
            place: None,
            sequence: None,
            source: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.determination != Determination::Unaddressed
    }

    pub fn is_approved(&self) -> bool {
        self.determination == Determination::Approved
    }

    pub(crate) fn approve(
        &mut self,
        increments: IncrementSet,
        place: Option<usize>,
        sequence: u64,
        leave_type: LeaveType,
        note: Option<String>,
    ) {
        debug_assert!(!self.is_resolved(), "pick resolved twice");
        self.determination = Determination::Approved;
        self.approved = Some(increments);
        self.place = place;
        self.sequence = Some(sequence);
        self.leave_type = leave_type;
        self.reason = note;
    }

    pub(crate) fn reject(&mut self, reason: String) {
        debug_assert!(!self.is_resolved(), "pick resolved twice");
        self.determination = Determination::Rejected;
        self.reason = Some(reason);
    }
}

impl fmt::Display for Pick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?}) - {:?}", self.date, self.leave_type, self.determination)?;
        if let Some(reason) = &self.reason {
            write!(f, " ({reason})")?;
        }
        Ok(())
    }
}

// ── Employee ─────────────────────────────────────────────

/// Inclusive window during which no pick may be approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub reason: String,
}

impl Exclusion {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub rank: Rank,
    /// Shift group ("A", "B", "C"). Each group is allocated independently.
    pub shift: String,
    pub hire_date: NaiveDate,
    #[serde(default)]
    pub exclusions: Vec<Exclusion>,
    pub awarded_vacation_shifts: Decimal,
    pub awarded_holiday_shifts: Decimal,
    #[serde(default)]
    pub used_vacation_shifts: Decimal,
    #[serde(default)]
    pub used_holiday_shifts: Decimal,
    #[serde(default)]
    pub approved_shifts: Decimal,
    /// Unresolved picks in submission order.
    #[serde(default)]
    pub pending: VecDeque<Pick>,
    /// Resolved picks in resolution order.
    #[serde(default)]
    pub processed: Vec<Pick>,
    /// Per-round tie-break among equal hire dates; only read by the priority sort.
    #[serde(skip)]
    pub(crate) tie_break: u64,
}

impl Employee {
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        rank: Rank,
        shift: impl Into<String>,
        hire_date: NaiveDate,
    ) -> Self {
        Self {
            id: EmployeeId(id.into()),
            first_name: first_name.into(),
            last_name: last_name.into(),
            rank,
            shift: shift.into(),
            hire_date,
            exclusions: Vec::new(),
            awarded_vacation_shifts: Decimal::ZERO,
            awarded_holiday_shifts: Decimal::ZERO,
            used_vacation_shifts: Decimal::ZERO,
            used_holiday_shifts: Decimal::ZERO,
            approved_shifts: Decimal::ZERO,
            pending: VecDeque::new(),
            processed: Vec::new(),
            tie_break: 0,
        }
    }

    pub fn with_budget(mut self, vacation: Decimal, holiday: Decimal) -> Self {
        self.awarded_vacation_shifts = vacation;
        self.awarded_holiday_shifts = holiday;
        self
    }

    pub fn with_exclusion(mut self, start: NaiveDate, end: NaiveDate, reason: impl Into<String>) -> Self {
        self.exclusions.push(Exclusion {
            start,
            end,
            reason: reason.into(),
        });
        self
    }

    pub fn with_pick(mut self, pick: Pick) -> Self {
        self.pending.push_back(pick);
        self
    }

    /// "Doe, J" style roster name.
    pub fn display_name(&self) -> String {
        match self.first_name.chars().next() {
            Some(initial) => format!("{}, {initial}", self.last_name),
            None => self.last_name.clone(),
        }
    }

    pub fn max_shifts_off(&self) -> Decimal {
        self.awarded_vacation_shifts + self.awarded_holiday_shifts
    }

    pub fn days_employed_on(&self, date: NaiveDate) -> i64 {
        (date - self.hire_date).num_days()
    }

    pub fn exclusion_for(&self, date: NaiveDate) -> Option<&Exclusion> {
        self.exclusions.iter().find(|e| e.covers(date))
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Book `value` shifts against the budget, vacation first unless the pick was
    /// forced to holiday. Returns the leave type the pick resolves to.
    pub(crate) fn draw_shifts(&mut self, value: Decimal, prefer_holiday: bool) -> LeaveType {
        let vacation_left = (self.awarded_vacation_shifts - self.used_vacation_shifts).max(Decimal::ZERO);
        let holiday_left = (self.awarded_holiday_shifts - self.used_holiday_shifts).max(Decimal::ZERO);

        let (from_vacation, from_holiday) = if prefer_holiday {
            let h = value.min(holiday_left);
            (value - h, h)
        } else {
            let v = value.min(vacation_left);
            (v, value - v)
        };

        self.used_vacation_shifts += from_vacation;
        self.used_holiday_shifts += from_holiday;
        self.approved_shifts += value;

        if prefer_holiday || from_holiday > Decimal::ZERO {
            LeaveType::Holiday
        } else {
            LeaveType::Vacation
        }
    }
}

// ── Calendar structures ──────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub employee_id: EmployeeId,
    pub pick_id: Ulid,
    pub rank: Rank,
}

/// A denied request kept in denial order for the slot it was denied on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerUp {
    pub employee_id: EmployeeId,
    pub pick_id: Ulid,
    pub reason: String,
    /// 1-based.
    pub position: usize,
}

/// Smallest allocatable unit of a day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Increment {
    pub date: NaiveDate,
    pub index: usize,
    pub name: String,
    pub capacity: u32,
    /// Approved requesters in approval order.
    pub assigned: Vec<Assignment>,
    pub rank_counts: BTreeMap<Rank, u32>,
    pub runner_ups: Vec<RunnerUp>,
}

impl Increment {
    pub fn new(date: NaiveDate, index: usize, name: impl Into<String>, capacity: u32) -> Self {
        Self {
            date,
            index,
            name: name.into(),
            capacity,
            assigned: Vec::new(),
            rank_counts: BTreeMap::new(),
            runner_ups: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.assigned.len() >= self.capacity as usize
    }

    pub fn count(&self, rank: Rank) -> u32 {
        self.rank_counts.get(&rank).copied().unwrap_or(0)
    }

    pub fn has_employee(&self, id: &EmployeeId) -> bool {
        self.assigned.iter().any(|a| &a.employee_id == id)
    }

    /// Append an approved requester. Returns its 0-based place.
    pub(crate) fn assign(&mut self, employee_id: EmployeeId, pick_id: Ulid, rank: Rank) -> usize {
        debug_assert!(!self.is_full(), "increment over capacity");
        let place = self.assigned.len();
        self.assigned.push(Assignment {
            employee_id,
            pick_id,
            rank,
        });
        *self.rank_counts.entry(rank).or_insert(0) += 1;
        place
    }

    /// Append a denial to the ledger. Returns its 1-based position.
    pub(crate) fn record_runner_up(&mut self, employee_id: EmployeeId, pick_id: Ulid, reason: String) -> usize {
        let position = self.runner_ups.len() + 1;
        self.runner_ups.push(RunnerUp {
            employee_id,
            pick_id,
            reason,
            position,
        });
        position
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_holiday: bool,
    pub layout: ShiftLayout,
    pub increments: BTreeMap<usize, Increment>,
}

impl CalendarDay {
    pub fn new(date: NaiveDate, layout: ShiftLayout, capacity: u32) -> Self {
        let increments = layout
            .increment_names()
            .iter()
            .enumerate()
            .map(|(i, name)| (i, Increment::new(date, i, *name, capacity)))
            .collect();
        Self {
            date,
            is_holiday: is_holiday(date),
            layout,
            increments,
        }
    }

    pub fn increment(&self, index: usize) -> Option<&Increment> {
        self.increments.get(&index)
    }

    pub fn has_employee(&self, id: &EmployeeId) -> bool {
        self.increments.values().any(|inc| inc.has_employee(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rank_parses_loosely_formatted_names() {
        assert_eq!("Battalion Chief".parse::<Rank>(), Ok(Rank::BattalionChief));
        assert_eq!("battalionchief".parse::<Rank>(), Ok(Rank::BattalionChief));
        assert_eq!("apparatus_specialist".parse::<Rank>(), Ok(Rank::ApparatusSpecialist));
        assert_eq!(" CAPTAIN ".parse::<Rank>(), Ok(Rank::Captain));
        assert!("Captive".parse::<Rank>().is_err());
    }

    #[test]
    fn rank_serializes_as_display_name() {
        let json = serde_json::to_string(&Rank::ProbationaryFirefighter).unwrap();
        assert_eq!(json, "\"Probationary Firefighter\"");
    }

    #[test]
    fn selection_parses_am_pm_vocabulary() {
        let layout = ShiftLayout::AmPm;
        assert_eq!(IncrementSet::parse("AM", layout).unwrap(), IncrementSet::only(0, 2));
        assert_eq!(IncrementSet::parse("pm", layout).unwrap(), IncrementSet::only(1, 2));
        assert_eq!(IncrementSet::parse("AMPM", layout).unwrap(), IncrementSet::full(2));
        assert_eq!(IncrementSet::parse("FULL", layout).unwrap(), IncrementSet::full(2));
    }

    #[test]
    fn selection_parses_two_day_vocabulary() {
        let layout = ShiftLayout::TwoDay;
        assert_eq!(IncrementSet::parse("day_1", layout).unwrap(), IncrementSet::only(0, 2));
        assert_eq!(IncrementSet::parse("Day 2", layout).unwrap(), IncrementSet::only(1, 2));
        assert_eq!(IncrementSet::parse("day_1day_2", layout).unwrap(), IncrementSet::full(2));
    }

    #[test]
    fn selection_rejects_unknown_text() {
        assert!(IncrementSet::parse("noon", ShiftLayout::AmPm).is_err());
        assert!(IncrementSet::parse("", ShiftLayout::AmPm).is_err());
        assert!(IncrementSet::parse("day_1", ShiftLayout::AmPm).is_err());
    }

    #[test]
    fn selection_value_and_label() {
        let am = IncrementSet::only(0, 2);
        assert_eq!(am.shift_value(), dec!(0.5));
        assert_eq!(am.label(ShiftLayout::AmPm), "AM");
        assert_eq!(IncrementSet::full(2).shift_value(), Decimal::ONE);
        assert_eq!(IncrementSet::full(2).label(ShiftLayout::TwoDay), "FULL");
        assert_eq!(IncrementSet::full(1).shift_value(), Decimal::ONE);
    }

    #[test]
    fn selection_serializes_as_flags() {
        let json = serde_json::to_string(&IncrementSet::only(1, 2)).unwrap();
        assert_eq!(json, "[0,1]");
        let back: IncrementSet = serde_json::from_str("[1,1]").unwrap();
        assert_eq!(back, IncrementSet::full(2));
        assert!(serde_json::from_str::<IncrementSet>("[2,0]").is_err());
    }

    #[test]
    fn selection_width_clamped() {
        let wide = IncrementSet::full(12);
        assert_eq!(wide.width(), MAX_INCREMENTS_PER_DAY);
        assert_eq!(wide.count(), MAX_INCREMENTS_PER_DAY);
        let set = IncrementSet::only(9, 12);
        assert!(set.is_empty());
        assert!(!set.contains(9));
        assert_eq!(set.without(9), set);
    }

    #[test]
    fn exclusion_bounds_are_inclusive() {
        let ex = Exclusion {
            start: date(2025, 3, 1),
            end: date(2025, 3, 10),
            reason: "PARAMEDIC CLASS".into(),
        };
        assert!(ex.covers(date(2025, 3, 1)));
        assert!(ex.covers(date(2025, 3, 10)));
        assert!(!ex.covers(date(2025, 3, 11)));
        assert!(!ex.covers(date(2025, 2, 28)));
    }

    #[test]
    fn draw_uses_vacation_before_holiday() {
        let mut e = Employee::new("1", "John", "Doe", Rank::Firefighter, "A", date(2010, 1, 1))
            .with_budget(dec!(0.5), dec!(2));
        assert_eq!(e.draw_shifts(dec!(1), false), LeaveType::Holiday);
        assert_eq!(e.used_vacation_shifts, dec!(0.5));
        assert_eq!(e.used_holiday_shifts, dec!(0.5));
        assert_eq!(e.approved_shifts, dec!(1));

        assert_eq!(e.draw_shifts(dec!(0.5), false), LeaveType::Holiday);
        assert_eq!(e.used_holiday_shifts, dec!(1));
    }

    #[test]
    fn draw_forced_holiday_uses_holiday_first() {
        let mut e = Employee::new("1", "John", "Doe", Rank::Firefighter, "A", date(2010, 1, 1))
            .with_budget(dec!(5), dec!(1));
        assert_eq!(e.draw_shifts(dec!(1), true), LeaveType::Holiday);
        assert_eq!(e.used_holiday_shifts, dec!(1));
        assert_eq!(e.used_vacation_shifts, dec!(0));
        assert_eq!(e.draw_shifts(dec!(1), false), LeaveType::Vacation);
    }

    #[test]
    fn display_name_uses_initial() {
        let e = Employee::new("7", "John", "Doe", Rank::Captain, "B", date(2010, 1, 1));
        assert_eq!(e.display_name(), "Doe, J");
    }

    #[test]
    fn schedule_switches_layout_on_transition() {
        let schedule = ShiftSchedule::fixed(ShiftLayout::AmPm).with_transition(date(2025, 2, 4), ShiftLayout::TwoDay);
        assert_eq!(schedule.layout_for(date(2025, 2, 3)), ShiftLayout::AmPm);
        assert_eq!(schedule.layout_for(date(2025, 2, 4)), ShiftLayout::TwoDay);
    }

    #[test]
    fn calendar_day_builds_layout_increments() {
        let day = CalendarDay::new(date(2025, 7, 4), ShiftLayout::AmPm, 5);
        assert!(day.is_holiday);
        assert_eq!(day.increments.len(), 2);
        assert_eq!(day.increment(1).unwrap().name, "PM");
    }
}
