//! JSON boundary: roster input, per-group result files, and the run summary.
//! Result files are written to a temp file, fsynced, then renamed into place.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::{Allocation, Calendar};
use crate::limits::*;
use crate::model::*;

#[derive(Debug)]
pub enum SnapshotError {
    Io(io::Error),
    Json(serde_json::Error),
    UnknownRank { employee: String, rank: String },
    BadSelection { employee: String, date: NaiveDate, text: String },
    InvalidGroupName(String),
    LimitExceeded(&'static str),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::Io(e) => write!(f, "io error: {e}"),
            SnapshotError::Json(e) => write!(f, "json error: {e}"),
            SnapshotError::UnknownRank { employee, rank } => {
                write!(f, "employee {employee}: unknown rank {rank:?}")
            }
            SnapshotError::BadSelection { employee, date, text } => {
                write!(f, "employee {employee}: pick on {date}: unrecognized increments {text:?}")
            }
            SnapshotError::InvalidGroupName(name) => write!(f, "invalid shift group name: {name:?}"),
            SnapshotError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Io(e) => Some(e),
            SnapshotError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SnapshotError {
    fn from(e: io::Error) -> Self {
        SnapshotError::Io(e)
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(e: serde_json::Error) -> Self {
        SnapshotError::Json(e)
    }
}

// ── Roster input ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RosterFile {
    pub employees: Vec<RosterEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RosterEntry {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub rank: String,
    pub shift: String,
    pub hire_date: NaiveDate,
    #[serde(default)]
    pub awarded_vacation_shifts: Decimal,
    #[serde(default)]
    pub awarded_holiday_shifts: Decimal,
    #[serde(default)]
    pub exclusions: Vec<Exclusion>,
    #[serde(default)]
    pub picks: Vec<RosterPick>,
}

#[derive(Debug, Deserialize)]
pub struct RosterPick {
    pub date: NaiveDate,
    /// Free text such as "AM", "PM", "AMPM", "FULL", "day_1day_2". Absent means the whole day.
    #[serde(default)]
    pub increments: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl RosterEntry {
    fn into_employee(self, schedule: &ShiftSchedule) -> Result<Employee, SnapshotError> {
        let rank = self.rank.parse::<Rank>().map_err(|_| SnapshotError::UnknownRank {
            employee: self.id.clone(),
            rank: self.rank.clone(),
        })?;
        if self.picks.len() > MAX_PICKS_PER_EMPLOYEE {
            return Err(SnapshotError::LimitExceeded("too many picks for one employee"));
        }

        let mut employee = Employee::new(
            self.id,
            self.first_name,
            self.last_name,
            rank,
            self.shift,
            self.hire_date,
        )
        .with_budget(self.awarded_vacation_shifts, self.awarded_holiday_shifts);
        employee.exclusions = self.exclusions;

        for p in self.picks {
            let layout = schedule.layout_for(p.date);
            let requested = match &p.increments {
                None => layout.all(),
                Some(text) => IncrementSet::parse(text, layout).map_err(|_| SnapshotError::BadSelection {
                    employee: employee.id.0.clone(),
                    date: p.date,
                    text: text.clone(),
                })?,
            };
            let mut pick = Pick::new(p.date, requested);
            pick.source = p.source;
            employee.pending.push_back(pick);
        }
        Ok(employee)
    }
}

/// Parse a roster document. Picks keep file order, which is submission order.
pub fn parse_roster(json: &str, schedule: &ShiftSchedule) -> Result<Vec<Employee>, SnapshotError> {
    let file: RosterFile = serde_json::from_str(json)?;
    if file.employees.len() > MAX_EMPLOYEES {
        return Err(SnapshotError::LimitExceeded("too many employees"));
    }
    file.employees
        .into_iter()
        .map(|entry| entry.into_employee(schedule))
        .collect()
}

pub fn read_roster(path: &Path, schedule: &ShiftSchedule) -> Result<Vec<Employee>, SnapshotError> {
    let text = fs::read_to_string(path)?;
    let employees = parse_roster(&text, schedule)?;
    metrics::gauge!(crate::observability::EMPLOYEES_LOADED).set(employees.len() as f64);
    debug!(path = %path.display(), employees = employees.len(), "roster loaded");
    Ok(employees)
}

// ── Results ──────────────────────────────────────────────

/// Strip a group name down to a safe file stem.
pub fn group_file_stem(group: &str) -> Result<String, SnapshotError> {
    if group.len() > MAX_GROUP_NAME_LEN {
        return Err(SnapshotError::InvalidGroupName(group.to_string()));
    }
    let safe: String = group
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if safe.is_empty() {
        return Err(SnapshotError::InvalidGroupName(group.to_string()));
    }
    Ok(safe)
}

pub fn employees_path(dir: &Path, group: &str) -> Result<PathBuf, SnapshotError> {
    Ok(dir.join(format!("{}-employees.json", group_file_stem(group)?)))
}

pub fn calendar_path(dir: &Path, group: &str) -> Result<PathBuf, SnapshotError> {
    Ok(dir.join(format!("{}-calendar.json", group_file_stem(group)?)))
}

/// Write `<group>-employees.json` and `<group>-calendar.json` into `dir`.
pub fn write_results(dir: &Path, group: &str, allocation: &Allocation) -> Result<(), SnapshotError> {
    write_json_atomic(&employees_path(dir, group)?, &allocation.employees)?;
    write_json_atomic(&calendar_path(dir, group)?, &allocation.calendar)?;
    Ok(())
}

/// Load a group's results. A missing calendar file is rebuilt from the
/// employees' approved picks.
pub fn read_results(dir: &Path, group: &str, schedule: ShiftSchedule, capacity: u32) -> Result<Allocation, SnapshotError> {
    let employees: Vec<Employee> = read_json(&employees_path(dir, group)?)?;
    let calendar = match read_json::<Calendar>(&calendar_path(dir, group)?) {
        Ok(calendar) => calendar,
        Err(SnapshotError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
            debug!(group, "calendar file missing, rebuilding from picks");
            Calendar::rebuild(schedule, capacity, &employees)
        }
        Err(e) => return Err(e),
    };
    Ok(Allocation {
        employees,
        calendar,
        rounds: 0,
    })
}

pub fn write_summary<T: Serialize>(dir: &Path, summary: &T) -> Result<PathBuf, SnapshotError> {
    let path = dir.join("summary.json");
    write_json_atomic(&path, summary)?;
    Ok(path)
}

fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), SnapshotError> {
    let tmp_path = path.with_extension("json.tmp");
    let file = File::create(&tmp_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SnapshotError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{allocate, AllocationConfig};
    use rust_decimal_macros::dec;

    fn tmp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("shiftpick_test_snapshot").join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    const ROSTER: &str = r#"{
        "employees": [
            {
                "id": "100", "first_name": "John", "last_name": "Doe",
                "rank": "battalion chief", "shift": "A", "hire_date": "2001-03-01",
                "awarded_vacation_shifts": 10, "awarded_holiday_shifts": 2.5,
                "exclusions": [{"start": "2025-03-01", "end": "2025-03-05", "reason": "PARAMEDIC CLASS"}],
                "picks": [
                    {"date": "2025-01-15", "increments": "AM"},
                    {"date": "2025-01-16", "increments": "pm", "source": "supplemental"},
                    {"date": "2025-01-17"}
                ]
            },
            {
                "id": "200", "first_name": "Ann", "last_name": "Roe",
                "rank": "Firefighter", "shift": "B", "hire_date": "2010-06-01"
            }
        ]
    }"#;

    #[test]
    fn roster_parses_ranks_and_selections() {
        let employees = parse_roster(ROSTER, &ShiftSchedule::default()).unwrap();
        assert_eq!(employees.len(), 2);
        let john = &employees[0];
        assert_eq!(john.rank, Rank::BattalionChief);
        assert_eq!(john.awarded_holiday_shifts, dec!(2.5));
        assert_eq!(john.exclusions.len(), 1);
        let picks: Vec<_> = john.pending.iter().map(|p| p.requested).collect();
        assert_eq!(
            picks,
            [IncrementSet::only(0, 2), IncrementSet::only(1, 2), IncrementSet::full(2)]
        );
        assert_eq!(john.pending[1].source.as_deref(), Some("supplemental"));
        assert!(employees[1].pending.is_empty());
    }

    #[test]
    fn roster_selection_follows_layout_transition() {
        let date = |d| NaiveDate::from_ymd_opt(2025, 1, d).unwrap();
        let schedule = ShiftSchedule::fixed(ShiftLayout::AmPm).with_transition(date(17), ShiftLayout::Full);
        let employees = parse_roster(ROSTER, &schedule).unwrap();
        let john = &employees[0];
        assert_eq!(john.pending[1].requested, IncrementSet::only(1, 2));
        assert_eq!(john.pending[2].requested, IncrementSet::full(1));

        // "AM" has no meaning in a single-increment day.
        let early = ShiftSchedule::fixed(ShiftLayout::AmPm).with_transition(date(1), ShiftLayout::Full);
        let result = parse_roster(ROSTER, &early);
        assert!(matches!(result, Err(SnapshotError::BadSelection { .. })));
    }

    #[test]
    fn roster_rejects_unknown_rank() {
        let json = ROSTER.replace("battalion chief", "Fire Marshal");
        let result = parse_roster(&json, &ShiftSchedule::default());
        assert!(matches!(result, Err(SnapshotError::UnknownRank { .. })));
    }

    #[test]
    fn results_round_trip() {
        let dir = tmp_dir("round_trip");
        let employees = parse_roster(ROSTER, &ShiftSchedule::default()).unwrap();
        let alloc = allocate(employees, AllocationConfig::seeded(3)).unwrap();
        write_results(&dir, "A", &alloc).unwrap();
        assert!(dir.join("A-employees.json").exists());
        assert!(!dir.join("A-employees.json.tmp").exists());

        let back = read_results(&dir, "A", ShiftSchedule::default(), 5).unwrap();
        for (a, b) in alloc.employees.iter().zip(&back.employees) {
            assert_eq!(a.processed, b.processed);
            assert_eq!(a.approved_shifts, b.approved_shifts);
        }
        let d = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(back.day(d).unwrap().increments[&0].assigned, alloc.day(d).unwrap().increments[&0].assigned);
    }

    #[test]
    fn missing_calendar_rebuilt_from_picks() {
        let dir = tmp_dir("rebuild");
        let employees = parse_roster(ROSTER, &ShiftSchedule::default()).unwrap();
        let alloc = allocate(employees, AllocationConfig::seeded(3)).unwrap();
        write_results(&dir, "A", &alloc).unwrap();
        fs::remove_file(calendar_path(&dir, "A").unwrap()).unwrap();

        let back = read_results(&dir, "A", ShiftSchedule::default(), 5).unwrap();
        let d = NaiveDate::from_ymd_opt(2025, 1, 17).unwrap();
        assert_eq!(back.day(d).unwrap().increments[&1].assigned.len(), 1);
    }

    #[test]
    fn group_name_sanitized() {
        assert_eq!(group_file_stem("../evil").unwrap(), "evil");
        assert!(group_file_stem("../..").is_err());
        assert!(group_file_stem(&"x".repeat(MAX_GROUP_NAME_LEN + 1)).is_err());
    }
}
