mod error;
mod mutations;
mod queries;
mod store;
pub(crate) mod validation;

pub use error::EngineError;
pub use store::Calendar;

use std::collections::HashSet;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::limits::*;
use crate::model::*;

/// What to do when only some requested increments of a pick are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialGrantPolicy {
    /// Deny the whole pick.
    #[default]
    DenyWhole,
    /// Approve the increments that pass; the rest go to the runner-up ledger.
    GrantAvailable,
}

#[derive(Debug, Clone)]
pub struct AllocationConfig {
    /// Grants per employee per round.
    pub round_cap: usize,
    /// People who may be off in one increment.
    pub capacity: u32,
    pub schedule: ShiftSchedule,
    pub partial_grants: PartialGrantPolicy,
    /// Seed for the seniority tie-break. `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            round_cap: DEFAULT_ROUND_CAP,
            capacity: DEFAULT_CAPACITY,
            schedule: ShiftSchedule::default(),
            partial_grants: PartialGrantPolicy::default(),
            seed: None,
        }
    }
}

impl AllocationConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}

/// Finished state of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    pub employees: Vec<Employee>,
    pub calendar: Calendar,
    pub rounds: usize,
}

/// Round-based allocator for one shift group. Single-threaded and synchronous;
/// each run owns its employees and calendar outright.
pub struct Engine {
    employees: Vec<Employee>,
    calendar: Calendar,
    config: AllocationConfig,
    rng: StdRng,
    rounds: usize,
    approvals: u64,
}

impl Engine {
    /// Validate input and build an engine. Fails fast on malformed data; no
    /// pick is touched if this returns an error.
    pub fn new(employees: Vec<Employee>, config: AllocationConfig) -> Result<Self, EngineError> {
        check_input(&employees, &config)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            calendar: Calendar::new(config.schedule, config.capacity),
            employees,
            config,
            rng,
            rounds: 0,
            approvals: 0,
        })
    }

    /// Process rounds until every pending pick is resolved. Returns the number
    /// of rounds this call ran.
    pub fn run(&mut self) -> Result<usize, EngineError> {
        let span = info_span!("allocation", employees = self.employees.len());
        let _enter = span.enter();
        let started = Instant::now();

        // Every productive round resolves at least one pick.
        let ceiling = self.pending_count() + 1;
        let mut rounds = 0;
        while self.has_pending() {
            if rounds >= ceiling {
                return Err(EngineError::RoundLimitExceeded(ceiling));
            }
            rounds += 1;
            self.rounds += 1;
            debug!(round = self.rounds, pending = self.pending_count(), "starting round");
            let resolved = self.run_round();
            metrics::counter!(crate::observability::ROUNDS_TOTAL).increment(1);
            debug!(round = self.rounds, resolved, "round complete");
        }

        metrics::histogram!(crate::observability::ALLOCATION_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        let (approved, rejected) = self.determination_counts();
        info!(rounds, approved, rejected, days = self.calendar.day_count(), "allocation complete");
        Ok(rounds)
    }

    /// One pass over all employees in priority order. Each takes picks until
    /// the round cap of grants is reached or the queue is empty.
    fn run_round(&mut self) -> usize {
        let order = self.priority_order();
        let mut resolved = 0;
        for idx in order {
            let mut granted = 0;
            while granted < self.config.round_cap {
                match self.process_next_pick(idx) {
                    Some(Determination::Approved) => {
                        granted += 1;
                        resolved += 1;
                    }
                    Some(_) => resolved += 1,
                    None => break,
                }
            }
        }
        resolved
    }

    /// Seniority order: earliest hire first, fresh random tie-break per round.
    fn priority_order(&mut self) -> Vec<usize> {
        for employee in &mut self.employees {
            employee.tie_break = self.rng.random();
        }
        let mut order: Vec<usize> = (0..self.employees.len()).collect();
        order.sort_by(|&a, &b| {
            let (a, b) = (&self.employees[a], &self.employees[b]);
            a.hire_date.cmp(&b.hire_date).then(a.tie_break.cmp(&b.tie_break))
        });
        order
    }

    fn determination_counts(&self) -> (usize, usize) {
        self.employees
            .iter()
            .flat_map(|e| e.processed.iter())
            .fold((0, 0), |(a, r), p| match p.determination {
                Determination::Approved => (a + 1, r),
                Determination::Rejected => (a, r + 1),
                Determination::Unaddressed => (a, r),
            })
    }

    pub fn into_allocation(self) -> Allocation {
        Allocation {
            employees: self.employees,
            calendar: self.calendar,
            rounds: self.rounds,
        }
    }
}

/// Validate, run to completion, and hand back the final state.
pub fn allocate(employees: Vec<Employee>, config: AllocationConfig) -> Result<Allocation, EngineError> {
    let mut engine = Engine::new(employees, config)?;
    engine.run()?;
    Ok(engine.into_allocation())
}

fn check_input(employees: &[Employee], config: &AllocationConfig) -> Result<(), EngineError> {
    if config.round_cap == 0 {
        return Err(EngineError::InvalidRoundCap(config.round_cap));
    }
    if config.round_cap > MAX_ROUND_CAP {
        return Err(EngineError::LimitExceeded("round cap too large"));
    }
    if config.capacity == 0 {
        return Err(EngineError::InvalidCapacity(config.capacity));
    }
    if config.capacity > MAX_CAPACITY {
        return Err(EngineError::LimitExceeded("increment capacity too large"));
    }
    if employees.len() > MAX_EMPLOYEES {
        return Err(EngineError::LimitExceeded("too many employees"));
    }

    let mut seen = HashSet::new();
    for e in employees {
        if !seen.insert(&e.id) {
            return Err(EngineError::DuplicateEmployee(e.id.clone()));
        }
        if e.awarded_vacation_shifts.is_sign_negative() || e.awarded_holiday_shifts.is_sign_negative() {
            return Err(EngineError::NegativeBudget(e.id.clone()));
        }
        if e.pending.len() > MAX_PICKS_PER_EMPLOYEE {
            return Err(EngineError::LimitExceeded("too many picks for one employee"));
        }
        if let Some(ex) = e.exclusions.iter().find(|ex| ex.end < ex.start) {
            return Err(EngineError::InvalidExclusion {
                employee: e.id.clone(),
                start: ex.start,
                end: ex.end,
            });
        }
        for pick in &e.pending {
            if pick.is_resolved() {
                return Err(EngineError::AlreadyResolved {
                    employee: e.id.clone(),
                    pick: pick.id,
                });
            }
            if pick.requested.is_empty() {
                return Err(EngineError::EmptySelection {
                    employee: e.id.clone(),
                    date: pick.date,
                });
            }
            let expected = config.schedule.layout_for(pick.date).len();
            if pick.requested.width() != expected {
                return Err(EngineError::SelectionMismatch {
                    employee: e.id.clone(),
                    date: pick.date,
                    expected,
                    actual: pick.requested.width(),
                });
            }
        }
    }
    Ok(())
}
