use std::collections::BTreeMap;

use tracing::info_span;

use crate::engine::{allocate, Allocation, AllocationConfig, EngineError};
use crate::limits::*;
use crate::model::Employee;

/// Runs one isolated engine per shift group. Groups never compete for slots;
/// the same date can be fully booked in "A" and empty in "B".
pub struct ShiftGroups {
    config: AllocationConfig,
}

impl ShiftGroups {
    pub fn new(config: AllocationConfig) -> Self {
        Self { config }
    }

    /// Split the roster by shift, preserving input order inside each group.
    pub fn partition(employees: Vec<Employee>) -> BTreeMap<String, Vec<Employee>> {
        let mut groups: BTreeMap<String, Vec<Employee>> = BTreeMap::new();
        for e in employees {
            groups.entry(e.shift.clone()).or_default().push(e);
        }
        groups
    }

    /// Allocate every group. With a base seed, group `n` (in name order) runs
    /// with `seed + n` so groups draw independent but reproducible tie-breaks.
    pub fn allocate(&self, employees: Vec<Employee>) -> Result<BTreeMap<String, Allocation>, EngineError> {
        let groups = Self::partition(employees);
        if groups.keys().any(|g| g.len() > MAX_GROUP_NAME_LEN) {
            return Err(EngineError::LimitExceeded("shift group name too long"));
        }
        metrics::gauge!(crate::observability::SHIFT_GROUPS).set(groups.len() as f64);

        let mut results = BTreeMap::new();
        for (n, (group, members)) in groups.into_iter().enumerate() {
            let span = info_span!("shift_group", group = %group, employees = members.len());
            let _enter = span.enter();
            let config = AllocationConfig {
                seed: self.config.seed.map(|s| s.wrapping_add(n as u64)),
                ..self.config.clone()
            };
            let allocation = allocate(members, config)?;
            results.insert(group, allocation);
        }
        Ok(results)
    }
}

/// One-shot helper for [`ShiftGroups::allocate`].
pub fn allocate_by_group(
    employees: Vec<Employee>,
    config: &AllocationConfig,
) -> Result<BTreeMap<String, Allocation>, EngineError> {
    ShiftGroups::new(config.clone()).allocate(employees)
}
