use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::info;

use shiftpick::engine::{AllocationConfig, PartialGrantPolicy};
use shiftpick::groups::ShiftGroups;
use shiftpick::limits::{DEFAULT_CAPACITY, DEFAULT_ROUND_CAP};
use shiftpick::model::{ShiftLayout, ShiftSchedule};
use shiftpick::{report, snapshot};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let input = std::env::var("SHIFTPICK_INPUT")
        .ok()
        .or_else(|| std::env::args().nth(1))
        .ok_or("no roster given: set SHIFTPICK_INPUT or pass a path")?;
    let output_dir = std::env::var("SHIFTPICK_OUTPUT_DIR").unwrap_or_else(|_| "./results".into());
    let round_cap: usize = std::env::var("SHIFTPICK_ROUND_CAP")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_ROUND_CAP);
    let capacity: u32 = std::env::var("SHIFTPICK_CAPACITY")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_CAPACITY);
    let seed: Option<u64> = std::env::var("SHIFTPICK_SEED").ok().and_then(|s| s.parse().ok());
    let partial_grants = match std::env::var("SHIFTPICK_PARTIAL_GRANTS").as_deref() {
        Ok("1" | "true" | "yes") => PartialGrantPolicy::GrantAvailable,
        _ => PartialGrantPolicy::DenyWhole,
    };
    let layout: ShiftLayout = match std::env::var("SHIFTPICK_LAYOUT") {
        Ok(s) => s.parse()?,
        Err(_) => ShiftLayout::AmPm,
    };
    let mut schedule = ShiftSchedule::fixed(layout);
    if let Ok(s) = std::env::var("SHIFTPICK_TRANSITION_DATE") {
        let from: NaiveDate = s.parse()?;
        let next: ShiftLayout = match std::env::var("SHIFTPICK_TRANSITION_LAYOUT") {
            Ok(s) => s.parse()?,
            Err(_) => ShiftLayout::TwoDay,
        };
        schedule = schedule.with_transition(from, next);
    }

    let config = AllocationConfig {
        round_cap,
        capacity,
        schedule,
        partial_grants,
        seed,
    };

    info!("shiftpick allocating {input}");
    info!("  output_dir: {output_dir}");
    info!("  round_cap: {round_cap}, capacity: {capacity}");
    info!("  layout: {layout:?}{}", schedule.transition.map_or(String::new(), |t| format!(
        " until {}, then {:?}",
        t.from, t.layout
    )));
    info!("  seed: {}", seed.map_or("random".to_string(), |s| s.to_string()));

    let employees = snapshot::read_roster(&PathBuf::from(&input), &config.schedule)?;
    info!("loaded {} employees", employees.len());

    let output_dir = PathBuf::from(output_dir);
    std::fs::create_dir_all(&output_dir)?;

    let results = ShiftGroups::new(config).allocate(employees)?;
    for (group, allocation) in &results {
        snapshot::write_results(&output_dir, group, allocation)?;
        let s = report::summarize(&allocation.employees);
        info!(
            "shift {group}: {} approved, {} denied ({:.1}%) in {} rounds",
            s.totals.approved, s.totals.denied, s.totals.approval_rate, allocation.rounds
        );
    }

    let summary = report::summarize(results.values().flat_map(|a| a.employees.iter()));
    let path = snapshot::write_summary(&output_dir, &summary)?;
    info!(
        "{} picks processed for {} employees, summary written to {}",
        summary.totals.processed,
        summary.employees,
        path.display()
    );
    Ok(())
}
