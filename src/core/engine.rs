use super::types::{DepletionPolicy, InputState, ProjectionResult, TrajectoryPoint};

pub const DAYS_PER_YEAR: f64 = 365.0;

/// Upper bound on simulated years so an unbounded span (e.g. an infinite
/// life expectancy) still terminates. Runs that hit it are marked
/// `truncated`.
pub const MAX_SIMULATED_YEARS: usize = 100_000;

pub fn project(input: &InputState) -> ProjectionResult {
    project_with(input, DepletionPolicy::CarryDeficit)
}

pub fn project_with(input: &InputState, policy: DepletionPolicy) -> ProjectionResult {
    let remaining_years = input.life_expectancy - input.age;
    let remaining_days = remaining_years * DAYS_PER_YEAR;

    let net_cashflow = input.annual_net_cashflow();
    let growth = input.growth_factor();

    let mut trajectory = Vec::new();
    let mut current_assets = input.assets;
    let mut year = 0.0_f64;
    // NaN spans fail the comparison and simulate nothing.
    while year <= remaining_years && trajectory.len() < MAX_SIMULATED_YEARS {
        current_assets += net_cashflow;
        current_assets *= growth;
        trajectory.push(TrajectoryPoint {
            year: input.age + year,
            assets: displayed_assets(current_assets),
        });
        if policy == DepletionPolicy::FloorAtZero && current_assets < 0.0 {
            current_assets = 0.0;
        }
        year += 1.0;
    }
    let truncated = year <= remaining_years;

    ProjectionResult {
        remaining_years,
        remaining_days,
        trajectory,
        truncated,
        final_assets: current_assets,
        daily_budget: daily_budget(current_assets, remaining_days),
    }
}

/// Final assets spread over the remaining days, floored. Zero or negative
/// day counts are divided through as-is.
pub fn daily_budget(final_assets: f64, remaining_days: f64) -> f64 {
    (final_assets / remaining_days).floor()
}

fn displayed_assets(current_assets: f64) -> f64 {
    if current_assets.is_nan() {
        return f64::NAN;
    }
    // Negative zero charts as plain zero.
    if current_assets <= 0.0 {
        return 0.0;
    }
    current_assets
}
