use serde::Serialize;

/// What happens to the running total once it drops below zero.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepletionPolicy {
    /// The accumulator keeps compounding below zero; only the charted
    /// point is clamped.
    #[default]
    CarryDeficit,
    /// The accumulator is reset to zero after any year that ends in deficit.
    FloorAtZero,
}

/// One snapshot of the six form fields. Replaced wholesale on every edit.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputState {
    pub age: f64,
    pub life_expectancy: f64,
    pub assets: f64,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub annual_rate_percent: f64,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            age: 30.0,
            life_expectancy: 85.0,
            assets: 5_000_000.0,
            monthly_income: 300_000.0,
            monthly_expenses: 250_000.0,
            annual_rate_percent: 3.0,
        }
    }
}

impl InputState {
    pub fn annual_net_cashflow(&self) -> f64 {
        (self.monthly_income - self.monthly_expenses) * 12.0
    }

    pub fn growth_factor(&self) -> f64 {
        1.0 + self.annual_rate_percent / 100.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct TrajectoryPoint {
    pub year: f64,
    pub assets: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub remaining_years: f64,
    pub remaining_days: f64,
    pub trajectory: Vec<TrajectoryPoint>,
    /// The span was longer than the simulation ceiling and the trajectory
    /// stops early.
    pub truncated: bool,
    pub final_assets: f64,
    pub daily_budget: f64,
}
