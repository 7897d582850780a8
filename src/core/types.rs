use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEFAULT_SIMULATIONS: u32 = 1_000;
pub const REFERENCE_AGE: u32 = 85;
pub const LATEST_DELAYED_RETIREMENT_AGE: u32 = 70;
pub const MAX_DELAY_YEARS: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationInputs {
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    pub total_savings: f64,
    pub monthly_contribution: f64,
    pub stocks_percent: u32,
    pub bonds_percent: u32,
    pub cash_percent: u32,
    pub annual_spending: f64,
    pub spending_smile_enabled: bool,
    pub social_security_claim_age: u32,
    pub social_security_monthly_amount: f64,
    pub other_monthly_income: f64,
    pub inflation_rate: f64,
    pub num_simulations: u32,
    pub seed: Option<u64>,
}

impl SimulationInputs {
    /// Inputs with the classic 60/30/10 allocation, no other income and the
    /// spending smile switched on.
    pub fn with_default_allocation(
        current_age: u32,
        retirement_age: u32,
        life_expectancy: u32,
        total_savings: f64,
        monthly_contribution: f64,
        annual_spending: f64,
    ) -> Self {
        Self {
            current_age,
            retirement_age,
            life_expectancy,
            total_savings,
            monthly_contribution,
            stocks_percent: 60,
            bonds_percent: 30,
            cash_percent: 10,
            annual_spending,
            spending_smile_enabled: true,
            social_security_claim_age: 67,
            social_security_monthly_amount: 0.0,
            other_monthly_income: 0.0,
            inflation_rate: 0.03,
            num_simulations: DEFAULT_SIMULATIONS,
            seed: None,
        }
    }

    pub fn horizon_years(&self) -> u32 {
        self.life_expectancy.saturating_sub(self.current_age)
    }

    /// Years the comparison batch pushes retirement back, never past age 70.
    pub fn delay_years(&self) -> u32 {
        MAX_DELAY_YEARS.min(LATEST_DELAYED_RETIREMENT_AGE.saturating_sub(self.retirement_age))
    }

    pub(crate) fn weights(&self) -> (f64, f64, f64) {
        (
            self.stocks_percent as f64 / 100.0,
            self.bonds_percent as f64 / 100.0,
            self.cash_percent as f64 / 100.0,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub balances: Vec<f64>,
    pub exhausted: bool,
}

impl Trajectory {
    pub fn succeeded(&self) -> bool {
        !self.exhausted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentileSnapshot {
    pub age: u32,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonOutcome {
    pub retirement_age: u32,
    pub success_rate: f64,
    pub median_at_85: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonBlock {
    pub current: ComparisonOutcome,
    pub delayed: ComparisonOutcome,
    pub delay_years: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub percentiles: Vec<PercentileSnapshot>,
    pub success_rate: f64,
    pub median_ending_wealth: f64,
    pub worst_case_at_85: f64,
    pub median_at_85: f64,
    pub best_case_at_85: f64,
    pub comparison: ComparisonBlock,
    pub simulation_count: u32,
    pub generated_at: DateTime<Utc>,
}
