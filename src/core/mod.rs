mod engine;
mod error;
mod format;
mod market;
mod percentiles;
mod spending;
mod types;
mod weeks;

pub use engine::{
    Batch, net_withdrawal, run_batch, run_monte_carlo, run_monte_carlo_with,
    run_monte_carlo_with_market, simulate_path,
};
pub use error::SimulationError;
pub use format::{format_currency, risk_profile};
pub use market::{
    AssetClassParams, AssetReturns, CholeskyFactors, CorrelatedReturns, Correlations,
    MarketAssumptions, ReturnModel, standard_normal,
};
pub use percentiles::{aggregate, nearest_rank};
pub use spending::{
    FlatSpendingComparison, PhaseSpan, SpendingPhase, SpendingSmileInputs, SpendingSmileResult,
    SpendingSummary, YearlySpending, calculate_spending_smile, smoothed_multiplier,
    step_multiplier,
};
pub use types::{
    ComparisonBlock, ComparisonOutcome, DEFAULT_SIMULATIONS, PercentileSnapshot, REFERENCE_AGE,
    SimulationInputs, SimulationResult, Trajectory,
};
pub use weeks::{
    ADULT_START_AGE, CostOfWaiting, HEALTHY_END_AGE, HealthyWeeks, RetirementWeeks,
    cost_of_waiting, healthy_weeks, retirement_weeks, weeks_remaining,
};
