use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::error::SimulationError;
use super::market::{CorrelatedReturns, MarketAssumptions, ReturnModel};
use super::percentiles::{aggregate, snapshot_at};
use super::spending::step_multiplier;
use super::types::{
    ComparisonBlock, ComparisonOutcome, PercentileSnapshot, REFERENCE_AGE, SimulationInputs,
    SimulationResult, Trajectory,
};

const SOCIAL_SECURITY_COLA: f64 = 0.015;

/// Per-trajectory state. Once a retired portfolio runs dry it stays pinned at
/// zero for the rest of the horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PathState {
    Accumulating(f64),
    Exhausted,
}

impl PathState {
    fn recorded_balance(self) -> f64 {
        match self {
            PathState::Accumulating(balance) => balance.max(0.0),
            PathState::Exhausted => 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Batch {
    pub trajectories: Vec<Trajectory>,
    pub successes: u32,
}

impl Batch {
    pub fn success_rate(&self) -> f64 {
        success_rate(self.successes, self.trajectories.len() as u32)
    }
}

pub fn run_monte_carlo(inputs: &SimulationInputs) -> Result<SimulationResult, SimulationError> {
    run_monte_carlo_with_market(inputs, MarketAssumptions::default())
}

pub fn run_monte_carlo_with_market(
    inputs: &SimulationInputs,
    assumptions: MarketAssumptions,
) -> Result<SimulationResult, SimulationError> {
    let mut rng = match inputs.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    run_monte_carlo_with(inputs, &CorrelatedReturns::new(assumptions), &mut rng)
}

/// Runs the primary batch and the delayed-retirement comparison batch, both
/// drawing from `rng` in that order.
pub fn run_monte_carlo_with<M, R>(
    inputs: &SimulationInputs,
    model: &M,
    rng: &mut R,
) -> Result<SimulationResult, SimulationError>
where
    M: ReturnModel,
    R: Rng + ?Sized,
{
    if inputs.life_expectancy < inputs.current_age {
        return Err(SimulationError::InvalidHorizon {
            current_age: inputs.current_age,
            life_expectancy: inputs.life_expectancy,
        });
    }

    let horizon_years = inputs.horizon_years();
    let simulations = inputs.num_simulations;

    let primary = run_batch(inputs, horizon_years, model, rng);
    let percentiles = aggregate(&primary.trajectories, inputs.current_age, horizon_years);
    let success_rate = primary.success_rate();
    debug!(
        simulations,
        horizon_years,
        successes = primary.successes,
        "primary batch complete"
    );

    let at_85 = reference_snapshot(&percentiles);
    let median_ending_wealth = percentiles.last().map(|s| s.p50).unwrap_or(0.0);

    let delay_years = inputs.delay_years();
    let delayed_inputs = SimulationInputs {
        retirement_age: inputs.retirement_age + delay_years,
        ..inputs.clone()
    };
    let delayed = run_batch(&delayed_inputs, horizon_years, model, rng);
    let reference_index = reference_index(inputs.current_age, horizon_years);
    let delayed_at_85 = snapshot_at(
        &delayed.trajectories,
        reference_index as usize,
        inputs.current_age + reference_index,
    );
    debug!(
        delay_years,
        successes = delayed.successes,
        "delayed retirement batch complete"
    );

    Ok(SimulationResult {
        success_rate,
        median_ending_wealth,
        worst_case_at_85: at_85.p10,
        median_at_85: at_85.p50,
        best_case_at_85: at_85.p90,
        comparison: ComparisonBlock {
            current: ComparisonOutcome {
                retirement_age: inputs.retirement_age,
                success_rate,
                median_at_85: at_85.p50,
            },
            delayed: ComparisonOutcome {
                retirement_age: delayed_inputs.retirement_age,
                success_rate: delayed.success_rate(),
                median_at_85: delayed_at_85.p50,
            },
            delay_years,
        },
        simulation_count: simulations,
        generated_at: Utc::now(),
        percentiles,
    })
}

pub fn run_batch<M, R>(
    inputs: &SimulationInputs,
    horizon_years: u32,
    model: &M,
    rng: &mut R,
) -> Batch
where
    M: ReturnModel,
    R: Rng + ?Sized,
{
    let mut trajectories = Vec::with_capacity(inputs.num_simulations as usize);
    let mut successes = 0_u32;
    for _ in 0..inputs.num_simulations {
        let trajectory = simulate_path(inputs, horizon_years, model, rng);
        if trajectory.succeeded() {
            successes += 1;
        }
        trajectories.push(trajectory);
    }
    Batch {
        trajectories,
        successes,
    }
}

/// Evolves one portfolio year by year. Index 0 of the returned balances is the
/// starting savings; index `y` is the balance at `current_age + y`.
pub fn simulate_path<M, R>(
    inputs: &SimulationInputs,
    horizon_years: u32,
    model: &M,
    rng: &mut R,
) -> Trajectory
where
    M: ReturnModel,
    R: Rng + ?Sized,
{
    let mut balances = Vec::with_capacity(horizon_years as usize + 1);
    balances.push(inputs.total_savings);

    let mut state = PathState::Accumulating(inputs.total_savings);
    for year in 1..=horizon_years {
        state = match state {
            PathState::Exhausted => PathState::Exhausted,
            PathState::Accumulating(balance) => advance_year(inputs, year, balance, model, rng),
        };
        balances.push(state.recorded_balance());
    }

    Trajectory {
        balances,
        exhausted: state == PathState::Exhausted,
    }
}

fn advance_year<M, R>(
    inputs: &SimulationInputs,
    year: u32,
    mut balance: f64,
    model: &M,
    rng: &mut R,
) -> PathState
where
    M: ReturnModel,
    R: Rng + ?Sized,
{
    let age = inputs.current_age + year;
    let retired = age > inputs.retirement_age;

    let (stocks, bonds, cash) = inputs.weights();
    let portfolio_return = model.sample(rng).weighted(stocks, bonds, cash);

    if !retired {
        balance += inputs.monthly_contribution * 12.0;
    }
    balance *= 1.0 + portfolio_return;

    if !retired {
        return PathState::Accumulating(balance);
    }

    balance -= net_withdrawal(inputs, year, age);
    if balance <= 0.0 {
        PathState::Exhausted
    } else {
        PathState::Accumulating(balance)
    }
}

/// Inflated spending less inflated other income and Social Security for one
/// retired year. Negative when income exceeds spending.
pub fn net_withdrawal(inputs: &SimulationInputs, year: u32, age: u32) -> f64 {
    let inflation_factor = (1.0 + inputs.inflation_rate).powi(year as i32);

    let mut spending = inputs.annual_spending * inflation_factor;
    if inputs.spending_smile_enabled {
        let years_retired = age as i64 - inputs.retirement_age as i64;
        spending *= step_multiplier(years_retired);
    }

    let mut income = inputs.other_monthly_income * 12.0 * inflation_factor;
    if age >= inputs.social_security_claim_age {
        let claimed_years = (age - inputs.social_security_claim_age) as i32;
        income += inputs.social_security_monthly_amount
            * 12.0
            * (1.0 + SOCIAL_SECURITY_COLA).powi(claimed_years);
    }

    spending - income
}

fn success_rate(successes: u32, simulations: u32) -> f64 {
    if simulations == 0 {
        return 0.0;
    }
    successes as f64 / simulations as f64 * 100.0
}

/// Year index of age 85, or the last year when 85 is outside the horizon.
fn reference_index(current_age: u32, horizon_years: u32) -> u32 {
    REFERENCE_AGE
        .checked_sub(current_age)
        .map(|offset| offset.min(horizon_years))
        .unwrap_or(horizon_years)
}

fn reference_snapshot(percentiles: &[PercentileSnapshot]) -> PercentileSnapshot {
    percentiles
        .iter()
        .find(|s| s.age == REFERENCE_AGE)
        .or_else(|| percentiles.last())
        .copied()
        .unwrap_or(PercentileSnapshot {
            age: REFERENCE_AGE,
            p10: 0.0,
            p25: 0.0,
            p50: 0.0,
            p75: 0.0,
            p90: 0.0,
        })
}
