use serde::Serialize;

pub const GO_GO_MULTIPLIER: f64 = 1.05;
pub const SLOW_GO_MULTIPLIER: f64 = 0.80;
pub const NO_GO_MULTIPLIER: f64 = 1.05;

const GO_GO_END_YEARS: i64 = 10;
const SLOW_GO_END_YEARS: i64 = 20;
const NO_GO_RAMP_YEARS: f64 = 15.0;
const GO_GO_TAPER_FLOOR: f64 = 0.95;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpendingPhase {
    GoGo,
    SlowGo,
    NoGo,
}

impl SpendingPhase {
    /// Step-function phase used by the Monte Carlo engine: both boundaries
    /// belong to the earlier phase.
    pub fn for_years_retired(years_retired: i64) -> Self {
        if years_retired <= GO_GO_END_YEARS {
            SpendingPhase::GoGo
        } else if years_retired <= SLOW_GO_END_YEARS {
            SpendingPhase::SlowGo
        } else {
            SpendingPhase::NoGo
        }
    }

    /// Phase labelling used by the smoothed analysis tool, with half-open
    /// ten-year windows.
    pub fn for_smile_year(years_retired: i64) -> Self {
        if years_retired < GO_GO_END_YEARS {
            SpendingPhase::GoGo
        } else if years_retired < SLOW_GO_END_YEARS {
            SpendingPhase::SlowGo
        } else {
            SpendingPhase::NoGo
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            SpendingPhase::GoGo => GO_GO_MULTIPLIER,
            SpendingPhase::SlowGo => SLOW_GO_MULTIPLIER,
            SpendingPhase::NoGo => NO_GO_MULTIPLIER,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpendingPhase::GoGo => "Go-Go",
            SpendingPhase::SlowGo => "Slow-Go",
            SpendingPhase::NoGo => "No-Go",
        }
    }
}

/// Spending multiplier applied by the engine in a given year of retirement.
pub fn step_multiplier(years_retired: i64) -> f64 {
    SpendingPhase::for_years_retired(years_retired).multiplier()
}

/// Continuous spending-smile curve: an eased taper through Go-Go, a parabolic
/// trough across Slow-Go and an eased climb through No-Go.
pub fn smoothed_multiplier(age: u32, retirement_age: u32) -> f64 {
    let years_retired = age as i64 - retirement_age as i64;
    if years_retired < 0 {
        return 1.0;
    }

    if years_retired <= GO_GO_END_YEARS {
        let t = years_retired as f64 / GO_GO_END_YEARS as f64;
        GO_GO_MULTIPLIER - (GO_GO_MULTIPLIER - GO_GO_TAPER_FLOOR) * t * t
    } else if years_retired <= SLOW_GO_END_YEARS {
        let t = (years_retired - GO_GO_END_YEARS) as f64
            / (SLOW_GO_END_YEARS - GO_GO_END_YEARS) as f64;
        let parabola = 4.0 * t * (1.0 - t);
        let midpoint = (GO_GO_MULTIPLIER + SLOW_GO_MULTIPLIER) / 2.0;
        midpoint - parabola * (midpoint - SLOW_GO_MULTIPLIER)
    } else {
        let t = ((years_retired - SLOW_GO_END_YEARS) as f64 / NO_GO_RAMP_YEARS).min(1.0);
        let ease_in = 1.0 - (1.0 - t).powi(2);
        SLOW_GO_MULTIPLIER + (NO_GO_MULTIPLIER - SLOW_GO_MULTIPLIER) * ease_in
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpendingSmileInputs {
    pub retirement_age: u32,
    pub life_expectancy: u32,
    pub initial_annual_spending: f64,
    pub inflation_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSpan {
    pub phase: SpendingPhase,
    pub name: &'static str,
    pub start_age: u32,
    pub end_age: u32,
    pub average_multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlySpending {
    pub age: u32,
    pub year: u32,
    pub phase: SpendingPhase,
    pub multiplier: f64,
    pub nominal_spending: f64,
    pub real_spending: f64,
    pub cumulative_nominal: f64,
    pub cumulative_real: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingSummary {
    pub total_nominal_spending: f64,
    pub total_real_spending: f64,
    pub average_annual_nominal: f64,
    pub average_annual_real: f64,
    pub peak_spending_age: u32,
    pub lowest_spending_age: u32,
    pub go_go_total: f64,
    pub slow_go_total: f64,
    pub no_go_total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatSpendingComparison {
    pub flat_total_spending: f64,
    pub smile_total_spending: f64,
    pub difference: f64,
    pub percent_difference: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingSmileResult {
    pub phases: Vec<PhaseSpan>,
    pub yearly_spending: Vec<YearlySpending>,
    pub summary: SpendingSummary,
    pub comparison: FlatSpendingComparison,
}

pub fn phase_spans(retirement_age: u32, life_expectancy: u32) -> Vec<PhaseSpan> {
    let go_go_end = retirement_age.saturating_add(9).min(life_expectancy);
    let slow_go_end = retirement_age.saturating_add(19).min(life_expectancy);

    [
        (SpendingPhase::GoGo, retirement_age, go_go_end),
        (SpendingPhase::SlowGo, go_go_end.saturating_add(1), slow_go_end),
        (SpendingPhase::NoGo, slow_go_end.saturating_add(1), life_expectancy),
    ]
    .into_iter()
    .map(|(phase, start_age, end_age)| PhaseSpan {
        phase,
        name: phase.label(),
        start_age,
        end_age,
        average_multiplier: phase.multiplier(),
    })
    .collect()
}

pub fn calculate_spending_smile(inputs: &SpendingSmileInputs) -> SpendingSmileResult {
    let retirement_years = inputs
        .life_expectancy
        .saturating_add(1)
        .saturating_sub(inputs.retirement_age);

    let mut yearly_spending = Vec::with_capacity(retirement_years as usize);
    let mut cumulative_nominal = 0.0;
    let mut cumulative_real = 0.0;
    let mut go_go_total = 0.0;
    let mut slow_go_total = 0.0;
    let mut no_go_total = 0.0;
    let mut peak = (inputs.retirement_age, 0.0_f64);
    let mut lowest = (inputs.retirement_age, f64::INFINITY);

    for i in 0..retirement_years {
        let age = inputs.retirement_age + i;
        let phase = SpendingPhase::for_smile_year(i as i64);
        let multiplier = smoothed_multiplier(age, inputs.retirement_age);

        let real_spending = inputs.initial_annual_spending * multiplier;
        let nominal_spending = real_spending * (1.0 + inputs.inflation_rate).powi(i as i32);
        cumulative_nominal += nominal_spending;
        cumulative_real += real_spending;

        match phase {
            SpendingPhase::GoGo => go_go_total += real_spending,
            SpendingPhase::SlowGo => slow_go_total += real_spending,
            SpendingPhase::NoGo => no_go_total += real_spending,
        }

        if real_spending > peak.1 {
            peak = (age, real_spending);
        }
        if real_spending < lowest.1 {
            lowest = (age, real_spending);
        }

        yearly_spending.push(YearlySpending {
            age,
            year: i + 1,
            phase,
            multiplier,
            nominal_spending,
            real_spending,
            cumulative_nominal,
            cumulative_real,
        });
    }

    let (average_annual_nominal, average_annual_real) = if retirement_years == 0 {
        (0.0, 0.0)
    } else {
        (
            cumulative_nominal / retirement_years as f64,
            cumulative_real / retirement_years as f64,
        )
    };

    let flat_total_spending = inputs.initial_annual_spending * retirement_years as f64;
    let difference = flat_total_spending - cumulative_real;
    let percent_difference = if flat_total_spending == 0.0 {
        0.0
    } else {
        difference / flat_total_spending * 100.0
    };

    SpendingSmileResult {
        phases: phase_spans(inputs.retirement_age, inputs.life_expectancy),
        yearly_spending,
        summary: SpendingSummary {
            total_nominal_spending: cumulative_nominal,
            total_real_spending: cumulative_real,
            average_annual_nominal,
            average_annual_real,
            peak_spending_age: peak.0,
            lowest_spending_age: lowest.0,
            go_go_total,
            slow_go_total,
            no_go_total,
        },
        comparison: FlatSpendingComparison {
            flat_total_spending,
            smile_total_spending: cumulative_real,
            difference,
            percent_difference,
        },
    }
}
