use serde::Serialize;

pub const WEEKS_PER_YEAR: u32 = 52;
pub const HEALTHY_END_AGE: u32 = 85;
pub const ADULT_START_AGE: u32 = 20;
const GO_GO_YEARS: u32 = 10;
const WEEKS_PER_MONTH: f64 = 4.33;

/// Adult life measured in weeks, from age 20 to the healthy end age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthyWeeks {
    pub total_adult_weeks: i64,
    pub weeks_lived: i64,
    pub weeks_remaining: u32,
    pub percent_lived: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementWeeks {
    pub weeks_until_retirement: u32,
    pub healthy_retirement_weeks: u32,
    pub go_go_weeks: u32,
    pub slow_go_weeks: u32,
    pub no_go_weeks: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostOfWaiting {
    pub early_retire_age: u32,
    pub late_retire_age: u32,
    pub weeks_lost: u32,
    pub go_go_weeks_lost: u32,
    pub equivalent_saturdays: u32,
    pub equivalent_months: u32,
    pub equivalent_years: u32,
}

/// Healthy weeks left before `healthy_end_age`. `current_age` may be
/// fractional.
pub fn weeks_remaining(current_age: f64, healthy_end_age: u32) -> u32 {
    let weeks = ((healthy_end_age as f64 - current_age) * WEEKS_PER_YEAR as f64).round();
    weeks.max(0.0) as u32
}

pub fn healthy_weeks(current_age: f64, healthy_end_age: u32) -> HealthyWeeks {
    let total_adult_weeks =
        (healthy_end_age as i64 - ADULT_START_AGE as i64) * WEEKS_PER_YEAR as i64;
    let weeks_lived =
        ((current_age - ADULT_START_AGE as f64) * WEEKS_PER_YEAR as f64).round() as i64;
    let percent_lived = if total_adult_weeks == 0 {
        0
    } else {
        (weeks_lived as f64 / total_adult_weeks as f64 * 100.0).round() as i64
    };

    HealthyWeeks {
        total_adult_weeks,
        weeks_lived,
        weeks_remaining: weeks_remaining(current_age, healthy_end_age),
        percent_lived,
    }
}

pub fn retirement_weeks(
    current_age: f64,
    retire_age: u32,
    healthy_end_age: u32,
) -> RetirementWeeks {
    let years = healthy_end_age.saturating_sub(retire_age);
    let go_go = years.min(GO_GO_YEARS);
    let slow_go = years.saturating_sub(GO_GO_YEARS).min(GO_GO_YEARS);
    let no_go = years.saturating_sub(2 * GO_GO_YEARS);
    let until = ((retire_age as f64 - current_age) * WEEKS_PER_YEAR as f64).round();

    RetirementWeeks {
        weeks_until_retirement: until.max(0.0) as u32,
        healthy_retirement_weeks: years * WEEKS_PER_YEAR,
        go_go_weeks: go_go * WEEKS_PER_YEAR,
        slow_go_weeks: slow_go * WEEKS_PER_YEAR,
        no_go_weeks: no_go * WEEKS_PER_YEAR,
    }
}

/// Weeks of retirement given up by retiring at `late_age` instead of
/// `early_age`. The lost weeks come off the front of Go-Go.
pub fn cost_of_waiting(early_age: u32, late_age: u32) -> CostOfWaiting {
    let years = late_age.saturating_sub(early_age);
    let weeks_lost = years * WEEKS_PER_YEAR;

    CostOfWaiting {
        early_retire_age: early_age,
        late_retire_age: late_age,
        weeks_lost,
        go_go_weeks_lost: weeks_lost.min(GO_GO_YEARS * WEEKS_PER_YEAR),
        // one Saturday per week
        equivalent_saturdays: weeks_lost,
        equivalent_months: (weeks_lost as f64 / WEEKS_PER_MONTH).round() as u32,
        equivalent_years: years,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weeks_remaining_rounds_and_floors_at_zero() {
        assert_eq!(weeks_remaining(60.0, HEALTHY_END_AGE), 1_300);
        assert_eq!(weeks_remaining(60.5, HEALTHY_END_AGE), 1_274);
        assert_eq!(weeks_remaining(90.0, HEALTHY_END_AGE), 0);
    }

    #[test]
    fn adult_life_is_counted_from_twenty() {
        let weeks = healthy_weeks(60.0, HEALTHY_END_AGE);
        assert_eq!(weeks.total_adult_weeks, 65 * 52);
        assert_eq!(weeks.weeks_lived, 40 * 52);
        assert_eq!(weeks.weeks_remaining, 1_300);
        assert_eq!(weeks.percent_lived, 62);
    }

    #[test]
    fn fractional_age_feeds_lived_and_remaining_weeks() {
        let weeks = healthy_weeks(60.5, HEALTHY_END_AGE);
        assert_eq!(weeks.weeks_lived, 2_106);
        assert_eq!(weeks.weeks_remaining, 1_274);
        assert_eq!(weeks.total_adult_weeks, 3_380);
    }

    #[test]
    fn degenerate_adult_span_reports_zero_percent() {
        assert_eq!(healthy_weeks(30.0, ADULT_START_AGE).percent_lived, 0);
    }

    #[test]
    fn retirement_weeks_split_into_phases() {
        let weeks = retirement_weeks(55.0, 60, HEALTHY_END_AGE);
        assert_eq!(weeks.weeks_until_retirement, 260);
        assert_eq!(weeks.healthy_retirement_weeks, 25 * 52);
        assert_eq!(weeks.go_go_weeks, 520);
        assert_eq!(weeks.slow_go_weeks, 520);
        assert_eq!(weeks.no_go_weeks, 260);
    }

    #[test]
    fn weeks_until_retirement_uses_fractional_age() {
        assert_eq!(retirement_weeks(60.5, 62, HEALTHY_END_AGE).weeks_until_retirement, 78);
        assert_eq!(retirement_weeks(63.2, 62, HEALTHY_END_AGE).weeks_until_retirement, 0);
    }

    #[test]
    fn retirement_after_healthy_end_has_no_retirement_weeks() {
        let weeks = retirement_weeks(80.0, 88, HEALTHY_END_AGE);
        assert_eq!(weeks.healthy_retirement_weeks, 0);
        assert_eq!(weeks.go_go_weeks, 0);
        assert_eq!(weeks.no_go_weeks, 0);
    }

    #[test]
    fn cost_of_waiting_caps_go_go_loss() {
        let cost = cost_of_waiting(62, 67);
        assert_eq!(cost.weeks_lost, 260);
        assert_eq!(cost.go_go_weeks_lost, 260);
        assert_eq!(cost.equivalent_saturdays, 260);
        assert_eq!(cost.equivalent_months, 60);
        assert_eq!(cost.equivalent_years, 5);

        let long = cost_of_waiting(55, 70);
        assert_eq!(long.go_go_weeks_lost, 520);
        assert_eq!(long.equivalent_saturdays, 780);
    }
}
