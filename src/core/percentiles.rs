use super::types::{PercentileSnapshot, Trajectory};

/// Nearest-rank value at `fraction` of an ascending slice: index
/// `floor(n * fraction)`, or 0 when that index does not exist.
pub fn nearest_rank(sorted: &[f64], fraction: f64) -> f64 {
    let index = (sorted.len() as f64 * fraction).floor() as usize;
    sorted.get(index).copied().unwrap_or(0.0)
}

/// Sorted balances of every trajectory at `year`; missing years count as 0.
pub fn sorted_column(trajectories: &[Trajectory], year: usize) -> Vec<f64> {
    let mut column = trajectories
        .iter()
        .map(|t| t.balances.get(year).copied().unwrap_or(0.0))
        .collect::<Vec<_>>();
    column.sort_by(|a, b| a.total_cmp(b));
    column
}

pub fn snapshot_at(trajectories: &[Trajectory], year: usize, age: u32) -> PercentileSnapshot {
    let column = sorted_column(trajectories, year);
    PercentileSnapshot {
        age,
        p10: nearest_rank(&column, 0.10),
        p25: nearest_rank(&column, 0.25),
        p50: nearest_rank(&column, 0.50),
        p75: nearest_rank(&column, 0.75),
        p90: nearest_rank(&column, 0.90),
    }
}

pub fn aggregate(
    trajectories: &[Trajectory],
    start_age: u32,
    horizon_years: u32,
) -> Vec<PercentileSnapshot> {
    (0..=horizon_years)
        .map(|year| snapshot_at(trajectories, year as usize, start_age + year))
        .collect()
}
