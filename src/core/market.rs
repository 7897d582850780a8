use std::f64::consts::PI;

use rand::Rng;

/// Mean and standard deviation of one asset class's nominal annual return.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetClassParams {
    pub mean: f64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlations {
    pub stocks_bonds: f64,
    pub stocks_cash: f64,
    pub bonds_cash: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketAssumptions {
    pub stocks: AssetClassParams,
    pub bonds: AssetClassParams,
    pub cash: AssetClassParams,
    pub correlations: Correlations,
}

impl Default for MarketAssumptions {
    fn default() -> Self {
        Self {
            stocks: AssetClassParams {
                mean: 0.10,
                std_dev: 0.18,
            },
            bonds: AssetClassParams {
                mean: 0.05,
                std_dev: 0.06,
            },
            cash: AssetClassParams {
                mean: 0.03,
                std_dev: 0.01,
            },
            correlations: Correlations {
                stocks_bonds: -0.2,
                stocks_cash: 0.0,
                bonds_cash: 0.3,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetReturns {
    pub stocks: f64,
    pub bonds: f64,
    pub cash: f64,
}

impl AssetReturns {
    pub fn weighted(self, stocks: f64, bonds: f64, cash: f64) -> f64 {
        stocks * self.stocks + bonds * self.bonds + cash * self.cash
    }
}

/// Source of one year's asset-class returns.
pub trait ReturnModel {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> AssetReturns;
}

/// Lower-triangular factor of the 3x3 correlation matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CholeskyFactors {
    pub l21: f64,
    pub l22: f64,
    pub l31: f64,
    pub l32: f64,
    pub l33: f64,
}

impl CholeskyFactors {
    pub fn from_correlations(corr: &Correlations) -> Self {
        let l21 = corr.stocks_bonds;
        let l22 = (1.0 - l21 * l21).sqrt();
        let l31 = corr.stocks_cash;
        let l32 = (corr.bonds_cash - corr.stocks_bonds * corr.stocks_cash) / l22;
        // Inconsistent correlation inputs can push this below zero.
        let l33 = (1.0 - l31 * l31 - l32 * l32).max(0.0).sqrt();

        Self {
            l21,
            l22,
            l31,
            l32,
            l33,
        }
    }

    fn correlate(&self, z1: f64, z2: f64, z3: f64) -> (f64, f64, f64) {
        (
            z1,
            self.l21 * z1 + self.l22 * z2,
            self.l31 * z1 + self.l32 * z2 + self.l33 * z3,
        )
    }
}

/// Normally distributed returns for stocks, bonds and cash, correlated through
/// a closed-form Cholesky factorisation.
#[derive(Debug, Clone, Copy)]
pub struct CorrelatedReturns {
    assumptions: MarketAssumptions,
    factors: CholeskyFactors,
}

impl CorrelatedReturns {
    pub fn new(assumptions: MarketAssumptions) -> Self {
        Self {
            factors: CholeskyFactors::from_correlations(&assumptions.correlations),
            assumptions,
        }
    }
}

impl Default for CorrelatedReturns {
    fn default() -> Self {
        Self::new(MarketAssumptions::default())
    }
}

impl ReturnModel for CorrelatedReturns {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> AssetReturns {
        let z1 = standard_normal(rng);
        let z2 = standard_normal(rng);
        let z3 = standard_normal(rng);
        let (e1, e2, e3) = self.factors.correlate(z1, z2, z3);

        let a = &self.assumptions;
        AssetReturns {
            stocks: a.stocks.mean + a.stocks.std_dev * e1,
            bonds: a.bonds.mean + a.bonds.std_dev * e2,
            cash: a.cash.mean + a.cash.std_dev * e3,
        }
    }
}

/// Box-Muller transform over two uniform draws, rejecting exact zeros.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1 = nonzero_uniform(rng);
    let u2 = nonzero_uniform(rng);
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

fn nonzero_uniform<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    loop {
        let u: f64 = rng.gen_range(0.0..1.0);
        if u != 0.0 {
            return u;
        }
    }
}
