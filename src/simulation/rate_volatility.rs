//! Exchange rate volatility modeling.
//!
//! Generates random-walk rate paths to drive debt pool scenarios under
//! moving prices.

use crate::core::currency::CurrencyKey;
use crate::core::fixed::Wad;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Configuration for a random-walk rate path.
#[derive(Debug, Clone)]
pub struct VolatilityConfig {
    /// Currencies whose rates move. The reference currency should stay
    /// out of this list so the peg itself holds steady.
    pub currencies: Vec<CurrencyKey>,
    /// Largest single-step move as a fraction of the current rate
    /// (e.g. 0.05 allows up to a 5% move per step).
    pub max_step_fraction: f64,
    /// Number of steps in the path.
    pub steps: usize,
    /// RNG seed so runs are reproducible.
    pub seed: u64,
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self {
            currencies: vec![CurrencyKey::new("nAUD"), CurrencyKey::new("nEUR")],
            max_step_fraction: 0.05,
            steps: 50,
            seed: 42,
        }
    }
}

/// A random-walk generator over a set of currency rates.
#[derive(Debug)]
pub struct RateWalk {
    config: VolatilityConfig,
    rng: StdRng,
    current: Vec<(CurrencyKey, Wad)>,
    steps_taken: usize,
}

impl RateWalk {
    /// Start a walk from the given initial rates. Currencies in the config
    /// without an initial rate start at one.
    pub fn new(config: VolatilityConfig, initial: &[(CurrencyKey, Wad)]) -> Self {
        let current = config
            .currencies
            .iter()
            .map(|&key| {
                let rate = initial
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|&(_, r)| r)
                    .unwrap_or(Wad::ONE);
                (key, rate)
            })
            .collect();
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            rng,
            current,
            steps_taken: 0,
        }
    }

    /// Advance one step and return the new rates, or `None` once the
    /// configured number of steps is exhausted.
    pub fn step(&mut self) -> Option<&[(CurrencyKey, Wad)]> {
        if self.steps_taken >= self.config.steps {
            return None;
        }
        self.steps_taken += 1;
        for (_, rate) in &mut self.current {
            let fraction = self
                .rng
                .gen_range(-self.config.max_step_fraction..self.config.max_step_fraction);
            *rate = perturb(*rate, fraction);
        }
        Some(&self.current)
    }

    pub fn rates(&self) -> &[(CurrencyKey, Wad)] {
        &self.current
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }
}

/// Move `rate` by `fraction` of itself, flooring at one raw unit so a
/// rate never collapses to zero mid-walk.
fn perturb(rate: Wad, fraction: f64) -> Wad {
    let scaled = (rate.raw() as f64 * (1.0 + fraction)).max(1.0);
    // f64 has 52 bits of mantissa; path rates live well below 2^52 raw
    // units of drift error, which is noise for simulation purposes.
    Wad::from_raw(scaled as u128)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_is_reproducible() {
        let initial = [(CurrencyKey::new("nAUD"), Wad::from_int(1))];
        let config = VolatilityConfig {
            currencies: vec![CurrencyKey::new("nAUD")],
            seed: 7,
            ..Default::default()
        };
        let mut a = RateWalk::new(config.clone(), &initial);
        let mut b = RateWalk::new(config, &initial);
        for _ in 0..10 {
            assert_eq!(a.step().unwrap(), b.step().unwrap());
        }
    }

    #[test]
    fn test_walk_exhausts_after_configured_steps() {
        let config = VolatilityConfig {
            steps: 3,
            ..Default::default()
        };
        let mut walk = RateWalk::new(config, &[]);
        assert!(walk.step().is_some());
        assert!(walk.step().is_some());
        assert!(walk.step().is_some());
        assert!(walk.step().is_none());
        assert_eq!(walk.steps_taken(), 3);
    }

    #[test]
    fn test_rates_stay_positive() {
        let config = VolatilityConfig {
            currencies: vec![CurrencyKey::new("nEUR")],
            max_step_fraction: 0.5,
            steps: 200,
            seed: 99,
        };
        let mut walk = RateWalk::new(config, &[(CurrencyKey::new("nEUR"), Wad::from_raw(10))]);
        while let Some(rates) = walk.step() {
            assert!(rates[0].1.raw() >= 1);
        }
    }
}
