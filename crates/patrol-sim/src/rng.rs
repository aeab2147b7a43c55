//! The RNG facade. Every stochastic decision in a run flows through a
//! single seeded ChaCha8 stream, so `(params, seed)` completely specifies
//! a run and two runs with the same pair replay identically.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

pub struct SimRng {
    inner: ChaCha8Rng,
}

impl SimRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// U(low, high). A degenerate range returns `low` without consuming
    /// a draw (zero deviation is a supported parameter).
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if low < high {
            self.inner.gen_range(low..high)
        } else {
            low
        }
    }

    /// N(mean, sd).
    pub fn normal(&mut self, mean: f64, sd: f64) -> f64 {
        let z: f64 = self.inner.sample(StandardNormal);
        mean + sd * z
    }

    /// U{low..=high}.
    pub fn int_inclusive(&mut self, low: u32, high: u32) -> u32 {
        self.inner.gen_range(low..=high)
    }

    /// A fresh U(0, 1) draw.
    pub fn unit(&mut self) -> f64 {
        self.inner.gen()
    }

    /// Bernoulli(p) with p clamped into [0, 1].
    pub fn chance(&mut self, p: f64) -> bool {
        if !(p > 0.0) {
            false
        } else if p >= 1.0 {
            true
        } else {
            self.inner.gen_bool(p)
        }
    }

    /// Categorical draw over `(key, weight)` entries. Weights need not be
    /// normalised; iteration order of the table fixes the draw order.
    pub fn weighted_key<'a>(&mut self, table: &'a BTreeMap<String, f64>) -> &'a str {
        let total: f64 = table.values().sum();
        let mut roll = self.uniform(0.0, total);
        for (key, weight) in table {
            if roll < *weight {
                return key;
            }
            roll -= weight;
        }
        // Rounding residue lands on the final entry.
        table
            .keys()
            .next_back()
            .map(String::as_str)
            .expect("weighted draw over an empty table")
    }
}
