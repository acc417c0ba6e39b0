use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Mutex;

use crate::models::TargetRange;

/// Source of session targets. Draws are uniform over the inclusive range.
pub trait TargetSource: Send + Sync {
    fn draw(&self, range: &TargetRange) -> i64;
}

/// Thread-local OS-seeded generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngTargets;

impl TargetSource for ThreadRngTargets {
    fn draw(&self, range: &TargetRange) -> i64 {
        rand::rng().random_range(range.min..=range.max)
    }
}

/// Deterministic generator for reproducible runs and tests.
pub struct SeededTargets {
    rng: Mutex<StdRng>,
}

impl SeededTargets {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl TargetSource for SeededTargets {
    fn draw(&self, range: &TargetRange) -> i64 {
        // A poisoned lock still holds a usable generator
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.random_range(range.min..=range.max)
    }
}
