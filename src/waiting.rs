use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Draws the intrinsic inter-reaction waiting time from the per-channel rate
/// vector. Only invoked when at least one rate is positive.
pub trait WaitingTime {
    fn waiting_time(&mut self, rates: &[f64]) -> f64;
}

/// Standard Gillespie waiting time: exponential with rate equal to the sum
/// of all channel rates (minimum of the per-channel exponentials).
pub struct ExponentialWaiting {
    rng: ChaCha8Rng,
}

impl ExponentialWaiting {
    pub fn new() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Default for ExponentialWaiting {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitingTime for ExponentialWaiting {
    fn waiting_time(&mut self, rates: &[f64]) -> f64 {
        let total: f64 = rates.iter().sum();
        let u: f64 = self.rng.gen();
        -u.ln() / total
    }
}
