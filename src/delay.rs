//! Inter-reaction delay models.
//!
//! A delay model receives the just-drawn waiting time (or any time window)
//! and returns an additional delay to add before the reaction is considered
//! to occur. Compound models combine a counting process over the window with
//! i.i.d. sub-delays; subordinator models accumulate the delay in closed
//! form over the window without an explicit count.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Distribution;

use crate::stable::SkewedStable;
use crate::KineticsError;

/// Extra delay drawn for a given time window. The window argument is the
/// waiting time just drawn by the engine; simple distributional models
/// ignore it.
pub trait DelayTime {
    fn delay(&mut self, window: f64) -> f64;
}

/// Counting process: number of i.i.d. delay events in a time window.
pub trait CountProcess {
    fn count(&mut self, window: f64) -> u64;
}

/// Independent real-valued sub-delay used inside compound models.
pub trait WaitingProcess {
    fn draw(&mut self) -> f64;
}

/// Plain Gillespie: no extra delay.
pub struct NoDelay;

impl DelayTime for NoDelay {
    fn delay(&mut self, _window: f64) -> f64 {
        0.0
    }
}

/// Exponential delay with the given mean, independent of the window.
pub struct ExponentialDelay {
    mean: f64,
    rng: ChaCha8Rng,
}

impl ExponentialDelay {
    pub fn new(mean: f64) -> Result<Self, KineticsError> {
        Self::with_rng(mean, ChaCha8Rng::from_entropy())
    }

    pub fn seeded(mean: f64, seed: u64) -> Result<Self, KineticsError> {
        Self::with_rng(mean, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(mean: f64, rng: ChaCha8Rng) -> Result<Self, KineticsError> {
        if !mean.is_finite() || mean <= 0.0 {
            return Err(KineticsError::Parameter(format!(
                "exponential delay mean {} must be positive",
                mean
            )));
        }
        Ok(Self { mean, rng })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }
}

impl DelayTime for ExponentialDelay {
    fn delay(&mut self, _window: f64) -> f64 {
        let u: f64 = self.rng.gen();
        -(1.0 - u).ln() * self.mean
    }
}

impl WaitingProcess for ExponentialDelay {
    fn draw(&mut self) -> f64 {
        self.delay(0.0)
    }
}

/// Gamma(shape, scale) delay, independent of the window.
pub struct GammaDelay {
    dist: rand_distr::Gamma<f64>,
    rng: ChaCha8Rng,
}

impl GammaDelay {
    pub fn new(shape: f64, scale: f64) -> Result<Self, KineticsError> {
        Self::with_rng(shape, scale, ChaCha8Rng::from_entropy())
    }

    pub fn seeded(shape: f64, scale: f64, seed: u64) -> Result<Self, KineticsError> {
        Self::with_rng(shape, scale, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(shape: f64, scale: f64, rng: ChaCha8Rng) -> Result<Self, KineticsError> {
        let dist = rand_distr::Gamma::new(shape, scale).map_err(|err| {
            KineticsError::Parameter(format!(
                "gamma delay (shape {}, scale {}): {}",
                shape, scale, err
            ))
        })?;
        Ok(Self { dist, rng })
    }
}

impl DelayTime for GammaDelay {
    fn delay(&mut self, _window: f64) -> f64 {
        self.dist.sample(&mut self.rng)
    }
}

impl WaitingProcess for GammaDelay {
    fn draw(&mut self) -> f64 {
        self.delay(0.0)
    }
}

/// Skewed Lévy-stable delay with stability index `alpha`, scale `sigma`, and
/// location `mu`, independent of the window.
pub struct StableDelay {
    dist: SkewedStable,
    rng: ChaCha8Rng,
}

impl StableDelay {
    pub fn new(alpha: f64, sigma: f64, mu: f64) -> Result<Self, KineticsError> {
        Ok(Self {
            dist: SkewedStable::new(alpha, sigma, mu)?,
            rng: ChaCha8Rng::from_entropy(),
        })
    }

    pub fn seeded(alpha: f64, sigma: f64, mu: f64, seed: u64) -> Result<Self, KineticsError> {
        Ok(Self {
            dist: SkewedStable::new(alpha, sigma, mu)?,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }
}

impl DelayTime for StableDelay {
    fn delay(&mut self, _window: f64) -> f64 {
        self.dist.sample(&mut self.rng)
    }
}

impl WaitingProcess for StableDelay {
    fn draw(&mut self) -> f64 {
        self.delay(0.0)
    }
}

/// Poisson counting process: `N ~ Poisson(rate * window)`.
pub struct PoissonProcess {
    rate: f64,
    rng: ChaCha8Rng,
}

impl PoissonProcess {
    pub fn new(rate: f64) -> Result<Self, KineticsError> {
        Self::with_rng(rate, ChaCha8Rng::from_entropy())
    }

    pub fn seeded(rate: f64, seed: u64) -> Result<Self, KineticsError> {
        Self::with_rng(rate, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(rate: f64, rng: ChaCha8Rng) -> Result<Self, KineticsError> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(KineticsError::Parameter(format!(
                "poisson process rate {} must be finite and non-negative",
                rate
            )));
        }
        Ok(Self { rate, rng })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl CountProcess for PoissonProcess {
    fn count(&mut self, window: f64) -> u64 {
        let lambda = self.rate * window;
        if lambda <= 0.0 || !lambda.is_finite() {
            return 0;
        }
        // rand_distr rejects lambda <= 0, which the guard above excludes.
        match rand_distr::Poisson::new(lambda) {
            Ok(dist) => {
                let n: f64 = dist.sample(&mut self.rng);
                n as u64
            }
            Err(_) => 0,
        }
    }
}

/// Generic compound delay: draw a count `N` over the window, sum `N`
/// independent sub-delays. Zero when `N = 0`.
pub struct CompoundDelay<N: CountProcess, W: WaitingProcess> {
    number_process: N,
    waiting_process: W,
}

impl<N: CountProcess, W: WaitingProcess> CompoundDelay<N, W> {
    pub fn new(number_process: N, waiting_process: W) -> Self {
        Self {
            number_process,
            waiting_process,
        }
    }
}

impl<N: CountProcess, W: WaitingProcess> DelayTime for CompoundDelay<N, W> {
    fn delay(&mut self, window: f64) -> f64 {
        let number = self.number_process.count(window);
        let mut delay = 0.0;
        for _ in 0..number {
            delay += self.waiting_process.draw();
        }
        delay
    }
}

/// Compound delay with exponential sub-delays, collapsed to a single
/// Gamma(N, scale) draw (the exact distribution of a sum of N independent
/// exponentials with mean `scale`).
pub struct CompoundExponentialDelay<N: CountProcess> {
    scale: f64,
    number_process: N,
    rng: ChaCha8Rng,
}

impl<N: CountProcess> CompoundExponentialDelay<N> {
    pub fn new(number_process: N, scale: f64) -> Result<Self, KineticsError> {
        Self::with_rng(number_process, scale, ChaCha8Rng::from_entropy())
    }

    pub fn seeded(number_process: N, scale: f64, seed: u64) -> Result<Self, KineticsError> {
        Self::with_rng(number_process, scale, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(number_process: N, scale: f64, rng: ChaCha8Rng) -> Result<Self, KineticsError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(KineticsError::Parameter(format!(
                "compound exponential scale {} must be positive",
                scale
            )));
        }
        Ok(Self {
            scale,
            number_process,
            rng,
        })
    }
}

impl<N: CountProcess> DelayTime for CompoundExponentialDelay<N> {
    fn delay(&mut self, window: f64) -> f64 {
        let number = self.number_process.count(window);
        if number == 0 {
            return 0.0;
        }
        // Shape >= 1 and scale > 0, so construction cannot fail.
        match rand_distr::Gamma::new(number as f64, self.scale) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => 0.0,
        }
    }
}

/// Compound delay with skewed-stable sub-delays, collapsed to a single draw
/// via the stable scaling property: a sum of N i.i.d. S(alpha, sigma, mu)
/// variables is S(alpha, N^(1/alpha) sigma, N mu).
pub struct CompoundStableDelay<N: CountProcess> {
    alpha: f64,
    sigma: f64,
    mu: f64,
    number_process: N,
    rng: ChaCha8Rng,
}

impl<N: CountProcess> CompoundStableDelay<N> {
    pub fn new(number_process: N, alpha: f64, sigma: f64, mu: f64) -> Result<Self, KineticsError> {
        Self::with_rng(number_process, alpha, sigma, mu, ChaCha8Rng::from_entropy())
    }

    pub fn seeded(
        number_process: N,
        alpha: f64,
        sigma: f64,
        mu: f64,
        seed: u64,
    ) -> Result<Self, KineticsError> {
        Self::with_rng(
            number_process,
            alpha,
            sigma,
            mu,
            ChaCha8Rng::seed_from_u64(seed),
        )
    }

    fn with_rng(
        number_process: N,
        alpha: f64,
        sigma: f64,
        mu: f64,
        rng: ChaCha8Rng,
    ) -> Result<Self, KineticsError> {
        // Validate once here; the per-draw rescaled distribution keeps alpha
        // and a positive scale, so it cannot fail afterwards.
        SkewedStable::new(alpha, sigma, mu)?;
        Ok(Self {
            alpha,
            sigma,
            mu,
            number_process,
            rng,
        })
    }
}

impl<N: CountProcess> DelayTime for CompoundStableDelay<N> {
    fn delay(&mut self, window: f64) -> f64 {
        let number = self.number_process.count(window);
        if number == 0 {
            return 0.0;
        }
        let n = number as f64;
        match SkewedStable::new(self.alpha, n.powf(1.0 / self.alpha) * self.sigma, n * self.mu)
        {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => 0.0,
        }
    }
}

/// Stable-subordinator delay in closed form: for a window `dt` the delay is
/// `(gamma dt)^(1/alpha) Z + mu` with `Z` a standard skewed-stable draw, the
/// increment of a stable subordinator over the window. The excess-only form
/// additionally subtracts the nominal elapsed window, reporting only the
/// delay beyond a regular reaction.
pub struct StableSubordinatorDelay {
    alpha: f64,
    gamma: f64,
    mu: f64,
    excess_only: bool,
    dist: SkewedStable,
    rng: ChaCha8Rng,
}

impl StableSubordinatorDelay {
    pub fn new(alpha: f64, gamma: f64, sigma: f64, mu: f64) -> Result<Self, KineticsError> {
        Self::build(alpha, gamma, sigma, mu, false, ChaCha8Rng::from_entropy())
    }

    pub fn seeded(
        alpha: f64,
        gamma: f64,
        sigma: f64,
        mu: f64,
        seed: u64,
    ) -> Result<Self, KineticsError> {
        Self::build(alpha, gamma, sigma, mu, false, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Variant reporting only the excess delay beyond the nominal window.
    pub fn excess_only(alpha: f64, gamma: f64, sigma: f64, mu: f64) -> Result<Self, KineticsError> {
        Self::build(alpha, gamma, sigma, mu, true, ChaCha8Rng::from_entropy())
    }

    pub fn excess_only_seeded(
        alpha: f64,
        gamma: f64,
        sigma: f64,
        mu: f64,
        seed: u64,
    ) -> Result<Self, KineticsError> {
        Self::build(alpha, gamma, sigma, mu, true, ChaCha8Rng::seed_from_u64(seed))
    }

    fn build(
        alpha: f64,
        gamma: f64,
        sigma: f64,
        mu: f64,
        excess_only: bool,
        rng: ChaCha8Rng,
    ) -> Result<Self, KineticsError> {
        if !gamma.is_finite() || gamma < 0.0 {
            return Err(KineticsError::Parameter(format!(
                "subordinator rate {} must be finite and non-negative",
                gamma
            )));
        }
        if !mu.is_finite() {
            return Err(KineticsError::Parameter(format!(
                "subordinator location {} must be finite",
                mu
            )));
        }
        Ok(Self {
            alpha,
            gamma,
            mu,
            excess_only,
            dist: SkewedStable::new(alpha, sigma, 0.0)?,
            rng,
        })
    }
}

impl DelayTime for StableSubordinatorDelay {
    fn delay(&mut self, window: f64) -> f64 {
        let base = (self.gamma * window).powf(1.0 / self.alpha) * self.dist.sample(&mut self.rng)
            + self.mu;
        if self.excess_only {
            base - window
        } else {
            base
        }
    }
}
