use crate::Stoichiometry;

/// Capability set the engine requires from every reaction channel: a
/// state-dependent rate, the particle-count update, and access to the
/// underlying stoichiometry. The engine holds channels as
/// `Box<dyn ReactionChannel>`, so the dispatch table is fixed once at
/// construction.
pub trait ReactionChannel {
    /// Propensity of the channel given current particle counts.
    fn rate(&self, numbers: &[u64]) -> f64;

    /// Applies one reaction event to the particle counts.
    ///
    /// Callers must only invoke this when `rate(numbers) > 0`, which
    /// guarantees every reactant count covers its coefficient; decrements
    /// saturate at zero as a guard.
    fn react(&self, numbers: &mut [u64]);

    fn stoichiometry(&self) -> &Stoichiometry;
}

/// Mass-action kinetics for one reaction.
///
/// The rate constant is pre-normalized by the product of reactant
/// coefficient factorials so the discrete propensity counts distinct
/// reactant combinations.
#[derive(Clone, Debug)]
pub struct MassAction {
    stoichiometry: Stoichiometry,
    rate_scaled: f64,
}

impl MassAction {
    pub fn new(stoichiometry: Stoichiometry) -> Self {
        let mut factor = 1.0;
        for &(_, coefficient) in stoichiometry.reactants() {
            factor *= factorial(coefficient);
        }
        let rate_scaled = stoichiometry.reaction_rate() / factor;
        Self {
            stoichiometry,
            rate_scaled,
        }
    }

    /// Propensity for continuous concentrations: plain powers instead of
    /// combinatorial counts.
    pub fn concentration_rate(&self, concentration: &[f64]) -> f64 {
        let mut combinations = 1.0;
        for &(species, coefficient) in self.stoichiometry.reactants() {
            combinations *= concentration[species].powi(coefficient as i32);
        }
        self.rate_scaled * combinations
    }

    /// Advances continuous concentrations by `rate * time_step` instead of
    /// unit events.
    pub fn react_concentration(&self, concentration: &mut [f64], time_step: f64) {
        let rate = self.concentration_rate(concentration);
        for &(species, coefficient) in self.stoichiometry.reactants() {
            concentration[species] -= coefficient as f64 * rate * time_step;
        }
        for &(species, coefficient) in self.stoichiometry.products() {
            concentration[species] += coefficient as f64 * rate * time_step;
        }
    }
}

impl ReactionChannel for MassAction {
    fn rate(&self, numbers: &[u64]) -> f64 {
        let mut combinations = 1.0;
        for &(species, coefficient) in self.stoichiometry.reactants() {
            combinations *= falling_factorial(numbers[species], coefficient);
            if combinations == 0.0 {
                return 0.0;
            }
        }
        self.rate_scaled * combinations
    }

    fn react(&self, numbers: &mut [u64]) {
        for &(species, coefficient) in self.stoichiometry.reactants() {
            numbers[species] = numbers[species].saturating_sub(coefficient as u64);
        }
        for &(species, coefficient) in self.stoichiometry.products() {
            numbers[species] += coefficient as u64;
        }
    }

    fn stoichiometry(&self) -> &Stoichiometry {
        &self.stoichiometry
    }
}

/// `value * (value - 1) * ... * (value - count + 1)`, the number of ordered
/// reactant combinations; zero whenever `value < count`.
#[inline]
pub fn falling_factorial(value: u64, count: usize) -> f64 {
    let count = count as u64;
    match count {
        0 => 1.0,
        1 => value as f64,
        2 if value >= 2 => (value * (value - 1)) as f64,
        _ if value < count => 0.0,
        _ => {
            let mut acc = 1.0;
            for i in 0..count {
                acc *= (value - i) as f64;
            }
            acc
        }
    }
}

#[inline]
fn factorial(count: usize) -> f64 {
    (1..=count).fold(1.0, |acc, k| acc * k as f64)
}
