//! Uniform reactor contract consumed by transport-layer drivers, plus
//! closed-form analytic reactors interchangeable with the stochastic engine.

use crate::engine::GillespieEngine;

/// The seam any reactor must satisfy to be driven by the transport layer:
/// bulk time evolution, per-species setters, and a per-species particle
/// (or mass) query. Values are `f64` so discrete and continuum reactors
/// share one surface.
pub trait Reactor {
    fn evolve(&mut self, time_max: f64);
    fn set_particles(&mut self, species: usize, value: f64);
    fn set_time(&mut self, time: f64);
    fn particles(&self, species: usize) -> f64;
}

impl Reactor for GillespieEngine {
    fn evolve(&mut self, time_max: f64) {
        self.advance_to(time_max);
    }

    fn set_particles(&mut self, species: usize, value: f64) {
        self.set_count(species, value.max(0.0).round() as u64);
    }

    fn set_time(&mut self, time: f64) {
        GillespieEngine::set_time(self, time);
    }

    fn particles(&self, species: usize) -> f64 {
        self.count(species) as f64
    }
}

/// Closed-form two-species bimolecular reactor: A + B -> 0 at a fixed rate,
/// evolved analytically in concentration space. Tracks its own local clock.
pub struct BimolecularAnalytic {
    reaction_rate: f64,
    masses: [f64; 2],
    time_current: f64,
    tol: f64,
}

impl BimolecularAnalytic {
    pub fn new(reaction_rate: f64, mass0: f64, mass1: f64) -> Self {
        Self {
            reaction_rate,
            masses: [mass0, mass1],
            time_current: 0.0,
            tol: 1e-10,
        }
    }

    /// Custom tolerance for the equal-mass branch of the solution.
    pub fn with_tolerance(reaction_rate: f64, mass0: f64, mass1: f64, tol: f64) -> Self {
        Self {
            reaction_rate,
            masses: [mass0, mass1],
            time_current: 0.0,
            tol,
        }
    }

    pub fn mass(&self, species: usize) -> f64 {
        self.masses[species]
    }
}

impl Reactor for BimolecularAnalytic {
    fn evolve(&mut self, time_max: f64) {
        let time_step = time_max - self.time_current;
        self.time_current = time_max;

        let max_idx = usize::from(self.masses[0] <= self.masses[1]);
        let mass_max = self.masses[max_idx];
        let mass_min = self.masses[1 - max_idx];
        let diff = mass_max - mass_min;

        if diff > self.tol {
            let exp_val = (-self.reaction_rate * time_step * diff).exp();
            let sol_base = diff / (mass_max - exp_val * mass_min);
            self.masses[max_idx] = mass_max * sol_base;
            self.masses[1 - max_idx] = mass_min * sol_base * exp_val;
        } else {
            // Equal initial masses degenerate to the 1/(1 + k m t) solution.
            let solution_equal = mass_max / (1.0 + self.reaction_rate * mass_max * time_step);
            self.masses = [solution_equal, solution_equal];
        }
    }

    fn set_particles(&mut self, species: usize, value: f64) {
        self.masses[species] = value;
    }

    fn set_time(&mut self, time: f64) {
        self.time_current = time;
    }

    fn particles(&self, species: usize) -> f64 {
        self.masses[species]
    }
}

/// Closed-form single-species decay reactor: A -> 0 at a fixed rate.
pub struct DecayAnalytic {
    reaction_rate: f64,
    mass: f64,
    time_current: f64,
}

impl DecayAnalytic {
    pub fn new(reaction_rate: f64, mass: f64) -> Self {
        Self {
            reaction_rate,
            mass,
            time_current: 0.0,
        }
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }
}

impl Reactor for DecayAnalytic {
    fn evolve(&mut self, time_max: f64) {
        let time_step = time_max - self.time_current;
        self.time_current = time_max;
        self.mass *= (-self.reaction_rate * time_step).exp();
    }

    fn set_particles(&mut self, _species: usize, value: f64) {
        self.mass = value;
    }

    fn set_time(&mut self, time: f64) {
        self.time_current = time;
    }

    fn particles(&self, _species: usize) -> f64 {
        self.mass
    }
}
