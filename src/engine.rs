use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::delay::DelayTime;
use crate::reaction::{MassAction, ReactionChannel};
use crate::waiting::{ExponentialWaiting, WaitingTime};
use crate::{derive_seed, KineticsError, Stoichiometry};

/// Complete binary tree over per-channel rates for O(log n) weighted
/// selection. Rebuilt from scratch every engine iteration, since generalized
/// delays invalidate any cached next-reaction information.
#[derive(Clone, Debug)]
pub(crate) struct RateTree {
    len: usize,
    leaf_count: usize,
    data: Vec<f64>,
}

impl RateTree {
    pub(crate) fn new(len: usize) -> Self {
        let leaf_count = len.max(1).next_power_of_two();
        Self {
            len,
            leaf_count,
            data: vec![0.0; leaf_count * 2],
        }
    }

    pub(crate) fn rebuild(&mut self, rates: &[f64]) {
        debug_assert_eq!(rates.len(), self.len);
        self.data.fill(0.0);
        self.data[self.leaf_count..self.leaf_count + self.len].copy_from_slice(rates);
        for idx in (1..self.leaf_count).rev() {
            self.data[idx] = self.data[idx << 1] + self.data[idx << 1 | 1];
        }
    }

    pub(crate) fn total(&self) -> f64 {
        self.data[1]
    }

    /// Index of the channel whose cumulative-rate interval contains `target`.
    pub(crate) fn select(&self, mut target: f64) -> usize {
        debug_assert!(self.len > 0);
        debug_assert!(target >= 0.0);
        let mut node = 1usize;
        while node < self.leaf_count {
            let left = self.data[node << 1];
            if left > 0.0 && target <= left {
                node <<= 1;
            } else {
                target -= left;
                node = (node << 1) | 1;
            }
        }
        let idx = node - self.leaf_count;
        if idx >= self.len {
            self.len - 1
        } else {
            idx
        }
    }
}

/// Generalized Gillespie simulation engine.
///
/// Owns the particle counts and the simulation clock, a fixed heterogeneous
/// collection of reaction channels, one waiting-time model, and one delay
/// model. Every step aggregates the per-channel rates, selects a channel
/// with probability proportional to its rate, advances the clock by the
/// intrinsic waiting time plus the model delay, and applies the channel's
/// update. Mutating setters allow reusing one engine across ensemble
/// realizations without reconstructing channels and generators.
pub struct GillespieEngine {
    particles: Vec<u64>,
    time_current: f64,
    waiting_time: Box<dyn WaitingTime>,
    delay_time: Box<dyn DelayTime>,
    channels: Vec<Box<dyn ReactionChannel>>,
    rates: Vec<f64>,
    rate_tree: RateTree,
    time_last_reaction: f64,
    time_next_reaction: f64,
    last_reaction: usize,
    next_reaction: usize,
    reacted: bool,
    rng: ChaCha8Rng,
}

impl GillespieEngine {
    /// Builds an engine from explicit waiting-time and delay models and a
    /// non-empty channel collection, with an entropy-seeded selection RNG.
    pub fn new(
        particles: Vec<u64>,
        time: f64,
        waiting_time: Box<dyn WaitingTime>,
        delay_time: Box<dyn DelayTime>,
        channels: Vec<Box<dyn ReactionChannel>>,
    ) -> Result<Self, KineticsError> {
        Self::with_rng(
            particles,
            time,
            waiting_time,
            delay_time,
            channels,
            ChaCha8Rng::from_entropy(),
        )
    }

    /// Like [`GillespieEngine::new`] with a deterministic selection RNG.
    pub fn seeded(
        particles: Vec<u64>,
        time: f64,
        waiting_time: Box<dyn WaitingTime>,
        delay_time: Box<dyn DelayTime>,
        channels: Vec<Box<dyn ReactionChannel>>,
        seed: u64,
    ) -> Result<Self, KineticsError> {
        Self::with_rng(
            particles,
            time,
            waiting_time,
            delay_time,
            channels,
            ChaCha8Rng::seed_from_u64(seed),
        )
    }

    /// Mass-action engine with the standard exponential waiting time: one
    /// channel per stoichiometry, entropy-seeded.
    pub fn mass_action(
        particles: Vec<u64>,
        time: f64,
        delay_time: Box<dyn DelayTime>,
        stoichiometries: Vec<Stoichiometry>,
    ) -> Result<Self, KineticsError> {
        let channels = mass_action_channels(stoichiometries);
        Self::new(
            particles,
            time,
            Box::new(ExponentialWaiting::new()),
            delay_time,
            channels,
        )
    }

    /// Mass-action engine with deterministic seeding; the waiting-time and
    /// selection generators get independent sub-seeds.
    pub fn mass_action_seeded(
        particles: Vec<u64>,
        time: f64,
        delay_time: Box<dyn DelayTime>,
        stoichiometries: Vec<Stoichiometry>,
        seed: u64,
    ) -> Result<Self, KineticsError> {
        let channels = mass_action_channels(stoichiometries);
        Self::with_rng(
            particles,
            time,
            Box::new(ExponentialWaiting::seeded(derive_seed(seed, 0))),
            delay_time,
            channels,
            ChaCha8Rng::seed_from_u64(derive_seed(seed, 1)),
        )
    }

    fn with_rng(
        particles: Vec<u64>,
        time: f64,
        waiting_time: Box<dyn WaitingTime>,
        delay_time: Box<dyn DelayTime>,
        channels: Vec<Box<dyn ReactionChannel>>,
        rng: ChaCha8Rng,
    ) -> Result<Self, KineticsError> {
        if channels.is_empty() {
            return Err(KineticsError::Config(
                "engine requires at least one reaction channel".into(),
            ));
        }
        let nr_species = particles.len();
        for (idx, channel) in channels.iter().enumerate() {
            let stoichiometry = channel.stoichiometry();
            for &(species, _) in stoichiometry
                .reactants()
                .iter()
                .chain(stoichiometry.products())
            {
                if species >= nr_species {
                    return Err(KineticsError::Config(format!(
                        "channel {} refers to species {} but only {} species exist",
                        idx, species, nr_species
                    )));
                }
            }
        }
        let nr_channels = channels.len();
        Ok(Self {
            particles,
            time_current: time,
            waiting_time,
            delay_time,
            channels,
            rates: vec![0.0; nr_channels],
            rate_tree: RateTree::new(nr_channels),
            time_last_reaction: time,
            time_next_reaction: time,
            last_reaction: 0,
            next_reaction: 0,
            reacted: false,
            rng,
        })
    }

    /// Advances past exactly one reaction, or halts the trajectory.
    ///
    /// With at least one positive channel rate this selects a channel,
    /// schedules it at `current + waiting + delay`, applies its update, and
    /// moves the clock to the reaction time. With all rates zero the state
    /// is absorbing: the next-reaction time (and the clock) become infinite
    /// and [`GillespieEngine::reacted`] reports `false`.
    pub fn step(&mut self) {
        self.reacted = false;
        self.compute_rates();
        if self.rate_tree.total() == 0.0 {
            self.time_next_reaction = f64::INFINITY;
        } else {
            self.next_reaction = self.pick_reaction();
            self.schedule_next_reaction();
            self.react(self.next_reaction);
            self.reacted = true;
        }
        self.time_current = self.time_next_reaction;
    }

    /// Advances the trajectory up to `time_max`, committing every reaction
    /// scheduled strictly before it and pinning the clock at `time_max`.
    ///
    /// Rates are recomputed fresh each iteration because the aggregate
    /// changes after every committed reaction. An absorbing state produces an
    /// infinite candidate time, so the loop always terminates. A record of
    /// the last candidate reaction and its time is kept even when it was not
    /// committed.
    pub fn advance_to(&mut self, time_max: f64) {
        self.reacted = false;
        loop {
            self.compute_rates();
            if self.rate_tree.total() == 0.0 {
                self.time_next_reaction = f64::INFINITY;
            } else {
                self.next_reaction = self.pick_reaction();
                self.schedule_next_reaction();
            }
            if self.time_next_reaction < time_max {
                self.time_current = self.time_next_reaction;
                self.react(self.next_reaction);
                self.reacted = true;
            } else {
                self.time_current = time_max;
                break;
            }
        }
    }

    /// Sum of all channel rates at the current state.
    pub fn rate_sum(&mut self) -> f64 {
        self.compute_rates();
        self.rate_tree.total()
    }

    pub fn time(&self) -> f64 {
        self.time_current
    }

    /// Time of the last committed reaction.
    pub fn time_last(&self) -> f64 {
        self.time_last_reaction
    }

    /// Time of the most recently scheduled reaction (infinite after halting).
    pub fn time_next(&self) -> f64 {
        self.time_next_reaction
    }

    /// Channel index of the last committed reaction.
    pub fn last(&self) -> usize {
        self.last_reaction
    }

    /// Channel index of the most recently scheduled reaction.
    pub fn next(&self) -> usize {
        self.next_reaction
    }

    /// Whether a reaction was committed during the last `step`/`advance_to`.
    pub fn reacted(&self) -> bool {
        self.reacted
    }

    /// Read-only view of the particle counts.
    pub fn particles(&self) -> &[u64] {
        &self.particles
    }

    pub fn count(&self, species: usize) -> u64 {
        self.particles[species]
    }

    pub fn nr_species(&self) -> usize {
        self.particles.len()
    }

    pub fn nr_channels(&self) -> usize {
        self.channels.len()
    }

    /// Reactant stoichiometry of a channel.
    pub fn reactants(&self, channel: usize) -> &[(usize, usize)] {
        self.channels[channel].stoichiometry().reactants()
    }

    /// Product stoichiometry of a channel.
    pub fn products(&self, channel: usize) -> &[(usize, usize)] {
        self.channels[channel].stoichiometry().products()
    }

    /// Resets counts and time for a fresh ensemble realization without
    /// reconstructing channels or generators.
    pub fn set(&mut self, particles: Vec<u64>, time: f64) {
        self.particles = particles;
        self.time_current = time;
        self.time_last_reaction = time;
        self.time_next_reaction = time;
        self.reacted = false;
    }

    pub fn set_count(&mut self, species: usize, count: u64) {
        self.particles[species] = count;
    }

    /// Sets the counts of the designated species only.
    ///
    /// Entries are consumed pairwise; when the slices differ in length the
    /// unpaired tail is ignored.
    pub fn set_counts(&mut self, species: &[usize], counts: &[u64]) {
        for (&s, &n) in species.iter().zip(counts) {
            self.particles[s] = n;
        }
    }

    pub fn set_time(&mut self, time: f64) {
        self.time_current = time;
    }

    /// Removes all particles.
    pub fn clear(&mut self) {
        self.particles.fill(0);
    }

    pub fn add(&mut self, species: usize, increment: u64) {
        self.particles[species] += increment;
    }

    /// Decrements a species count, saturating at zero.
    pub fn remove(&mut self, species: usize, decrement: u64) {
        self.particles[species] = self.particles[species].saturating_sub(decrement);
    }

    fn compute_rates(&mut self) {
        for (rate, channel) in self.rates.iter_mut().zip(&self.channels) {
            *rate = channel.rate(&self.particles);
        }
        self.rate_tree.rebuild(&self.rates);
    }

    fn pick_reaction(&mut self) -> usize {
        // A single channel never needs the weighted draw.
        if self.channels.len() == 1 {
            return 0;
        }
        let u: f64 = self.rng.gen();
        self.rate_tree.select(u * self.rate_tree.total())
    }

    fn schedule_next_reaction(&mut self) {
        let waiting = self.waiting_time.waiting_time(&self.rates);
        self.time_next_reaction = self.time_current + waiting + self.delay_time.delay(waiting);
    }

    fn react(&mut self, channel: usize) {
        self.last_reaction = self.next_reaction;
        self.time_last_reaction = self.time_next_reaction;
        self.channels[channel].react(&mut self.particles);
    }
}

fn mass_action_channels(stoichiometries: Vec<Stoichiometry>) -> Vec<Box<dyn ReactionChannel>> {
    stoichiometries
        .into_iter()
        .map(|stoichiometry| Box::new(MassAction::new(stoichiometry)) as Box<dyn ReactionChannel>)
        .collect()
}
