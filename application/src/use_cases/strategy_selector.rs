//! Strategy and temperature draws for generation calls.
//!
//! All draws for a batch happen on the orchestrating task before any worker
//! is spawned, so a seeded selector yields the same slot assignments no
//! matter how the workers are scheduled.

use ensemble_domain::{SelectionMode, Strategy, StrategySet};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// One slot's sampled configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotDraw {
    pub strategy: Strategy,
    pub temperature: f32,
}

/// Randomized strategy picker with replacement.
pub struct StrategySelector {
    strategies: StrategySet,
    mode: SelectionMode,
    temperature_min: f32,
    temperature_max: f32,
    rng: StdRng,
}

impl StrategySelector {
    pub fn new(
        strategies: StrategySet,
        mode: SelectionMode,
        temperature_band: (f32, f32),
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (min, max) = temperature_band;
        Self {
            strategies,
            mode,
            temperature_min: min.min(max),
            temperature_max: min.max(max),
            rng,
        }
    }

    pub fn strategies(&self) -> &StrategySet {
        &self.strategies
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Draw a strategy and temperature for one call.
    ///
    /// Returns `None` only if the strategy set is empty, which
    /// [`StrategySet`] construction rules out.
    pub fn draw(&mut self) -> Option<SlotDraw> {
        let strategy = match self.mode {
            SelectionMode::Uniform => self.strategies.as_slice().choose(&mut self.rng),
            SelectionMode::Indexed => {
                if self.strategies.is_empty() {
                    return None;
                }
                let index = self.rng.gen_range(0..self.strategies.len());
                self.strategies.get(index)
            }
        }?
        .clone();

        let temperature = if self.temperature_max > self.temperature_min {
            self.rng
                .gen_range(self.temperature_min..=self.temperature_max)
        } else {
            self.temperature_min
        };

        Some(SlotDraw {
            strategy,
            temperature,
        })
    }

    /// Draw `count` slots in slot order.
    pub fn draw_batch(&mut self, count: usize) -> Vec<SlotDraw> {
        (0..count).filter_map(|_| self.draw()).collect()
    }
}
