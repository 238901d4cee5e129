//! Dwell-time tuning of the reversion delay.

use rand::rngs::StdRng;
use rand::Rng;

/// Produces the next reversion delay when a node enters or leaves `Bulwark`.
pub trait AdaptationStrategy: Send + Sync {
    /// `elapsed` is the number of cycles since the previous bulwark
    /// transition; `entering` is true on promotion, false on reversion.
    fn adapt(&self, delay: f64, elapsed: u64, entering: bool, rng: &mut StdRng) -> f64;
}

/// Leaves the delay alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedAdaptation;

impl AdaptationStrategy for FixedAdaptation {
    fn adapt(&self, delay: f64, _elapsed: u64, _entering: bool, _rng: &mut StdRng) -> f64 {
        delay
    }
}

/// Re-entering soon after leaving multiplies the delay by `up`; leaving
/// multiplies it by `down` perturbed uniformly by up to `noise`.
#[derive(Debug, Clone, Copy)]
pub struct MultiplicativeAdaptation {
    pub up: f64,
    pub down: f64,
    pub cooldown: u64,
    pub noise: f64,
}

impl MultiplicativeAdaptation {
    fn noisy(&self, value: f64, rng: &mut StdRng) -> f64 {
        if self.noise <= 0.0 {
            return value;
        }
        value + rng.gen_range(-self.noise..=self.noise)
    }
}

impl AdaptationStrategy for MultiplicativeAdaptation {
    fn adapt(&self, delay: f64, elapsed: u64, entering: bool, rng: &mut StdRng) -> f64 {
        let next = if entering {
            if elapsed <= self.cooldown {
                delay * self.up
            } else {
                delay
            }
        } else {
            delay * self.noisy(self.down, rng)
        };
        next.max(0.0)
    }
}
