// src/pacing/mod.rs

use crate::config::Config;
use rand_chacha::ChaCha20Rng;
use rand_core::{OsRng, RngCore, SeedableRng};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::info;

/// How a simulated step ends before it is forced to completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    TransientError,
}

/// Supplies the delays and outcomes that drive a simulated run.
pub trait Pacer: Send {
    fn step_delay(&mut self) -> Duration;
    fn step_outcome(&mut self) -> StepOutcome;
    fn retry_delay(&mut self) -> Duration;
}

/// Seeded pseudo-random pacing.
pub struct RandomPacer {
    rng: ChaCha20Rng,
    seed: u64,
    min: Duration,
    max: Duration,
    retry: Duration,
    error_rate: f64,
}

impl RandomPacer {
    pub fn new(config: &Config) -> Self {
        let seed = config.seed.unwrap_or_else(|| {
            let seed = gen_seed();
            info!(seed, "pacing seeded from the OS, pass --seed to replay");
            seed
        });
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            seed,
            min: config.min_step_delay,
            max: config.max_step_delay,
            retry: config.retry_delay,
            error_rate: config.error_rate,
        }
    }

    /// Seed in use, so a run can be replayed with `--seed`.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform sample in `[0, 1)`.
    fn sample(&mut self) -> f64 {
        (self.rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

impl Pacer for RandomPacer {
    fn step_delay(&mut self) -> Duration {
        let min = self.min.as_millis() as u64;
        let span = (self.max.as_millis() as u64).saturating_sub(min);
        if span == 0 {
            return self.min;
        }
        Duration::from_millis(min + self.rng.next_u64() % span)
    }

    fn step_outcome(&mut self) -> StepOutcome {
        if self.sample() < self.error_rate {
            StepOutcome::TransientError
        } else {
            StepOutcome::Completed
        }
    }

    fn retry_delay(&mut self) -> Duration {
        self.retry
    }
}

/// No delays, no errors.
#[derive(Clone, Copy, Debug, Default)]
pub struct InstantPacer;

impl Pacer for InstantPacer {
    fn step_delay(&mut self) -> Duration {
        Duration::ZERO
    }

    fn step_outcome(&mut self) -> StepOutcome {
        StepOutcome::Completed
    }

    fn retry_delay(&mut self) -> Duration {
        Duration::ZERO
    }
}

/// Fixed delays and a queue of outcomes; completes once the queue runs dry.
#[derive(Clone, Debug, Default)]
pub struct ScriptedPacer {
    step_delay: Duration,
    retry_delay: Duration,
    outcomes: VecDeque<StepOutcome>,
}

impl ScriptedPacer {
    pub fn new(step_delay: Duration, retry_delay: Duration) -> Self {
        Self {
            step_delay,
            retry_delay,
            outcomes: VecDeque::new(),
        }
    }

    pub fn with_outcomes(mut self, outcomes: impl IntoIterator<Item = StepOutcome>) -> Self {
        self.outcomes.extend(outcomes);
        self
    }
}

impl Pacer for ScriptedPacer {
    fn step_delay(&mut self) -> Duration {
        self.step_delay
    }

    fn step_outcome(&mut self) -> StepOutcome {
        self.outcomes.pop_front().unwrap_or(StepOutcome::Completed)
    }

    fn retry_delay(&mut self) -> Duration {
        self.retry_delay
    }
}

pub fn from_config(config: &Config) -> Box<dyn Pacer> {
    if config.instant {
        Box::new(InstantPacer)
    } else {
        Box::new(RandomPacer::new(config))
    }
}

fn gen_seed() -> u64 {
    let mut seed = [0u8; 8];
    OsRng.fill_bytes(&mut seed);
    u64::from_le_bytes(seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> RandomPacer {
        RandomPacer::new(&Config {
            seed: Some(seed),
            ..Config::default()
        })
    }

    #[test]
    fn delays_stay_within_the_configured_range() {
        let mut pacer = seeded(7);
        for _ in 0..1000 {
            let delay = pacer.step_delay();
            assert!(delay >= Duration::from_millis(1000), "{delay:?}");
            assert!(delay < Duration::from_millis(3000), "{delay:?}");
        }
        assert_eq!(pacer.retry_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn same_seed_replays_the_same_run() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        for _ in 0..50 {
            assert_eq!(a.step_delay(), b.step_delay());
            assert_eq!(a.step_outcome(), b.step_outcome());
        }
        assert_eq!(a.seed(), 42);
    }

    #[test]
    fn unseeded_run_replays_from_its_reported_seed() {
        let mut fresh = RandomPacer::new(&Config::default());
        let mut replay = seeded(fresh.seed());
        for _ in 0..50 {
            assert_eq!(fresh.step_delay(), replay.step_delay());
            assert_eq!(fresh.step_outcome(), replay.step_outcome());
        }
    }

    #[test]
    fn error_rate_roughly_matches_configuration() {
        let mut pacer = seeded(1234);
        let errors = (0..10_000)
            .filter(|_| pacer.step_outcome() == StepOutcome::TransientError)
            .count();
        assert!((700..1300).contains(&errors), "{errors}");
    }

    #[test]
    fn error_rate_bounds_are_absolute() {
        let mut never = RandomPacer::new(&Config {
            seed: Some(1),
            error_rate: 0.0,
            ..Config::default()
        });
        let mut always = RandomPacer::new(&Config {
            seed: Some(1),
            error_rate: 1.0,
            ..Config::default()
        });
        for _ in 0..500 {
            assert_eq!(never.step_outcome(), StepOutcome::Completed);
            assert_eq!(always.step_outcome(), StepOutcome::TransientError);
        }
    }

    #[test]
    fn collapsed_range_returns_the_minimum() {
        let mut pacer = RandomPacer::new(&Config {
            seed: Some(3),
            min_step_delay: Duration::from_millis(250),
            max_step_delay: Duration::from_millis(250),
            ..Config::default()
        });
        assert_eq!(pacer.step_delay(), Duration::from_millis(250));
    }

    #[test]
    fn scripted_pacer_plays_back_then_completes() {
        let mut pacer = ScriptedPacer::new(Duration::from_millis(10), Duration::from_millis(5))
            .with_outcomes([StepOutcome::TransientError, StepOutcome::Completed]);
        assert_eq!(pacer.step_outcome(), StepOutcome::TransientError);
        assert_eq!(pacer.step_outcome(), StepOutcome::Completed);
        assert_eq!(pacer.step_outcome(), StepOutcome::Completed);
        assert_eq!(pacer.step_delay(), Duration::from_millis(10));
        assert_eq!(pacer.retry_delay(), Duration::from_millis(5));
    }

    #[test]
    fn instant_mode_skips_delays() {
        let mut pacer = from_config(&Config {
            instant: true,
            ..Config::default()
        });
        assert_eq!(pacer.step_delay(), Duration::ZERO);
        assert_eq!(pacer.retry_delay(), Duration::ZERO);
        assert_eq!(pacer.step_outcome(), StepOutcome::Completed);
    }
}
