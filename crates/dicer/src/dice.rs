//! Per-process random source for the dice-roll endpoint.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use common::DieFace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Shared six-sided die.
///
/// Clones share one generator, so a single seed drives every roll in the
/// process. The lock is held only for the duration of one draw.
#[derive(Clone)]
pub struct Dice {
    rng: Arc<Mutex<StdRng>>,
}

impl Dice {
    /// Seed once from the current wall-clock time.
    pub fn seeded_from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self::with_seed(seed)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    /// Draw a face uniformly from `[1, 6]`.
    pub fn roll(&self) -> DieFace {
        // A poisoned generator is still a valid generator.
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let value = rng.gen_range(DieFace::MIN..=DieFace::MAX);
        DieFace::new(value).unwrap_or_else(|| unreachable!("gen_range stays within [1, 6]"))
    }
}
