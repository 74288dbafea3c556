use rand::rngs::StdRng;
use rand::SeedableRng;

/// Injected RNG source for a single Birthing invocation. Design Notes
/// favour an RNG seeded per-call over a shared global generator, so every
/// draw is independently reproducible from a recorded seed.
pub trait RngSource: Send + Sync {
    fn make_rng(&self) -> StdRng;
}

/// Seeds from OS entropy; used in production.
#[derive(Default)]
pub struct EntropyRngSource;

impl RngSource for EntropyRngSource {
    fn make_rng(&self) -> StdRng {
        StdRng::from_entropy()
    }
}

/// Deterministic seed for tests, so a flaky draw can be reproduced exactly.
pub struct FixedRngSource(pub u64);

impl RngSource for FixedRngSource {
    fn make_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.0)
    }
}
