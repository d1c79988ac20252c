//! Idempotency token source
//!
//! Production wiring draws from a generator seeded with the current time.
//! Tests pass their own closure instead.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Boxed `next_token(bound) -> [0, bound)` function
pub type TokenSource = Box<dyn FnMut(u32) -> u32 + Send>;

/// Time-seeded token source
pub fn time_seeded() -> TokenSource {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let mut rng = StdRng::seed_from_u64(seed);
    Box::new(move |bound| if bound == 0 { 0 } else { rng.gen_range(0..bound) })
}

/// Token source that always yields `value`
pub fn fixed(value: u32) -> TokenSource {
    Box::new(move |_| value)
}
