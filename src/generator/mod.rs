//! Shared pseudorandom generator
//!
//! A [`Generator`] owns an [`Engine`] behind a mutex. Every fill kernel
//! acquires the lock once for its entire duration — never released and
//! reacquired mid-fill — so each call is one critical section and its
//! output is a deterministic function of the pre-call state. The guard is
//! RAII: it is released on every exit path, including errors.

mod engine;

pub use engine::Engine;

use parking_lot::{Mutex, MutexGuard};
use rand::Rng;
use std::sync::OnceLock;

/// Shared pseudorandom generator with an exclusive lock
///
/// Callers share a generator by reference (or `Arc`) across threads; calls
/// against one generator linearize under its lock in some unspecified order
/// under contention.
pub struct Generator {
    engine: Mutex<Engine>,
}

impl Generator {
    /// Create a generator with a fixed seed
    pub fn from_seed(seed: u64) -> Self {
        Self {
            engine: Mutex::new(Engine::from_seed(seed)),
        }
    }

    /// Create a generator seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::rng().random())
    }

    /// Acquire the exclusive lock on the engine
    ///
    /// Blocks if another thread holds the lock; no fairness guarantee
    /// beyond the underlying mutex.
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, Engine> {
        self.engine.lock()
    }

    /// Reset the engine to a fixed seed
    ///
    /// Takes the lock, so it serializes against in-flight fills.
    pub fn set_seed(&self, seed: u64) {
        *self.engine.lock() = Engine::from_seed(seed);
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator").finish_non_exhaustive()
    }
}

/// Process-wide default generator, entropy-seeded on first use
///
/// Every fill kernel takes `Option<&Generator>` and falls back to this
/// instance when none is supplied.
pub fn default_generator() -> &'static Generator {
    static DEFAULT: OnceLock<Generator> = OnceLock::new();
    DEFAULT.get_or_init(Generator::from_entropy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_generators_agree() {
        let a = Generator::from_seed(99);
        let b = Generator::from_seed(99);
        let va: Vec<u64> = {
            let mut e = a.lock();
            (0..16).map(|_| e.next_u64()).collect()
        };
        let vb: Vec<u64> = {
            let mut e = b.lock();
            (0..16).map(|_| e.next_u64()).collect()
        };
        assert_eq!(va, vb);
    }

    #[test]
    fn test_set_seed_resets() {
        let g = Generator::from_seed(5);
        let first = g.lock().next_u64();
        g.set_seed(5);
        assert_eq!(g.lock().next_u64(), first);
    }

    #[test]
    fn test_default_generator_is_shared() {
        let a = default_generator() as *const Generator;
        let b = default_generator() as *const Generator;
        assert_eq!(a, b);
    }

    #[test]
    fn test_lock_serializes_threads() {
        use std::sync::Arc;

        let g = Arc::new(Generator::from_seed(0));
        let mut handles = Vec::new();
        for _ in 0..4 {
            let g = Arc::clone(&g);
            handles.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    let mut e = g.lock();
                    e.next_u64();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        // 4000 draws happened under the lock; a fresh engine advanced the
        // same number of times must match the shared engine's next value.
        let mut reference = Engine::from_seed(0);
        for _ in 0..4000 {
            reference.next_u64();
        }
        assert_eq!(g.lock().next_u64(), reference.next_u64());
    }
}
