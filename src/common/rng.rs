//! Deterministic random number generation for reproducible runs.
//!
//! The merger's sampling gate and its tie-breaking jitter consume randomness.
//! Tests and offline re-runs want the same decisions every time, so the
//! pipeline takes any `rand::Rng` and this module provides a tiny seeded one.

/// Xorshift64 generator.
///
/// - Minimal (three shift/xor steps)
/// - Deterministic for a given seed
/// - Good enough for gating and jitter, not for cryptography
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    /// Create a new SimpleRng with the given seed.
    /// A zero seed is replaced by 1 to avoid the all-zero fixed point.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    #[inline]
    fn step(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform f64 in [0, 1)
    #[inline]
    pub fn rand(&mut self) -> f64 {
        // Top 53 bits so the result is exactly representable and < 1
        (self.step() >> 11) as f64 / (1u64 << 53) as f64
    }
}

impl rand::RngCore for SimpleRng {
    fn next_u32(&mut self) -> u32 {
        (self.step() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.step()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, RngCore};

    #[test]
    fn test_simple_rng_seed_zero() {
        let mut rng = SimpleRng::new(0);
        assert_eq!(rng.state, 1);
        assert_ne!(rng.next_u64(), 0);
    }

    #[test]
    fn test_simple_rng_xorshift_sequence() {
        let mut rng = SimpleRng::new(42);
        rng.next_u64();
        assert_eq!(rng.state, 45454805674);
    }

    #[test]
    fn test_simple_rng_deterministic() {
        let mut rng1 = SimpleRng::new(7);
        let mut rng2 = SimpleRng::new(7);
        for _ in 0..100 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_rand_range() {
        let mut rng = SimpleRng::new(42);
        for _ in 0..1000 {
            let val = rng.rand();
            assert!((0.0..1.0).contains(&val));
        }
    }

    #[test]
    fn test_works_with_rand_traits() {
        let mut rng = SimpleRng::new(3);
        let mut hits = 0;
        for _ in 0..10_000 {
            if rng.gen_bool(0.25) {
                hits += 1;
            }
        }
        assert!((2000..3000).contains(&hits), "hits = {}", hits);

        let mut buf = [0u8; 13];
        rng.fill_bytes(&mut buf);
        assert!(buf.iter().any(|&b| b != 0));
    }
}
