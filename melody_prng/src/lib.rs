// Seedable pseudo-random number generator for melody generation.
//
// xoshiro256++ (Blackman & Vigna, 2019) with its state expanded from a single
// `u64` seed by SplitMix64. Hand-rolled so that a seed printed by one build
// reproduces the same melody on any platform and any later build.
//
// The generator core uses integer arithmetic only. Floating point appears
// only in `next_f64`, which is derived from the integer stream.

use serde::{Deserialize, Serialize};

/// xoshiro256++ state. One instance per melody generator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MelodyRng {
    s: [u64; 4],
}

impl MelodyRng {
    /// Seed a new generator. Equal seeds give equal output streams.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform `f64` in [0, 1), built from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `[low, high)`, rejection-sampled so small ranges
    /// carry no modulo bias.
    ///
    /// Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let span = high - low;
        if span.is_power_of_two() {
            return low + (self.next_u64() & (span - 1));
        }
        let threshold = span.wrapping_neg() % span;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % span);
            }
        }
    }

    /// Uniform index in `[0, len)`.
    ///
    /// Panics if `len == 0`.
    pub fn index(&mut self, len: usize) -> usize {
        self.range_u64(0, len as u64) as usize
    }

    /// Uniform signed integer in `[low, high]`, both ends included.
    ///
    /// Panics if `low > high`.
    pub fn range_i64_inclusive(&mut self, low: i64, high: i64) -> i64 {
        assert!(low <= high, "range_i64_inclusive: low must be <= high");
        let span = high.abs_diff(low);
        if span == u64::MAX {
            return self.next_u64() as i64;
        }
        low.wrapping_add(self.range_u64(0, span + 1) as i64)
    }

    /// Pick one element uniformly. Returns `None` for an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let i = self.index(items.len());
        items.get(i)
    }
}

/// SplitMix64 step, used only to expand the seed.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = MelodyRng::new(42);
        let mut b = MelodyRng::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = MelodyRng::new(42);
        let mut b = MelodyRng::new(43);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn f64_in_unit_range() {
        let mut rng = MelodyRng::new(12345);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "f64 out of range: {v}");
        }
    }

    #[test]
    fn range_u64_within_bounds() {
        let mut rng = MelodyRng::new(999);
        for _ in 0..10_000 {
            let v = rng.range_u64(10, 20);
            assert!((10..20).contains(&v), "range_u64 out of range: {v}");
        }
    }

    #[test]
    fn signed_inclusive_range_hits_both_ends() {
        let mut rng = MelodyRng::new(7);
        let mut seen = [false; 5];
        for _ in 0..10_000 {
            let v = rng.range_i64_inclusive(-2, 2);
            assert!((-2..=2).contains(&v), "out of range: {v}");
            seen[(v + 2) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s), "every value in [-2, 2] should appear");
    }

    #[test]
    fn degenerate_range_is_constant() {
        let mut rng = MelodyRng::new(3);
        for _ in 0..100 {
            assert_eq!(rng.range_i64_inclusive(0, 0), 0);
        }
    }

    #[test]
    fn choose_covers_all_items() {
        let mut rng = MelodyRng::new(11);
        let items = [0.25, 0.5, 1.0];
        let mut counts = [0usize; 3];
        for _ in 0..3000 {
            let picked = *rng.choose(&items).unwrap();
            let i = items.iter().position(|&x| x == picked).unwrap();
            counts[i] += 1;
        }
        // Roughly uniform: each bucket well above zero and below half.
        for c in counts {
            assert!((700..1300).contains(&c), "skewed counts: {counts:?}");
        }
    }

    #[test]
    fn choose_empty_is_none() {
        let mut rng = MelodyRng::new(1);
        let empty: [u8; 0] = [];
        assert!(rng.choose(&empty).is_none());
    }

    #[test]
    fn serialization_roundtrip_continues_stream() {
        let mut rng = MelodyRng::new(42);
        for _ in 0..100 {
            rng.next_u64();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: MelodyRng = serde_json::from_str(&json).unwrap();
        for _ in 0..100 {
            assert_eq!(rng.next_u64(), restored.next_u64());
        }
    }
}
