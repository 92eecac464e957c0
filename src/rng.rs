use std::cell::RefCell;

use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro128Plus;

/// default generator state (the state of a xoshiro generator must be non-zero)
const DEFAULT_SEED: [u8; 16] = [2,0,0,0, 1,0,0,0, 1,0,0,0, 1,0,0,0];

thread_local! {
    /// process-wide generator. The search runs on a single thread, so every
    /// draw of a run goes through this one state.
    static GENERATOR: RefCell<Xoshiro128Plus> =
        RefCell::new(Xoshiro128Plus::from_seed(DEFAULT_SEED));
}

/** reseeds the process-wide generator. All subsequent draws are a pure
function of the seed, which makes runs reproducible. */
pub fn set_seed(seed:u64) {
    GENERATOR.with(|g| *g.borrow_mut() = Xoshiro128Plus::seed_from_u64(seed));
}

fn next_u32() -> u32 {
    GENERATOR.with(|g| g.borrow_mut().next_u32())
}

/// uniform integer in [0,maximum)
pub fn rand_below(maximum:usize) -> usize {
    debug_assert!(maximum > 0);
    ((next_u32() >> 1) as usize) % maximum
}

/// uniform float in [0,1)
pub fn rand_unit() -> f64 {
    (next_u32() >> 1) as f64 / 2_147_483_648.
}

/// Fisher-Yates shuffle driven by the process-wide generator
pub fn shuffle<T>(values:&mut [T]) {
    for i in (1..values.len()).rev() {
        values.swap(i, rand_below(i+1));
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reproducible_draws() {
        set_seed(42);
        let first:Vec<usize> = (0..100).map(|_| rand_below(1000)).collect();
        set_seed(42);
        let second:Vec<usize> = (0..100).map(|_| rand_below(1000)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rand_below_range() {
        set_seed(1);
        for _ in 0..1000 {
            assert!(rand_below(7) < 7);
        }
        for _ in 0..100 {
            assert_eq!(rand_below(1), 0);
        }
    }

    #[test]
    fn test_rand_unit_range() {
        set_seed(1);
        for _ in 0..1000 {
            let x = rand_unit();
            assert!((0. ..1.).contains(&x));
        }
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        set_seed(7);
        let mut values:Vec<usize> = (0..50).collect();
        shuffle(&mut values);
        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<usize>>());
    }
}
