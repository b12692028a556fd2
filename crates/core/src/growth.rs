//! Population growth policies.
//!
//! The registry itself has no opinion on how many terminals join per
//! subframe. The scheduler asks a `GrowthPolicy` at the start of every
//! subframe and admits that many.

use rand::{Rng, RngCore};

/// Decides how many new terminals join in a given subframe.
pub trait GrowthPolicy: Send {
    /// Number of terminals to admit this subframe.
    ///
    /// `admitted` is the registry's total-admitted count before admission.
    fn admissions(&mut self, subframe: u64, admitted: usize, rng: &mut dyn RngCore) -> usize;

    /// True once the policy will never admit anyone again.
    fn is_exhausted(&self, admitted: usize) -> bool;
}

/// Fixed population: nobody ever joins.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGrowth;

impl GrowthPolicy for NoGrowth {
    fn admissions(&mut self, _subframe: u64, _admitted: usize, _rng: &mut dyn RngCore) -> usize {
        0
    }

    fn is_exhausted(&self, _admitted: usize) -> bool {
        true
    }
}

/// Uniform draw in `0..=bound` per subframe, optionally capped.
#[derive(Debug, Clone, Copy)]
pub struct BoundedGrowth {
    bound: usize,
    cap: Option<usize>,
}

impl BoundedGrowth {
    /// `cap` is the maximum total population; `None` grows forever.
    pub fn new(bound: usize, cap: Option<usize>) -> Self {
        Self { bound, cap }
    }
}

impl GrowthPolicy for BoundedGrowth {
    fn admissions(&mut self, _subframe: u64, admitted: usize, rng: &mut dyn RngCore) -> usize {
        if self.is_exhausted(admitted) {
            return 0;
        }

        let draw = rng.gen_range(0..=self.bound);
        match self.cap {
            Some(cap) => draw.min(cap.saturating_sub(admitted)),
            None => draw,
        }
    }

    fn is_exhausted(&self, admitted: usize) -> bool {
        if self.bound == 0 {
            return true;
        }
        self.cap.is_some_and(|cap| admitted >= cap)
    }
}
