use rand::distributions::uniform::SampleUniform;
use rand::distributions::WeightedIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Debug;

use crate::error::{GeneratorError, Result};

/// Random source threaded through every sampler.
///
/// `roll` is the yes/no decision behind basket growth and defect injection.
/// It is separate from `rng` so a test can pin those decisions while the
/// continuous draws (dates, quantities, demographics) stay random.
pub trait Dice {
    type Rng: Rng;

    fn rng(&mut self) -> &mut Self::Rng;

    fn roll(&mut self, probability: f64) -> bool {
        self.rng().gen::<f64>() < probability
    }
}

impl Dice for StdRng {
    type Rng = StdRng;

    fn rng(&mut self) -> &mut StdRng {
        self
    }
}

/// Seed for one generation stream. Stream `m` covers both the volume draw and
/// the orders of month `m`, so parallel and sequential runs draw identical data.
pub fn stream_rng(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_mul(1000).wrapping_add(stream)),
        None => StdRng::from_entropy(),
    }
}

pub fn weighted_index<W>(weights: &[W], what: &str) -> Result<WeightedIndex<W>>
where
    W: SampleUniform + PartialOrd + Default + Clone + Debug + for<'a> std::ops::AddAssign<&'a W>,
{
    WeightedIndex::new(weights).map_err(|e| {
        GeneratorError::InvalidArgument(format!("{} weights {:?}: {}", what, weights, e))
    })
}
