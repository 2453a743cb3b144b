use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use std::fmt;
use std::str::FromStr;

use crate::common::weighted_index;
use crate::error::{GeneratorError, Result};

/// Inclusive age range for each bracket, indexed by `age_group - 1`.
pub const AGE_BRACKETS: [(u8, u8); 4] = [(18, 25), (26, 40), (41, 60), (61, 90)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sex {
    F,
    M,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::F => write!(f, "F"),
            Sex::M => write!(f, "M"),
        }
    }
}

impl FromStr for Sex {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "F" => Ok(Sex::F),
            "M" => Ok(Sex::M),
            other => Err(GeneratorError::InvalidArgument(format!("unknown sex label {:?}", other))),
        }
    }
}

/// Buyer profile drawn once per order and shared by all of its line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Demographics {
    pub sex: Sex,
    pub age: u8,
    pub age_group: u8,
}

/// `weight` is P(F). A weight of 1.0 always yields F, 0.0 always M.
pub fn sample_sex<R: Rng + ?Sized>(weight: f64, rng: &mut R) -> Sex {
    if rng.gen::<f64>() < weight {
        Sex::F
    } else {
        Sex::M
    }
}

/// Categorical draw over the four brackets; returns 1..=4.
pub fn sample_age_group<R: Rng + ?Sized>(weights: &[u32; 4], rng: &mut R) -> Result<u8> {
    Ok(age_group_from(&weighted_index(&weights[..], "age bracket")?, rng))
}

/// Same draw from a prebuilt four-bracket index.
pub fn age_group_from<R: Rng + ?Sized>(brackets: &WeightedIndex<u32>, rng: &mut R) -> u8 {
    brackets.sample(rng) as u8 + 1
}

pub fn sample_age<R: Rng + ?Sized>(age_group: u8, rng: &mut R) -> Result<u8> {
    let (low, high) = age_group
        .checked_sub(1)
        .and_then(|i| AGE_BRACKETS.get(i as usize))
        .ok_or_else(|| {
            GeneratorError::InvalidArgument(format!("age group {} is outside 1..=4", age_group))
        })?;
    Ok(rng.gen_range(*low..=*high))
}

pub fn sample_demographics<R: Rng + ?Sized>(
    sex_skew: f64,
    age_brackets: &WeightedIndex<u32>,
    rng: &mut R,
) -> Result<Demographics> {
    let sex = sample_sex(sex_skew, rng);
    let age_group = age_group_from(age_brackets, rng);
    let age = sample_age(age_group, rng)?;
    Ok(Demographics { sex, age, age_group })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn ages_stay_inside_their_bracket() {
        let mut rng = StdRng::seed_from_u64(1);
        for (group, (low, high)) in (1u8..=4).zip(AGE_BRACKETS) {
            for _ in 0..2_000 {
                let age = sample_age(group, &mut rng).unwrap();
                assert!((low..=high).contains(&age), "group {} gave age {}", group, age);
            }
        }
    }

    #[test]
    fn age_group_outside_range_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        for group in [0u8, 5, 255] {
            assert!(matches!(
                sample_age(group, &mut rng),
                Err(GeneratorError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn extreme_sex_weights_are_deterministic() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..10_000 {
            assert_eq!(sample_sex(1.0, &mut rng), Sex::F);
            assert_eq!(sample_sex(0.0, &mut rng), Sex::M);
        }
    }

    #[test]
    fn sex_frequency_tracks_weight() {
        let mut rng = StdRng::seed_from_u64(3);
        let draws = 100_000;
        let females = (0..draws).filter(|_| sample_sex(0.3, &mut rng) == Sex::F).count();
        let observed = females as f64 / draws as f64;
        assert!((observed - 0.30).abs() < 0.02, "observed {}", observed);
    }

    #[test]
    fn age_group_follows_weights() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..1_000 {
            assert_eq!(sample_age_group(&[0, 0, 5, 0], &mut rng).unwrap(), 3);
        }
        let mut counts = [0u32; 4];
        for _ in 0..10_000 {
            counts[sample_age_group(&[1, 1, 2, 10], &mut rng).unwrap() as usize - 1] += 1;
        }
        assert!(counts[3] > counts[0] + counts[1] + counts[2]);
    }

    #[test]
    fn demographics_are_internally_consistent() {
        let mut rng = StdRng::seed_from_u64(5);
        let brackets = weighted_index(&[8u32, 7, 6, 3][..], "test").unwrap();
        for _ in 0..1_000 {
            let d = sample_demographics(0.5, &brackets, &mut rng).unwrap();
            let (low, high) = AGE_BRACKETS[d.age_group as usize - 1];
            assert!((low..=high).contains(&d.age));
        }
    }

    #[test]
    fn sex_labels_parse_back() {
        assert_eq!("F".parse::<Sex>().unwrap(), Sex::F);
        assert_eq!(Sex::M.to_string().parse::<Sex>().unwrap(), Sex::M);
        assert!("X".parse::<Sex>().is_err());
    }
}
