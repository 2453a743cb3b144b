use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

use crate::common::weighted_index;
use crate::error::Result;

pub const STREET_NAMES: [&str; 29] = [
    "1st", "2nd", "3rd", "4th", "5th", "6th", "7th", "8th", "9th", "10th", "11th", "12th", "13th",
    "Main", "MLK", "Redwood", "Cypress", "Sunset", "Washington", "Lincoln", "Chestnut", "South",
    "North", "West", "Virginia", "Ridge", "Dogwood", "Knoll", "Bell",
];

pub const STREET_TYPES: [(&str, u32); 8] = [
    ("Ave", 7),
    ("St", 9),
    ("Dr", 3),
    ("Way", 3),
    ("Lane", 2),
    ("Rd", 8),
    ("Court", 1),
    ("Blvd", 4),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Locale {
    pub city: &'static str,
    pub state: &'static str,
    pub zip: &'static str,
    pub weight: f64,
}

const fn locale(city: &'static str, state: &'static str, zip: &'static str, weight: f64) -> Locale {
    Locale { city, state, zip, weight }
}

/// City, state and zip are only ever drawn together so they always agree.
pub const LOCALES: [Locale; 10] = [
    locale("Sacramento", "CA", "94203", 7.0),
    locale("Minneapolis", "MN", "55111", 5.0),
    locale("Providence", "RI", "02902", 1.0),
    locale("Las Vegas", "NV", "88901", 7.5),
    locale("Omaha", "NE", "68007", 2.0),
    locale("Baton Rouge", "LA", "70808", 2.0),
    locale("Miami", "FL", "33133", 8.0),
    locale("New York City", "NY", "10001", 9.0),
    locale("Chicago", "IL", "60007", 8.0),
    locale("Denver", "CO", "80259", 3.0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub number: u16,
    pub street: &'static str,
    pub street_type: &'static str,
    pub city: &'static str,
    pub state: &'static str,
    pub zip: &'static str,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}, {}, {} {}",
            self.number, self.street, self.street_type, self.city, self.state, self.zip
        )
    }
}

/// Mailing address sampler. Holds its weighted indices so they are built once.
#[derive(Debug, Clone)]
pub struct AddressBook {
    street_types: WeightedIndex<u32>,
    locales: WeightedIndex<f64>,
}

impl AddressBook {
    pub fn new() -> Result<Self> {
        let type_weights: Vec<u32> = STREET_TYPES.iter().map(|(_, w)| *w).collect();
        let locale_weights: Vec<f64> = LOCALES.iter().map(|l| l.weight).collect();
        Ok(AddressBook {
            street_types: weighted_index(&type_weights, "street type")?,
            locales: weighted_index(&locale_weights, "locale")?,
        })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Address {
        let number = rng.gen_range(1..=999);
        // non-empty constant list
        let street = STREET_NAMES.choose(rng).copied().unwrap_or(STREET_NAMES[0]);
        let (street_type, _) = STREET_TYPES[self.street_types.sample(rng)];
        let place = &LOCALES[self.locales.sample(rng)];
        Address {
            number,
            street,
            street_type,
            city: place.city,
            state: place.state,
            zip: place.zip,
        }
    }
}
