use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::common::weighted_index;
use crate::error::{GeneratorError, Result};

/// One sellable item.
///
/// `sex_skew` is the probability that a buyer is labelled "F"; `age_weights`
/// are relative weights for the brackets 18-25, 26-40, 41-60 and 61-90.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub name: &'static str,
    pub unit_price: f64,
    pub popularity: u32,
    pub sex_skew: f64,
    pub age_weights: [u32; 4],
}

/// A co-purchase that may ride along with a trigger product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Companion {
    pub product: &'static str,
    pub probability: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct BasketRule {
    pub triggers: &'static [&'static str],
    pub companions: &'static [Companion],
}

const fn product(
    name: &'static str,
    unit_price: f64,
    popularity: u32,
    sex_skew: f64,
    age_weights: [u32; 4],
) -> Product {
    Product { name, unit_price, popularity, sex_skew, age_weights }
}

const fn companion(product: &'static str, probability: f64) -> Companion {
    Companion { product, probability }
}

//                 name                                 price  pop  F-skew  ages
const PRODUCTS: [Product; 20] = [
    product("AA Batteries (12 Pack)",           11.95,  42, 0.52, [4, 7, 8, 7]),
    product("Bike Helmet",                      27.95,  19, 0.60, [2, 4, 6, 8]),
    product("Bungee Cords (10 Pack)",           11.45,  35, 0.48, [3, 5, 8, 8]),
    product("Cherry & Oliver Pitter",           15.49,   6, 0.68, [3, 6, 7, 9]),
    product("Craft Scissors (8 Pack)",          36.0,   11, 0.50, [5, 7, 4, 4]),
    product("Earthworm Fishing Lure (32 Pack)",  7.28,   2, 0.10, [4, 4, 5, 6]),
    product("Hair Curler",                      93.31,  15, 0.75, [8, 7, 6, 3]),
    product("Knee High Boots",                 129.2,   13, 0.80, [5, 6, 8, 7]),
    product("Mechanical Scale",                 38.88,   8, 0.55, [1, 3, 6, 7]),
    product("Milky Mama Nursing Cover",         20.0,    4, 0.90, [6, 8, 1, 1]),
    product("Noahs Arc Soundbar",              799.0,    2, 0.40, [5, 8, 6, 3]),
    product("Shooter Video Game",               59.99,  38, 0.35, [9, 7, 5, 1]),
    product("Shower Grab Bar",                  34.98,  10, 0.40, [1, 1, 2, 10]),
    product("Snazzy Hair Clips (3 Pack)",        5.30,  26, 0.85, [6, 5, 4, 4]),
    product("Space Cadet Snow Blower",        1399.0,    1, 0.30, [1, 4, 6, 9]),
    product("Sun Hat",                          24.96,  30, 0.60, [4, 5, 6, 7]),
    product("Tub of 50 Marbles",                17.75,   5, 0.65, [5, 7, 5, 7]),
    product("Velcro Shoes",                     43.16,  17, 0.20, [5, 2, 4, 7]),
    product("Vuvuzela",                          4.99,   8, 0.33, [7, 5, 5, 3]),
    product("Wireless Phone Charger",           42.42,  41, 0.45, [8, 7, 7, 6]),
];

const BASKET_RULES: [BasketRule; 3] = [
    BasketRule {
        triggers: &["Hair Curler"],
        companions: &[
            companion("Snazzy Hair Clips (3 Pack)", 0.22),
            companion("AA Batteries (12 Pack)", 0.05),
            companion("Milky Mama Nursing Cover", 0.07),
        ],
    },
    BasketRule {
        triggers: &["Craft Scissors (8 Pack)", "Bungee Cords (10 Pack)"],
        companions: &[
            companion("Tub of 50 Marbles", 0.09),
            companion("Earthworm Fishing Lure (32 Pack)", 0.04),
        ],
    },
    BasketRule {
        triggers: &["Velcro Shoes"],
        companions: &[
            companion("Shower Grab Bar", 0.18),
            companion("Sun Hat", 0.04),
            companion("Tub of 50 Marbles", 0.07),
        ],
    },
];

/// Read-only product reference data, built once and shared by reference.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    rules: Vec<BasketRule>,
    popularity: WeightedIndex<u32>,
    // parallel to `products`
    age_brackets: Vec<WeightedIndex<u32>>,
}

impl Catalog {
    pub fn standard() -> Result<Self> {
        Self::new(PRODUCTS.to_vec(), BASKET_RULES.to_vec())
    }

    pub fn new(products: Vec<Product>, rules: Vec<BasketRule>) -> Result<Self> {
        let mut age_brackets = Vec::with_capacity(products.len());
        for product in &products {
            // quantity is geometric with p = 1 - 1/price
            if !(product.unit_price > 1.0) {
                return Err(GeneratorError::InvalidArgument(format!(
                    "{} has price {}, must exceed 1",
                    product.name, product.unit_price
                )));
            }
            if !(0.0..=1.0).contains(&product.sex_skew) {
                return Err(GeneratorError::InvalidArgument(format!(
                    "{} has sex skew {}, must be within [0, 1]",
                    product.name, product.sex_skew
                )));
            }
            age_brackets.push(weighted_index(&product.age_weights[..], product.name)?);
        }

        let weights: Vec<u32> = products.iter().map(|p| p.popularity).collect();
        let popularity = weighted_index(&weights, "popularity")?;

        let catalog = Catalog { products, rules, popularity, age_brackets };
        for rule in &catalog.rules {
            for name in rule.triggers.iter().chain(rule.companions.iter().map(|c| &c.product)) {
                catalog.lookup(name)?;
            }
        }
        Ok(catalog)
    }

    pub fn lookup(&self, name: &str) -> Result<&Product> {
        self.products
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| GeneratorError::NotFound(name.to_string()))
    }

    /// Age-bracket distribution of a product's buyers, built once with the catalog.
    pub fn age_brackets(&self, name: &str) -> Result<&WeightedIndex<u32>> {
        self.products
            .iter()
            .position(|p| p.name == name)
            .map(|i| &self.age_brackets[i])
            .ok_or_else(|| GeneratorError::NotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.products.iter().map(|p| p.name).collect()
    }

    /// Parallel to `names()`.
    pub fn popularity_weights(&self) -> Vec<u32> {
        self.products.iter().map(|p| p.popularity).collect()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Popularity-weighted draw over the whole catalog.
    pub fn sample_product<R: Rng + ?Sized>(&self, rng: &mut R) -> &Product {
        &self.products[self.popularity.sample(rng)]
    }

    /// Companion items for a primary product; empty when it triggers no rule.
    pub fn companions_for(&self, name: &str) -> &[Companion] {
        self.rules
            .iter()
            .find(|rule| rule.triggers.iter().any(|trigger| *trigger == name))
            .map(|rule| rule.companions)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn standard_catalog_has_every_product_once() {
        let catalog = Catalog::standard().unwrap();
        let names = catalog.names();
        assert_eq!(names.len(), 20);
        let mut deduped = names.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), names.len());
        assert_eq!(catalog.popularity_weights().len(), names.len());
    }

    #[test]
    fn lookup_finds_known_products() {
        let catalog = Catalog::standard().unwrap();
        let curler = catalog.lookup("Hair Curler").unwrap();
        assert_eq!(curler.unit_price, 93.31);
        assert_eq!(curler.popularity, 15);
        assert_eq!(curler.sex_skew, 0.75);
        assert_eq!(curler.age_weights, [8, 7, 6, 3]);
    }

    #[test]
    fn lookup_reports_unknown_products() {
        let catalog = Catalog::standard().unwrap();
        assert_eq!(
            catalog.lookup("Left Handed Spoon"),
            Err(GeneratorError::NotFound("Left Handed Spoon".to_string()))
        );
    }

    #[test]
    fn companions_follow_basket_rules() {
        let catalog = Catalog::standard().unwrap();
        assert_eq!(catalog.companions_for("Hair Curler").len(), 3);
        assert_eq!(catalog.companions_for("Craft Scissors (8 Pack)"), catalog.companions_for("Bungee Cords (10 Pack)"));
        let velcro: Vec<_> = catalog.companions_for("Velcro Shoes").iter().map(|c| c.product).collect();
        assert_eq!(velcro, vec!["Shower Grab Bar", "Sun Hat", "Tub of 50 Marbles"]);
        assert!(catalog.companions_for("Vuvuzela").is_empty());
    }

    #[test]
    fn rejects_price_that_breaks_quantity_model() {
        let mut products = PRODUCTS.to_vec();
        products[0].unit_price = 0.99;
        assert!(matches!(
            Catalog::new(products, vec![]),
            Err(GeneratorError::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_rules_naming_unknown_products() {
        let rules = vec![BasketRule {
            triggers: &["Hair Curler"],
            companions: &[Companion { product: "Hair Dryer", probability: 0.5 }],
        }];
        assert_eq!(
            Catalog::new(PRODUCTS.to_vec(), rules).unwrap_err(),
            GeneratorError::NotFound("Hair Dryer".to_string())
        );
    }

    #[test]
    fn age_brackets_follow_product_weights() {
        let catalog = Catalog::standard().unwrap();
        let mut rng = StdRng::seed_from_u64(12);
        let grab_bar = catalog.age_brackets("Shower Grab Bar").unwrap();
        let mut counts = [0u32; 4];
        for _ in 0..10_000 {
            counts[grab_bar.sample(&mut rng)] += 1;
        }
        // weights 1, 1, 2, 10
        assert!(counts[3] > counts[0] + counts[1] + counts[2]);
        assert_eq!(
            catalog.age_brackets("Hair Dryer").unwrap_err(),
            GeneratorError::NotFound("Hair Dryer".to_string())
        );
    }

    #[test]
    fn popular_products_are_drawn_more_often() {
        let catalog = Catalog::standard().unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for _ in 0..20_000 {
            *counts.entry(catalog.sample_product(&mut rng).name).or_default() += 1;
        }
        // weight 42 vs weight 1
        assert!(counts["AA Batteries (12 Pack)"] > 10 * counts.get("Space Cadet Snow Blower").copied().unwrap_or(0));
    }
}
