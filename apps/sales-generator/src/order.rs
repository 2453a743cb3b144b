use chrono::NaiveDateTime;
use rand::Rng;
use rand_distr::{Distribution, Geometric};

use crate::address::AddressBook;
use crate::catalog::{Catalog, Product};
use crate::common::Dice;
use crate::demographics::{sample_demographics, Demographics, Sex};
use crate::error::{GeneratorError, Result};
use crate::temporal::sample_order_timestamp;

/// Chance of one extra, unrelated product per order.
pub const IMPULSE_PROBABILITY: f64 = 0.02;
/// Chance per order of a row that repeats the column names.
pub const HEADER_DUPLICATE_PROBABILITY: f64 = 0.002;
/// Chance per order of a row with every field empty.
pub const BLANK_ROW_PROBABILITY: f64 = 0.003;

/// One product line of an order.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub order_id: u64,
    pub product: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub ordered_at: NaiveDateTime,
    pub address: String,
    pub sex: Sex,
    pub age: u8,
    pub age_group: u8,
}

/// An output row. Sentinel rows are deliberate noise, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Item(LineItem),
    HeaderDuplicate,
    Blank,
}

impl Row {
    pub fn as_item(&self) -> Option<&LineItem> {
        match self {
            Row::Item(item) => Some(item),
            _ => None,
        }
    }
}

/// Trials until the first success with p = 1 - 1/price, so cheap items
/// occasionally sell in bulk while expensive ones almost always sell singly.
pub fn sample_quantity<R: Rng + ?Sized>(unit_price: f64, rng: &mut R) -> Result<u32> {
    let geometric = Geometric::new(1.0 - 1.0 / unit_price).map_err(|e| {
        GeneratorError::InvalidArgument(format!("quantity model for price {}: {}", unit_price, e))
    })?;
    // rand_distr counts failures before the first success
    let failures = geometric.sample(rng);
    Ok(u32::try_from(failures.saturating_add(1)).unwrap_or(u32::MAX))
}

/// Everything a line item shares with the rest of its order.
struct OrderContext {
    order_id: u64,
    ordered_at: NaiveDateTime,
    address: String,
    buyer: Demographics,
}

impl OrderContext {
    fn line<R: Rng + ?Sized>(&self, product: &Product, rng: &mut R) -> Result<Row> {
        Ok(Row::Item(LineItem {
            order_id: self.order_id,
            product: product.name.to_string(),
            quantity: sample_quantity(product.unit_price, rng)?,
            unit_price: product.unit_price,
            ordered_at: self.ordered_at,
            address: self.address.clone(),
            sex: self.buyer.sex,
            age: self.buyer.age,
            age_group: self.buyer.age_group,
        }))
    }
}

/// Builds one order at a time from shared, read-only reference data.
#[derive(Debug, Clone, Copy)]
pub struct OrderAssembler<'a> {
    catalog: &'a Catalog,
    addresses: &'a AddressBook,
    year: i32,
}

impl<'a> OrderAssembler<'a> {
    pub fn new(catalog: &'a Catalog, addresses: &'a AddressBook, year: i32) -> Self {
        OrderAssembler { catalog, addresses, year }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Draws a popularity-weighted primary product and builds the order.
    pub fn assemble<D: Dice>(&self, order_id: u64, month: u32, dice: &mut D) -> Result<Vec<Row>> {
        let address = self.addresses.sample(dice.rng()).to_string();
        let ordered_at = sample_order_timestamp(month, self.year, dice.rng())?;
        let primary = self.catalog.sample_product(dice.rng());
        self.build(order_id, address, ordered_at, primary, dice)
    }

    /// Builds an order around a chosen primary product.
    pub fn assemble_with_primary<D: Dice>(
        &self,
        order_id: u64,
        month: u32,
        primary: &str,
        dice: &mut D,
    ) -> Result<Vec<Row>> {
        let primary = self.catalog.lookup(primary)?;
        let address = self.addresses.sample(dice.rng()).to_string();
        let ordered_at = sample_order_timestamp(month, self.year, dice.rng())?;
        self.build(order_id, address, ordered_at, primary, dice)
    }

    fn build<D: Dice>(
        &self,
        order_id: u64,
        address: String,
        ordered_at: NaiveDateTime,
        primary: &Product,
        dice: &mut D,
    ) -> Result<Vec<Row>> {
        // drawn once from the primary product, reused for every line
        let age_brackets = self.catalog.age_brackets(primary.name)?;
        let buyer = sample_demographics(primary.sex_skew, age_brackets, dice.rng())?;
        let order = OrderContext { order_id, ordered_at, address, buyer };

        let mut rows = vec![order.line(primary, dice.rng())?];

        for companion in self.catalog.companions_for(primary.name) {
            if dice.roll(companion.probability) {
                let product = self.catalog.lookup(companion.product)?;
                rows.push(order.line(product, dice.rng())?);
            }
        }

        if dice.roll(IMPULSE_PROBABILITY) {
            let product = self.catalog.sample_product(dice.rng());
            rows.push(order.line(product, dice.rng())?);
        }

        if dice.roll(HEADER_DUPLICATE_PROBABILITY) {
            rows.push(Row::HeaderDuplicate);
        }
        if dice.roll(BLANK_ROW_PROBABILITY) {
            rows.push(Row::Blank);
        }

        Ok(rows)
    }
}
