use chrono::Month;
use log::{debug, info};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::common::Dice;
use crate::error::{GeneratorError, Result};
use crate::order::{OrderAssembler, Row};

/// Order volume is Gaussian per month with a holiday surge at the end of the year.
pub fn volume_model(month: u32) -> Result<(f64, f64)> {
    match month {
        1..=10 => Ok((12_000.0, 4_000.0)),
        11 => Ok((20_000.0, 3_000.0)),
        12 => Ok((26_000.0, 3_000.0)),
        other => Err(GeneratorError::InvalidArgument(format!("month {} is outside 1..=12", other))),
    }
}

pub fn draw_order_count<R: Rng + ?Sized>(month: u32, rng: &mut R) -> Result<u64> {
    let (mean, std_dev) = volume_model(month)?;
    Ok(order_count_from_draw(mean + std_dev * rng.sample::<f64, _>(StandardNormal)))
}

/// Truncated toward zero; a negative draw means no orders that month.
pub fn order_count_from_draw(drawn: f64) -> u64 {
    u64::try_from(drawn as i64).unwrap_or(0)
}

pub fn month_name(month: u32) -> Result<&'static str> {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .ok_or_else(|| GeneratorError::InvalidArgument(format!("month {} is outside 1..=12", month)))
}

/// A month's order count and the order ids reserved for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthPlan {
    pub month: u32,
    pub order_count: u64,
    pub first_order_id: u64,
}

impl MonthPlan {
    /// One id per order, so the next month starts right after this one.
    pub fn next_order_id(&self) -> u64 {
        self.first_order_id + self.order_count
    }
}

/// Draws one month's volume and reserves its order ids.
pub fn plan_month<R: Rng + ?Sized>(month: u32, first_order_id: u64, rng: &mut R) -> Result<MonthPlan> {
    let plan = MonthPlan { month, order_count: draw_order_count(month, rng)?, first_order_id };
    debug!("Planned {:?}", plan);
    Ok(plan)
}

/// Draws every month's volume up front, each from the month's own random
/// source, which is handed back for generation. Each month gets exactly the
/// id range sequential generation would have given it, so months can then
/// run in any order.
pub fn plan_year<D, I>(streams: I, first_order_id: u64) -> Result<Vec<(MonthPlan, D)>>
where
    D: Dice,
    I: IntoIterator<Item = (u32, D)>,
{
    let mut next_id = first_order_id;
    let mut plans = Vec::new();
    for (month, mut dice) in streams {
        let plan = plan_month(month, next_id, dice.rng())?;
        next_id = plan.next_order_id();
        plans.push((plan, dice));
    }
    Ok(plans)
}

/// Rows for one month, kept as records until they are written.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthTable {
    pub month: u32,
    pub year: i32,
    pub order_count: u64,
    pub rows: Vec<Row>,
}

impl MonthTable {
    pub fn item_count(&self) -> usize {
        self.rows.iter().filter(|r| matches!(r, Row::Item(_))).count()
    }

    pub fn header_duplicate_count(&self) -> usize {
        self.rows.iter().filter(|r| matches!(r, Row::HeaderDuplicate)).count()
    }

    pub fn blank_count(&self) -> usize {
        self.rows.iter().filter(|r| matches!(r, Row::Blank)).count()
    }
}

/// Runs the order loop for a pre-drawn plan.
pub fn generate_month<D: Dice>(assembler: &OrderAssembler<'_>, plan: &MonthPlan, dice: &mut D) -> Result<MonthTable> {
    let month_name = month_name(plan.month)?;
    info!("{} orders for {}.", plan.order_count, month_name);

    let mut rows = Vec::new();
    let mut order_id = plan.first_order_id;
    let mut remaining = plan.order_count;
    while remaining > 0 {
        rows.extend(assembler.assemble(order_id, plan.month, dice)?);
        order_id += 1;
        remaining -= 1;
    }

    debug!("{} produced {} rows for {} orders", month_name, rows.len(), plan.order_count);
    Ok(MonthTable { month: plan.month, year: assembler.year(), order_count: plan.order_count, rows })
}

/// Draws the month's volume, generates it and returns the id for the next month.
pub fn run_month<D: Dice>(
    assembler: &OrderAssembler<'_>,
    month: u32,
    starting_order_id: u64,
    dice: &mut D,
) -> Result<(MonthTable, u64)> {
    let plan = plan_month(month, starting_order_id, dice.rng())?;
    let table = generate_month(assembler, &plan, dice)?;
    Ok((table, plan.next_order_id()))
}
