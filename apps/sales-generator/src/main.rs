use anyhow::Result;
use log::{debug, info};
use rayon::prelude::*;
use std::time::Instant;

use sales_generator::address::AddressBook;
use sales_generator::catalog::Catalog;
use sales_generator::common::stream_rng;
use sales_generator::config::Config;
use sales_generator::month::{generate_month, plan_year, run_month, MonthTable};
use sales_generator::order::OrderAssembler;
use sales_generator::summary::{MonthSummary, RunSummary};
use sales_generator::table;

const ALL_MONTHS: [u32; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];

fn write_month(config: &Config, table: &MonthTable) -> Result<MonthSummary> {
    let path = table::persist_month(table, &config.output_dir, config.output_format)?;
    info!("✅ {} complete ({} rows).", path.display(), table.rows.len());
    MonthSummary::new(table, &path)
}

// Every month draws from its own stream, so a seeded run produces the same
// files whether months run in sequence or in parallel.
fn run(config: &Config, months: &[u32]) -> Result<RunSummary> {
    let start_time = Instant::now();

    let catalog = Catalog::standard()?;
    let addresses = AddressBook::new()?;
    let assembler = OrderAssembler::new(&catalog, &addresses, config.year);

    let (month_summaries, next_order_id) = if config.parallel_months {
        let streams = months.iter().map(|&month| (month, stream_rng(config.seed, month as u64)));
        let plans = plan_year(streams, config.first_order_id)?;
        let next_order_id = plans.last().map(|(plan, _)| plan.next_order_id()).unwrap_or(config.first_order_id);

        info!("🧵 Generating {} months on {} threads", plans.len(), rayon::current_num_threads());
        let summaries = plans
            .into_par_iter()
            .map(|(plan, mut rng)| {
                let table = generate_month(&assembler, &plan, &mut rng)?;
                write_month(config, &table)
            })
            .collect::<Result<Vec<_>>>()?;
        (summaries, next_order_id)
    } else {
        let mut next_order_id = config.first_order_id;
        let mut summaries = Vec::with_capacity(months.len());
        for &month in months {
            let mut rng = stream_rng(config.seed, month as u64);
            let (table, next) = run_month(&assembler, month, next_order_id, &mut rng)?;
            summaries.push(write_month(config, &table)?);
            next_order_id = next;
        }
        (summaries, next_order_id)
    };

    Ok(RunSummary {
        year: config.year,
        seed: config.seed,
        first_order_id: config.first_order_id,
        next_order_id,
        elapsed_secs: start_time.elapsed().as_secs_f64(),
        months: month_summaries,
    })
}

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from_env()?;
    info!("🚀 Starting sales data generation for {}", config.year);
    debug!("Configuration: {:?}", config);

    let summary = run(&config, &ALL_MONTHS)?;
    summary.write(&config.summary_path)?;

    info!(
        "🎉 Generated {} rows across {} months (order ids {}..{}) in {:.1}s",
        summary.total_rows(),
        summary.months.len(),
        summary.first_order_id,
        summary.next_order_id,
        summary.elapsed_secs
    );
    Ok(())
}
