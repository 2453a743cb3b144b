use anyhow::{Context, Result};
use chrono::Month;
use clap::Parser;
use log::{debug, info};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about = "Concatenate monthly sales files into one CSV", long_about = None)]
struct Args {
    /// Directory holding the per-month CSV files
    #[arg(short, long, default_value = "./data")]
    input_dir: PathBuf,
    /// Combined file to write
    #[arg(short, long, default_value = "sales_data.csv")]
    output: PathBuf,
}

/// `(year, month)` of a `{Month}_{year}.csv` file name.
fn calendar_key(path: &Path) -> Option<(i32, u8)> {
    let stem = path.file_stem()?.to_str()?;
    let (month, year) = stem.rsplit_once('_')?;
    let month = month.parse::<Month>().ok()?;
    Some((year.parse().ok()?, month.number_from_month() as u8))
}

/// Visible `.csv` files in `dir`, in calendar order. Files not named
/// `{Month}_{year}.csv` follow, sorted by name.
fn month_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if name.starts_with('.') {
            continue;
        }
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("csv") {
            debug!("Skipping {}", path.display());
            continue;
        }
        files.push(path);
    }
    files.sort_by_cached_key(|path| {
        let key = calendar_key(path);
        (key.is_none(), key, path.clone())
    });
    Ok(files)
}

/// Copies every data record of every input after a single header row.
/// The first input's header is used; records are not validated.
fn merge<R: Read, W: Write>(inputs: Vec<(String, R)>, writer: W) -> Result<u64> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut header_written = false;
    let mut merged = 0;

    for (name, input) in inputs {
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(input);
        if !header_written {
            let headers = reader.headers().with_context(|| format!("reading header of {}", name))?;
            csv_writer.write_record(headers)?;
            header_written = true;
        }

        let mut rows = 0;
        for record in reader.records() {
            let record = record.with_context(|| format!("reading {}", name))?;
            csv_writer.write_record(&record)?;
            rows += 1;
        }
        info!("{} merged ({} rows)", name, rows);
        merged += rows;
    }

    csv_writer.flush()?;
    Ok(merged)
}

fn merge_directory(input_dir: &Path, output: &Path) -> Result<u64> {
    let files = month_files(input_dir)?;
    let mut inputs = Vec::with_capacity(files.len());
    for path in &files {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        inputs.push((path.display().to_string(), file));
    }

    let out = File::create(output).with_context(|| format!("creating {}", output.display()))?;
    merge(inputs, BufWriter::new(out))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start_time = Instant::now();

    let rows = merge_directory(&args.input_dir, &args.output)?;

    info!(
        "🎉 {} created successfully with {} rows in {:.1}s",
        args.output.display(),
        rows,
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}
