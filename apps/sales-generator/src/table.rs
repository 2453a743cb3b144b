use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use csv::StringRecord;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::GeneratorError;
use crate::month::{month_name, MonthTable};
use crate::order::{LineItem, Row};
use crate::temporal::{format_order_date, parse_order_date};

pub const COLUMNS: [&str; 9] = ["id", "product", "quantity", "price", "date", "address", "sex", "age", "age_group"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "parquet" => Ok(OutputFormat::Parquet),
            other => Err(anyhow::anyhow!("unsupported output format {:?} (expected csv or parquet)", other)),
        }
    }
}

/// `January_2020.csv` and friends.
pub fn month_file_name(month: u32, year: i32, format: OutputFormat) -> Result<String> {
    Ok(format!("{}_{}.{}", month_name(month)?, year, format.extension()))
}

fn to_fields(row: &Row) -> [String; 9] {
    match row {
        Row::Item(item) => [
            item.order_id.to_string(),
            item.product.clone(),
            item.quantity.to_string(),
            item.unit_price.to_string(),
            format_order_date(&item.ordered_at),
            item.address.clone(),
            item.sex.to_string(),
            item.age.to_string(),
            item.age_group.to_string(),
        ],
        Row::HeaderDuplicate => COLUMNS.map(str::to_string),
        Row::Blank => Default::default(),
    }
}

fn from_record(record: &StringRecord, line: u64) -> std::result::Result<Row, GeneratorError> {
    let malformed = |reason: String| GeneratorError::MalformedRow { line, reason };

    if record.len() != COLUMNS.len() {
        return Err(malformed(format!("expected {} fields, found {}", COLUMNS.len(), record.len())));
    }
    if record.iter().all(str::is_empty) {
        return Ok(Row::Blank);
    }
    if record.iter().eq(COLUMNS.iter().copied()) {
        return Ok(Row::HeaderDuplicate);
    }

    fn parse<T: std::str::FromStr>(value: &str, column: &str) -> std::result::Result<T, String>
    where
        T::Err: std::fmt::Display,
    {
        value.parse().map_err(|e| format!("{} {:?}: {}", column, value, e))
    }

    let item = LineItem {
        order_id: parse(&record[0], "id").map_err(malformed)?,
        product: record[1].to_string(),
        quantity: parse(&record[2], "quantity").map_err(malformed)?,
        unit_price: parse(&record[3], "price").map_err(malformed)?,
        ordered_at: parse_order_date(&record[4]).map_err(|e| malformed(e.to_string()))?,
        address: record[5].to_string(),
        sex: record[6].parse().map_err(|e: GeneratorError| malformed(e.to_string()))?,
        age: parse(&record[7], "age").map_err(malformed)?,
        age_group: parse(&record[8], "age_group").map_err(malformed)?,
    };
    Ok(Row::Item(item))
}

pub fn write_csv<W: Write>(rows: &[Row], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(COLUMNS)?;
    for row in rows {
        csv_writer.write_record(to_fields(row))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Parses a month file back into rows; sentinel rows come back as their variants.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Row>> {
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let line = index as u64 + 2;
        let record = record.with_context(|| format!("CSV parse error at line {}", line))?;
        rows.push(from_record(&record, line)?);
    }
    Ok(rows)
}

/// Every column is Utf8: sentinel rows put text into numeric columns.
pub fn to_record_batch(rows: &[Row]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(
        COLUMNS.iter().map(|name| Field::new(*name, DataType::Utf8, false)).collect::<Vec<_>>(),
    ));

    let records: Vec<[String; 9]> = rows.iter().map(to_fields).collect();
    let columns: Vec<ArrayRef> = (0..COLUMNS.len())
        .map(|i| Arc::new(StringArray::from_iter_values(records.iter().map(|r| r[i].as_str()))) as ArrayRef)
        .collect();

    Ok(RecordBatch::try_new(schema, columns)?)
}

pub fn write_parquet<W: Write + Send>(rows: &[Row], writer: W) -> Result<()> {
    let batch = to_record_batch(rows)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(writer, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Writes one month into `dir`, creating it when missing. Returns the file path.
pub fn persist_month(table: &MonthTable, dir: &Path, format: OutputFormat) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating output directory {}", dir.display()))?;
    let path = dir.join(month_file_name(table.month, table.year, format)?);
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let writer = BufWriter::new(file);

    match format {
        OutputFormat::Csv => write_csv(&table.rows, writer),
        OutputFormat::Parquet => write_parquet(&table.rows, writer),
    }
    .with_context(|| format!("writing {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AddressBook;
    use crate::catalog::Catalog;
    use crate::demographics::Sex;
    use crate::month::{generate_month, MonthPlan};
    use crate::order::OrderAssembler;
    use arrow::array::Array;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn item(order_id: u64, product: &str, price: f64) -> Row {
        Row::Item(LineItem {
            order_id,
            product: product.to_string(),
            quantity: 2,
            unit_price: price,
            ordered_at: NaiveDate::from_ymd_opt(2020, 12, 31).unwrap().and_hms_opt(23, 59, 0).unwrap(),
            address: "917 1st St, Providence, RI 02902".to_string(),
            sex: Sex::F,
            age: 33,
            age_group: 2,
        })
    }

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sales-generator-{}-{}", tag, std::process::id()))
    }

    #[test]
    fn writes_fixed_column_layout() {
        let rows = vec![item(123456, "Craft Scissors (8 Pack)", 36.0), Row::HeaderDuplicate, Row::Blank];
        let mut buffer = Vec::new();
        write_csv(&rows, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,product,quantity,price,date,address,sex,age,age_group");
        assert_eq!(
            lines[1],
            "123456,Craft Scissors (8 Pack),2,36,12/31/20 23:59,\"917 1st St, Providence, RI 02902\",F,33,2"
        );
        assert_eq!(lines[2], lines[0]);
        assert_eq!(lines[3], ",,,,,,,,");
    }

    #[test]
    fn generated_month_round_trips_through_csv() {
        let catalog = Catalog::standard().unwrap();
        let addresses = AddressBook::new().unwrap();
        let assembler = OrderAssembler::new(&catalog, &addresses, 2020);
        let plan = MonthPlan { month: 2, order_count: 2_000, first_order_id: 123_456 };
        let mut table = generate_month(&assembler, &plan, &mut StdRng::seed_from_u64(31)).unwrap();
        table.rows.extend([Row::HeaderDuplicate, Row::Blank]);

        let mut buffer = Vec::new();
        write_csv(&table.rows, &mut buffer).unwrap();
        let parsed = read_csv(buffer.as_slice()).unwrap();
        assert_eq!(parsed, table.rows);
    }

    #[test]
    fn read_reports_line_of_malformed_row() {
        let text = "id,product,quantity,price,date,address,sex,age,age_group\n\
                    1,Vuvuzela,one,4.99,01/02/20 12:00,\"1 Main St, Omaha, NE 68007\",M,20,1\n";
        let err = read_csv(text.as_bytes()).unwrap_err();
        let err = err.downcast::<GeneratorError>().unwrap();
        assert!(matches!(err, GeneratorError::MalformedRow { line: 2, .. }), "{:?}", err);
    }

    #[test]
    fn record_batch_keeps_every_row_as_text() {
        let rows = vec![item(7, "Sun Hat", 24.96), Row::Blank, Row::HeaderDuplicate];
        let batch = to_record_batch(&rows).unwrap();
        assert_eq!(batch.num_rows(), 3);
        assert_eq!(batch.num_columns(), 9);
        let price = batch.column(3).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(price.value(0), "24.96");
        assert_eq!(price.value(1), "");
        assert_eq!(price.value(2), "price");
    }

    #[test]
    fn parquet_output_is_framed() {
        let mut buffer = Vec::new();
        write_parquet(&[item(1, "Vuvuzela", 4.99)], &mut buffer).unwrap();
        assert!(buffer.starts_with(b"PAR1"));
        assert!(buffer.ends_with(b"PAR1"));
    }

    #[test]
    fn persists_month_under_its_name() {
        let dir = temp_dir("persist");
        let table = MonthTable { month: 1, year: 2020, order_count: 1, rows: vec![item(1, "Sun Hat", 24.96)] };
        let path = persist_month(&table, &dir, OutputFormat::Csv).unwrap();
        assert_eq!(path.file_name().unwrap(), "January_2020.csv");
        let parsed = read_csv(File::open(&path).unwrap()).unwrap();
        assert_eq!(parsed, table.rows);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn output_format_parses_case_insensitively() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("parquet".parse::<OutputFormat>().unwrap(), OutputFormat::Parquet);
        assert!("xlsx".parse::<OutputFormat>().is_err());
        assert_eq!(month_file_name(11, 2020, OutputFormat::Parquet).unwrap(), "November_2020.parquet");
    }
}
