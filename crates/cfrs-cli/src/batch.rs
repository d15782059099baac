//! Batch scoring: read a CSV or Parquet table of requests, recommend per row,
//! write the table back with result columns appended.
//!
//! Columns are matched by name, so order and extra columns don't matter. Any
//! bad row fails the whole run before the output file is created.

use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, bail};
use arrow::array::{
    Array, ArrayRef, Float64Array, Int64Array, StringArray, TimestampNanosecondArray,
};
use arrow::compute::cast;
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use cfrs_ai::{Recommendation, Recommender};
use cfrs_core::{CropMeasurements, Domain, FertilizerMeasurements, tabular};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Rows sampled when inferring a CSV schema.
const CSV_INFER_ROWS: usize = 1000;

pub struct BatchStats {
    pub domain: Domain,
    pub output: PathBuf,
    pub total_rows: usize,
    /// Rows whose class id had no label.
    pub unknown: usize,
    pub elapsed_secs: f64,
}

/// On-disk table format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Parquet,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("parquet") | Some("pq") => Ok(Self::Parquet),
            _ => bail!(
                "cannot tell table format of {} (expected .csv, .parquet or .pq)",
                path.display()
            ),
        }
    }
}

/// Score every row of `input` and write the results to `output`.
pub fn run_batch(
    rec: &Recommender,
    domain: Domain,
    input: &Path,
    output: &Path,
) -> anyhow::Result<BatchStats> {
    let start = Instant::now();
    let input_format = TableFormat::from_path(input)?;
    let output_format = TableFormat::from_path(output)?;

    // 1. Read source table.
    let source = read_table(input, input_format)
        .with_context(|| format!("reading {}", input.display()))?;
    let total_rows: usize = source.iter().map(|b| b.num_rows()).sum();
    info!(rows = total_rows, input = %input.display(), domain = %domain, "read request table");

    // 2. Score every row. Nothing is written until all rows succeed.
    let request_schema = Arc::new(tabular::request_schema(domain));
    let output_schema = tabular::result_schema(&request_schema);
    let now_nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .context("system clock is out of timestamp range")?;

    let mut output_batches = Vec::with_capacity(source.len());
    let mut first_row = 0usize;
    let mut unknown = 0usize;

    for batch in &source {
        let requests = select_request_columns(batch, &request_schema)?;
        let scored = score_batch(rec, domain, &requests, first_row)?;
        unknown += scored.iter().filter(|r| !r.known).count();

        output_batches.push(append_results(&requests, &output_schema, &scored, now_nanos)?);
        first_row += batch.num_rows();
        debug!(scored = first_row, total = total_rows, "scored batch");
    }

    // 3. Write results.
    write_table(output, output_format, &output_schema, &output_batches)
        .with_context(|| format!("writing {}", output.display()))?;

    let elapsed_secs = start.elapsed().as_secs_f64();
    info!(
        rows = total_rows,
        unknown,
        output = %output.display(),
        elapsed_secs,
        "batch complete"
    );
    Ok(BatchStats {
        domain,
        output: output.to_path_buf(),
        total_rows,
        unknown,
        elapsed_secs,
    })
}

fn read_table(path: &Path, format: TableFormat) -> anyhow::Result<Vec<RecordBatch>> {
    let mut file = File::open(path)?;
    match format {
        TableFormat::Csv => {
            let (schema, _) = arrow::csv::reader::Format::default()
                .with_header(true)
                .infer_schema(&mut file, Some(CSV_INFER_ROWS))?;
            file.seek(SeekFrom::Start(0))?;
            let reader = arrow::csv::ReaderBuilder::new(Arc::new(schema))
                .with_header(true)
                .build(file)?;
            Ok(reader.collect::<Result<Vec<_>, _>>()?)
        }
        TableFormat::Parquet => {
            let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
            Ok(reader.collect::<Result<Vec<_>, _>>()?)
        }
    }
}

/// Write `batches` to `path`. Output goes to a temporary file in the same
/// directory and replaces `path` only once every batch is written.
fn write_table(
    path: &Path,
    format: TableFormat,
    schema: &Arc<Schema>,
    batches: &[RecordBatch],
) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;

    match format {
        TableFormat::Csv => {
            let mut writer = arrow::csv::WriterBuilder::new()
                .with_header(true)
                .build(tmp.as_file_mut());
            // The header is written with the first batch.
            if batches.is_empty() {
                writer.write(&RecordBatch::new_empty(schema.clone()))?;
            }
            for batch in batches {
                writer.write(batch)?;
            }
        }
        TableFormat::Parquet => {
            let mut writer = ArrowWriter::try_new(tmp.as_file_mut(), schema.clone(), None)?;
            for batch in batches {
                writer.write(batch)?;
            }
            writer.close()?;
        }
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Pick the domain's feature columns by name and cast them to the request
/// schema's types (Float64 measurements, Utf8 category names).
fn select_request_columns(
    batch: &RecordBatch,
    request_schema: &Arc<Schema>,
) -> anyhow::Result<RecordBatch> {
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(request_schema.fields().len());
    for field in request_schema.fields() {
        let column = batch
            .column_by_name(field.name())
            .with_context(|| format!("input has no {:?} column", field.name()))?;
        let column = cast(column, field.data_type())
            .with_context(|| format!("column {:?} cannot be read as {}", field.name(), field.data_type()))?;
        columns.push(column);
    }
    Ok(RecordBatch::try_new(request_schema.clone(), columns)?)
}

fn score_batch(
    rec: &Recommender,
    domain: Domain,
    requests: &RecordBatch,
    first_row: usize,
) -> anyhow::Result<Vec<Recommendation>> {
    let row = RowReader { batch: requests };
    (0..requests.num_rows())
        .map(|i| {
            let row_number = first_row + i + 1;
            score_row(rec, domain, &row, i).with_context(|| format!("row {row_number}"))
        })
        .collect()
}

fn score_row(
    rec: &Recommender,
    domain: Domain,
    row: &RowReader<'_>,
    i: usize,
) -> anyhow::Result<Recommendation> {
    let recommendation = match domain {
        Domain::Crop => rec.recommend_crop(&CropMeasurements {
            n: row.number("n", i)?,
            p: row.number("p", i)?,
            k: row.number("k", i)?,
            temperature: row.number("temperature", i)?,
            humidity: row.number("humidity", i)?,
            ph: row.number("ph", i)?,
            rainfall: row.number("rainfall", i)?,
        })?,
        Domain::Fertilizer => rec.recommend_fertilizer(&FertilizerMeasurements {
            temperature: row.number("temperature", i)?,
            humidity: row.number("humidity", i)?,
            moisture: row.number("moisture", i)?,
            soil_type: row.text("soil_type", i)?.to_string(),
            crop_type: row.text("crop_type", i)?.to_string(),
            nitrogen: row.number("nitrogen", i)?,
            potassium: row.number("potassium", i)?,
            phosphorous: row.number("phosphorous", i)?,
        })?,
    };
    Ok(recommendation)
}

/// Typed cell access over a batch already cast to the request schema.
struct RowReader<'a> {
    batch: &'a RecordBatch,
}

impl<'a> RowReader<'a> {
    fn column(&self, name: &str, i: usize) -> anyhow::Result<&'a ArrayRef> {
        let column = self
            .batch
            .column_by_name(name)
            .with_context(|| format!("missing column {name:?}"))?;
        if column.is_null(i) {
            bail!("{name:?} is empty or not a valid value");
        }
        Ok(column)
    }

    fn number(&self, name: &str, i: usize) -> anyhow::Result<f64> {
        let column = self.column(name, i)?;
        let values = column
            .as_any()
            .downcast_ref::<Float64Array>()
            .with_context(|| format!("column {name:?} is {}, expected Float64", column.data_type()))?;
        Ok(values.value(i))
    }

    fn text(&self, name: &str, i: usize) -> anyhow::Result<&'a str> {
        let column = self.column(name, i)?;
        let values = column
            .as_any()
            .downcast_ref::<StringArray>()
            .with_context(|| format!("column {name:?} is {}, expected Utf8", column.data_type()))?;
        Ok(values.value(i))
    }
}

fn append_results(
    requests: &RecordBatch,
    schema: &Arc<Schema>,
    scored: &[Recommendation],
    now_nanos: i64,
) -> anyhow::Result<RecordBatch> {
    let n = scored.len();
    let mut columns: Vec<ArrayRef> = requests.columns().to_vec();

    // recommendation: Utf8
    columns.push(Arc::new(StringArray::from_iter_values(
        scored.iter().map(|r| r.label()),
    )));
    // class_id: Int64
    columns.push(Arc::new(Int64Array::from_iter_values(
        scored.iter().map(|r| r.class_id),
    )));
    // recommended_at: Timestamp(Nanosecond, UTC)
    columns.push(Arc::new(
        TimestampNanosecondArray::from(vec![now_nanos; n]).with_timezone("UTC"),
    ));

    Ok(RecordBatch::try_new(schema.clone(), columns)?)
}
