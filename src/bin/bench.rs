//! astratable Benchmark Driver
//!
//! Creates a measurement-set-shaped table (N scalar columns + a UVW
//! coordinate column), writes it under a selected write/allocation
//! strategy combination, reads every cell back, and prints the checksum.
//! Strategy selection is plain configuration passed into the engine;
//! the same dataset must produce the same checksum under every
//! combination.

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

use astratable::{
    checksum, AllocationStrategy, CellValue, ElementType, Result, SchemaBuilder, Table,
    WriteStrategy,
};

/// astratable benchmark driver
#[derive(Parser, Debug)]
#[command(name = "astratable-bench")]
#[command(about = "Columnar write/allocation strategy benchmark")]
#[command(version)]
struct Args {
    /// Path where the benchmark table will be created
    table_path: PathBuf,

    /// Number of rows to create
    #[arg(short, long, default_value = "1000")]
    rows: u64,

    /// Number of scalar columns to create
    #[arg(short, long, default_value = "10")]
    cols: usize,

    /// Write granularity
    #[arg(short, long, value_enum, default_value = "column")]
    write_mode: WriteMode,

    /// File-space allocation strategy
    #[arg(short, long, value_enum, default_value = "lazy")]
    alloc_mode: AllocMode,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WriteMode {
    /// One cell per call
    Cell,
    /// One row per commit
    Row,
    /// One column per call
    Column,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AllocMode {
    /// Extend and zero-fill as writes land
    Lazy,
    /// Extend files to final size up front
    Truncate,
    /// Reserve blocks up front without writing zeros
    Reserve,
}

impl From<WriteMode> for WriteStrategy {
    fn from(mode: WriteMode) -> Self {
        match mode {
            WriteMode::Cell => WriteStrategy::CellPut,
            WriteMode::Row => WriteStrategy::RowPut,
            WriteMode::Column => WriteStrategy::ColumnBulkPut,
        }
    }
}

impl From<AllocMode> for AllocationStrategy {
    fn from(mode: AllocMode) -> Self {
        match mode {
            AllocMode::Lazy => AllocationStrategy::LazyZeroFill,
            AllocMode::Truncate => AllocationStrategy::PreTruncate,
            AllocMode::Reserve => AllocationStrategy::PreReserve,
        }
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,astratable=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let args = Args::parse();

    tracing::info!("astratable-bench v{}", astratable::VERSION);
    tracing::info!(
        "table: {} ({} rows x {} scalar columns + UVW)",
        args.table_path.display(),
        args.rows,
        args.cols
    );

    if let Err(e) = run(&args) {
        tracing::error!("benchmark failed: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let write_strategy = WriteStrategy::from(args.write_mode);
    let alloc_strategy = AllocationStrategy::from(args.alloc_mode);

    // N scalar columns plus the fixed-shape coordinate column
    let mut builder = SchemaBuilder::new();
    for i in 0..args.cols {
        builder = builder.add_scalar_column(format!("COL_{}", i), ElementType::Float64);
    }
    builder = builder.add_array_column("UVW", ElementType::Float64, &[3]);
    let descriptor = builder.build()?;

    let table = Table::create(&args.table_path, descriptor, args.rows, alloc_strategy)?;
    if let Some(report) = table.allocation_report() {
        if report.substituted() {
            tracing::warn!(
                requested = %report.requested,
                effective = %report.effective,
                "allocation strategy was substituted"
            );
        }
    }

    tracing::info!("starting write operations (mode: {})", write_strategy);
    write_dataset(&table, args.rows, args.cols, write_strategy)?;

    tracing::info!("starting read operations");
    let total = checksum(&table)?;
    table.close()?;

    println!("Benchmark completed. Checksum: {}", total);
    Ok(())
}

/// Write the benchmark dataset: `COL_c[r] = c * 1000 + r`,
/// `UVW[r] = [0.1 r, 0.2 r, 0.3 r]`
fn write_dataset(table: &Table, rows: u64, cols: usize, strategy: WriteStrategy) -> Result<()> {
    match strategy {
        WriteStrategy::ColumnBulkPut => {
            for c in 0..cols {
                let column = table.scalar_column::<f64>(&format!("COL_{}", c))?;
                let values: Vec<f64> =
                    (0..rows).map(|r| c as f64 * 1000.0 + r as f64).collect();
                column.put_all(&values)?;
            }

            let uvw = table.array_column::<f64>("UVW")?;
            let mut values = Vec::with_capacity(3 * rows as usize);
            for r in 0..rows {
                values.push(r as f64 * 0.1);
                values.push(r as f64 * 0.2);
                values.push(r as f64 * 0.3);
            }
            uvw.put_all(&[3], &values)?;
        }
        WriteStrategy::CellPut => {
            for c in 0..cols {
                let column = table.scalar_column::<f64>(&format!("COL_{}", c))?;
                for r in 0..rows {
                    column.put(r, c as f64 * 1000.0 + r as f64)?;
                }
            }

            let uvw = table.array_column::<f64>("UVW")?;
            for r in 0..rows {
                let cell = [r as f64 * 0.1, r as f64 * 0.2, r as f64 * 0.3];
                uvw.put(r, &[3], &cell)?;
            }
        }
        WriteStrategy::RowPut => {
            for r in 0..rows {
                let mut row = table.begin_row(r)?;
                for c in 0..cols {
                    row.set(
                        &format!("COL_{}", c),
                        CellValue::Float64(c as f64 * 1000.0 + r as f64),
                    )?;
                }
                row.set(
                    "UVW",
                    CellValue::Float64Array(
                        vec![3],
                        vec![r as f64 * 0.1, r as f64 * 0.2, r as f64 * 0.3],
                    ),
                )?;
                row.commit()?;
            }
        }
    }
    Ok(())
}
