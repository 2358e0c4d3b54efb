//! Clean the raw housing data and split it into train/test tables.
//!
//! Loads the raw CSV, fills missing values in one numeric column with the
//! column median, splits the rows into seeded train/test partitions, and
//! writes both partitions as CSV:
//!
//! ```bash
//! cargo run --bin process_data -- [--data <path>] [--out-dir <dir>] \
//!     [--test-size <fraction>] [--seed <u64>] [--stratify <column>] \
//!     [--impute-col <column>]
//! ```

use std::path::PathBuf;

use homeval::data::{read_csv, write_csv};
use homeval::prepare::{impute_median, train_test_split};

const DEFAULT_DATA: &str = "data/raw/california-housing-prices.csv";
const DEFAULT_OUT_DIR: &str = "data/processed";
const DEFAULT_IMPUTE_COL: &str = "total_bedrooms";

#[derive(Debug)]
struct Args {
    data: PathBuf,
    out_dir: PathBuf,
    test_size: f32,
    seed: u64,
    stratify: Option<String>,
    impute_col: String,
}

fn parse_args() -> Args {
    let mut data = PathBuf::from(DEFAULT_DATA);
    let mut out_dir = PathBuf::from(DEFAULT_OUT_DIR);
    let mut test_size = 0.2f32;
    let mut seed = 42u64;
    let mut stratify: Option<String> = None;
    let mut impute_col = DEFAULT_IMPUTE_COL.to_string();

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--data" => data = PathBuf::from(it.next().expect("--data requires a value")),
            "--out-dir" => out_dir = PathBuf::from(it.next().expect("--out-dir requires a value")),
            "--test-size" => {
                test_size = it
                    .next()
                    .expect("--test-size requires a value")
                    .parse()
                    .expect("--test-size must be a number")
            }
            "--seed" => {
                seed = it
                    .next()
                    .expect("--seed requires a value")
                    .parse()
                    .expect("--seed must be an integer")
            }
            "--stratify" => stratify = Some(it.next().expect("--stratify requires a value")),
            "--impute-col" => impute_col = it.next().expect("--impute-col requires a value"),
            "--help" => print_help_and_exit(),
            other => panic!("unknown arg: {other}"),
        }
    }

    Args {
        data,
        out_dir,
        test_size,
        seed,
        stratify,
        impute_col,
    }
}

fn print_help_and_exit() -> ! {
    eprintln!(
        "process_data\n\n  --data <path>         raw CSV (default: {DEFAULT_DATA})\n  --out-dir <dir>       output directory (default: {DEFAULT_OUT_DIR})\n  --test-size <frac>    test fraction (default: 0.2)\n  --seed <u64>          shuffle seed (default: 42)\n  --stratify <column>   stratify the split by this column\n  --impute-col <column> median-fill this column (default: {DEFAULT_IMPUTE_COL})"
    );
    std::process::exit(0)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = parse_args();

    log::info!("loading raw data from {}", args.data.display());
    let mut frame = read_csv(&args.data)?;

    let _ = impute_median(&mut frame, &args.impute_col);

    let (train, test) =
        train_test_split(&frame, args.test_size, args.seed, args.stratify.as_deref())?;

    let train_path = args.out_dir.join("train.csv");
    let test_path = args.out_dir.join("test.csv");

    log::info!("saving training data to {}", train_path.display());
    write_csv(&train, &train_path)?;
    log::info!("saving testing data to {}", test_path.display());
    write_csv(&test, &test_path)?;

    log::info!("data processing completed successfully");
    Ok(())
}
