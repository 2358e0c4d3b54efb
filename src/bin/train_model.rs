//! Train the house-price model and persist the artifact.
//!
//! Loads the processed training table, derives the feature matrix and
//! schema, fits a random-forest regressor, and writes the model + schema
//! bundle to disk:
//!
//! ```bash
//! cargo run --bin train_model -- [--data <path>] [--model <path>] \
//!     [--trees <n>] [--max-depth <d>] [--threads <n>] [--seed <u64>] \
//!     [--label <column>] [--categorical <column>]
//! ```

use std::path::PathBuf;

use homeval::data::read_csv;
use homeval::forest::RandomForestParams;
use homeval::model::{Model, DEFAULT_CATEGORICAL_COLUMN, DEFAULT_LABEL_COLUMN};

const DEFAULT_DATA: &str = "data/processed/train.csv";
const DEFAULT_MODEL: &str = "models/random_forest.hval";

#[derive(Debug)]
struct Args {
    data: PathBuf,
    model: PathBuf,
    trees: u32,
    max_depth: u32,
    threads: usize,
    seed: u64,
    label: String,
    categorical: String,
}

fn parse_args() -> Args {
    let mut data = PathBuf::from(DEFAULT_DATA);
    let mut model = PathBuf::from(DEFAULT_MODEL);
    let mut trees = 100u32;
    let mut max_depth = 0u32;
    let mut threads = 0usize;
    let mut seed = 42u64;
    let mut label = DEFAULT_LABEL_COLUMN.to_string();
    let mut categorical = DEFAULT_CATEGORICAL_COLUMN.to_string();

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--data" => data = PathBuf::from(it.next().expect("--data requires a value")),
            "--model" => model = PathBuf::from(it.next().expect("--model requires a value")),
            "--trees" => {
                trees = it
                    .next()
                    .expect("--trees requires a value")
                    .parse()
                    .expect("--trees must be an integer")
            }
            "--max-depth" => {
                max_depth = it
                    .next()
                    .expect("--max-depth requires a value")
                    .parse()
                    .expect("--max-depth must be an integer")
            }
            "--threads" => {
                threads = it
                    .next()
                    .expect("--threads requires a value")
                    .parse()
                    .expect("--threads must be an integer")
            }
            "--seed" => {
                seed = it
                    .next()
                    .expect("--seed requires a value")
                    .parse()
                    .expect("--seed must be an integer")
            }
            "--label" => label = it.next().expect("--label requires a value"),
            "--categorical" => categorical = it.next().expect("--categorical requires a value"),
            "--help" => print_help_and_exit(),
            other => panic!("unknown arg: {other}"),
        }
    }

    Args {
        data,
        model,
        trees,
        max_depth,
        threads,
        seed,
        label,
        categorical,
    }
}

fn print_help_and_exit() -> ! {
    eprintln!(
        "train_model\n\n  --data <path>         training CSV (default: {DEFAULT_DATA})\n  --model <path>        artifact output (default: {DEFAULT_MODEL})\n  --trees <n>           number of trees (default: 100)\n  --max-depth <d>       max tree depth, 0 = unlimited (default: 0)\n  --threads <n>         fitting threads, 0 = all cores (default: 0)\n  --seed <u64>          forest seed (default: 42)\n  --label <column>      label column (default: {DEFAULT_LABEL_COLUMN})\n  --categorical <column> categorical column (default: {DEFAULT_CATEGORICAL_COLUMN})"
    );
    std::process::exit(0)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = parse_args();

    log::info!("loading training data from {}", args.data.display());
    let frame = read_csv(&args.data)?;
    log::info!(
        "loaded training data with {} rows and {} columns",
        frame.n_rows(),
        frame.n_cols()
    );

    let params = RandomForestParams {
        n_trees: args.trees,
        max_depth: args.max_depth,
        n_threads: args.threads,
        seed: args.seed,
        ..Default::default()
    };

    let model = Model::fit(&frame, &args.categorical, &args.label, &params)?;
    model.save(&args.model)?;

    Ok(())
}
