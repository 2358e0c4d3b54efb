//! Evaluate the trained model on the held-out test table.
//!
//! Loads the test CSV and the model artifact, predicts every row, scores
//! the predictions against the true labels, and writes the metrics
//! record:
//!
//! ```bash
//! cargo run --bin evaluate_model -- [--data <path>] [--model <path>] \
//!     [--out <path>] [--label <column>] [--categorical <column>]
//! ```

use std::path::PathBuf;

use homeval::data::read_csv;
use homeval::metrics::EvaluationReport;
use homeval::model::{Model, DEFAULT_CATEGORICAL_COLUMN, DEFAULT_LABEL_COLUMN};

const DEFAULT_DATA: &str = "data/processed/test.csv";
const DEFAULT_MODEL: &str = "models/random_forest.hval";
const DEFAULT_OUT: &str = "models/evaluation_metrics.json";

#[derive(Debug)]
struct Args {
    data: PathBuf,
    model: PathBuf,
    out: PathBuf,
    label: String,
    categorical: String,
}

fn parse_args() -> Args {
    let mut data = PathBuf::from(DEFAULT_DATA);
    let mut model = PathBuf::from(DEFAULT_MODEL);
    let mut out = PathBuf::from(DEFAULT_OUT);
    let mut label = DEFAULT_LABEL_COLUMN.to_string();
    let mut categorical = DEFAULT_CATEGORICAL_COLUMN.to_string();

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--data" => data = PathBuf::from(it.next().expect("--data requires a value")),
            "--model" => model = PathBuf::from(it.next().expect("--model requires a value")),
            "--out" => out = PathBuf::from(it.next().expect("--out requires a value")),
            "--label" => label = it.next().expect("--label requires a value"),
            "--categorical" => categorical = it.next().expect("--categorical requires a value"),
            "--help" => print_help_and_exit(),
            other => panic!("unknown arg: {other}"),
        }
    }

    Args {
        data,
        model,
        out,
        label,
        categorical,
    }
}

fn print_help_and_exit() -> ! {
    eprintln!(
        "evaluate_model\n\n  --data <path>          test CSV (default: {DEFAULT_DATA})\n  --model <path>         model artifact (default: {DEFAULT_MODEL})\n  --out <path>           metrics output (default: {DEFAULT_OUT})\n  --label <column>       label column (default: {DEFAULT_LABEL_COLUMN})\n  --categorical <column> categorical column (default: {DEFAULT_CATEGORICAL_COLUMN})"
    );
    std::process::exit(0)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = parse_args();

    log::info!("loading test data from {}", args.data.display());
    let frame = read_csv(&args.data)?;
    let labels = frame.numeric(&args.label)?.to_vec();

    log::info!("loading model from {}", args.model.display());
    let model = Model::load(&args.model)?;

    log::info!("making predictions");
    let predictions = model.predict(&frame, &args.categorical);

    let report = EvaluationReport::from_predictions(&predictions, &labels);
    log::info!("--- model evaluation results ---");
    log::info!("  r-squared: {:.4}", report.r2_score);
    log::info!("  mean squared error: {:.4}", report.mean_squared_error);

    report.write_json(&args.out)?;
    Ok(())
}
