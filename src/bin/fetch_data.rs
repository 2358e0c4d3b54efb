//! Fetch the raw housing dataset.
//!
//! Downloads the California housing CSV to the raw data path unless the
//! file already exists:
//!
//! ```bash
//! cargo run --bin fetch_data -- [--url <url>] [--out <path>]
//! ```

use std::path::PathBuf;

use homeval::fetch::download_if_absent;

const DEFAULT_URL: &str =
    "https://raw.githubusercontent.com/ageron/handson-ml/master/datasets/housing/housing.csv";
const DEFAULT_OUT: &str = "data/raw/california-housing-prices.csv";

#[derive(Debug)]
struct Args {
    url: String,
    out: PathBuf,
}

fn parse_args() -> Args {
    let mut url = DEFAULT_URL.to_string();
    let mut out = PathBuf::from(DEFAULT_OUT);

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--url" => url = it.next().expect("--url requires a value"),
            "--out" => out = PathBuf::from(it.next().expect("--out requires a value")),
            "--help" => print_help_and_exit(),
            other => panic!("unknown arg: {other}"),
        }
    }

    Args { url, out }
}

fn print_help_and_exit() -> ! {
    eprintln!(
        "fetch_data\n\n  --url <url>   data source URL (default: California housing CSV)\n  --out <path>  destination file (default: {DEFAULT_OUT})"
    );
    std::process::exit(0)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = parse_args();

    download_if_absent(&args.url, &args.out)?;
    Ok(())
}
