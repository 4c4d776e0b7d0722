mod config;

use std::{borrow::Cow, env, fs, process};

use config::InterpreterConfig;
use tracing_subscriber::EnvFilter;
use tripsplit_application::{SettlementService, TripLedger};
use tripsplit_presentation::SettlementPresenter;

type CliResult<T> = Result<T, Cow<'static, str>>;

const USAGE: &str = "Usage: tripsplit-interpreter <ledger.json> [--json]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    init_logging();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> CliResult<()> {
    let (path, format) = parse_args(env::args().skip(1))?;
    let config = InterpreterConfig::from_env()?;

    let source =
        fs::read_to_string(&path).map_err(|err| format!("Failed to read '{path}': {err}"))?;
    let ledger: TripLedger = serde_json::from_str(&source)
        .map_err(|err| format!("Failed to parse ledger '{path}': {err}"))?;

    let service = SettlementService::new(config.context);
    let report = service
        .settle(&ledger)
        .map_err(|err| format!("Invalid ledger: {err}"))?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::to_string_pretty(&report)
                .map_err(|err| format!("Failed to serialize report: {err}"))?;
            println!("{output}");
        }
        OutputFormat::Text => {
            let view = SettlementPresenter::new(service.context())
                .render_with_participants(&report, &ledger.names);
            print!("{view}");
        }
    }

    Ok(())
}

fn parse_args(args: impl IntoIterator<Item = String>) -> CliResult<(String, OutputFormat)> {
    let mut path = None;
    let mut format = OutputFormat::Text;

    for arg in args {
        match arg.as_str() {
            "--json" => format = OutputFormat::Json,
            flag if flag.starts_with("--") => {
                return Err(format!("Unknown option '{flag}'\n{USAGE}").into());
            }
            _ if path.is_none() => path = Some(arg),
            _ => return Err(USAGE.into()),
        }
    }

    let Some(path) = path else {
        return Err(USAGE.into());
    };
    Ok((path, format))
}
