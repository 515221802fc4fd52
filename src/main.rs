use std::env;
use std::fs::File;
use std::io;
use std::process::ExitCode;

use log::{error, info};

use equiscope::session::CREDENTIALS_VAR;
use equiscope::{
    Authenticator, Error, EstimatorConfig, NegativePolicy, QueryVector, Result, Session,
    StaticCredentials, ValuationEstimator, ValuationReport,
};

const USAGE: &str = "usage: equiscope [--funding N] [--revenue N] [--users N] [--burn-rate N] \
[--growth-rate N] [--clamp] [--show-data] [--export-csv PATH|-] [--username U --password P]";

#[derive(Debug, Default)]
struct Args {
    query: QueryVector,
    policy: NegativePolicy,
    show_data: bool,
    export_csv: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

fn parse_args(raw: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    let mut it = raw.into_iter();

    while let Some(flag) = it.next() {
        match flag.as_str() {
            "--clamp" => args.policy = NegativePolicy::ClampToZero,
            "--show-data" => args.show_data = true,
            "-h" | "--help" => return Err(Error::Usage(USAGE.to_string())),
            _ => {
                let value = it
                    .next()
                    .ok_or_else(|| Error::Usage(format!("{flag} expects a value\n{USAGE}")))?;
                match flag.as_str() {
                    "--funding" => args.query.funding = parse_number(&flag, &value)?,
                    "--revenue" => args.query.revenue = parse_number(&flag, &value)?,
                    "--users" => args.query.users = parse_number(&flag, &value)?,
                    "--burn-rate" => args.query.burn_rate = parse_number(&flag, &value)?,
                    "--growth-rate" => args.query.growth_rate = parse_number(&flag, &value)?,
                    "--export-csv" => args.export_csv = Some(value),
                    "--username" => args.username = Some(value),
                    "--password" => args.password = Some(value),
                    _ => return Err(Error::Usage(format!("unknown flag {flag}\n{USAGE}"))),
                }
            }
        }
    }

    Ok(args)
}

fn parse_number(flag: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Usage(format!("{flag} expects a number, got {value:?}")))
}

/// Gates access when a credential table is configured; `None` leaves the CLI open.
fn check_access(args: &Args, credential_table: Option<&str>) -> Result<()> {
    let Some(table) = credential_table else {
        return Ok(());
    };

    let credentials = StaticCredentials::parse(table)?;
    let authenticator: &dyn Authenticator = &credentials;
    let mut session = Session::new();

    let username = args.username.as_deref().unwrap_or_default();
    let password = args.password.as_deref().unwrap_or_default();

    if session.login(authenticator, username, password) {
        Ok(())
    } else {
        Err(Error::Usage("invalid username or password".to_string()))
    }
}

fn run(args: Args, config: EstimatorConfig, credential_table: Option<&str>) -> Result<()> {
    check_access(&args, credential_table)?;

    let estimator = ValuationEstimator::with_config(config)?;
    let model = estimator.fit()?;

    let report = ValuationReport::estimate(&model, &args.query, args.policy)?;
    println!("Estimated valuation: {report}");
    if report.out_of_distribution {
        println!("note: these metrics are outside the range of the comparables");
    }
    if report.is_clamped() {
        println!("note: raw model output {:.2} was floored at zero", report.raw);
    }

    if args.show_data {
        println!();
        print!("{}", estimator.dataset().to_csv_string()?);
    }

    match args.export_csv.as_deref() {
        Some("-") => estimator.dataset().write_csv(io::stdout().lock())?,
        Some(path) => {
            estimator.dataset().write_csv(File::create(path)?)?;
            info!("wrote {} samples to {path}", estimator.dataset().n_samples());
        }
        None => {}
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let credential_table = env::var(CREDENTIALS_VAR).ok();
    let result = parse_args(env::args().skip(1)).and_then(|args| {
        let config = EstimatorConfig::from_env()?;
        run(args, config, credential_table.as_deref())
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Usage(message)) => {
            eprintln!("{message}");
            ExitCode::from(2)
        }
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
