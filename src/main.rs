use std::{env, fs, path, str::FromStr, time::Duration};

use dotenv::dotenv;
use eyre::{bail, eyre};
use mcprobe::{Dialect, Prober, config::Config, tracing::init_tracing};
use tracing::info;

const USAGE: &str =
    "usage: mcprobe <host> [port] [--dialect <1_7|1_6|1_4>] [--timeout-ms <ms>] [--config <path>]";

struct Args {
    host: String,
    port: Option<u16>,
    dialect: Option<Dialect>,
    timeout_ms: Option<u64>,
    config_file: String,
}

fn parse_args(args: &[String]) -> eyre::Result<Args> {
    let mut positional = Vec::new();
    let mut dialect = None;
    let mut timeout_ms = None;
    let mut config_file = "config.toml".to_string();

    let mut args = args.iter().skip(1);
    while let Some(arg) = args.next() {
        let mut value = || args.next().ok_or_else(|| eyre!("{arg} needs a value\n{USAGE}"));
        match arg.as_str() {
            "--dialect" => {
                let v = value()?;
                dialect = Some(
                    Dialect::from_str(v).map_err(|_| eyre!("unknown dialect {v:?}\n{USAGE}"))?,
                );
            }
            "--timeout-ms" => timeout_ms = Some(value()?.parse()?),
            "--config" => config_file = value()?.clone(),
            _ => positional.push(arg.clone()),
        }
    }

    let mut positional = positional.into_iter();
    let Some(host) = positional.next() else {
        bail!(USAGE);
    };
    let port = positional.next().map(|p| p.parse()).transpose()?;
    if positional.next().is_some() {
        bail!(USAGE);
    }

    Ok(Args {
        host,
        port,
        dialect,
        timeout_ms,
        config_file,
    })
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv().ok();

    let args = parse_args(&env::args().collect::<Vec<_>>())?;

    // the config file is optional, everything has a default
    let config_file_path = path::Path::new(&args.config_file);
    let config: Config = if config_file_path.exists() {
        toml::from_str(&fs::read_to_string(config_file_path)?)?
    } else {
        Config::default()
    };

    init_tracing(&config);

    let mut options = config.query.options();
    if let Some(dialect) = args.dialect {
        options.dialect = Some(dialect);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        options.timeout = Duration::from_millis(timeout_ms);
    }
    let port = args.port.unwrap_or(config.query.port());

    info!("querying {}:{port}", args.host);
    let report = Prober::default()
        .query_detailed(&args.host, port, &options)
        .await;
    info!(
        "tried {}",
        report
            .attempted
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let status = report.outcome?;
    println!("{}", serde_json::to_string_pretty(&status)?);

    Ok(())
}
