use anyhow::{Context, Result};
use clap::{crate_version, App, Arg, SubCommand};
use sr_config::Config;
use sr_relayer::{runner, subcommand};
use std::{fs, path::Path};

const COMMAND_RUN: &str = "run";
const COMMAND_CHECK: &str = "check";
const COMMAND_INIT_COMMITTEE: &str = "init-committee";
const COMMAND_EXAMPLE_CONFIG: &str = "generate-example-config";
const ARG_OUTPUT_PATH: &str = "output-path";
const ARG_CONFIG: &str = "config";
const ARG_CHAIN: &str = "chain";

fn read_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read(&path)
        .with_context(|| format!("read config file from {}", path.as_ref().to_string_lossy()))?;
    let config = toml::from_slice(&content).with_context(|| "parse config file")?;
    Ok(config)
}

fn generate_example_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let mut config = Config::default();
    config.sub_chains.push(Default::default());
    config.node_probe = Some(Default::default());
    let content = toml::to_string_pretty(&config)?;
    fs::write(path, content)?;
    Ok(())
}

fn config_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name(ARG_CONFIG)
        .short("c")
        .takes_value(true)
        .required(true)
        .default_value("./config.toml")
        .help("The config file path")
}

async fn run_cli() -> Result<()> {
    let app = App::new("Subrelay")
        .about("Relays sub-chain headers and committees to the main chain.")
        .version(crate_version!())
        .subcommand(
            SubCommand::with_name(COMMAND_RUN)
                .about("Run the relayer")
                .arg(config_arg())
                .display_order(0),
        )
        .subcommand(
            SubCommand::with_name(COMMAND_CHECK)
                .about("Show what the next tick would submit, without pushing")
                .arg(config_arg())
                .display_order(1),
        )
        .subcommand(
            SubCommand::with_name(COMMAND_INIT_COMMITTEE)
                .about("Vote every local producer into an empty sub-chain committee")
                .arg(config_arg())
                .arg(
                    Arg::with_name(ARG_CHAIN)
                        .long(ARG_CHAIN)
                        .takes_value(true)
                        .required(true)
                        .help("The sub-chain name"),
                )
                .display_order(2),
        )
        .subcommand(
            SubCommand::with_name(COMMAND_EXAMPLE_CONFIG)
                .about("Generate an example config file")
                .arg(
                    Arg::with_name(ARG_OUTPUT_PATH)
                        .short("o")
                        .takes_value(true)
                        .required(true)
                        .default_value("./config.example.toml")
                        .help("The path of the example config file"),
                )
                .display_order(3),
        );

    // handle subcommands
    let matches = app.clone().get_matches();
    let config_path = |m: &clap::ArgMatches| {
        m.value_of(ARG_CONFIG)
            .unwrap_or("./config.toml")
            .to_string()
    };
    match matches.subcommand() {
        (COMMAND_RUN, Some(m)) => {
            let config = read_config(config_path(m))?;
            runner::run(config).await?;
        }
        (COMMAND_CHECK, Some(m)) => {
            let config = read_config(config_path(m))?;
            for report in subcommand::check::check(&config).await? {
                print!("{}", report);
            }
        }
        (COMMAND_INIT_COMMITTEE, Some(m)) => {
            let config = read_config(config_path(m))?;
            let chain_name = m.value_of(ARG_CHAIN).unwrap_or_default();
            let receipts = subcommand::init_committee::init_committee(&config, chain_name).await?;
            for receipt in receipts {
                println!("{}", receipt.transaction_id);
            }
        }
        (COMMAND_EXAMPLE_CONFIG, Some(m)) => {
            let path = m.value_of(ARG_OUTPUT_PATH).unwrap_or("./config.example.toml");
            generate_example_config(path)?;
        }
        _ => {
            // default command: start the relayer
            let config = read_config("./config.toml")?;
            runner::run(config).await?;
        }
    };
    Ok(())
}

/// Subrelay entry
fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let _enter = runtime.enter();
    let _guard = sr_telemetry::init()?;
    runtime.block_on(run_cli())
}
