use std::io::Write;

use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{error, Level, LevelFilter};
use schema::{CheckSchema, ResetSchema};
use shelf_reset::SchemaError;

mod macros;
mod schema;
mod util;

/// Shelf cli
#[derive(Parser)]
#[clap(version)]
struct Opts {
    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

#[derive(Subcommand)]
enum SubCommand {
    ResetSchema(ResetSchema),
    CheckSchema(CheckSchema),
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let opts: Opts = Opts::parse();

    let mut cmd = match opts.subcmd {
        SubCommand::ResetSchema(reset) => runnable_cmd!(reset),
        SubCommand::CheckSchema(check) => runnable_cmd!(check),
    };

    let log_level = if cmd.is_verbose() {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format(|buf, record| {
            let prefix = match record.level() {
                Level::Error => "error".red(),
                Level::Warn => "warn".yellow(),
                Level::Info => "info".blue(),
                Level::Debug => "debug".purple(),
                Level::Trace => "trace".cyan(),
            }
            .bold();
            writeln!(buf, "{} {}", prefix, record.args())
        })
        .init();

    if let Err(err) = cmd.run().await {
        error!("{}", err);
        if cmd.is_verbose() {
            let err_chain = err.chain().skip(1);
            if err_chain.clone().next().is_some() {
                eprintln!("{}", "\nCaused by:".italic().truecolor(190, 190, 190));
            }
            err_chain
                .for_each(|cause| eprintln!(" - {}", cause.to_string().truecolor(190, 190, 190)));
        }
        std::process::exit(exit_code(&err));
    }
}

/// Exit code of the first [`SchemaError`] in the chain, 1 for anything else.
fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<SchemaError>())
        .map_or(1, SchemaError::exit_code)
}

#[async_trait]
pub trait Runnable {
    async fn run(&mut self) -> Result<()>;

    fn is_verbose(&self) -> bool {
        false
    }
}
