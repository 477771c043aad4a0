//! MathVM regression runner
//!
//! Runs the interpreter over golden-file fixtures and reports the first
//! divergence of each test.

use clap::Parser;
use mvm_regress::commands::{Commands, GlobalArgs};
use mvm_regress::{cli, common::logging};

#[derive(Parser)]
#[command(name = "mvm-regress", about = "Golden-file regression runner for MathVM")]
#[command(version, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_cli(cli.global.verbose);

    match cli::dispatch(&cli.global, cli.command).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }
}
