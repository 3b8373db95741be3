//! ## tsbench-cli
//! **Command-line front end for the timestamp benchmark**
//!
//! `tsbench run` measures one timestamp source under contention and prints
//! elapsed time and throughput. `tsbench plan` shows where workers would be
//! pinned without running anything.

use clap::Parser;

mod commands;

use commands::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(run_args) => commands::run_benchmark(run_args),
        Commands::Plan(plan_args) => commands::show_plan(plan_args),
    }
}
