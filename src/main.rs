//! CLI entry point for the halftone pattern engine

use clap::Parser;
use halftone_forge::io::cli::{Cli, JobRunner};

fn main() -> halftone_forge::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .init();
    let mut runner = JobRunner::new(cli);
    runner.run()
}
