use clap::Parser;
use pivotscreen::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
