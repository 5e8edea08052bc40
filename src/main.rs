use clap::Parser;
use std::process::ExitCode;

use gig_client::frameworks::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    gig_client::run(Cli::parse()).await
}
