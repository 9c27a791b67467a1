//! packsync - reconcile Vim/Neovim plugin packs with a declared list

use std::process::ExitCode;

use clap::Parser;
use packsync::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
