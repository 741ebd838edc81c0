//! # Daybook Binary
//!
//! Entry point for the operator shell. All logic lives in `daybook_lib`.

use clap::Parser;
use daybook_lib::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = daybook_lib::run(cli).await {
        eprintln!("daybook: {err}");
        std::process::exit(1);
    }
}
