//! SoapBridge CLI: SOAP-to-REST migration assistant.
//!
//! Builds a reference context pack from uploaded API docs and drives the
//! design and client-code generation stages against Gemini.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
