use anyhow::Context;
use deepgram_errors::{ClientOptions, NormalizedError};
use std::io::Read;
use std::process::ExitCode;
use tracing::{error, info};

/// Read the error body from the file given as first argument, or stdin
fn read_body() -> anyhow::Result<String> {
    match std::env::args().nth(1) {
        Some(path) => {
            std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path))
        }
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read error body from stdin")?;
            Ok(body)
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let options = match ClientOptions::load() {
        Ok(options) => options,
        Err(e) => {
            error!("Client setup failed: {}", e);
            eprintln!("{}", e);
            return Ok(ExitCode::from(2));
        }
    };
    info!("Using Deepgram API at {}", options.base_url()?);

    let body = read_body()?;
    let normalized = NormalizedError::from_body(&body, None)
        .context("Error body violates the API contract")?;

    println!("{}", normalized);
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    // Initialize tracing for structured logging
    tracing_subscriber::fmt::init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
