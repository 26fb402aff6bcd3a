// src/main.rs

use resticon::cli::{self, CliCommand};
use resticon::{logging, run, run_worker};

#[tokio::main]
async fn main() {
    match run_main().await {
        // Exit explicitly: after an interrupt, tokio's stdin reader can still
        // be parked in a blocking read, which would stall runtime shutdown.
        Ok(()) => std::process::exit(0),
        Err(err) => {
            eprintln!("[!] resticon error: {err}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;

    match args.command.clone() {
        Some(CliCommand::Worker(worker)) => run_worker(worker).await?,
        None => {
            run(args).await?;
        }
    }
    Ok(())
}
