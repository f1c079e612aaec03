// src/main.rs

use igniter::{cli, logging, run};

/// Exit code of a run aborted by a fatal task failure.
const FATAL_EXIT_CODE: i32 = 101;

#[tokio::main]
async fn main() {
    let code = match run_main().await {
        Ok(code) => code,
        Err(err) => {
            let fatal = err.is_fatal_abort();
            eprintln!("igniter error: {:?}", anyhow::Error::from(err));
            if fatal { FATAL_EXIT_CODE } else { 1 }
        }
    };
    std::process::exit(code);
}

async fn run_main() -> igniter::errors::Result<i32> {
    let args = cli::parse()?;
    logging::init_logging(args.log_level)?;
    let summary = run(args).await?;
    Ok(summary.exit_code())
}
