// src/main.rs

use siteloop::engine::RunFailure;
use siteloop::{cli, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("siteloop error: {err:?}");
        // Inherit the failed task's exit code where one was recorded.
        let code = err
            .downcast_ref::<RunFailure>()
            .map(RunFailure::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
