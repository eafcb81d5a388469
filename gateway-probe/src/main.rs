use std::process::ExitCode;

use gateway_probe::{ProbeConfig, logging};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    logging::init_tracing();

    let config = ProbeConfig::from_env()?;

    println!("=== Gateway Probe: {} ===", config.base_url());
    let report = gateway_probe::run(&config).await;
    report.print();

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
