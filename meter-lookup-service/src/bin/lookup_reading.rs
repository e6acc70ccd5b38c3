use anyhow::{bail, Result};
use meter_lookup_service::{
    config::AppConfig,
    find_reading,
    http::AppState,
    observability,
    LookupRequest,
};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        bail!("usage: lookup_reading <meterID> <mobileNo> <requestID>");
    }
    let request = LookupRequest::new(&args[1], &args[2], &args[3]);

    // Same house layout as the server (METER_LOOKUP_CONFIG or defaults).
    let cfg = AppConfig::load()?;
    let state = AppState::from_config(&cfg.data);

    let reading = find_reading(&request, state.sources(), state.policy()).await?;
    println!("{}", serde_json::to_string_pretty(&reading)?);

    Ok(())
}
