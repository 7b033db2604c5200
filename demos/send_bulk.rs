//! Send one message to a comma-separated list of recipients.
//!
//! `cargo run --example send_bulk -- --to 254700000001,254700000002 --text "Hi"`
//!
//! Provider settings come from `SMS_API_URL`, `SMS_CLIENT_ID`, `SMS_API_KEY`
//! and `SMS_SENDER_ID` (environment or `.env`); `--sender` overrides the
//! sender id.
use onfon_sms::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let app = AppConfig::load()?;
    init_tracing(&app.logging);
    load_dotenv();

    let to = arg_or_env("--to", "SMS_TO");
    let text = arg_or_env("--text", "SMS_TEXT");
    let recipients: Vec<String> = to
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from)
        .collect();

    let host = arg("--sender").map(|sender| HostSettings::new().with(SMS_SENDER_ID, sender));
    let resolver = Resolver::standard(host, Defaults::new());

    let results = send_sms_with(&resolver, &app.dispatch, &recipients, &text).await?;
    let summary = DispatchSummary::of(&results);
    println!(
        "{} batches: {} delivered, {} failed",
        summary.batches, summary.delivered, summary.failed
    );
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

fn arg(flag: &str) -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    let idx = args.iter().position(|a| a == flag)?;
    args.get(idx + 1).cloned()
}

fn arg_or_env(flag: &str, env_key: &str) -> String {
    arg(flag)
        .or_else(|| std::env::var(env_key).ok())
        .unwrap_or_else(|| panic!("missing {} (arg {} or env {})", flag, flag, env_key))
}
