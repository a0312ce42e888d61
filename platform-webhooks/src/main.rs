use clap::Parser;
use platform_webhooks::cli::{header_lines, read_payload, resolve_secret, sign_file};
use platform_webhooks::config::{Args, Command, Config};
use platform_webhooks::telemetry;
use platform_webhooks::webhooks::{parse_signature_header, parse_timestamp_header, verify};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::load(&args)?;

    telemetry::init_telemetry()?;

    tracing::debug!("{:?}", args.command);

    match args.command {
        Command::Sign {
            payload_file,
            timestamp,
            secret,
        } => {
            let secret = resolve_secret(secret, &config)?;
            let result = sign_file(&payload_file, &secret, timestamp)?;
            for line in header_lines(&result) {
                println!("{}", line);
            }
        }
        Command::Verify {
            payload_file,
            signature,
            timestamp,
            secret,
            tolerance,
        } => {
            let secret = resolve_secret(secret, &config)?;
            let payload = read_payload(&payload_file)?;
            let timestamp = parse_timestamp_header(&timestamp)?;
            let tolerance = tolerance.unwrap_or(config.signature.tolerance_secs);

            verify(&payload, &parse_signature_header(&signature), &secret, timestamp, tolerance)?;

            tracing::info!(timestamp, "Webhook signature is valid");
            println!("valid");
        }
    }

    Ok(())
}
