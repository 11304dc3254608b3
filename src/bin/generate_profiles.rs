//! Script to generate profiles offline and print them as CSV.
//!
//! Usage: `generate_profiles <country> [count] [field,field,...]`
//!
//! Mailboxes need the network, so the `email` field is not available here.

use dotenvy::dotenv;
use fake_profile_api::export;
use fake_profile_api::generation::{MAX_PROFILES, MIN_PROFILES};
use fake_profile_api::generator::ProfileGenerator;
use fake_profile_api::iban::IbanAllocator;
use fake_profile_api::models::{Country, ExtraField};
use std::env;
use std::io::Write;

/// Main entry point for the generation script.
///
/// Parses the arguments, generates the batch against a fresh IBAN pool and
/// writes the CSV export to stdout.
fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(country) = args.first() else {
        anyhow::bail!("usage: generate_profiles <country> [count] [field,field,...]");
    };
    let country: Country = country.parse().map_err(anyhow::Error::msg)?;

    let count: u32 = match args.get(1) {
        Some(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("count must be a number, got '{}'", raw))?,
        None => 1,
    };
    if !(MIN_PROFILES..=MAX_PROFILES).contains(&count) {
        anyhow::bail!("count must be between {} and {}", MIN_PROFILES, MAX_PROFILES);
    }

    let mut fields: Vec<ExtraField> = match args.get(2) {
        Some(raw) => raw
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse().map_err(anyhow::Error::msg))
            .collect::<anyhow::Result<_>>()?,
        None => Vec::new(),
    };
    if fields.contains(&ExtraField::Email) {
        tracing::warn!("email is not available offline, dropping the column");
        fields.retain(|f| *f != ExtraField::Email);
    }

    tracing::info!("Generating {} profiles for {}", count, country);

    let ibans = IbanAllocator::new();
    let profiles: Vec<_> = (0..count)
        .map(|_| ProfileGenerator::generate(country, &fields, &ibans))
        .collect();

    let csv = export::to_csv(&profiles, &fields)?;
    std::io::stdout().write_all(&csv)?;

    Ok(())
}
