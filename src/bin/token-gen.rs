use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;

use portal_gateway::config::Config;
use portal_gateway::services::auth::{BearerVerifier, TokenIssuer};

/// Mint a bearer token the gateway accepts, signed with the configured secret.
///
/// Reads the same environment (`.env` included) as the gateway, so the token
/// matches `SECURITY_JWT_SECRET`, `SECURITY_JWT_PREFIX` and
/// `SECURITY_JWT_EXPIRATION` unless overridden here.
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Subject (`sub` claim)
    #[arg(long)]
    subject: String,

    /// Granted authority; repeat for several (e.g. --authority ROLE_USER --authority ROLE_ADMIN)
    #[arg(long = "authority")]
    authorities: Vec<String>,

    /// Lifetime in seconds. Default: SECURITY_JWT_EXPIRATION.
    #[arg(long)]
    ttl: Option<u64>,

    /// Print only the token (no prefix, no extra lines)
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env().context("failed to load configuration")?;

    let ttl = args.ttl.unwrap_or(config.gate.expiration_seconds);
    let issuer = TokenIssuer::new(&config.gate.secret, ttl);

    let now = Utc::now();
    let token = issuer.issue(&args.subject, &args.authorities, now)?;

    if args.quiet {
        println!("{token}");
        return Ok(());
    }

    // Sanity check against the gateway's own verifier.
    let header_value = format!("{}{}", config.gate.prefix, token);
    let identity = BearerVerifier::from_config(&config.gate).verify(&header_value, now)?;

    if config.uses_dev_secret {
        eprintln!("warning: signed with the development secret");
    }
    println!("{}: {}", config.gate.header, header_value);
    println!("subject:     {}", identity.subject);
    println!(
        "authorities: {}",
        identity.authorities.into_iter().collect::<Vec<_>>().join(",")
    );
    println!("expires in:  {}s", ttl);
    Ok(())
}
