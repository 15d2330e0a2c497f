use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_TOKEN_SYMMETRIC_KEY: &str = "token-symmetric-key";
pub const ARG_ACCESS_TOKEN_TTL_SECONDS: &str = "access-token-ttl-seconds";
pub const ARG_REFRESH_TOKEN_TTL_SECONDS: &str = "refresh-token-ttl-seconds";

#[derive(Debug)]
pub struct Options {
    pub symmetric_key: SecretString,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_seconds: i64,
}

impl Options {
    /// # Errors
    /// Returns an error if a required token argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let symmetric_key = matches
            .get_one::<String>(ARG_TOKEN_SYMMETRIC_KEY)
            .cloned()
            .map(SecretString::from)
            .context("missing required argument: --token-symmetric-key")?;

        Ok(Self {
            symmetric_key,
            access_token_ttl_seconds: matches
                .get_one::<i64>(ARG_ACCESS_TOKEN_TTL_SECONDS)
                .copied()
                .unwrap_or(900),
            refresh_token_ttl_seconds: matches
                .get_one::<i64>(ARG_REFRESH_TOKEN_TTL_SECONDS)
                .copied()
                .unwrap_or(86_400),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SYMMETRIC_KEY)
                .long(ARG_TOKEN_SYMMETRIC_KEY)
                .help("Symmetric key for access and refresh tokens (exactly 32 bytes)")
                .env("SIMPLEBANK_TOKEN_SYMMETRIC_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_ACCESS_TOKEN_TTL_SECONDS)
                .long(ARG_ACCESS_TOKEN_TTL_SECONDS)
                .help("Access token lifetime in seconds")
                .env("SIMPLEBANK_ACCESS_TOKEN_TTL_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_REFRESH_TOKEN_TTL_SECONDS)
                .long(ARG_REFRESH_TOKEN_TTL_SECONDS)
                .help("Refresh token (session) lifetime in seconds")
                .env("SIMPLEBANK_REFRESH_TOKEN_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
}
