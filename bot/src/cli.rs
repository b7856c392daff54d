use clap::{ArgAction, Parser};
use offers::{Config, Credentials};
use std::path::PathBuf;
use std::time::Duration;

/// Asks an operator, one offer at a time, whether to accept, decline or hold
/// incoming trade offers.
#[derive(Parser)]
#[command(author, version, about)]
pub struct Args {
    #[arg(env = "STEAM_ACCOUNT_NAME")]
    pub account_name: String,

    #[arg(env = "STEAM_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Seed for the two-factor logon code
    #[arg(env = "STEAM_SHARED_SECRET", hide_env_values = true)]
    pub shared_secret: String,

    /// Key used to approve confirmations
    #[arg(env = "STEAM_IDENTITY_SECRET", hide_env_values = true)]
    pub identity_secret: String,

    /// Milliseconds between attempts to take an offer off the queue
    #[arg(env = "OFFER_CHECK_TIME")]
    pub offer_check_time: u64,

    /// Offers to replay through the sandbox platform (JSON)
    #[arg(long, env = "OFFER_FEED")]
    pub feed: PathBuf,

    /// Hold further offers back until the current one has been dealt with
    #[arg(long, env = "SAFE_DRAIN", default_value_t = true, action = ArgAction::Set)]
    pub safe_drain: bool,

    /// Wait after the post-relog logon before acting (gated mode)
    #[arg(long, env = "SETTLE_DELAY_MS", default_value_t = 2500)]
    pub settle_delay_ms: u64,

    /// Wait after a relog before acting (ungated mode)
    #[arg(long, env = "RELOG_DELAY_MS", default_value_t = 15000)]
    pub relog_delay_ms: u64,

    #[arg(long, env = "CONFIRMATION_INTERVAL_MS", default_value_t = 2000)]
    pub confirmation_interval_ms: u64,
}

impl Args {
    pub fn config(&self) -> Config {
        let credentials = Credentials::new(
            &self.account_name,
            &self.password,
            &self.shared_secret,
            &self.identity_secret,
        );

        Config::new(credentials, Duration::from_millis(self.offer_check_time))
            .with_safe_drain(self.safe_drain)
            .with_settle_delay(Duration::from_millis(self.settle_delay_ms))
            .with_relog_delay(Duration::from_millis(self.relog_delay_ms))
            .with_confirmation_interval(Duration::from_millis(self.confirmation_interval_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSITIONAL: [&str; 6] = ["bot", "trader", "hunter2", "shared", "identity", "60000"];

    #[test]
    fn positional_arguments_fill_the_config() {
        let args = Args::try_parse_from(POSITIONAL.iter().copied().chain(["--feed", "offers.json"]))
            .unwrap();
        let config = args.config();

        assert_eq!(config.credentials.account_name, "trader");
        assert_eq!(config.credentials.identity_secret.expose(), "identity");
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert!(config.safe_drain);
        assert_eq!(config.settle_delay, Duration::from_millis(2500));
        assert_eq!(args.feed, PathBuf::from("offers.json"));
    }

    #[test]
    fn ungated_mode_is_opt_in() {
        let args = Args::try_parse_from(POSITIONAL.iter().copied().chain([
            "--feed",
            "offers.json",
            "--safe-drain",
            "false",
            "--relog-delay-ms",
            "20000",
        ]))
        .unwrap();
        let config = args.config();

        assert!(!config.safe_drain);
        assert_eq!(config.relog_delay, Duration::from_secs(20));
    }

    #[test]
    fn offer_check_time_must_be_a_number() {
        let args = ["bot", "trader", "hunter2", "shared", "identity", "soon", "--feed", "f"];
        assert!(Args::try_parse_from(args).is_err());
    }
}
