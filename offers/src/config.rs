use crate::{Error, Result};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(2500);
pub const DEFAULT_RELOG_DELAY: Duration = Duration::from_millis(15000);
pub const DEFAULT_CONFIRMATION_INTERVAL: Duration = Duration::from_millis(2000);

/// A credential that must never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

#[derive(Clone, Debug)]
pub struct Credentials {
    pub account_name: String,
    pub password: Secret,
    /// Seed for the time-based logon code.
    pub shared_secret: Secret,
    /// Key used by the confirmation checker.
    pub identity_secret: Secret,
}

impl Credentials {
    pub fn new(
        account_name: impl Into<String>,
        password: impl Into<String>,
        shared_secret: impl Into<String>,
        identity_secret: impl Into<String>,
    ) -> Self {
        Self {
            account_name: account_name.into(),
            password: Secret::new(password),
            shared_secret: Secret::new(shared_secret),
            identity_secret: Secret::new(identity_secret),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub credentials: Credentials,
    /// Time between drain attempts (`offerCheckTime`).
    pub poll_interval: Duration,
    /// Only drain when no offer is being evaluated, and execute decisions
    /// after the post-relog logon instead of after a blind delay.
    pub safe_drain: bool,
    pub settle_delay: Duration,
    pub relog_delay: Duration,
    pub confirmation_interval: Duration,
}

impl Config {
    pub fn new(credentials: Credentials, poll_interval: Duration) -> Self {
        Self {
            credentials,
            poll_interval,
            safe_drain: true,
            settle_delay: DEFAULT_SETTLE_DELAY,
            relog_delay: DEFAULT_RELOG_DELAY,
            confirmation_interval: DEFAULT_CONFIRMATION_INTERVAL,
        }
    }

    pub fn with_safe_drain(mut self, safe_drain: bool) -> Self {
        self.safe_drain = safe_drain;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_relog_delay(mut self, delay: Duration) -> Self {
        self.relog_delay = delay;
        self
    }

    pub fn with_confirmation_interval(mut self, interval: Duration) -> Self {
        self.confirmation_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.credentials.account_name.is_empty() {
            return Err(Error::Config("account name is empty".into()));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::Config("offer check time must be positive".into()));
        }
        if self.confirmation_interval.is_zero() {
            return Err(Error::Config(
                "confirmation interval must be positive".into(),
            ));
        }
        Ok(())
    }
}
