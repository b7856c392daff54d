//! The trading platform, as seen from here.
//!
//! Authentication, logon codes, offer polling and confirmations are owned by
//! whatever implements these traits. Implementations report back by sending
//! [`Event`](crate::Event)s through the [`EventSender`](crate::EventSender)
//! they were built with.
use crate::config::Secret;
use crate::offer::Offer;
use crate::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Opaque web session cookies.
#[derive(Clone, PartialEq, Eq)]
pub struct Cookies(pub Vec<String>);

impl fmt::Debug for Cookies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cookies({} entries)", self.0.len())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PersonaState {
    Offline,
    Online,
}

#[derive(Clone, Debug)]
pub struct LogOnDetails {
    pub account_name: String,
    pub password: Secret,
    pub two_factor_code: String,
    pub remember_password: bool,
}

#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Starts the logon. Success is reported later as `LoggedOn` followed by
    /// `WebSession`; an error here means the credentials were rejected.
    async fn log_on(&self, details: LogOnDetails) -> Result<()>;

    async fn set_persona(&self, state: PersonaState) -> Result<()>;

    /// Forces a fresh session. Reported as another `LoggedOn`.
    async fn relog(&self) -> Result<()>;
}

pub trait AuthCodeGenerator: Send + Sync {
    fn auth_code(&self, shared_secret: &Secret) -> Result<String>;
}

#[async_trait]
pub trait OfferSource: Send + Sync {
    async fn set_cookies(&self, cookies: &Cookies) -> Result<()>;

    async fn accept(&self, offer: &Offer) -> Result<()>;

    async fn decline(&self, offer: &Offer) -> Result<()>;
}

#[async_trait]
pub trait ConfirmationChecker: Send + Sync {
    async fn set_cookies(&self, cookies: &Cookies) -> Result<()>;

    /// Starts (or restarts) background confirmation polling.
    async fn start(&self, interval: Duration, identity_secret: &Secret) -> Result<()>;
}

/// The collaborators the controller needs, bundled.
#[derive(Clone)]
pub struct Platform {
    pub session: Arc<dyn SessionProvider>,
    pub codes: Arc<dyn AuthCodeGenerator>,
    pub offers: Arc<dyn OfferSource>,
    pub confirmations: Arc<dyn ConfirmationChecker>,
}

impl Platform {
    /// For implementations that cover every concern in one type.
    pub fn from_shared<P>(platform: Arc<P>) -> Self
    where
        P: SessionProvider + AuthCodeGenerator + OfferSource + ConfirmationChecker + 'static,
    {
        Self {
            session: platform.clone(),
            codes: platform.clone(),
            offers: platform.clone(),
            confirmations: platform,
        }
    }
}
