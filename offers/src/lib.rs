//! Operator-driven trade offer handling.
//!
//! Incoming offers are queued, shown to an operator one line at a time and
//! accepted, declined or held according to the answer. Everything that talks
//! to the trading platform sits behind the traits in [`platform`].
mod config;
mod controller;
mod decision;
mod error;
mod event;
mod executor;
mod offer;
pub mod platform;
mod prompt;
mod queue;

pub use config::{
    Config, Credentials, Secret, DEFAULT_CONFIRMATION_INTERVAL, DEFAULT_RELOG_DELAY,
    DEFAULT_SETTLE_DELAY,
};
pub use controller::{Controller, Phase};
pub use decision::{Action, Decision, PendingDecision, Response};
pub use error::Error;
pub use event::{channel, Event, EventSender, Inbox};
pub use executor::{execute, SUCCESS};
pub use offer::{EconItem, Offer, OfferId, OfferRecord, OfferState, SteamId};
pub use platform::Platform;
pub use prompt::{Console, PromptSender, Prompter};
pub use queue::OfferQueue;

pub type Result<T> = std::result::Result<T, Error>;
