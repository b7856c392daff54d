use crate::decision::Action;
use crate::offer::OfferId;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Login failed: {0}")]
    Login(String),

    #[error("Failed to {action} offer {offer_id}: {reason}")]
    OfferAction {
        offer_id: OfferId,
        action: Action,
        reason: String,
    },

    #[error("Unrecognized response {response:?} for offer {offer_id}")]
    UnrecognizedResponse { offer_id: OfferId, response: String },

    #[error("Session error: {0}")]
    Session(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Event channel closed")]
    ChannelClosed,
}

impl Error {
    /// A failed accept/decline. The reason is folded onto one line because
    /// the console prints exactly one result line per offer.
    pub(crate) fn offer_action(offer_id: OfferId, action: Action, cause: impl fmt::Display) -> Self {
        let reason = cause
            .to_string()
            .split(['\r', '\n'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Error::OfferAction {
            offer_id,
            action,
            reason,
        }
    }
}
