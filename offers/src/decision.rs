use crate::offer::Offer;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// What the operator can answer to a rendered offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Accept,
    Decline,
    Hold,
}

impl Decision {
    /// The platform call this decision needs, if any.
    pub fn action(self) -> Option<Action> {
        match self {
            Decision::Accept => Some(Action::Accept),
            Decision::Decline => Some(Action::Decline),
            Decision::Hold => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    Accept,
    Decline,
}

impl Action {
    pub fn past_tense(self) -> &'static str {
        match self {
            Action::Accept => "accepted",
            Action::Decline => "declined",
        }
    }
}

/// A parsed operator line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Decision(Decision),
    Unrecognized(String),
}

impl Response {
    /// Matches exactly, apart from the line terminator.
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        match Decision::from_str(line) {
            Ok(decision) => Response::Decision(decision),
            Err(_) => Response::Unrecognized(line.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PendingDecision {
    pub offer: Offer,
    pub action: Action,
}
