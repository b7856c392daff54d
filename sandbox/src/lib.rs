//! A scripted trading platform for dry runs: replays offers from a JSON feed
//! and answers logons, relogs and offer actions in-process.
mod feed;
mod replay;

pub use feed::Feed;
pub use replay::{ReplayPlatform, ReplaySettings};
