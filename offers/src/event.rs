use crate::decision::PendingDecision;
use crate::offer::Offer;
use crate::platform::Cookies;
use crate::{Error, Result};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Everything the controller reacts to. All of it arrives through one inbox.
#[derive(Debug)]
pub enum Event {
    /// Low-level logon finished, either initially or after a relog.
    LoggedOn,
    /// Web session granted.
    WebSession(Cookies),
    NewOffer(Offer),
    /// Drain timer fired.
    Tick,
    OperatorResponse { offer: Offer, response: String },
    /// The settle delay after a post-relog logon ran out.
    SettleElapsed,
    /// The fixed relog delay ran out for a decision made without the drain gate.
    RelogElapsed(PendingDecision),
}

pub type Inbox = UnboundedReceiver<Event>;

/// Handle that collaborators use to push events at the controller.
#[derive(Clone, Debug)]
pub struct EventSender(UnboundedSender<Event>);

impl EventSender {
    pub fn send(&self, event: Event) -> Result<()> {
        self.0.send(event).map_err(|_| Error::ChannelClosed)
    }
}

pub fn channel() -> (EventSender, Inbox) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (EventSender(sender), receiver)
}
