use crate::feed::Feed;
use async_trait::async_trait;
use log::{debug, info, warn};
use offers::platform::{
    AuthCodeGenerator, ConfirmationChecker, Cookies, LogOnDetails, OfferSource, PersonaState,
    SessionProvider,
};
use offers::{Action, Error, Event, EventSender, Offer, OfferId, Result, Secret};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;

const SANDBOX_CODE: &str = "R3PLY";

#[derive(Clone, Copy, Debug)]
pub struct ReplaySettings {
    /// Gap between replayed offers.
    pub feed_interval: Duration,
    /// How long a relog takes to report back.
    pub relog_latency: Duration,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            feed_interval: Duration::from_secs(1),
            relog_latency: Duration::from_millis(500),
        }
    }
}

/// An in-process stand-in for the trading platform. Replays a fixed feed of
/// offers once a web session exists and records what was done with them.
pub struct ReplayPlatform {
    events: EventSender,
    settings: ReplaySettings,
    pending_feed: Mutex<Option<Vec<Offer>>>,
    failing: HashSet<OfferId>,
    sessions: AtomicU32,
    outcomes: Mutex<Vec<(OfferId, Action)>>,
}

impl ReplayPlatform {
    pub fn new(feed: Feed, events: EventSender, settings: ReplaySettings) -> Arc<Self> {
        Arc::new(Self {
            events,
            settings,
            pending_feed: Mutex::new(Some(feed.offers)),
            failing: feed.failing,
            sessions: AtomicU32::new(0),
            outcomes: Mutex::new(Vec::new()),
        })
    }

    /// Every accept/decline that went through, in order.
    pub async fn outcomes(&self) -> Vec<(OfferId, Action)> {
        self.outcomes.lock().await.clone()
    }

    fn next_session(&self) -> u32 {
        self.sessions.fetch_add(1, Ordering::Relaxed) + 1
    }

    async fn respond(&self, offer: &Offer, action: Action) -> Result<()> {
        if self.failing.contains(&offer.id) {
            return Err(Error::Session(format!(
                "offer {} can no longer be {}",
                offer.id,
                action.past_tense()
            )));
        }
        info!("[sandbox] offer {} {}", offer.id, action.past_tense());
        self.outcomes.lock().await.push((offer.id.clone(), action));
        Ok(())
    }
}

fn open_session(events: &EventSender, session: u32) -> Result<()> {
    events.send(Event::LoggedOn)?;
    events.send(Event::WebSession(Cookies(vec![
        format!("sessionid=sandbox{session}"),
        format!("steamLoginSecure=sandbox{session}"),
    ])))
}

#[async_trait]
impl SessionProvider for ReplayPlatform {
    async fn log_on(&self, details: LogOnDetails) -> Result<()> {
        if details.two_factor_code.is_empty() {
            return Err(Error::Login("two-factor code required".into()));
        }
        info!("[sandbox] {} logged on", details.account_name);
        open_session(&self.events, self.next_session())
    }

    async fn set_persona(&self, state: PersonaState) -> Result<()> {
        debug!("[sandbox] persona is now {state:?}");
        Ok(())
    }

    async fn relog(&self) -> Result<()> {
        debug!("[sandbox] relogging");
        let events = self.events.clone();
        let session = self.next_session();
        let latency = self.settings.relog_latency;
        tokio::spawn(async move {
            sleep(latency).await;
            if let Err(e) = open_session(&events, session) {
                warn!("[sandbox] relog not delivered: {e}");
            }
        });
        Ok(())
    }
}

impl AuthCodeGenerator for ReplayPlatform {
    fn auth_code(&self, _shared_secret: &Secret) -> Result<String> {
        Ok(SANDBOX_CODE.to_string())
    }
}

#[async_trait]
impl OfferSource for ReplayPlatform {
    async fn set_cookies(&self, cookies: &Cookies) -> Result<()> {
        debug!("[sandbox] offer source got {cookies:?}");

        let Some(offers) = self.pending_feed.lock().await.take() else {
            return Ok(());
        };

        info!("[sandbox] replaying {} offers", offers.len());
        let events = self.events.clone();
        let interval = self.settings.feed_interval;
        tokio::spawn(async move {
            for offer in offers {
                sleep(interval).await;
                if events.send(Event::NewOffer(offer)).is_err() {
                    warn!("[sandbox] controller gone, replay stopped");
                    break;
                }
            }
        });

        Ok(())
    }

    async fn accept(&self, offer: &Offer) -> Result<()> {
        self.respond(offer, Action::Accept).await
    }

    async fn decline(&self, offer: &Offer) -> Result<()> {
        self.respond(offer, Action::Decline).await
    }
}

#[async_trait]
impl ConfirmationChecker for ReplayPlatform {
    async fn set_cookies(&self, cookies: &Cookies) -> Result<()> {
        debug!("[sandbox] confirmation checker got {cookies:?}");
        Ok(())
    }

    async fn start(&self, interval: Duration, _identity_secret: &Secret) -> Result<()> {
        info!("[sandbox] checking confirmations every {interval:?}");
        Ok(())
    }
}
