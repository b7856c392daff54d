use crate::config::Config;
use crate::decision::{PendingDecision, Response};
use crate::event::{Event, EventSender, Inbox};
use crate::executor::{self, SUCCESS};
use crate::offer::{Offer, OfferId};
use crate::platform::{Cookies, LogOnDetails, Platform, PersonaState};
use crate::prompt::{Console, PromptSender};
use crate::queue::OfferQueue;
use crate::{Error, Result};
use log::{debug, error, info, warn};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

/// Whether an offer is currently in front of the operator or awaiting its
/// decision. Only tracked when draining is gated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Evaluating(OfferId),
}

#[derive(Debug)]
struct Pending {
    decision: PendingDecision,
    settling: bool,
}

/// Owns the offer queue and the pending decision, and reacts to one event at
/// a time.
pub struct Controller {
    config: Config,
    platform: Platform,
    events: EventSender,
    prompts: PromptSender,
    console: Console,
    queue: OfferQueue,
    phase: Phase,
    pending: Option<Pending>,
}

impl Controller {
    pub fn new(
        config: Config,
        platform: Platform,
        events: EventSender,
        prompts: PromptSender,
        console: Console,
    ) -> Self {
        Self {
            config,
            platform,
            events,
            prompts,
            console,
            queue: OfferQueue::new(),
            phase: Phase::Idle,
            pending: None,
        }
    }

    pub fn queue(&self) -> &OfferQueue {
        &self.queue
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn pending(&self) -> Option<&PendingDecision> {
        self.pending.as_ref().map(|pending| &pending.decision)
    }

    /// Logs on with a fresh two-factor code. The session provider answers
    /// with `LoggedOn` and `WebSession` events.
    pub async fn start(&self) -> Result<()> {
        let credentials = &self.config.credentials;
        let two_factor_code = self
            .platform
            .codes
            .auth_code(&credentials.shared_secret)
            .map_err(|e| Error::Login(e.to_string()))?;

        info!("Logging on as {}", credentials.account_name);
        self.platform
            .session
            .log_on(LogOnDetails {
                account_name: credentials.account_name.clone(),
                password: credentials.password.clone(),
                two_factor_code,
                remember_password: true,
            })
            .await
            .map_err(|e| match e {
                Error::Login(_) => e,
                other => Error::Login(other.to_string()),
            })
    }

    /// Logs on, then processes events in arrival order. Only a failed logon
    /// ends this early.
    pub async fn run(mut self, mut inbox: Inbox) -> Result<()> {
        self.config.validate()?;
        self.start().await?;
        let ticker = self.spawn_ticker();

        while let Some(event) = inbox.recv().await {
            if let Err(e) = self.handle(event).await {
                error!("Failed to handle event: {e}");
            }
        }

        ticker.abort();
        Ok(())
    }

    /// Drives the drain loop. The first tick comes one full period after start.
    pub fn spawn_ticker(&self) -> JoinHandle<()> {
        let events = self.events.clone();
        let period = self.config.poll_interval;

        tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if events.send(Event::Tick).is_err() {
                    break;
                }
            }
        })
    }

    pub async fn handle(&mut self, event: Event) -> Result<()> {
        match event {
            Event::LoggedOn => self.on_logged_on().await,
            Event::WebSession(cookies) => self.on_web_session(cookies).await,
            Event::NewOffer(offer) => {
                info!("New offer {} from {}", offer.id, offer.partner);
                self.queue.push(offer);
                Ok(())
            }
            Event::Tick => self.drain(),
            Event::OperatorResponse { offer, response } => {
                self.on_response(offer, Response::parse(&response)).await
            }
            Event::SettleElapsed => self.on_settle_elapsed().await,
            Event::RelogElapsed(decision) => {
                executor::execute(&self.platform, &self.console, decision).await
            }
        }
    }

    async fn on_logged_on(&mut self) -> Result<()> {
        info!("Logged on");
        if let Err(e) = self.platform.session.set_persona(PersonaState::Online).await {
            error!("Failed to go online: {e}");
        }

        if !self.config.safe_drain {
            return Ok(());
        }

        if let Some(pending) = self.pending.as_mut().filter(|pending| !pending.settling) {
            pending.settling = true;
            debug!(
                "Session refreshed, executing offer {} in {:?}",
                pending.decision.offer.id, self.config.settle_delay
            );
            self.notify_after(self.config.settle_delay, Event::SettleElapsed);
        }

        Ok(())
    }

    async fn on_web_session(&mut self, cookies: Cookies) -> Result<()> {
        debug!("Web session established");
        self.platform.offers.set_cookies(&cookies).await?;
        self.platform.confirmations.set_cookies(&cookies).await?;
        self.platform
            .confirmations
            .start(
                self.config.confirmation_interval,
                &self.config.credentials.identity_secret,
            )
            .await
    }

    fn drain(&mut self) -> Result<()> {
        if self.config.safe_drain && self.phase != Phase::Idle {
            return Ok(());
        }

        let Some(offer) = self.queue.pop() else {
            return Ok(());
        };

        debug!("Evaluating offer {} ({} left)", offer.id, self.queue.len());
        if self.config.safe_drain {
            self.phase = Phase::Evaluating(offer.id.clone());
        }
        if let Err(e) = self.prompts.ask(offer) {
            self.finish();
            return Err(e);
        }
        Ok(())
    }

    async fn on_response(&mut self, offer: Offer, response: Response) -> Result<()> {
        let decision = match response {
            Response::Decision(decision) => decision,
            Response::Unrecognized(response) => {
                self.finish();
                let err = Error::UnrecognizedResponse {
                    offer_id: offer.id,
                    response,
                };
                warn!("{err}, dropping the offer");
                return Ok(());
            }
        };

        let Some(action) = decision.action() else {
            info!("Holding offer {}", offer.id);
            self.finish();
            return self.console.write_line(SUCCESS).await;
        };

        let decision = PendingDecision { offer, action };

        info!("Refreshing session before acting on offer {}", decision.offer.id);
        if let Err(e) = self.platform.session.relog().await {
            self.finish();
            return self.report_failure(decision, e).await;
        }

        if self.config.safe_drain {
            self.pending = Some(Pending {
                decision,
                settling: false,
            });
        } else {
            self.notify_after(self.config.relog_delay, Event::RelogElapsed(decision));
        }

        Ok(())
    }

    async fn on_settle_elapsed(&mut self) -> Result<()> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        let outcome = executor::execute(&self.platform, &self.console, pending.decision).await;
        self.finish();
        outcome
    }

    async fn report_failure(&self, decision: PendingDecision, cause: Error) -> Result<()> {
        let err = Error::offer_action(decision.offer.id, decision.action, cause);
        error!("{err}");
        self.console.write_line(&err.to_string()).await?;
        Err(err)
    }

    fn finish(&mut self) {
        self.phase = Phase::Idle;
    }

    fn notify_after(&self, delay: Duration, event: Event) {
        let events = self.events.clone();
        tokio::spawn(async move {
            sleep(delay).await;
            if events.send(event).is_err() {
                warn!("Controller stopped before a scheduled decision was due");
            }
        });
    }
}
