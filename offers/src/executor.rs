use crate::decision::{Action, PendingDecision};
use crate::platform::Platform;
use crate::prompt::Console;
use crate::{Error, Result};
use log::{error, info};

/// Written to the console whenever a decision has gone through.
pub const SUCCESS: &str = "success";

/// Carries out an accept or decline exactly once. Failures are written to the
/// console and returned, never retried.
pub async fn execute(
    platform: &Platform,
    console: &Console,
    decision: PendingDecision,
) -> Result<()> {
    let PendingDecision { offer, action } = decision;
    info!("Going to {action} offer {}", offer.id);

    let outcome = match action {
        Action::Accept => platform.offers.accept(&offer).await,
        Action::Decline => platform.offers.decline(&offer).await,
    };

    match outcome {
        Ok(()) => {
            info!("Offer {} {}", offer.id, action.past_tense());
            console.write_line(SUCCESS).await
        }
        Err(e) => {
            let err = Error::offer_action(offer.id, action, e);
            error!("{err}");
            console.write_line(&err.to_string()).await?;
            Err(err)
        }
    }
}
