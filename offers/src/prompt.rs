use crate::event::{Event, EventSender};
use crate::offer::{Offer, OfferRecord};
use crate::{Error, Result};
use log::{debug, warn};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;

type SharedWriter = Arc<Mutex<Box<dyn AsyncWrite + Send + Unpin>>>;

/// Line-oriented operator output: offer records, `success`, error text.
#[derive(Clone)]
pub struct Console {
    writer: SharedWriter,
}

impl Console {
    pub fn new<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }

    pub async fn write_line(&self, line: &str) -> Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Routes offers to the operator.
#[derive(Clone, Debug)]
pub struct PromptSender(UnboundedSender<Offer>);

impl PromptSender {
    pub fn channel() -> (Self, UnboundedReceiver<Offer>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self(sender), receiver)
    }

    pub fn ask(&self, offer: Offer) -> Result<()> {
        self.0.send(offer).map_err(|_| Error::ChannelClosed)
    }
}

/// Asks the operator about one offer at a time and forwards each answer to
/// the controller.
pub struct Prompter<R> {
    reader: R,
    console: Console,
    requests: UnboundedReceiver<Offer>,
    events: EventSender,
}

impl<R> Prompter<R>
where
    R: AsyncBufRead + Send + Unpin + 'static,
{
    pub fn new(reader: R, console: Console, events: EventSender) -> (Self, PromptSender) {
        let (sender, requests) = PromptSender::channel();
        let prompter = Self {
            reader,
            console,
            requests,
            events,
        };
        (prompter, sender)
    }

    /// Runs until the controller goes away or operator input hits EOF.
    pub async fn run(self) -> Result<()> {
        let Self {
            mut reader,
            console,
            mut requests,
            events,
        } = self;
        let mut buf = Vec::new();

        while let Some(offer) = requests.recv().await {
            let record = OfferRecord::from(&offer).render()?;
            console.write_line(&record).await?;

            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                warn!("Operator input closed, no more offers will be evaluated");
                break;
            }
            // Bytes that aren't UTF-8 just make the answer unrecognized.
            let response = String::from_utf8_lossy(&buf)
                .trim_end_matches(['\r', '\n'])
                .to_string();

            debug!("Operator answered {response:?} for offer {}", offer.id);
            events.send(Event::OperatorResponse { offer, response })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::Response;
    use crate::event;
    use crate::offer::{OfferState, SteamId};
    use tokio::io::{duplex, AsyncWriteExt, BufReader};

    fn offer(id: &str) -> Offer {
        Offer {
            id: id.into(),
            partner: SteamId::individual(46143802),
            message: String::new(),
            state: OfferState::Active,
            items_to_give: vec![],
            items_to_receive: vec![],
            is_our_offer: false,
            created: None,
            updated: None,
            expires: None,
        }
    }

    #[tokio::test]
    async fn renders_offer_and_forwards_answer() {
        let (out_write, out_read) = duplex(4096);
        let (mut in_write, in_read) = duplex(4096);
        let (events, mut inbox) = event::channel();

        let (prompter, prompts) =
            Prompter::new(BufReader::new(in_read), Console::new(out_write), events);
        let task = tokio::spawn(prompter.run());

        prompts.ask(offer("123")).unwrap();

        let mut rendered = BufReader::new(out_read).lines();
        let line = rendered.next_line().await.unwrap().unwrap();
        let record: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(record["id"], "123");
        assert_eq!(record["partner"], "76561198006409530");

        in_write.write_all(b"ACCEPT\n").await.unwrap();
        match inbox.recv().await.unwrap() {
            Event::OperatorResponse { offer, response } => {
                assert_eq!(offer.id.as_str(), "123");
                assert_eq!(response, "ACCEPT");
            }
            other => panic!("unexpected event {other:?}"),
        }

        drop(prompts);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn asks_one_question_at_a_time() {
        let (out_write, out_read) = duplex(4096);
        let (mut in_write, in_read) = duplex(4096);
        let (events, mut inbox) = event::channel();

        let (prompter, prompts) =
            Prompter::new(BufReader::new(in_read), Console::new(out_write), events);
        tokio::spawn(prompter.run());

        prompts.ask(offer("1")).unwrap();
        prompts.ask(offer("2")).unwrap();

        let mut rendered = BufReader::new(out_read).lines();
        let first = rendered.next_line().await.unwrap().unwrap();
        assert!(first.contains("\"id\":\"1\""));

        in_write.write_all(b"HOLD\n").await.unwrap();
        let second = rendered.next_line().await.unwrap().unwrap();
        assert!(second.contains("\"id\":\"2\""));
        in_write.write_all(b"DECLINE\n").await.unwrap();

        let answers: Vec<_> = [inbox.recv().await.unwrap(), inbox.recv().await.unwrap()]
            .into_iter()
            .map(|event| match event {
                Event::OperatorResponse { offer, response } => (offer.id.to_string(), response),
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(
            answers,
            [
                ("1".to_string(), "HOLD".to_string()),
                ("2".to_string(), "DECLINE".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn invalid_utf8_answer_does_not_stop_the_prompter() {
        let (out_write, _out_read) = duplex(4096);
        let (mut in_write, in_read) = duplex(4096);
        let (events, mut inbox) = event::channel();

        let (prompter, prompts) =
            Prompter::new(BufReader::new(in_read), Console::new(out_write), events);
        let task = tokio::spawn(prompter.run());

        prompts.ask(offer("1")).unwrap();
        prompts.ask(offer("2")).unwrap();
        in_write.write_all(b"ACC\xffEPT\r\nHOLD\n").await.unwrap();

        let answers: Vec<_> = [inbox.recv().await.unwrap(), inbox.recv().await.unwrap()]
            .into_iter()
            .map(|event| match event {
                Event::OperatorResponse { offer, response } => (offer.id.to_string(), response),
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(
            answers,
            [
                ("1".to_string(), "ACC\u{FFFD}EPT".to_string()),
                ("2".to_string(), "HOLD".to_string())
            ]
        );
        assert!(matches!(
            Response::parse(&answers[0].1),
            Response::Unrecognized(_)
        ));

        drop(prompts);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn stops_on_closed_input() {
        let (out_write, _out_read) = duplex(4096);
        let (in_write, in_read) = duplex(4096);
        drop(in_write);
        let (events, _inbox) = event::channel();

        let (prompter, prompts) =
            Prompter::new(BufReader::new(in_read), Console::new(out_write), events);
        prompts.ask(offer("9")).unwrap();
        prompter.run().await.unwrap();
    }
}
