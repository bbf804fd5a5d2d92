use ansi_term::Colour;
use anyhow::Result;
use async_trait::async_trait;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::{debug, error};

use super::{ChatTransport, InboundMessage, Person};

/// Chat transport for running the bot in a terminal. Each paragraph typed on stdin becomes one
/// inbound message, so a block of quoted log lines can be pasted in one go.
pub struct ConsoleTransport;

impl ConsoleTransport {
    /// Starts reading stdin in the background and returns the transport together with the
    /// stream of inbound messages.
    pub fn start() -> (Self, mpsc::Receiver<InboundMessage>) {
        let (sender, receiver) = mpsc::channel(10);
        tokio::spawn(async move {
            let stdin = BufReader::new(tokio::io::stdin());
            if let Err(e) = read_messages(stdin, sender).await {
                error!("Stopped reading console input {e:?}");
            }
        });
        (Self, receiver)
    }
}

async fn read_messages(
    input: impl AsyncBufRead + Unpin,
    sender: mpsc::Sender<InboundMessage>,
) -> Result<()> {
    let mut lines = input.lines();
    let mut paragraph: Vec<String> = vec![];
    loop {
        let line = lines.next_line().await?;
        let finished = match &line {
            Some(line) if !line.trim().is_empty() => {
                paragraph.push(line.clone());
                false
            }
            _ => true,
        };

        if finished && !paragraph.is_empty() {
            let content = paragraph.join("\n");
            paragraph.clear();
            debug!("Received console message {content:?}");
            if sender.send(InboundMessage { content }).await.is_err() {
                return Ok(());
            }
        }

        if line.is_none() {
            return Ok(());
        }
    }
}

/// Guesses a first name from a handle like `jane.doe@example.com`.
fn first_name_from_handle(handle: &str) -> String {
    let local = handle.split('@').next().unwrap_or(handle);
    let first = local.split(['.', '_', '-']).next().unwrap_or(local);
    let mut chars = first.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => handle.to_string(),
    }
}

#[async_trait]
impl ChatTransport for ConsoleTransport {
    async fn send_message(&self, text: &str) -> Result<()> {
        println!("{}", Colour::Cyan.paint(text));
        Ok(())
    }

    async fn find_person(&self, handle: &str) -> Result<Person> {
        Ok(Person {
            handle: handle.to_string(),
            first_name: first_name_from_handle(handle),
        })
    }
}
