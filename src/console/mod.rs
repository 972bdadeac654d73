//! User interaction. [Prompter] is the contract the tracker uses to ask questions and show alerts,
//! [Console] is the terminal realization that shares stdin with the interactive command loop.

use std::io::Write;

use ansi_term::Colour;
use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio_stream::wrappers::LinesStream;
use tokio_util::sync::CancellationToken;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Prompter: Send {
    /// Returns the answer as typed, or `None` when the user has nothing more to say, for example
    /// when input ended.
    async fn ask(&mut self, question: &str) -> Result<Option<String>>;

    /// Destructive operations go through this. Anything but an explicit yes is a no.
    async fn confirm(&mut self, question: &str) -> Result<bool>;

    fn alert(&mut self, message: &str);
}

/// A prompt was abandoned because the application is shutting down.
#[derive(Debug, Error)]
#[error("Interrupted")]
pub struct Interrupted;

pub struct Console<R = BufReader<Stdin>> {
    lines: LinesStream<R>,
    shutdown: CancellationToken,
}

impl Console {
    pub fn stdin(shutdown: CancellationToken) -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), shutdown)
    }
}

impl<R: AsyncBufRead + Unpin + Send> Console<R> {
    /// Prompts fail with [Interrupted] once `shutdown` is cancelled.
    pub fn new(reader: R, shutdown: CancellationToken) -> Self {
        Self {
            lines: LinesStream::new(reader.lines()),
            shutdown,
        }
    }

    /// Reads the next line. Cancel safe, so it can be raced against ticks.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.next().await.transpose()?)
    }

    pub fn prompt_marker(&self) {
        print!("> ");
        let _ = std::io::stdout().flush();
    }

    async fn answer(&mut self) -> Result<Option<String>> {
        let shutdown = self.shutdown.clone();
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => Err(Interrupted.into()),
            line = self.next_line() => line,
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> Prompter for Console<R> {
    async fn ask(&mut self, question: &str) -> Result<Option<String>> {
        print!("{} ", Colour::Cyan.paint(question));
        std::io::stdout().flush()?;
        self.answer().await
    }

    async fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(&format!("{question} [y/N]")).await?;
        Ok(matches!(
            answer.map(|v| v.trim().to_lowercase()).as_deref(),
            Some("y" | "yes")
        ))
    }

    fn alert(&mut self, message: &str) {
        println!("{}", Colour::Yellow.bold().paint(message));
    }
}
