//! Route announcer: the sole writer of the command channel.
//!
//! # Responsibilities
//! - Render one command per transition
//! - Write the whole line and flush before returning
//! - Surface write failures to the caller (they are fatal)

use std::io;

use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::bgp::command::{RouteAction, RouteCommand};
use crate::bgp::route::RouteSpec;
use crate::config::schema::ChannelConfig;
use crate::observability::metrics;

/// Boxed command channel used by the binary (stdout or a named pipe).
pub type CommandChannel = Box<dyn AsyncWrite + Unpin + Send>;

/// Errors writing to the command channel.
#[derive(Debug, Error)]
pub enum AnnounceError {
    #[error("failed to write `{command}` to command channel: {source}")]
    Write {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// Writes route commands to the speaker's control channel.
#[derive(Debug)]
pub struct RouteAnnouncer<W> {
    channel: W,
    commands_sent: u64,
}

impl<W> RouteAnnouncer<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(channel: W) -> Self {
        Self {
            channel,
            commands_sent: 0,
        }
    }

    /// Tell the speaker to start advertising `route`.
    pub async fn announce(&mut self, route: &RouteSpec) -> Result<(), AnnounceError> {
        self.send(RouteAction::Announce, route).await
    }

    /// Tell the speaker to stop advertising `route`.
    pub async fn withdraw(&mut self, route: &RouteSpec) -> Result<(), AnnounceError> {
        self.send(RouteAction::Withdraw, route).await
    }

    pub async fn send(&mut self, action: RouteAction, route: &RouteSpec) -> Result<(), AnnounceError> {
        let command = RouteCommand::new(action, route);
        let line = command.to_line();

        let written = async {
            self.channel.write_all(line.as_bytes()).await?;
            self.channel.flush().await
        }
        .await;

        if let Err(source) = written {
            return Err(AnnounceError::Write {
                command: command.to_string(),
                source,
            });
        }

        self.commands_sent += 1;
        metrics::record_command(action);
        tracing::info!(route = %route, action = %action, "Route command sent");
        Ok(())
    }

    /// Number of commands successfully written so far.
    pub fn commands_sent(&self) -> u64 {
        self.commands_sent
    }

    pub fn get_ref(&self) -> &W {
        &self.channel
    }

    /// Release the channel.
    pub fn into_inner(self) -> W {
        self.channel
    }
}

/// Open the configured command channel.
pub async fn open_channel(config: &ChannelConfig) -> io::Result<CommandChannel> {
    match config {
        ChannelConfig::Stdout => Ok(Box::new(tokio::io::stdout())),
        ChannelConfig::Pipe(path) => {
            let file = tokio::fs::OpenOptions::new()
                .append(true)
                .open(path)
                .await?;
            tracing::info!(path = ?path, "Opened command pipe");
            Ok(Box::new(file))
        }
    }
}
