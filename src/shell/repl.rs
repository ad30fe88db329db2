//! Line-oriented command loop
//!
//! Each input line is split on whitespace and parsed with clap, so `target`
//! accepts the same `--username`/`--password`/`--skip-ssl-validation` flags as
//! the command line. Every command yields text; nothing here ends the process
//! except `exit`/`quit` or end of input.

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::error::Result;

use super::ConfigCommand;

/// Prompt printed before each line is read
pub const PROMPT: &str = "dataflow:>";

#[derive(Parser, Debug)]
#[command(name = "dataflow", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

/// Commands understood by the interactive shell
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Connect to a Data Flow server
    Target {
        /// Server URI
        uri: String,

        /// Username for basic authentication
        #[arg(long)]
        username: Option<String>,

        /// Password for basic authentication
        #[arg(long)]
        password: Option<String>,

        /// Accept any server certificate (unsafe)
        #[arg(long)]
        skip_ssl_validation: bool,
    },

    /// Show the current target and its capabilities
    Info,

    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}

/// What a single input line produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Output(String),
    Exit,
    Empty,
}

impl ShellCommand {
    /// Parse one input line; help and usage errors come back as `Err(text)`
    pub fn parse_line(line: &str) -> std::result::Result<Option<Self>, String> {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return Ok(None);
        }
        ShellLine::try_parse_from(words)
            .map(|parsed| Some(parsed.command))
            .map_err(|e| e.render().to_string())
    }
}

/// Run one input line against the command
pub async fn dispatch(command: &ConfigCommand, line: &str) -> Dispatch {
    match ShellCommand::parse_line(line) {
        Ok(None) => Dispatch::Empty,
        Ok(Some(ShellCommand::Target {
            uri,
            username,
            password,
            skip_ssl_validation,
        })) => Dispatch::Output(
            command
                .target(
                    &uri,
                    username.as_deref(),
                    password.as_deref(),
                    skip_ssl_validation,
                )
                .await,
        ),
        Ok(Some(ShellCommand::Info)) => Dispatch::Output(command.info().await),
        Ok(Some(ShellCommand::Exit)) => Dispatch::Exit,
        Err(text) => Dispatch::Output(text.trim_end().to_string()),
    }
}

/// Read lines until `exit` or end of input, writing each result
pub async fn run<R, W>(command: &ConfigCommand, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    loop {
        writer.write_all(PROMPT.as_bytes()).await?;
        writer.flush().await?;

        let Some(line) = lines.next_line().await? else {
            debug!("End of input");
            break;
        };

        match dispatch(command, &line).await {
            Dispatch::Output(text) => {
                writer.write_all(text.as_bytes()).await?;
                writer.write_all(b"\n").await?;
            }
            Dispatch::Empty => {}
            Dispatch::Exit => break,
        }
    }

    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
