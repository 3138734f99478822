//! Line-oriented interactive front end over a [`Session`].

use crate::asset::AssetLoader;
use crate::remix::{RemixBackend, DEFAULT_DOWNLOAD_NAME};
use crate::session::{ErrorDetail, Session, Slot};
use crate::view::SessionView;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const HELP: &str = "\
Commands:
  model <path>       load the subject image
  product <path>     load the product image
  clear model|product
  scenario [text]    describe the interaction (empty clears it)
  generate           create the ad image
  download [path]    save the image (default remix-ad-studio.png)
  reset              start a new project
  status             show the current state
  help               show this help
  quit               exit";

/// One user action typed at the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load a file into a slot.
    Load(Slot, PathBuf),
    /// Empty a slot.
    Clear(Slot),
    /// Replace the scenario text.
    Scenario(String),
    /// Submit the session.
    Generate,
    /// Save the generated image.
    Download(Option<PathBuf>),
    /// Reset the session.
    Reset,
    /// Print the current view.
    Status,
    /// Print the command list.
    Help,
    /// Leave the console.
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map(|(v, r)| (v, r.trim()))
            .unwrap_or((line, ""));

        let path = |what: &str| {
            if rest.is_empty() {
                Err(format!("usage: {what} <path>"))
            } else {
                Ok(PathBuf::from(rest))
            }
        };

        match verb.to_lowercase().as_str() {
            "model" => Ok(Self::Load(Slot::Model, path("model")?)),
            "product" => Ok(Self::Load(Slot::Product, path("product")?)),
            "clear" => match rest.to_lowercase().as_str() {
                "model" => Ok(Self::Clear(Slot::Model)),
                "product" => Ok(Self::Clear(Slot::Product)),
                _ => Err("usage: clear model|product".into()),
            },
            "scenario" => Ok(Self::Scenario(rest.to_string())),
            "generate" | "submit" => Ok(Self::Generate),
            "download" | "save" => Ok(Self::Download(
                (!rest.is_empty()).then(|| PathBuf::from(rest)),
            )),
            "reset" => Ok(Self::Reset),
            "status" | "" => Ok(Self::Status),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command `{other}`; try `help`")),
        }
    }
}

/// Whether the console keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// Stop.
    Quit,
}

/// Drives a session from typed commands.
pub struct Console<B> {
    session: Session<B>,
    loader: AssetLoader,
}

impl<B: RemixBackend> Console<B> {
    /// Creates a console over `session`, loading files with `loader`.
    pub fn new(session: Session<B>, loader: AssetLoader) -> Self {
        Self { session, loader }
    }

    /// The session being driven.
    pub fn session(&self) -> &Session<B> {
        &self.session
    }

    /// Runs one command, returning the text to show and whether to continue.
    pub async fn execute(&mut self, command: Command) -> (Flow, String) {
        let out = match command {
            Command::Load(slot, path) => match self.loader.load(&path).await {
                Ok(asset) => {
                    let msg = format!("{} loaded: {}", slot.label(), asset.name());
                    self.session.select(slot, asset);
                    msg
                }
                // Read failures are shown but leave the session untouched.
                Err(err) => format!("Error: {}", ErrorDetail::from(&err)),
            },
            Command::Clear(slot) => {
                self.session.clear(slot);
                format!("{} cleared", slot.label())
            }
            Command::Scenario(text) => {
                let msg = if text.is_empty() {
                    "Scenario cleared".to_string()
                } else {
                    "Scenario set".to_string()
                };
                self.session.set_scenario(text);
                msg
            }
            Command::Generate => {
                if !self.session.can_submit() {
                    "Load both a model and a product image first.".to_string()
                } else {
                    self.session.submit().await;
                    SessionView::of(&self.session).to_string()
                }
            }
            Command::Download(path) => self.download(path).await,
            Command::Reset => {
                self.session.reset();
                SessionView::of(&self.session).to_string()
            }
            Command::Status => SessionView::of(&self.session).to_string(),
            Command::Help => HELP.to_string(),
            Command::Quit => return (Flow::Quit, String::new()),
        };
        (Flow::Continue, out)
    }

    async fn download(&self, path: Option<PathBuf>) -> String {
        let Some(result) = self.session.result() else {
            return "Nothing to download yet.".to_string();
        };
        let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_NAME));
        let written = match result.to_bytes() {
            Ok(bytes) => tokio::fs::write(&path, &bytes).await.map(|_| bytes.len()),
            Err(err) => return format!("Error: {}", ErrorDetail::from(&err)),
        };
        match written {
            Ok(len) => format!("Saved {} ({len} bytes)", path.display()),
            Err(err) => format!("Error: could not write {}: {err}", path.display()),
        }
    }

    /// Reads commands from `input` until `quit` or end of input.
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        output.write_all(b"> ").await?;
        output.flush().await?;

        while let Some(line) = lines.next_line().await? {
            let text = match line.parse::<Command>() {
                Ok(Command::Generate) if self.session.can_submit() => {
                    output.write_all(b"Remixing Assets...\n").await?;
                    output.flush().await?;
                    self.execute(Command::Generate).await.1
                }
                Ok(command) => match self.execute(command).await {
                    (Flow::Quit, _) => break,
                    (Flow::Continue, text) => text,
                },
                Err(msg) => msg,
            };
            output.write_all(text.trim_end().as_bytes()).await?;
            output.write_all(b"\n> ").await?;
            output.flush().await?;
        }
        output.write_all(b"\n").await?;
        output.flush().await
    }
}
