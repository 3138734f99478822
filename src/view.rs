//! What the user sees for a given session.

use crate::remix::DEFAULT_DOWNLOAD_NAME;
use crate::session::{Session, SessionState, Slot};
use serde::Serialize;
use std::fmt;

/// Display state of one asset slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotView {
    /// Slot label ("The Model" / "The Product").
    pub label: &'static str,
    /// Hint shown under an empty slot.
    pub hint: &'static str,
    /// File name of the loaded asset.
    pub file: Option<String>,
    /// Preview reference of the loaded asset.
    pub preview: Option<String>,
}

/// A read-only snapshot of everything the front end renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    /// State name: idle, generating, success or error.
    pub state: &'static str,
    /// Model slot.
    pub model: SlotView,
    /// Product slot.
    pub product: SlotView,
    /// Scenario text as typed.
    pub scenario: String,
    /// Whether the submit action responds.
    pub submit_enabled: bool,
    /// Label on the submit action.
    pub submit_label: &'static str,
    /// The reset action is only offered after a success.
    pub reset_visible: bool,
    /// Main heading of the output panel.
    pub headline: &'static str,
    /// Secondary text of the output panel.
    pub detail: Option<String>,
    /// Error message, when the last attempt failed.
    pub error: Option<String>,
    /// Suggested file name for the download action, when there is an image.
    pub download_name: Option<&'static str>,
}

impl SessionView {
    /// Captures the current state of `session`.
    pub fn of<B>(session: &Session<B>) -> Self {
        let state = session.state();
        let (headline, detail) = match state {
            SessionState::Idle => (
                "Ready to Create",
                Some(
                    "Load your assets and describe the interaction to generate a professional ad."
                        .to_string(),
                ),
            ),
            SessionState::Generating => (
                "Processing Assets",
                Some("Compositing the scene with depth of field...".to_string()),
            ),
            SessionState::Success(result) => (
                "Studio Output",
                result
                    .metadata
                    .duration_ms
                    .map(|ms| format!("Generated in {ms}ms")),
            ),
            SessionState::Error(_) => ("Generation Failed", None),
        };

        Self {
            state: state.name(),
            model: slot_view(session, Slot::Model),
            product: slot_view(session, Slot::Product),
            scenario: session.scenario().to_string(),
            submit_enabled: session.can_submit(),
            submit_label: if state.is_generating() {
                "Remixing Assets..."
            } else {
                "Generate Ad"
            },
            reset_visible: matches!(state, SessionState::Success(_)),
            headline,
            detail,
            error: session.error().map(|e| e.message.clone()),
            download_name: session.result().map(|_| DEFAULT_DOWNLOAD_NAME),
        }
    }
}

fn slot_view<B>(session: &Session<B>, slot: Slot) -> SlotView {
    let asset = session.asset(slot);
    SlotView {
        label: slot.label(),
        hint: match slot {
            Slot::Model => "AI Twin / Human subject",
            Slot::Product => "Item to be held or applied",
        },
        file: asset.map(|a| a.name().to_string()),
        preview: asset.map(|a| a.preview_reference().to_string()),
    }
}

impl fmt::Display for SlotView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{:<12} {}", self.label, file),
            None => write!(f, "{:<12} (empty - {})", self.label, self.hint),
        }
    }
}

impl fmt::Display for SessionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.model)?;
        writeln!(f, "{}", self.product)?;
        if !self.scenario.is_empty() {
            writeln!(f, "{:<12} {}", "Scenario", self.scenario)?;
        }
        writeln!(
            f,
            "[{}]{}",
            self.submit_label,
            if self.submit_enabled { "" } else { " (unavailable)" }
        )?;
        writeln!(f)?;
        writeln!(f, "== {} ==", self.headline)?;
        if let Some(detail) = &self.detail {
            writeln!(f, "{detail}")?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "Error: {error}")?;
        }
        if let Some(name) = self.download_name {
            writeln!(f, "Download available as {name}")?;
        }
        if self.reset_visible {
            writeln!(f, "Start a new project with `reset`.")?;
        }
        Ok(())
    }
}
