//! The upload → request → render state machine for one user session.
//!
//! ```text
//! Idle ──submit──▶ Generating ──ok──▶ Success(result)
//!                      │    ▲             │
//!                      err  └──submit─────┤
//!                      ▼                  │
//!                 Error(detail) ──submit──┘ (back to Generating)
//!
//! reset: any state ──▶ Idle
//! ```
//!
//! Slot edits and scenario edits never change the state.

use crate::asset::ImageAsset;
use crate::error::{ErrorKind, RemixError, Result, GENERIC_FAILURE_MESSAGE};
use crate::remix::{RemixBackend, RemixRequest, RemixResult};
use std::fmt;

/// Which of the two asset slots an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The subject ("AI twin") image.
    Model,
    /// The product image.
    Product,
}

impl Slot {
    /// Label shown next to the slot.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Model => "The Model",
            Self::Product => "The Product",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model => f.write_str("model"),
            Self::Product => f.write_str("product"),
        }
    }
}

/// A failure as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    /// Which part of the taxonomy the failure belongs to.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
}

impl From<&RemixError> for ErrorDetail {
    fn from(err: &RemixError) -> Self {
        let message = match err.detail() {
            Some(text) if text.trim().is_empty() => GENERIC_FAILURE_MESSAGE.to_string(),
            _ => err.to_string(),
        };
        Self {
            kind: err.kind(),
            message,
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Where the session currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing submitted yet, or just reset.
    #[default]
    Idle,
    /// A request is in flight.
    Generating,
    /// The last request produced an image.
    Success(RemixResult),
    /// The last request failed.
    Error(ErrorDetail),
}

impl SessionState {
    /// Short lowercase name, used in logs and JSON output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Generating => "generating",
            Self::Success(_) => "success",
            Self::Error(_) => "error",
        }
    }

    /// Returns true while a request is in flight.
    pub fn is_generating(&self) -> bool {
        matches!(self, Self::Generating)
    }
}

/// Identifies one submission so late completions can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitTicket(u64);

/// One user's assets, scenario and view state.
pub struct Session<B> {
    backend: B,
    model: Option<ImageAsset>,
    product: Option<ImageAsset>,
    scenario: String,
    state: SessionState,
    submissions: u64,
    in_flight: Option<SubmitTicket>,
}

impl<B> Session<B> {
    /// Creates an idle session with empty slots.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            model: None,
            product: None,
            scenario: String::new(),
            state: SessionState::Idle,
            submissions: 0,
            in_flight: None,
        }
    }

    /// The backend requests are sent to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Asset in the model slot, if any.
    pub fn model_asset(&self) -> Option<&ImageAsset> {
        self.model.as_ref()
    }

    /// Asset in the product slot, if any.
    pub fn product_asset(&self) -> Option<&ImageAsset> {
        self.product.as_ref()
    }

    /// Asset in `slot`, if any.
    pub fn asset(&self, slot: Slot) -> Option<&ImageAsset> {
        match slot {
            Slot::Model => self.model_asset(),
            Slot::Product => self.product_asset(),
        }
    }

    /// Current scenario text (may be empty).
    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    /// The generated image, when the state is `Success`.
    pub fn result(&self) -> Option<&RemixResult> {
        match &self.state {
            SessionState::Success(result) => Some(result),
            _ => None,
        }
    }

    /// The failure, when the state is `Error`.
    pub fn error(&self) -> Option<&ErrorDetail> {
        match &self.state {
            SessionState::Error(detail) => Some(detail),
            _ => None,
        }
    }

    /// Puts `asset` in the model slot, dropping any previous one.
    pub fn select_model_asset(&mut self, asset: ImageAsset) {
        self.select(Slot::Model, asset);
    }

    /// Puts `asset` in the product slot, dropping any previous one.
    pub fn select_product_asset(&mut self, asset: ImageAsset) {
        self.select(Slot::Product, asset);
    }

    /// Puts `asset` in `slot`, dropping any previous one.
    pub fn select(&mut self, slot: Slot, asset: ImageAsset) {
        tracing::debug!(%slot, file = asset.name(), "asset selected");
        // The replaced asset drops here, releasing its preview.
        *self.slot_mut(slot) = Some(asset);
    }

    /// Empties the model slot.
    pub fn clear_model_asset(&mut self) {
        self.clear(Slot::Model);
    }

    /// Empties the product slot.
    pub fn clear_product_asset(&mut self) {
        self.clear(Slot::Product);
    }

    /// Empties `slot`.
    pub fn clear(&mut self, slot: Slot) {
        if self.slot_mut(slot).take().is_some() {
            tracing::debug!(%slot, "asset cleared");
        }
    }

    /// Replaces the scenario text.
    pub fn set_scenario(&mut self, text: impl Into<String>) {
        self.scenario = text.into();
    }

    /// True when both slots are filled and nothing is in flight.
    pub fn can_submit(&self) -> bool {
        self.model.is_some() && self.product.is_some() && !self.state.is_generating()
    }

    /// Enters `Generating` and returns the request to send.
    ///
    /// Returns `None`, changing nothing, when [`can_submit`](Self::can_submit)
    /// is false. The request owns copies of both payloads, so later slot edits
    /// do not affect it.
    pub fn begin_submit(&mut self) -> Option<(SubmitTicket, RemixRequest)> {
        let (model, product) = match (&self.model, &self.product) {
            (Some(m), Some(p)) if !self.state.is_generating() => (m, p),
            _ => return None,
        };
        let request = RemixRequest::build(model, product, &self.scenario);

        self.submissions += 1;
        let ticket = SubmitTicket(self.submissions);
        self.in_flight = Some(ticket);
        self.state = SessionState::Generating;
        tracing::info!(
            model = model.name(),
            product = product.name(),
            "generating remix"
        );
        Some((ticket, request))
    }

    /// Applies the outcome of the submission identified by `ticket`.
    ///
    /// Returns false, changing nothing, if the ticket is not the one in
    /// flight (the session was reset after it was issued).
    pub fn finish_submit(&mut self, ticket: SubmitTicket, outcome: Result<RemixResult>) -> bool {
        if self.in_flight != Some(ticket) {
            tracing::debug!(?ticket, "discarding stale remix completion");
            return false;
        }
        self.in_flight = None;
        self.state = match outcome {
            Ok(result) => {
                tracing::info!(duration_ms = ?result.metadata.duration_ms, "remix generated");
                SessionState::Success(result)
            }
            Err(err) => {
                tracing::warn!("remix generation failed: {err}");
                SessionState::Error(ErrorDetail::from(&err))
            }
        };
        true
    }

    /// Clears both slots, the scenario and any result or error; back to `Idle`.
    pub fn reset(&mut self) {
        self.model = None;
        self.product = None;
        self.scenario.clear();
        self.in_flight = None;
        self.state = SessionState::Idle;
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<ImageAsset> {
        match slot {
            Slot::Model => &mut self.model,
            Slot::Product => &mut self.product,
        }
    }
}

impl<B: RemixBackend> Session<B> {
    /// Submits the current assets and waits for the outcome.
    ///
    /// A no-op returning false unless both slots are filled and nothing is in
    /// flight. Otherwise the session ends in `Success` or `Error`.
    pub async fn submit(&mut self) -> bool {
        let Some((ticket, request)) = self.begin_submit() else {
            return false;
        };
        let outcome = self.backend.generate(&request).await;
        self.finish_submit(ticket, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetLoader;
    use crate::remix::GenerationMetadata;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies with a queued outcome and records every request.
    #[derive(Default)]
    struct StubBackend {
        replies: Mutex<Vec<Result<RemixResult>>>,
        seen: Mutex<Vec<RemixRequest>>,
    }

    impl StubBackend {
        fn replying(reply: Result<RemixResult>) -> Self {
            Self {
                replies: Mutex::new(vec![reply]),
                seen: Mutex::default(),
            }
        }
    }

    #[async_trait]
    impl RemixBackend for StubBackend {
        async fn generate(&self, request: &RemixRequest) -> Result<RemixResult> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(RemixError::EmptyResponse))
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn image(payload: &str) -> RemixResult {
        RemixResult::from_base64(payload, GenerationMetadata::default())
    }

    fn loaded(loader: &AssetLoader, session: &mut Session<StubBackend>) {
        session.select_model_asset(loader.from_bytes("a.jpg", vec![1]).unwrap());
        session.select_product_asset(loader.from_bytes("b.png", vec![2]).unwrap());
    }

    #[tokio::test]
    async fn test_submit_requires_both_slots() {
        let loader = AssetLoader::new();
        let mut session = Session::new(StubBackend::replying(Ok(image("QUJD"))));

        assert!(!session.submit().await);
        session.select_model_asset(loader.from_bytes("a.jpg", vec![1]).unwrap());
        assert!(!session.submit().await);
        assert_eq!(session.state(), &SessionState::Idle);
        assert!(session.backend().seen.lock().unwrap().is_empty());

        session.select_product_asset(loader.from_bytes("b.png", vec![2]).unwrap());
        assert!(session.submit().await);
        assert_eq!(session.result().unwrap().as_data_url(), "data:image/png;base64,QUJD");
    }

    #[test]
    fn test_begin_submit_refused_while_generating() {
        let loader = AssetLoader::new();
        let mut session = Session::new(StubBackend::default());
        loaded(&loader, &mut session);

        let (ticket, _) = session.begin_submit().unwrap();
        assert!(session.state().is_generating());
        assert!(!session.can_submit());
        assert!(session.begin_submit().is_none());

        assert!(session.finish_submit(ticket, Ok(image("QUJD"))));
        assert!(session.can_submit());
    }

    #[tokio::test]
    async fn test_failure_moves_to_error_with_message() {
        let loader = AssetLoader::new();
        let mut session = Session::new(StubBackend::replying(Err(RemixError::EmptyResponse)));
        loaded(&loader, &mut session);

        assert!(session.submit().await);
        let detail = session.error().unwrap();
        assert_eq!(detail.kind, ErrorKind::EmptyResponse);
        assert_eq!(detail.message, "No image data found in response.");
        assert!(session.result().is_none());
    }

    #[tokio::test]
    async fn test_resubmit_after_error_clears_it() {
        let loader = AssetLoader::new();
        let backend = StubBackend::default();
        // Popped from the back: first call fails, second succeeds.
        *backend.replies.lock().unwrap() = vec![
            Ok(image("QUJD")),
            Err(RemixError::Config("no key".into())),
        ];
        let mut session = Session::new(backend);
        loaded(&loader, &mut session);

        session.submit().await;
        assert_eq!(session.error().unwrap().kind, ErrorKind::Configuration);

        let (ticket, _) = session.begin_submit().unwrap();
        assert_eq!(session.state(), &SessionState::Generating);
        assert!(session.error().is_none());
        let outcome = session.backend().generate(&session_request(&session)).await;
        session.finish_submit(ticket, outcome);
        assert!(session.result().is_some());
    }

    fn session_request(session: &Session<StubBackend>) -> RemixRequest {
        RemixRequest::build(
            session.model_asset().unwrap(),
            session.product_asset().unwrap(),
            session.scenario(),
        )
    }

    #[test]
    fn test_empty_error_message_gets_fallback() {
        let detail = ErrorDetail::from(&RemixError::Config(String::new()));
        assert_eq!(detail.message, GENERIC_FAILURE_MESSAGE);
        assert_eq!(detail.kind, ErrorKind::Configuration);

        let detail = ErrorDetail::from(&RemixError::Api {
            status: 500,
            message: "  ".into(),
        });
        assert_eq!(detail.message, GENERIC_FAILURE_MESSAGE);
        assert_eq!(detail.kind, ErrorKind::Transport);

        let detail = ErrorDetail::from(&RemixError::Api {
            status: 500,
            message: "boom".into(),
        });
        assert_eq!(detail.message, "API error: 500 - boom");
        assert_eq!(detail.kind, ErrorKind::Transport);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let loader = AssetLoader::new();
        let mut session = Session::new(StubBackend::default());
        loaded(&loader, &mut session);
        session.set_scenario("holding it");
        let (ticket, _) = session.begin_submit().unwrap();
        session.finish_submit(ticket, Ok(image("QUJD")));

        for _ in 0..2 {
            session.reset();
            assert_eq!(session.state(), &SessionState::Idle);
            assert!(session.model_asset().is_none());
            assert!(session.product_asset().is_none());
            assert_eq!(session.scenario(), "");
            assert!(session.result().is_none());
            assert!(session.error().is_none());
        }
        assert_eq!(loader.previews().live_count(), 0);
    }

    #[test]
    fn test_stale_completion_after_reset_is_discarded() {
        let loader = AssetLoader::new();
        let mut session = Session::new(StubBackend::default());
        loaded(&loader, &mut session);

        let (old, _) = session.begin_submit().unwrap();
        session.reset();
        assert!(!session.finish_submit(old, Ok(image("QUJD"))));
        assert_eq!(session.state(), &SessionState::Idle);

        loaded(&loader, &mut session);
        let (new, _) = session.begin_submit().unwrap();
        assert_ne!(old, new);
        assert!(!session.finish_submit(old, Err(RemixError::EmptyResponse)));
        assert!(session.state().is_generating());
        assert!(session.finish_submit(new, Ok(image("QUJD"))));
    }

    #[test]
    fn test_slot_edits_do_not_change_state() {
        let loader = AssetLoader::new();
        let mut session = Session::new(StubBackend::default());
        loaded(&loader, &mut session);
        let (ticket, request) = session.begin_submit().unwrap();

        session.clear_model_asset();
        session.set_scenario("something else");
        assert!(session.state().is_generating());
        // The in-flight request kept its own copy.
        assert_eq!(request.model_image.data, "AQ==");

        session.finish_submit(ticket, Ok(image("QUJD")));
        assert!(!session.can_submit());
        assert!(matches!(session.state(), SessionState::Success(_)));
    }

    #[test]
    fn test_replace_and_clear_release_previews() {
        let loader = AssetLoader::new();
        let mut session = Session::new(StubBackend::default());

        let first = loader.from_bytes("first.png", vec![1]).unwrap();
        let first_ref = first.preview_reference().to_string();
        session.select_model_asset(first);
        session.clear_model_asset();
        assert!(!loader.previews().is_live(&first_ref));

        let second = loader.from_bytes("second.png", vec![2]).unwrap();
        let second_ref = second.preview_reference().to_string();
        session.select_model_asset(second);
        assert_eq!(session.model_asset().unwrap().name(), "second.png");
        assert_eq!(loader.previews().live_count(), 1);

        let third = loader.from_bytes("third.png", vec![3]).unwrap();
        session.select(Slot::Model, third);
        assert!(!loader.previews().is_live(&second_ref));
        assert_eq!(session.asset(Slot::Model).unwrap().name(), "third.png");
        assert_eq!(loader.previews().live_count(), 1);
    }

    #[test]
    fn test_slot_labels() {
        assert_eq!(Slot::Model.label(), "The Model");
        assert_eq!(Slot::Product.to_string(), "product");
    }
}
