//! Session lifecycle manager
//!
//! Owns the single live session per manager: creation on a successful
//! initialize, wholesale replacement on reset, and the accumulated
//! transcript. Generation issues exactly one backend request per call,
//! never retries, and never queues — overlapping calls are independent
//! and serialization is the caller's concern.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use vault_domain::{
    GenerationOptions, Message, ModelAvailability, SessionConfig, Transcript, UnavailableReason,
    validate_prompt,
};

use crate::ports::backend::{BackendSession, ModelBackend};
use crate::ports::notifier::{ChatNotifier, NoNotifier};
use crate::typewriter;

/// Errors from an initialization or reset attempt.
///
/// Fatal to that attempt; the caller may not generate until a later
/// initialize or reset succeeds.
#[derive(Error, Debug)]
pub enum InitError {
    #[error("device not eligible")]
    DeviceNotEligible,

    #[error("model feature not enabled")]
    FeatureNotEnabled,

    #[error("model not ready")]
    ModelNotReady,

    #[error("model unavailable: {0}")]
    Other(String),

    #[error("failed to open session: {0}")]
    SessionCreation(String),
}

impl From<UnavailableReason> for InitError {
    fn from(reason: UnavailableReason) -> Self {
        match reason {
            UnavailableReason::DeviceNotEligible => InitError::DeviceNotEligible,
            UnavailableReason::FeatureNotEnabled => InitError::FeatureNotEnabled,
            UnavailableReason::ModelNotReady => InitError::ModelNotReady,
            UnavailableReason::Other(detail) => InitError::Other(detail),
        }
    }
}

/// Errors from a single generation attempt.
///
/// Recoverable; the caller may retry by issuing another `generate`.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("session is not initialized; call initialize() first")]
    NotInitialized,

    #[error("prompt must not be empty")]
    EmptyPrompt,

    #[error("backend failure: {0}")]
    Backend(String),
}

/// One live session: the backend handle plus its transcript.
struct LiveSession {
    session: Arc<dyn BackendSession>,
    transcript: Transcript,
    options: GenerationOptions,
}

/// Mutable manager state, guarded by one mutex.
///
/// `epoch` increments on every session replacement; an in-flight
/// generation captures the epoch at issue time and only appends to the
/// transcript if it is unchanged at completion.
struct ManagerState {
    live: Option<LiveSession>,
    last_config: SessionConfig,
    epoch: u64,
}

/// Owns the lifecycle of a single conversational session.
pub struct SessionManager {
    backend: Arc<dyn ModelBackend>,
    notifier: Arc<dyn ChatNotifier>,
    state: Mutex<ManagerState>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self::with_notifier(backend, Arc::new(NoNotifier))
    }

    pub fn with_notifier(backend: Arc<dyn ModelBackend>, notifier: Arc<dyn ChatNotifier>) -> Self {
        Self {
            backend,
            notifier,
            state: Mutex::new(ManagerState {
                live: None,
                last_config: SessionConfig::default(),
                epoch: 0,
            }),
        }
    }

    /// Check availability and, if the model is usable, create a session
    /// bound to `config`.
    ///
    /// On failure the manager stays (or becomes) not ready and the
    /// classified reason is returned.
    pub async fn initialize(&self, config: SessionConfig) -> Result<(), InitError> {
        let session = self.create_session(&config).await?;

        let mut state = self.state.lock().await;
        state.epoch += 1;
        state.live = Some(LiveSession {
            session,
            transcript: session_preamble(&config),
            options: config.options.clone(),
        });
        state.last_config = config;
        info!("session initialized (epoch {})", state.epoch);
        Ok(())
    }

    /// Discard the current session (if any) and create a fresh one with
    /// an empty transcript, using the given or previously used config.
    ///
    /// The new session is built before the old one is dropped, so no
    /// caller ever observes a half-replaced session; on failure the
    /// prior session (if any) remains live.
    pub async fn reset(&self, config: Option<SessionConfig>) -> Result<(), InitError> {
        let config = match config {
            Some(config) => config,
            None => self.state.lock().await.last_config.clone(),
        };
        debug!("resetting session");
        self.initialize(config).await
    }

    /// Snapshot of the live session's transcript, or `None` before the
    /// first successful initialize.
    pub async fn transcript(&self) -> Option<Transcript> {
        let state = self.state.lock().await;
        state.live.as_ref().map(|live| live.transcript.clone())
    }

    /// Submit a prompt to the active session and wait for the full
    /// response text.
    ///
    /// Fails fast with [`GenerationError::NotInitialized`] before any
    /// backend contact if no session is live, and with
    /// [`GenerationError::EmptyPrompt`] for empty or whitespace-only
    /// prompts. A successful generation appends a prompt/response turn
    /// to the transcript, with a Tool-role entry for each tool
    /// invocation the backend resolved — unless the session was
    /// replaced while the request was in flight, in which case the
    /// stale completion still resolves to its caller but leaves the
    /// new transcript untouched.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let prompt = validate_prompt(prompt).map_err(|_| GenerationError::EmptyPrompt)?;

        // Snapshot what the request needs, then release the lock: it is
        // never held across the backend await.
        let (session, options, epoch) = {
            let state = self.state.lock().await;
            let live = state.live.as_ref().ok_or(GenerationError::NotInitialized)?;
            (live.session.clone(), live.options.clone(), state.epoch)
        };

        self.notifier.on_loading(true);
        let result = session.respond(prompt, &options).await;
        self.notifier.on_loading(false);

        let turn = result.map_err(|e| {
            warn!("generation failed: {}", e);
            GenerationError::Backend(e.to_string())
        })?;

        let mut state = self.state.lock().await;
        if state.epoch == epoch {
            if let Some(live) = state.live.as_mut() {
                live.transcript.push(Message::user(prompt));
                for invocation in &turn.tool_invocations {
                    live.transcript.push(Message::tool(
                        invocation.name.clone(),
                        invocation.output.clone(),
                    ));
                }
                live.transcript.push(Message::assistant(turn.text.clone()));
            }
        } else {
            debug!("session was reset mid-flight; dropping transcript append");
        }
        drop(state);

        self.notifier.on_response(&turn.text);
        Ok(turn.text)
    }

    /// Generate, then replay the completed response through the
    /// typewriter for progressive display, forwarding each partial to
    /// the notifier. Returns the full text.
    pub async fn generate_streamed(
        &self,
        prompt: &str,
        tick: Duration,
    ) -> Result<String, GenerationError> {
        let text = self.generate(prompt).await?;

        let mut stream = typewriter::simulate(&text, tick);
        while let Some(partial) = stream.recv().await {
            self.notifier.on_stream_chunk(&partial);
        }
        self.notifier.on_stream_end();

        Ok(text)
    }

    async fn create_session(
        &self,
        config: &SessionConfig,
    ) -> Result<Arc<dyn BackendSession>, InitError> {
        match self.backend.availability().await {
            ModelAvailability::Available => {}
            ModelAvailability::Unavailable(reason) => {
                warn!("model unavailable: {}", reason);
                return Err(reason.into());
            }
        }

        self.backend
            .open_session(config)
            .await
            .map_err(|e| InitError::SessionCreation(e.to_string()))
    }
}

/// Transcript a fresh session starts with: the system instructions, or
/// nothing when they are blank.
fn session_preamble(config: &SessionConfig) -> Transcript {
    let mut transcript = Transcript::new();
    if !config.instructions.trim().is_empty() {
        transcript.push(Message::system(config.instructions.clone()));
    }
    transcript
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;
    use vault_domain::{ResponseTurn, Role, Tool, ToolCall, ToolDefinition, ToolError, ToolRegistry};

    use crate::ports::backend::BackendError;

    /// Backend stub with a scripted availability and canned replies.
    struct StubBackend {
        availability: ModelAvailability,
        request_count: Arc<AtomicUsize>,
        gate: Option<Arc<Notify>>,
    }

    impl StubBackend {
        fn available() -> Self {
            Self {
                availability: ModelAvailability::Available,
                request_count: Arc::new(AtomicUsize::new(0)),
                gate: None,
            }
        }

        fn unavailable(reason: UnavailableReason) -> Self {
            Self {
                availability: ModelAvailability::Unavailable(reason),
                request_count: Arc::new(AtomicUsize::new(0)),
                gate: None,
            }
        }

        /// Make every respond() wait until the gate is notified.
        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }
    }

    #[async_trait]
    impl ModelBackend for StubBackend {
        async fn availability(&self) -> ModelAvailability {
            self.availability.clone()
        }

        async fn open_session(
            &self,
            _config: &SessionConfig,
        ) -> Result<Arc<dyn BackendSession>, BackendError> {
            Ok(Arc::new(StubSession {
                request_count: self.request_count.clone(),
                gate: self.gate.clone(),
            }))
        }
    }

    struct StubSession {
        request_count: Arc<AtomicUsize>,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl BackendSession for StubSession {
        async fn respond(
            &self,
            prompt: &str,
            _options: &GenerationOptions,
        ) -> Result<ResponseTurn, BackendError> {
            self.request_count.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            Ok(ResponseTurn::from_text(format!("echo: {}", prompt)))
        }
    }

    #[tokio::test]
    async fn generate_before_initialize_fails_without_backend_contact() {
        let backend = Arc::new(StubBackend::available());
        let requests = backend.request_count.clone();
        let manager = SessionManager::new(backend);

        let result = manager.generate("hello").await;
        assert!(matches!(result, Err(GenerationError::NotInitialized)));
        assert_eq!(requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected_without_backend_contact() {
        let backend = Arc::new(StubBackend::available());
        let requests = backend.request_count.clone();
        let manager = SessionManager::new(backend);
        manager.initialize(SessionConfig::default()).await.unwrap();

        for prompt in ["", "   ", "\n\t"] {
            let result = manager.generate(prompt).await;
            assert!(matches!(result, Err(GenerationError::EmptyPrompt)));
        }
        assert_eq!(requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn initialize_fails_when_model_unavailable() {
        let backend = Arc::new(StubBackend::unavailable(UnavailableReason::ModelNotReady));
        let manager = SessionManager::new(backend);

        let result = manager.initialize(SessionConfig::default()).await;
        assert!(matches!(result, Err(InitError::ModelNotReady)));
        assert!(manager.transcript().await.is_none());

        // Still not ready
        let result = manager.generate("hello").await;
        assert!(matches!(result, Err(GenerationError::NotInitialized)));
    }

    #[tokio::test]
    async fn unrecognized_unavailability_preserves_detail() {
        let backend = Arc::new(StubBackend::unavailable(UnavailableReason::Other(
            "weights missing".to_string(),
        )));
        let manager = SessionManager::new(backend);

        match manager.initialize(SessionConfig::default()).await {
            Err(InitError::Other(detail)) => assert_eq!(detail, "weights missing"),
            other => panic!("expected Other, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn successful_generation_appends_a_turn() {
        let manager = SessionManager::new(Arc::new(StubBackend::available()));
        manager.initialize(SessionConfig::default()).await.unwrap();

        let text = manager.generate("hi there").await.unwrap();
        assert_eq!(text, "echo: hi there");

        let transcript = manager.transcript().await.unwrap();
        assert_eq!(transcript.turns(), 1);
        let messages = transcript.messages();
        // System instructions, prompt, response
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].content, "hi there");
        assert_eq!(messages[2].content, "echo: hi there");
    }

    /// Backend whose session resolves a tool through the config's
    /// registry mid-respond and reports the invocation on the turn.
    struct ToolUsingBackend;

    #[async_trait]
    impl ModelBackend for ToolUsingBackend {
        async fn availability(&self) -> ModelAvailability {
            ModelAvailability::Available
        }

        async fn open_session(
            &self,
            config: &SessionConfig,
        ) -> Result<Arc<dyn BackendSession>, BackendError> {
            Ok(Arc::new(ToolUsingSession {
                tools: config.tools.clone(),
            }))
        }
    }

    struct ToolUsingSession {
        tools: ToolRegistry,
    }

    #[async_trait]
    impl BackendSession for ToolUsingSession {
        async fn respond(
            &self,
            _prompt: &str,
            _options: &GenerationOptions,
        ) -> Result<ResponseTurn, BackendError> {
            let call = ToolCall::new("current_date");
            let output = self
                .tools
                .dispatch(&call)
                .await
                .map_err(|e| BackendError::Tool(e.to_string()))?;
            Ok(
                ResponseTurn::from_text(format!("The answer uses: {}", output))
                    .with_tool_invocation("current_date", output),
            )
        }
    }

    struct FixedDateTool {
        definition: ToolDefinition,
    }

    impl FixedDateTool {
        fn new() -> Self {
            Self {
                definition: ToolDefinition::new("current_date", "Returns the current date"),
            }
        }
    }

    #[async_trait]
    impl Tool for FixedDateTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn invoke(&self, _call: &ToolCall) -> Result<String, ToolError> {
            Ok("Today's date is Friday".to_string())
        }
    }

    #[tokio::test]
    async fn tool_invocations_are_recorded_in_the_transcript() {
        let registry = ToolRegistry::new().register(Arc::new(FixedDateTool::new()));
        let config = SessionConfig::new("").with_tools(registry);
        let manager = SessionManager::new(Arc::new(ToolUsingBackend));
        manager.initialize(config).await.unwrap();

        let text = manager.generate("what day is it").await.unwrap();
        assert_eq!(text, "The answer uses: Today's date is Friday");

        let transcript = manager.transcript().await.unwrap();
        let messages = transcript.messages();
        // Prompt, the tool invocation it triggered, then the response
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Tool);
        assert_eq!(messages[1].tool_name.as_deref(), Some("current_date"));
        assert_eq!(messages[1].content, "Today's date is Friday");
        assert_eq!(messages[2].role, Role::Assistant);
    }

    #[tokio::test]
    async fn reset_clears_the_transcript() {
        let manager = SessionManager::new(Arc::new(StubBackend::available()));
        let config = SessionConfig::new("");
        manager.initialize(config.clone()).await.unwrap();

        manager.generate("one").await.unwrap();
        manager.generate("two").await.unwrap();
        assert_eq!(manager.transcript().await.unwrap().turns(), 2);

        manager.reset(None).await.unwrap();
        assert_eq!(manager.transcript().await.unwrap().turns(), 0);
    }

    #[tokio::test]
    async fn reset_before_initialize_is_safe() {
        let manager = SessionManager::new(Arc::new(StubBackend::available()));
        manager.reset(None).await.unwrap();
        assert!(manager.transcript().await.is_some());
    }

    #[tokio::test]
    async fn overlapping_generates_resolve_independently() {
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(StubBackend::available().gated(gate.clone()));
        let manager = Arc::new(SessionManager::new(backend));
        manager.initialize(SessionConfig::default()).await.unwrap();

        let m_a = manager.clone();
        let task_a = tokio::spawn(async move { m_a.generate("first").await });
        let m_b = manager.clone();
        let task_b = tokio::spawn(async move { m_b.generate("second").await });

        // Release B's request, then A's; each resolves to its own result.
        tokio::task::yield_now().await;
        gate.notify_one();
        gate.notify_one();

        let a = task_a.await.unwrap().unwrap();
        let b = task_b.await.unwrap().unwrap();
        assert_eq!(a, "echo: first");
        assert_eq!(b, "echo: second");
    }

    #[tokio::test]
    async fn stale_completion_does_not_append_to_new_transcript() {
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(StubBackend::available().gated(gate.clone()));
        let manager = Arc::new(SessionManager::new(backend));
        let config = SessionConfig::new("");
        manager.initialize(config.clone()).await.unwrap();

        let m = manager.clone();
        let in_flight = tokio::spawn(async move { m.generate("stale").await });
        tokio::task::yield_now().await;

        // Replace the session while the request is pending, then let the
        // pending request complete.
        manager.reset(Some(config)).await.unwrap();
        gate.notify_one();

        // The stale completion still resolves to its caller...
        let text = in_flight.await.unwrap().unwrap();
        assert_eq!(text, "echo: stale");

        // ...but the fresh transcript is untouched.
        assert_eq!(manager.transcript().await.unwrap().turns(), 0);
    }

    #[tokio::test]
    async fn notifier_observes_loading_and_stream_events() {
        use std::sync::Mutex as StdMutex;

        #[derive(Default)]
        struct RecordingNotifier {
            events: StdMutex<Vec<String>>,
        }

        impl ChatNotifier for RecordingNotifier {
            fn on_loading(&self, loading: bool) {
                self.events.lock().unwrap().push(format!("loading:{}", loading));
            }
            fn on_response(&self, text: &str) {
                self.events.lock().unwrap().push(format!("response:{}", text));
            }
            fn on_stream_chunk(&self, partial: &str) {
                self.events.lock().unwrap().push(format!("chunk:{}", partial));
            }
            fn on_stream_end(&self) {
                self.events.lock().unwrap().push("end".to_string());
            }
        }

        let notifier = Arc::new(RecordingNotifier::default());
        let manager =
            SessionManager::with_notifier(Arc::new(StubBackend::available()), notifier.clone());
        manager.initialize(SessionConfig::default()).await.unwrap();

        manager
            .generate_streamed("hi", Duration::from_millis(1))
            .await
            .unwrap();

        let events = notifier.events.lock().unwrap().clone();
        assert_eq!(events[0], "loading:true");
        assert_eq!(events[1], "loading:false");
        assert_eq!(events[2], "response:echo: hi");
        assert_eq!(events[3], "chunk:echo:");
        assert_eq!(events[4], "chunk:echo: hi");
        assert_eq!(events.last().unwrap(), "end");
    }
}
