//! The chat session controller.
//!
//! A submission moves the session from `Idle` to `Sending`, appends the user
//! turn immediately, and hands back a [`PendingCompletion`]. Dispatching that
//! token produces either assistant text or a failure; [`ChatSession::finish`]
//! turns both into a conversation turn and returns the session to `Idle`.
//! Failures never escape as errors: each becomes a visible assistant message.

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use crate::api::ChatRequest;
use crate::core::completion::{build_request, CompletionError, CompletionTransport};
use crate::core::config::PreferenceStore;
use crate::core::constants::{reference_links_block, RESPONSE_CITATIONS};
use crate::core::conversation::ConversationStore;
use crate::core::message::Message;
use crate::core::resolver::{resolve_model, CredentialSource, ResolveError, ResolvedModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Sending,
}

/// Why a submission was ignored before any state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EmptyInput,
    Busy,
}

/// How a failed turn is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Configuration,
    RateLimited,
    Transport,
    Malformed,
}

#[derive(Debug)]
pub enum Failure {
    Configuration(ResolveError),
    Completion(CompletionError),
}

impl Failure {
    pub fn kind(&self) -> FailureKind {
        match self {
            Failure::Configuration(_) => FailureKind::Configuration,
            Failure::Completion(CompletionError::RateLimited { .. }) => FailureKind::RateLimited,
            Failure::Completion(CompletionError::MalformedResponse(_)) => FailureKind::Malformed,
            Failure::Completion(CompletionError::Http { .. } | CompletionError::Network(_)) => {
                FailureKind::Transport
            }
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Configuration(err) => write!(f, "{err}"),
            Failure::Completion(err) => write!(f, "{err}"),
        }
    }
}

impl Error for Failure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Failure::Configuration(err) => Some(err),
            Failure::Completion(err) => Some(err),
        }
    }
}

/// Result of one completed submission.
#[derive(Debug)]
pub enum TurnOutcome {
    Replied(Message),
    Failed { kind: FailureKind, message: Message },
}

impl TurnOutcome {
    pub fn message(&self) -> &Message {
        match self {
            TurnOutcome::Replied(message) | TurnOutcome::Failed { message, .. } => message,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TurnOutcome::Failed { .. })
    }
}

/// An in-flight submission. Holding one means the session is `Sending`.
#[derive(Debug)]
pub struct PendingCompletion {
    target: Result<(ResolvedModel, ChatRequest), ResolveError>,
}

impl PendingCompletion {
    /// Model chosen for this request, if resolution succeeded.
    pub fn model(&self) -> Option<&ResolvedModel> {
        self.target.as_ref().ok().map(|(model, _)| model)
    }

    /// Performs the network call. Configuration failures return without any I/O.
    pub async fn dispatch(&self, transport: &dyn CompletionTransport) -> Result<String, Failure> {
        match &self.target {
            Ok((model, request)) => transport
                .complete(model, request)
                .await
                .map_err(Failure::Completion),
            Err(err) => Err(Failure::Configuration(err.clone())),
        }
    }
}

pub struct ChatSession {
    conversation: ConversationStore,
    prefs: Arc<PreferenceStore>,
    credentials: Arc<dyn CredentialSource>,
    transport: Arc<dyn CompletionTransport>,
    state: SessionState,
}

impl ChatSession {
    /// Creates a session over an already-loaded conversation.
    pub fn new(
        conversation: ConversationStore,
        prefs: Arc<PreferenceStore>,
        credentials: Arc<dyn CredentialSource>,
        transport: Arc<dyn CompletionTransport>,
    ) -> Self {
        Self {
            conversation,
            prefs,
            credentials,
            transport,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    pub fn conversation(&self) -> &ConversationStore {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut ConversationStore {
        &mut self.conversation
    }

    pub fn resolve(&self) -> Result<ResolvedModel, ResolveError> {
        resolve_model(&self.prefs, self.credentials.as_ref())
    }

    /// `Idle -> Sending`: validates input, appends the user turn and prepares the request.
    pub fn begin(&mut self, text: &str) -> Result<PendingCompletion, Rejection> {
        if self.state == SessionState::Sending {
            return Err(Rejection::Busy);
        }
        let user_message = Message::user(text).ok_or(Rejection::EmptyInput)?;

        // History is captured before the user turn is appended; the request adds it last.
        let history = self.conversation.api_history();
        let content = user_message.content().to_string();
        self.conversation.append(user_message);
        self.state = SessionState::Sending;

        let temperature = self.prefs.get_settings().temperature;
        let target = self.resolve().map(|model| {
            let request = build_request(&model, history, &content, temperature);
            (model, request)
        });
        Ok(PendingCompletion { target })
    }

    /// `{Succeeded, Failed} -> Idle`: appends the reply or the failure explanation.
    /// Consumes the pending token so each submission finishes exactly once.
    pub fn finish(
        &mut self,
        _pending: PendingCompletion,
        result: Result<String, Failure>,
    ) -> TurnOutcome {
        let outcome = match result {
            Ok(content) => TurnOutcome::Replied(Message::assistant_with_citations(
                content,
                RESPONSE_CITATIONS.iter().map(|url| url.to_string()).collect(),
            )),
            Err(failure) => {
                let kind = failure.kind();
                warn!(kind = ?kind, error = %failure, "completion failed");
                TurnOutcome::Failed {
                    kind,
                    message: Message::assistant(failure_message(&failure)),
                }
            }
        };
        self.conversation.append(outcome.message().clone());
        self.state = SessionState::Idle;
        outcome
    }

    /// Runs a whole submission. Returns the rejection when the input is ignored.
    pub async fn submit(&mut self, text: &str) -> Result<TurnOutcome, Rejection> {
        let pending = self.begin(text)?;
        let transport = Arc::clone(&self.transport);
        let result = pending.dispatch(transport.as_ref()).await;
        Ok(self.finish(pending, result))
    }
}

const RATE_LIMIT_MESSAGE: &str = "**Rate Limit Reached** 🚫

The AI service is temporarily unavailable due to high usage. This happens when too many requests are made in a short time.

**What you can do:**
1. **Wait a few minutes** and try again - rate limits are usually temporary
2. **Configure your own API key** for dedicated access and higher limits
3. **Use a different model** if you have multiple configured

**To add your own API key:**
- Run `monero-tutor models add --id <model> --name <name> --base-url <url> --api-key <key>`
- Or store a key for an existing model with `monero-tutor auth <model>`
- Then select it with `monero-tutor models use <model>`";

const CONNECTION_TROUBLE_PREFIX: &str =
    "I apologize, but I'm having trouble connecting to the AI service right now.";

/// User-facing text for a failed turn. Rate limits get their own remediation steps.
pub fn failure_message(failure: &Failure) -> String {
    let body = match failure.kind() {
        FailureKind::RateLimited => RATE_LIMIT_MESSAGE.to_string(),
        _ => format!("{CONNECTION_TROUBLE_PREFIX} {failure}"),
    };
    format!("{body}\n\n{}", reference_links_block())
}
