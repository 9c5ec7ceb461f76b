//! Client-side conversation state: the visible message list, the
//! anonymous usage counter, and the sign-in gate.

mod backend;

pub use backend::{ChatBackend, HttpBackend};

use uuid::Uuid;

use crate::auth::Principal;

/// Number of messages an unauthenticated session may send before the
/// sign-in gate opens.
pub const FREE_MESSAGE_LIMIT: u32 = 10;

/// Rendered in place of a reply when the gateway call fails. The
/// failure is not surfaced as an error to the caller.
pub const SEND_FAILED_MESSAGE: &str = "Error occurred. Please try again.";

#[derive(Clone, Debug, PartialEq)]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Clone, Debug)]
pub struct ChatMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    fn new(role: MessageRole, content: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SessionPhase {
    Idle,
    /// A send is in flight. Only the send affordance is disabled; the
    /// rest of the UI stays interactive.
    AwaitingReply,
    /// The sign-in gate is showing.
    Gated,
}

/// What happened to a `send_message` call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SendOutcome {
    /// Empty input, silently ignored.
    Ignored,
    /// The anonymous limit was hit; nothing was sent or counted.
    Gated,
    /// The message went out and a reply (or the error placeholder)
    /// was appended.
    Sent,
}

pub struct ChatSession<B> {
    backend: B,
    messages: Vec<ChatMessage>,
    phase: SessionPhase,
    principal: Option<Principal>,
    free_messages_used: u32,
    // Always the id of the newest message so the view stays scrolled
    // to the bottom after every list mutation
    scroll_anchor: Option<String>,
}

impl<B: ChatBackend> ChatSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            messages: Vec::new(),
            phase: SessionPhase::Idle,
            principal: None,
            free_messages_used: 0,
            scroll_anchor: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    pub fn free_messages_used(&self) -> u32 {
        self.free_messages_used
    }

    pub fn scroll_anchor(&self) -> Option<&str> {
        self.scroll_anchor.as_deref()
    }

    fn push(&mut self, message: ChatMessage) {
        self.scroll_anchor = Some(message.id.clone());
        self.messages.push(message);
    }

    /// Sends a message through the gateway. The user message is
    /// appended optimistically before the call goes out, and the
    /// anonymous counter is incremented for the attempt whether or
    /// not the call succeeds.
    pub async fn send_message(&mut self, input: &str) -> SendOutcome {
        let message = input.trim();
        if message.is_empty() {
            return SendOutcome::Ignored;
        }

        if self.principal.is_none() && self.free_messages_used >= FREE_MESSAGE_LIMIT {
            self.phase = SessionPhase::Gated;
            return SendOutcome::Gated;
        }

        self.push(ChatMessage::new(MessageRole::User, message));
        self.phase = SessionPhase::AwaitingReply;
        if self.principal.is_none() {
            self.free_messages_used += 1;
        }

        let user_id = self.principal.as_ref().map(|p| p.id.clone());
        let result = self.backend.send(message, user_id.as_deref()).await;
        match result {
            Ok(reply) => self.push(ChatMessage::new(MessageRole::Assistant, &reply)),
            Err(err) => {
                tracing::debug!("Chat send failed: {}", err);
                self.push(ChatMessage::new(MessageRole::Assistant, SEND_FAILED_MESSAGE));
            }
        }
        self.phase = SessionPhase::Idle;

        SendOutcome::Sent
    }

    /// Open the sign-in gate directly, also reachable below the
    /// limit via the explicit sign-in affordance.
    pub fn open_gate(&mut self) {
        self.phase = SessionPhase::Gated;
    }

    pub fn dismiss_gate(&mut self) {
        if self.phase == SessionPhase::Gated {
            self.phase = SessionPhase::Idle;
        }
    }

    /// Handler for "current principal changed" events from the
    /// identity provider. Signing in clears the gate; signing out
    /// keeps the usage counter at whatever value it held.
    pub fn apply_identity(&mut self, principal: Option<Principal>) {
        if principal.is_some() && self.phase == SessionPhase::Gated {
            self.phase = SessionPhase::Idle;
        }
        self.principal = principal;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anyhow::{Error, Result, anyhow};
    use async_trait::async_trait;

    use super::*;

    /// Backend that replays scripted results and records every call.
    #[derive(Default)]
    struct ScriptedBackend {
        replies: Mutex<Vec<Result<String, String>>>,
        calls: Mutex<Vec<(String, Option<String>)>>,
    }

    impl ScriptedBackend {
        fn replying(reply: &str, times: usize) -> Self {
            let backend = Self::default();
            let mut replies = backend.replies.lock().unwrap();
            for _ in 0..times {
                replies.push(Ok(reply.to_string()));
            }
            drop(replies);
            backend
        }

        fn failing() -> Self {
            let backend = Self::default();
            backend
                .replies
                .lock()
                .unwrap()
                .push(Err("connection refused".to_string()));
            backend
        }

        fn calls(&self) -> Vec<(String, Option<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatBackend for &ScriptedBackend {
        async fn send(&self, message: &str, user_id: Option<&str>) -> Result<String, Error> {
            self.calls
                .lock()
                .unwrap()
                .push((message.to_string(), user_id.map(|s| s.to_string())));
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                return Err(anyhow!("no scripted reply"));
            }
            replies.remove(0).map_err(|e| anyhow!(e))
        }
    }

    #[tokio::test]
    async fn it_shows_both_sides_of_an_exchange() {
        let backend = ScriptedBackend::replying("Hi there", 1);
        let mut session = ChatSession::new(&backend);

        let outcome = session.send_message("Hello").await;

        assert_eq!(outcome, SendOutcome::Sent);
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.free_messages_used(), 1);
        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "Hello");
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].content, "Hi there");
        // Anonymous sends carry no user id
        assert_eq!(backend.calls(), vec![("Hello".to_string(), None)]);
    }

    #[tokio::test]
    async fn it_ignores_blank_input() {
        let backend = ScriptedBackend::default();
        let mut session = ChatSession::new(&backend);

        assert_eq!(session.send_message("   ").await, SendOutcome::Ignored);
        assert!(session.messages().is_empty());
        assert_eq!(session.free_messages_used(), 0);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn it_trims_input_before_sending() {
        let backend = ScriptedBackend::replying("Hi there", 1);
        let mut session = ChatSession::new(&backend);

        session.send_message("  Hello  ").await;

        assert_eq!(session.messages()[0].content, "Hello");
        assert_eq!(backend.calls()[0].0, "Hello");
    }

    #[tokio::test]
    async fn it_gates_the_eleventh_anonymous_send() {
        let backend = ScriptedBackend::replying("ok", 10);
        let mut session = ChatSession::new(&backend);

        for n in 0..10 {
            let outcome = session.send_message(&format!("message {}", n)).await;
            assert_eq!(outcome, SendOutcome::Sent);
        }
        assert_eq!(session.free_messages_used(), 10);
        assert_eq!(session.messages().len(), 20);

        let outcome = session.send_message("test").await;

        assert_eq!(outcome, SendOutcome::Gated);
        assert_eq!(session.phase(), SessionPhase::Gated);
        // The gated attempt is not rendered, counted, or sent
        assert_eq!(session.messages().len(), 20);
        assert_eq!(session.free_messages_used(), 10);
        assert_eq!(backend.calls().len(), 10);
    }

    #[tokio::test]
    async fn it_never_gates_authenticated_sends() {
        let backend = ScriptedBackend::replying("ok", 3);
        let mut session = ChatSession::new(&backend);
        session.free_messages_used = 10;
        session.apply_identity(Some(Principal::new("user-1")));

        for n in 0..3 {
            let outcome = session.send_message(&format!("message {}", n)).await;
            assert_eq!(outcome, SendOutcome::Sent);
        }

        // The counter is neither checked nor incremented
        assert_eq!(session.free_messages_used(), 10);
        let calls = backend.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|(_, id)| id.as_deref() == Some("user-1")));
    }

    #[tokio::test]
    async fn it_renders_failures_as_an_assistant_message() {
        let backend = ScriptedBackend::failing();
        let mut session = ChatSession::new(&backend);

        let outcome = session.send_message("Hello").await;

        assert_eq!(outcome, SendOutcome::Sent);
        assert_eq!(session.phase(), SessionPhase::Idle);
        // The attempt still counts
        assert_eq!(session.free_messages_used(), 1);
        let last = session.messages().last().unwrap();
        assert_eq!(last.role, MessageRole::Assistant);
        assert_eq!(last.content, SEND_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn it_clears_the_gate_on_sign_in_and_keeps_messages() {
        let backend = ScriptedBackend::replying("ok", 1);
        let mut session = ChatSession::new(&backend);
        session.send_message("Hello").await;
        session.free_messages_used = 10;

        assert_eq!(session.send_message("test").await, SendOutcome::Gated);

        session.apply_identity(Some(Principal::new("user-1")));

        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.is_authenticated());
        assert_eq!(session.messages().len(), 2);
    }

    #[tokio::test]
    async fn it_keeps_the_counter_across_sign_out() {
        let backend = ScriptedBackend::replying("ok", 4);
        let mut session = ChatSession::new(&backend);

        for n in 0..3 {
            session.send_message(&format!("message {}", n)).await;
        }
        session.apply_identity(Some(Principal::new("user-1")));
        session.send_message("authenticated").await;
        session.apply_identity(None);

        // Counting resumes from the retained value
        assert_eq!(session.free_messages_used(), 3);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn it_opens_the_gate_from_the_sign_in_affordance() {
        let backend = ScriptedBackend::default();
        let mut session = ChatSession::new(&backend);

        session.open_gate();
        assert_eq!(session.phase(), SessionPhase::Gated);

        session.dismiss_gate();
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn it_anchors_the_view_to_the_newest_message() {
        let backend = ScriptedBackend::replying("Hi there", 1);
        let mut session = ChatSession::new(&backend);
        assert!(session.scroll_anchor().is_none());

        session.send_message("Hello").await;

        let last_id = session.messages().last().unwrap().id.clone();
        assert_eq!(session.scroll_anchor(), Some(last_id.as_str()));
    }
}
