//! Chat session orchestration.
//!
//! The session owns the working copy of the active conversation and pushes
//! every mutation back to the store right after it is applied in memory. Only
//! one send can be in flight: [`ChatSession::send`] borrows the session
//! mutably until the relay answers.

use tracing::{info, warn};

use crate::conversations::{Conversation, ConversationStore, ConversationSummary, Message};
use crate::relay::ChatRequest;

use super::errors::{ClientError, ClientResult};
use super::relay_client::ChatTransport;

/// Prompts offered while the active conversation is empty.
pub const SUGGESTED_PROMPTS: [&str; 4] = [
    "What is the current price of TCS stock?",
    "Latest news about Reliance Industries",
    "Which stocks are trending in Indian market today?",
    "Compare HDFC Bank and ICICI Bank performance",
];

/// One person's chat session over a conversation store and a relay.
pub struct ChatSession<T: ChatTransport> {
    store: ConversationStore,
    transport: T,
    current: Option<Conversation>,
    last_error: Option<String>,
}

impl<T: ChatTransport> ChatSession<T> {
    /// Create a session with no active conversation.
    pub fn new(store: ConversationStore, transport: T) -> Self {
        Self {
            store,
            transport,
            current: None,
            last_error: None,
        }
    }

    /// The active conversation, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&Conversation> {
        self.current.as_ref()
    }

    /// Messages of the active conversation.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        match &self.current {
            Some(conversation) => &conversation.messages,
            None => &[],
        }
    }

    /// Error of the last failed send, cleared by the next action.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Stored conversations, most recently updated first.
    #[must_use]
    pub fn summaries(&self) -> Vec<ConversationSummary> {
        self.store.list_summaries()
    }

    /// Prompts to offer, empty once the conversation has messages.
    #[must_use]
    pub fn suggested_prompts(&self) -> &'static [&'static str] {
        if self.messages().is_empty() {
            &SUGGESTED_PROMPTS
        } else {
            &[]
        }
    }

    /// Start a fresh, empty conversation. It is stored once it has messages.
    pub fn new_conversation(&mut self) -> &Conversation {
        self.last_error = None;
        self.current.insert(self.store.create_new(None))
    }

    /// Make a stored conversation active. Returns `false` if it does not exist.
    pub fn open(&mut self, id: &str) -> bool {
        match self.store.get(id) {
            Some(conversation) => {
                self.current = Some(conversation);
                self.last_error = None;
                true
            }
            None => false,
        }
    }

    /// Delete a stored conversation, closing it if it is active.
    pub fn delete(&mut self, id: &str) {
        self.store.delete(id);
        if self.current.as_ref().is_some_and(|c| c.id == id) {
            self.current = None;
        }
    }

    /// Delete every stored conversation and close the active one.
    pub fn clear_all(&mut self) {
        self.store.clear_all();
        self.current = None;
    }

    /// Send a user message and record the reply.
    ///
    /// Blank input is rejected without touching any state. Otherwise the user
    /// message is appended and stored, the relay is called with the earlier
    /// messages as history, and its reply is appended and stored. On failure a
    /// synthetic assistant message describing the error is appended instead,
    /// so the failure stays visible in the history, and the error is returned.
    ///
    /// # Errors
    /// Returns [`ClientError::EmptyMessage`] for blank input, or the relay error.
    pub async fn send(&mut self, content: &str) -> ClientResult<Message> {
        if content.trim().is_empty() {
            return Err(ClientError::EmptyMessage);
        }
        self.last_error = None;

        let history = self.messages().to_vec();
        let user_message = Message::user(content);
        let conversation = match self.current.take() {
            Some(mut conversation) => {
                conversation.push_message(user_message);
                conversation
            }
            None => {
                let conversation = self.store.create_new(Some(user_message));
                info!("Started conversation {}", conversation.id);
                conversation
            }
        };
        self.current = Some(conversation);
        self.persist();

        let request = ChatRequest {
            message: content.to_string(),
            history,
        };
        let (reply, result) = match self.transport.send(&request).await {
            Ok(text) => {
                let reply = Message::assistant(text);
                (reply.clone(), Ok(reply))
            }
            Err(e) => {
                let reason = e.to_string();
                warn!("Error sending message: {reason}");
                self.last_error = Some(reason.clone());
                let reply = Message::assistant(format!(
                    "Sorry, I encountered an error: {reason}. Please try again."
                ));
                (reply, Err(e))
            }
        };

        if let Some(conversation) = self.current.as_mut() {
            conversation.push_message(reply);
        }
        self.persist();

        result
    }

    fn persist(&self) {
        if let Some(conversation) = &self.current {
            self.store.save(conversation);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::conversations::{MemoryStorage, Role};
    use crate::relay::RelayFuture;

    struct ScriptedTransport {
        replies: Mutex<Vec<ClientResult<String>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<ClientResult<String>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl ChatTransport for ScriptedTransport {
        fn send<'a>(&'a self, request: &'a ChatRequest) -> RelayFuture<'a, ClientResult<String>> {
            Box::pin(async move {
                self.requests.lock().unwrap().push(request.clone());
                self.replies.lock().unwrap().remove(0)
            })
        }
    }

    fn session(replies: Vec<ClientResult<String>>) -> ChatSession<ScriptedTransport> {
        let store = ConversationStore::new(Arc::new(MemoryStorage::new()));
        ChatSession::new(store, ScriptedTransport::new(replies))
    }

    #[tokio::test]
    async fn test_blank_input_changes_nothing() {
        let mut session = session(Vec::new());

        let result = session.send("   ").await;

        assert!(matches!(result, Err(ClientError::EmptyMessage)));
        assert!(session.current().is_none());
        assert!(session.summaries().is_empty());
        assert!(session.transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_creates_and_persists_conversation() {
        let mut session = session(vec![
            Ok("**Price:**\n- TCS: 3,900".to_string()),
            Ok("Sure.".to_string()),
        ]);

        let reply = session.send("What is the current price of TCS stock?").await.unwrap();
        assert_eq!(reply.role, Role::Assistant);
        session.send("And Infosys?").await.unwrap();

        let current = session.current().unwrap();
        assert_eq!(current.title, "What is the current price of TCS stock?");
        assert_eq!(current.messages.len(), 4);

        let stored = session.store.get(&current.id).unwrap();
        assert_eq!(stored.messages, current.messages);

        let requests = session.transport.requests.lock().unwrap();
        assert!(requests[0].history.is_empty());
        assert_eq!(requests[1].history.len(), 2);
        assert_eq!(requests[1].message, "And Infosys?");
    }

    #[tokio::test]
    async fn test_relay_failure_is_recorded_in_history() {
        let mut session = session(vec![Err(ClientError::Relay("Resource exhausted".to_string()))]);

        let result = session.send("hi").await;

        assert!(matches!(result, Err(ClientError::Relay(_))));
        assert_eq!(session.last_error(), Some("Resource exhausted"));
        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(
            messages[1].content,
            "Sorry, I encountered an error: Resource exhausted. Please try again."
        );

        let id = session.current().unwrap().id.clone();
        assert_eq!(session.store.get(&id).unwrap().messages.len(), 2);
    }

    #[tokio::test]
    async fn test_open_delete_and_clear() {
        let mut session = session(vec![Ok("one".to_string()), Ok("two".to_string())]);
        session.send("first").await.unwrap();
        let first_id = session.current().unwrap().id.clone();
        session.new_conversation();
        assert_eq!(session.suggested_prompts().len(), SUGGESTED_PROMPTS.len());
        session.send("second").await.unwrap();
        assert!(session.suggested_prompts().is_empty());

        assert_eq!(session.summaries().len(), 2);
        assert!(session.open(&first_id));
        assert_eq!(session.messages()[0].content, "first");
        assert!(!session.open("conv_missing"));

        session.delete(&first_id);
        assert!(session.current().is_none());
        assert_eq!(session.summaries().len(), 1);

        session.clear_all();
        assert!(session.summaries().is_empty());
    }

    #[tokio::test]
    async fn test_empty_new_conversation_is_not_stored() {
        let mut session = session(Vec::new());

        session.new_conversation();

        assert!(session.summaries().is_empty());
        assert!(session.messages().is_empty());
    }
}
