pub mod conversation;

pub use conversation::ConversationStore;
