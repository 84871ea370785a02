pub mod engine;
pub mod session;

pub use engine::{Reply, ResponseEngine};
pub use session::{Session, SessionState, WELCOME_MESSAGE};
