pub mod error;
pub mod reset;
pub mod session;
pub mod store;
pub mod tokens;

pub use error::SessionError;
pub use reset::should_reset;
pub use session::Session;
pub use store::{BusyGuard, SessionStore};
pub use tokens::TokenAccountant;
