// === TYPES MODULE ===

pub mod crypto;
pub mod deserializers;
pub mod handlers;
pub mod near;
pub mod progress;
pub mod signing;
pub mod wasm_to_json;
pub mod webauthn;
pub mod worker_messages;

// Re-export commonly used types
pub use crypto::*;
pub use handlers::*;
pub use near::*;
pub use progress::*;
pub use signing::*;
pub use webauthn::*;
