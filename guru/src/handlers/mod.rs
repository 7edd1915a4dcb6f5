// Web handlers (health, answered question listing)
pub mod web_handlers;
pub use web_handlers::AppState;

// XMPP gateway webhook handlers
pub mod xmpp_handlers;
