pub mod controls_timer;
pub mod progression;
pub mod protocol;
pub mod session;
pub mod state;
pub mod tracker;
pub mod transport;

// Re-export the session and its message types so the binary and tests can
// wire a player without reaching into submodules.
pub use protocol::{HostCommand, HostUpdate};
pub use session::PlayerSession;
pub use state::{EngineInput, EngineSettings};
