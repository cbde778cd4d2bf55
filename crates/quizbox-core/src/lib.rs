//! quizbox-core - Shared runtime plumbing for the quizbox binaries
//!
//! Logging setup and shutdown signalling used by both the HTTP server
//! and the command-line tools.

pub mod logging;
pub mod shutdown;

// Re-exports for convenience
pub use logging::init_logging;
pub use shutdown::shutdown_signal;
