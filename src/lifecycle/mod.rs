//! Process lifecycle: startup signals and graceful shutdown.

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
