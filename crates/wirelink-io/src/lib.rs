//! wirelink-io: single-IO-task plumbing shared by the binary and AT
//! module families.
//!
//! - [`io`] -- the task that owns the transport and feeds the engine
//! - [`session`] -- engine + IO handle with the request/confirm pattern

pub mod io;
pub mod session;

pub use io::{spawn_io_task, IoConfig, LinkIo, Request};
pub use session::{Session, SessionConfig};
