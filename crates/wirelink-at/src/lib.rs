//! AT command protocol for wirelink.
//!
//! WiFi and cellular modules speak line-oriented text instead of binary
//! frames. The same correlation engine drives them: the final result code
//! (`OK`, `ERROR`, `+CME ERROR: n`) confirms the command in flight, and
//! lines starting with the event marker become typed [`AtEvent`]s.
//!
//! - [`line`] -- byte-at-a-time line assembler
//! - [`command`] -- command encoder and argument splitting
//! - [`events`] -- event table and typed events
//! - [`protocol`] -- classifier and [`AtProtocol`]
//! - [`module`] / [`builder`] -- [`AtModule`] and [`AtModuleBuilder`]
//!
//! # Example
//!
//! ```
//! use wirelink_at::protocol::classify_line;
//! use wirelink_at::AtEvent;
//! use wirelink_core::protocol::Classified;
//!
//! let line = r#"+CEREG: 1,"1234","01020304",7"#;
//! let classified = classify_line(line, '+').unwrap();
//! assert_eq!(
//!     classified,
//!     Classified::Event(AtEvent::NetworkRegistration {
//!         stat: 1,
//!         tac: Some("1234".into()),
//!         eci: Some("01020304".into()),
//!         act: Some(7),
//!     })
//! );
//! ```

pub mod builder;
pub mod command;
pub mod events;
pub mod line;
pub mod module;
pub mod protocol;

pub use builder::AtModuleBuilder;
pub use command::{AtArg, AtCommand};
pub use events::AtEvent;
pub use module::AtModule;
pub use protocol::{AtConfig, AtKey, AtProtocol, AtStatus};
