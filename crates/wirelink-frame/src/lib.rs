//! Binary checksummed frame protocol for wirelink.
//!
//! The sub-GHz radios and the BLE module share one wire format: a start
//! marker, a command byte whose top two bits carry the message category, a
//! one- or two-byte length, the payload and an XOR checksum. This crate
//! provides:
//!
//! - **Frame codec** ([`frame`], [`checksum`]) -- profiles, encoder, XOR
//!   validation.
//! - **Assembler** ([`assembler`]) -- byte-at-a-time receive state machine
//!   with a preallocated, bounds-checked buffer.
//! - **Classifier** ([`classify`]) -- REQ/CNF/IND/RSP categories and status
//!   extraction.
//! - **BinaryModule** ([`module`]) and **BinaryModuleBuilder** ([`builder`])
//!   -- request/confirm API over a running session.
//!
//! # Example
//!
//! ```
//! use wirelink_frame::assembler::FrameAssembler;
//! use wirelink_frame::frame::{encode_request, FrameProfile};
//!
//! let profile = FrameProfile::short_length();
//! let request = encode_request(&profile, 0x00, &[]).unwrap();
//! assert_eq!(&request[..], &[0x02, 0x00, 0x00, 0x02]);
//!
//! // Simulate the reset confirmation arriving byte by byte.
//! let mut assembler = FrameAssembler::new(profile);
//! let frame = [0x02, 0x40, 0x01, 0x00, 0x43]
//!     .iter()
//!     .find_map(|&b| assembler.push(b))
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(frame.command, 0x40);
//! ```

pub mod assembler;
pub mod builder;
pub mod checksum;
pub mod classify;
pub mod commands;
pub mod frame;
pub mod module;
pub mod protocol;

pub use builder::BinaryModuleBuilder;
pub use classify::{decode, Category, Decoded, Indication, Status};
pub use frame::{Frame, FrameProfile};
pub use module::BinaryModule;
pub use protocol::FrameProtocol;
