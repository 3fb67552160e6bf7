//! Command codes shared by the binary module families.
//!
//! Only the commands every family implements the same way are listed; a
//! module-specific vocabulary builds its codes with [`Category::command`].
//!
//! [`Category::command`]: crate::classify::Category::command

use crate::classify::Category;

/// Software reset of the module.
pub const RESET: u8 = 0x00;
/// Query the module's operating state.
pub const GET_STATE: u8 = 0x01;
/// Transmit a data payload over the air.
pub const DATA: u8 = 0x04;

pub const RESET_REQ: u8 = Category::Request.command(RESET);
pub const RESET_CNF: u8 = Category::Confirmation.command(RESET);
pub const GET_STATE_REQ: u8 = Category::Request.command(GET_STATE);
pub const GET_STATE_CNF: u8 = Category::Confirmation.command(GET_STATE);
pub const DATA_REQ: u8 = Category::Request.command(DATA);
pub const DATA_CNF: u8 = Category::Confirmation.command(DATA);
/// Data received over the air.
pub const DATA_IND: u8 = Category::Indication.command(DATA);

/// Confirmation command byte answering a request for `identity`.
pub const fn confirmation_of(identity: u8) -> u8 {
    Category::Confirmation.command(identity)
}
