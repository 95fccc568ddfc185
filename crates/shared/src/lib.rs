//! Wire types shared between the scanner client core and the desktop GUI:
//! batch domain model, pushed-feed envelope, and structured API errors.

pub mod domain;
pub mod error;
pub mod protocol;
