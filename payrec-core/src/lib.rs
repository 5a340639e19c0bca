#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod chain;
pub mod cursor;
pub mod notify;
pub mod reconciler;
pub mod treasury;
pub mod utils;
