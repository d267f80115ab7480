//! JWT claims, clock and type-state verification.

pub mod claims;
pub mod clock;
pub mod token;

pub use claims::{Claims, TokenKind};
pub use clock::{Clock, FixedClock, SystemClock};
pub use token::{SignatureVerified, Token, Unverified, Verified};
