//! Trait seams toward external collaborators and the system clock.

pub mod clock;
pub mod connections;
pub mod content;
pub mod platform;

pub use clock::{Clock, ManualClock, SystemClock};
pub use connections::ConnectionProvider;
pub use content::{CandidateTweet, ContentSource};
pub use platform::{ActionOutcome, PlatformClient};
