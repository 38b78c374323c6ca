//! API handlers for the SkillSwap backend

pub mod admin;
pub mod message;
pub mod profile;
pub mod review;
pub mod skill;
pub mod swap;
pub mod verification;

pub use message::*;
pub use profile::*;
pub use review::*;
pub use skill::*;
pub use swap::*;
pub use verification::*;
