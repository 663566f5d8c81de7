mod annex;
mod assignment;
mod attendance;
mod audit_log;
mod course;
mod participant;
mod phase;
mod signature;
mod user;

pub use annex::*;
pub use assignment::*;
pub use attendance::*;
pub use audit_log::*;
pub use course::*;
pub use participant::*;
pub use phase::*;
pub use signature::*;
pub use user::*;
