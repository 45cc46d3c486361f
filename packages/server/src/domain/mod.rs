pub mod role;
pub mod status;

pub use role::{DEFAULT_ROLE, UserRole};
pub use status::{ContestStatus, TransitionError};
