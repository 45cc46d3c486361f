pub mod auth;
pub mod contest;
pub mod payment;
pub mod shared;
pub mod stats;
pub mod submission;
pub mod user;
