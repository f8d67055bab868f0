pub mod domain;
pub mod service;

pub use domain::{EmailPreferences, NewUser, User};
pub use service::{UserError, UserService};
