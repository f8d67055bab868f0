//! Job-board service core: a generic record-store client, the domain
//! services layered over it (accounts, listings, applications, deadline
//! reminders), the notification simulator, and the HTTP routers exposing
//! them.

pub mod board;
pub mod config;
pub mod error;
pub mod notify;
pub mod policy;
pub mod store;
pub mod telemetry;
