//! Service layer for business logic and orchestration.
//!
//! Services sit between the HTTP handlers and the repository: they bound every
//! call with a deadline and enforce pre-conditions the store cannot express.

pub mod person_service;

pub use person_service::{PersonLogic, PersonService};
