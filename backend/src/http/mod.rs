//! HTTP server module for the person service.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Payload decoding and validation                        │
//! │  - Status code mapping                                    │
//! │  - CORS, tracing                                          │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Logic Layer (services::PersonLogic)                      │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Repository Layer (db/)                                   │
//! │  - SqliteRepository / LocalRepository                     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Routes
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | GET | `/person/persons/` | 200, array of persons |
//! | GET | `/person/persons/getById/?id=<id>` | 200, person |
//! | POST | `/person/persons/` | 201, created person |
//! | PUT | `/person/persons/` | 200, updated person |
//! | DELETE | `/person/persons/?id=<id>` | 204 |
//! | GET | `/health` | 200 |

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{ApiError, AppError};
pub use handlers::RequestContext;
pub use router::create_router;
pub use state::AppState;
