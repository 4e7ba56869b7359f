// Application layer - ledger use cases on top of the repository.
// Clients (the CLI and the interactive shell) only talk to LedgerService.

pub mod error;
mod service;

pub use error::*;
pub use service::*;
