//! Identity ledger
//!
//! Binds an [`IdentityHandle`] to a public key and an append-only log of
//! [`Reference`]s. [`IdentityLedger`] is the provider trait; the daemon
//! implements it over SQLite, and [`MemoryLedger`] keeps everything in
//! process.

mod memory;
mod provider;
mod types;

pub use memory::{MemoryLedger, MemoryLedgerError};
pub use provider::{IdentityLedger, LedgerError};
pub use types::{
    AppendOutcome, IdentityHandle, IdentityRecord, InvalidInput, Reference, MAX_HANDLE_LEN,
    MAX_REFERENCE_LEN,
};
