//! Bid persistence for bidflow.
//!
//! Stores submitted bids in a local `SQLite` database and provides the CRUD
//! and monthly-aggregation operations the gateway exposes. Rows are kept
//! deliberately loose (free-text status, RFC 3339 timestamps as text) so the
//! table can absorb whatever the submission flow hands it.

pub mod bids;
pub mod connection;
pub mod error;
pub mod migrations;

pub use bids::{Bid, BidPatch, BidStatus, NewBid};
pub use connection::{open, open_in_memory};
pub use error::{Result, StoreError};
