//! Request handlers, one module per endpoint group.

pub mod bids;
pub mod generate;
pub mod health;
pub mod insight;
pub mod login;
pub mod place_bid;
pub mod scan;
pub mod search;
