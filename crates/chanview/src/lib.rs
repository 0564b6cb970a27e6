//! Channel-scoped visibility filtering for a document store's indexed views
//! and analytic queries.
//!
//! Index definitions are wrapped so every emission is tagged with the
//! producing document's live channels; raw query results are then reduced to
//! the subset the calling principal may see, with internal sync metadata
//! stripped on the way out.

// public exports are one module level down
pub mod analytic;
pub mod channel;
pub mod db;
pub mod error;
pub mod filter;
pub mod index;
pub mod meta;
pub mod obs;
pub mod principal;
pub mod store;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, stores, sinks, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        channel::ChannelSet,
        db::Database,
        index::{IndexDoc, IndexOptions, IndexView},
        principal::Principal,
        store::{IndexResult, IndexRow, QueryOptions},
    };
}
