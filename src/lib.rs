//! A read-through, time-bounded in-memory cache of the EPSS scores.
//!
//! The scores are downloaded on demand, kept in memory, and downloaded again
//! once they are older than the update interval. See [`scores::Client`].

pub mod application;
pub mod error;
pub mod models;
pub mod readers;
pub mod scores;
pub mod writers;

pub use error::{Error, FetchError, ParseError, RefreshError, Result};
pub use models::{Metadata, Score};
pub use scores::{Client, ClientBuilder};
