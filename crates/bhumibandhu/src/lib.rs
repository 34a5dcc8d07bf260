//! `bhumibandhu` - A land record registry
//!
//! This library keeps an ordered collection of land parcel records in a
//! durable SQLite slot, answers searches and dashboard queries over it, and
//! converts areas between international and regional Indian units.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod documents;
pub mod error;
pub mod export;
pub mod fixtures;
pub mod logging;
pub mod record;
pub mod storage;
pub mod store;
pub mod units;

pub use config::Config;
pub use dashboard::{DashboardStats, RecordBadge};
pub use documents::{DocumentSource, FetchOutcome, LocalDocumentSource};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::LandRecord;
pub use storage::{SlotInfo, SlotStore, Storage};
pub use store::{LandRecordStore, LoadOutcome, StoreState, StoreView};
pub use units::{convert, UnitKey};
