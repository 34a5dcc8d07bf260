//! The land record store.
//!
//! Owns the ordered record collection (newest first) and keeps it in sync
//! with one durable slot. The store moves through an explicit lifecycle:
//! it is constructed [`StoreState::Uninitialized`], and
//! [`LandRecordStore::initialize`] either loads the persisted snapshot, seeds
//! an empty slot, or leaves the store [`StoreState::Failed`] when the
//! snapshot cannot be decoded.
//!
//! Every successful insertion rewrites the whole snapshot. The store is the
//! slot's only writer.

use std::fmt;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::RecordsConfig;
use crate::error::{Error, Result};
use crate::fixtures;
use crate::record::LandRecord;
use crate::storage::{SlotStore, Storage};

/// Default slot name for the record collection.
pub const DEFAULT_SLOT_KEY: &str = "bhumibandhu_land_records";

/// Readiness of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreState {
    /// Constructed but not yet loaded.
    Uninitialized,
    /// Loaded and accepting operations.
    Ready,
    /// Loading failed; the store holds no records.
    Failed(String),
}

impl fmt::Display for StoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Ready => write!(f, "ready"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// What a consumer can render right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreView<'a> {
    /// No data yet.
    Loading,
    /// Loading failed with this reason.
    Failed(&'a str),
    /// The current collection.
    Ready(&'a [LandRecord]),
}

/// How the collection was obtained during initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A non-empty snapshot was read from the slot.
    Loaded(usize),
    /// The slot was absent or empty and the seed set was written to it.
    Seeded(usize),
    /// The slot was absent or empty and seeding is disabled.
    Empty,
}

/// Ordered collection of land records backed by a durable slot.
#[derive(Debug)]
pub struct LandRecordStore<S = Storage> {
    backend: S,
    slot_key: String,
    options: RecordsConfig,
    land_id_pattern: Option<Regex>,
    state: StoreState,
    records: Vec<LandRecord>,
}

impl<S: SlotStore> LandRecordStore<S> {
    /// Create an uninitialized store over `backend` using the default slot.
    #[must_use]
    pub fn new(backend: S) -> Self {
        Self {
            backend,
            slot_key: DEFAULT_SLOT_KEY.to_string(),
            options: RecordsConfig::default(),
            land_id_pattern: None,
            state: StoreState::Uninitialized,
            records: Vec::new(),
        }
    }

    /// Create an uninitialized store with an explicit slot and options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] if `options.land_id_pattern` is not
    /// a valid regex.
    pub fn with_options(
        backend: S,
        slot_key: impl Into<String>,
        options: RecordsConfig,
    ) -> Result<Self> {
        let land_id_pattern = options
            .land_id_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| Error::ConfigValidation {
                message: format!("invalid land_id_pattern: {e}"),
            })?;

        Ok(Self {
            slot_key: slot_key.into(),
            options,
            land_id_pattern,
            ..Self::new(backend)
        })
    }

    /// Load the collection from the slot, seeding it if absent or empty.
    ///
    /// Calling this on a store that is already ready is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SnapshotCorrupt`] if the slot holds malformed JSON
    /// (the store is left [`StoreState::Failed`]), or a storage error if the
    /// slot cannot be read or the seed set cannot be written.
    pub fn initialize(&mut self) -> Result<LoadOutcome> {
        if self.state == StoreState::Ready {
            return Ok(LoadOutcome::Loaded(self.records.len()));
        }

        match self.load() {
            Ok(outcome) => {
                self.state = StoreState::Ready;
                info!(slot = %self.slot_key, records = self.records.len(), ?outcome, "Record store ready");
                Ok(outcome)
            }
            Err(err) => {
                self.records.clear();
                self.state = StoreState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    fn load(&mut self) -> Result<LoadOutcome> {
        let stored = self.backend.read_slot(&self.slot_key)?;

        let records: Vec<LandRecord> = match stored {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| Error::SnapshotCorrupt {
                slot: self.slot_key.clone(),
                source,
            })?,
            None => Vec::new(),
        };

        if !records.is_empty() {
            debug!(slot = %self.slot_key, count = records.len(), "Loaded record snapshot");
            let count = records.len();
            self.records = records;
            return Ok(LoadOutcome::Loaded(count));
        }

        if !self.options.seed_on_empty {
            self.records = Vec::new();
            return Ok(LoadOutcome::Empty);
        }

        let seed = fixtures::seed_records()?;
        self.persist(&seed)?;
        let count = seed.len();
        self.records = seed;
        info!(slot = %self.slot_key, count, "Seeded empty record store");
        Ok(LoadOutcome::Seeded(count))
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> &StoreState {
        &self.state
    }

    /// Whether the store accepts operations.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == StoreState::Ready
    }

    /// The state as something a consumer can branch on and render.
    #[must_use]
    pub fn view(&self) -> StoreView<'_> {
        match &self.state {
            StoreState::Uninitialized => StoreView::Loading,
            StoreState::Failed(reason) => StoreView::Failed(reason),
            StoreState::Ready => StoreView::Ready(&self.records),
        }
    }

    /// Name of the slot backing this store.
    #[must_use]
    pub fn slot_key(&self) -> &str {
        &self.slot_key
    }

    /// The backing slot store.
    #[must_use]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// All records, newest first. Empty until the store is ready.
    #[must_use]
    pub fn records(&self) -> &[LandRecord] {
        &self.records
    }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record with exactly this land id.
    #[must_use]
    pub fn find(&self, land_id: &str) -> Option<&LandRecord> {
        self.records.iter().find(|r| r.land_id == land_id)
    }

    /// Insert a record at the head of the collection and persist the snapshot.
    ///
    /// # Errors
    ///
    /// - [`Error::StoreNotReady`] if [`LandRecordStore::initialize`] has not
    ///   succeeded.
    /// - [`Error::InvalidRecord`] if the record breaks a data model invariant
    ///   or its id does not match the configured pattern.
    /// - [`Error::DuplicateLandId`] if duplicates are rejected by config.
    /// - A storage error if the snapshot cannot be written; the record is not
    ///   kept in that case.
    pub fn add_record(&mut self, record: LandRecord) -> Result<()> {
        self.ensure_ready()?;

        let record = record.normalize()?;
        self.check_land_id(&record.land_id)?;

        if self.find(&record.land_id).is_some() {
            if self.options.reject_duplicate_ids {
                return Err(Error::DuplicateLandId(record.land_id));
            }
            warn!(land_id = %record.land_id, "Adding record with duplicate land id");
        }

        let land_id = record.land_id.clone();
        self.records.insert(0, record);
        if let Err(err) = self.persist(&self.records) {
            self.records.remove(0);
            return Err(err);
        }

        info!(land_id = %land_id, total = self.records.len(), "Added land record");
        Ok(())
    }

    /// Records whose land id, survey number, current owner or village
    /// contains `query`, ignoring case and surrounding whitespace.
    ///
    /// A blank query returns every record. Results keep collection order.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&LandRecord> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.records.iter().collect();
        }
        self.records.iter().filter(|r| r.matches(&query)).collect()
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(Error::StoreNotReady {
                state: self.state.to_string(),
            })
        }
    }

    fn check_land_id(&self, land_id: &str) -> Result<()> {
        match &self.land_id_pattern {
            Some(regex) if !regex.is_match(land_id) => Err(Error::invalid_record(
                land_id,
                format!("land id does not match pattern {}", regex.as_str()),
            )),
            _ => Ok(()),
        }
    }

    fn persist(&self, records: &[LandRecord]) -> Result<()> {
        let snapshot = serde_json::to_string(records)?;
        self.backend.write_slot(&self.slot_key, &snapshot)
    }
}
