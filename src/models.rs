//! Data models for room inventories and the persisted price history.
//!
//! This module defines the core data structures used throughout the application:
//! - [`RoomInventory`]: Room categories and their lowest observed price for one property
//! - [`Snapshot`]: One run's complete set of per-property inventories
//! - [`History`]: The ordered sequence of snapshots persisted between runs
//!
//! The serialized field names (`date`, `data`) form the on-disk history
//! contract, so they must not be renamed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Room-type display label mapped to the lowest price observed for it.
///
/// A room type can be listed several times on one page (refundable and
/// non-refundable fares); only the minimum survives. An empty inventory is a
/// meaningful result: the property was checked and nothing could be extracted
/// (sold out, blocked, or an unrecognized layout). It is distinct from the
/// property not having been checked at all, which is simply absent from the
/// snapshot.
pub type RoomInventory = BTreeMap<String, f64>;

/// A collection of per-property inventories captured by a single run.
///
/// Each execution of the application produces exactly one `Snapshot`, which
/// is appended to the persisted [`History`].
///
/// # Serialized Form
///
/// ```json
/// {
///   "date": "2025-06-01 09:00",
///   "data": {
///     "Hotel A": { "Deluxe Room": 4500.0, "Suite": 8000.0 },
///     "Hotel B": {}
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Local capture time in `YYYY-MM-DD HH:MM` format.
    pub date: String,
    /// Property display name mapped to its extracted inventory.
    pub data: BTreeMap<String, RoomInventory>,
}

/// Snapshots in creation order, oldest first.
///
/// The history is bounded by the configured retention: when an append pushes
/// it past the bound, the oldest snapshots are dropped from the front.
pub type History = Vec<Snapshot>;
