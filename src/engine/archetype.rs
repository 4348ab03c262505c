//! Archetypes: structural storage groups keyed by component signature.
//!
//! An archetype owns one column per component id in its signature plus the
//! entity bookkeeping for its rows: a dense entity list, an id-to-row map,
//! and the dirty flags queries use to decide between cached, patched, and
//! rebuilt results.
//!
//! ## Invariants
//!
//! - `entities.len()` equals the valid-row bound of every column at every
//!   point a query can observe (world-level operations that move rows keep
//!   the entity list and the columns in lockstep).
//! - Row removal swaps the last entity into the vacated row; rows never
//!   contain holes.
//! - The signature is fixed at construction; archetypes live for the
//!   world's lifetime even when emptied.

use std::collections::HashMap;

use crate::engine::component::ComponentRegistry;
use crate::engine::storage::Column;
use crate::engine::types::{ArchetypeId, ComponentId, DirtyFlags, RowId, Signature};

/// Monotonic change counters for one archetype.
///
/// Queries snapshot these and derive [`DirtyFlags`] relative to their own
/// snapshot via [`Archetype::flags_since`]; the counters themselves are
/// never reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChangeCounts {
    /// Rows appended over the archetype's lifetime.
    pub added: u64,
    /// Rows removed over the archetype's lifetime.
    pub removed: u64,
    /// In-place value overwrites over the archetype's lifetime.
    pub updated: u64,
}

/// A structural storage group: the columns and entity rows for one exact set
/// of component types.
pub struct Archetype {
    id: ArchetypeId,
    signature: Signature,
    /// One column per signature id, parallel to `signature.ids()`.
    columns: Vec<Box<dyn Column>>,
    /// Dense entity list; the position of an index here is its row.
    entities: Vec<u64>,
    rows: HashMap<u64, RowId>,
    counts: ChangeCounts,
}

impl Archetype {
    pub(crate) fn new(id: ArchetypeId, signature: Signature, registry: &ComponentRegistry) -> Self {
        let columns = signature
            .ids()
            .iter()
            .map(|&component_id| registry.new_column(component_id))
            .collect();

        log::debug!("created archetype {} for signature {:?}", id, signature.ids());

        Self {
            id,
            signature,
            columns,
            entities: Vec::new(),
            rows: HashMap::new(),
            counts: ChangeCounts::default(),
        }
    }

    /// This archetype's index in the world's table.
    #[inline]
    pub fn id(&self) -> ArchetypeId {
        self.id
    }

    /// The canonical component-id set stored here.
    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Returns `true` if `component_id` is part of this archetype's signature.
    #[inline]
    pub fn has(&self, component_id: ComponentId) -> bool {
        self.signature.has(component_id)
    }

    /// Number of entities stored.
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Dense entity index list, in row order.
    #[inline]
    pub fn entities(&self) -> &[u64] {
        &self.entities
    }

    /// The row holding `entity_index`, if present.
    #[inline]
    pub fn row_of(&self, entity_index: u64) -> Option<RowId> {
        self.rows.get(&entity_index).copied()
    }

    /// The column storing `component_id`, if part of the signature.
    pub fn column(&self, component_id: ComponentId) -> Option<&dyn Column> {
        let position = self.signature.position(component_id)?;
        Some(self.columns[position].as_ref())
    }

    pub(crate) fn column_mut(&mut self, component_id: ComponentId) -> Option<&mut dyn Column> {
        let position = self.signature.position(component_id)?;
        Some(self.columns[position].as_mut())
    }

    pub(crate) fn columns_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Column>> + '_ {
        self.columns.iter_mut()
    }

    /// Lifetime change counters; snapshot these to observe changes later.
    #[inline]
    pub fn change_counts(&self) -> ChangeCounts {
        self.counts
    }

    /// Derives the dirty bits accumulated since the `seen` snapshot.
    pub fn flags_since(&self, seen: ChangeCounts) -> DirtyFlags {
        let mut flags = DirtyFlags::NONE;
        if self.counts.added > seen.added {
            flags |= DirtyFlags::ADDED;
        }
        if self.counts.removed > seen.removed {
            flags |= DirtyFlags::REMOVED;
        }
        if self.counts.updated > seen.updated {
            flags |= DirtyFlags::UPDATED;
        }
        flags
    }

    /// Records an in-place value overwrite.
    pub(crate) fn mark_updated(&mut self) {
        self.counts.updated += 1;
    }

    /// Assigns the next dense row to `entity_index` and marks ADDED.
    ///
    /// Column contents for the new row are supplied by the caller, which
    /// keeps columns and the entity list in lockstep.
    pub(crate) fn append(&mut self, entity_index: u64) -> RowId {
        debug_assert!(
            !self.rows.contains_key(&entity_index),
            "entity {entity_index} appended twice to archetype {}",
            self.id
        );

        let row = self.entities.len() as RowId;
        self.entities.push(entity_index);
        self.rows.insert(entity_index, row);
        self.counts.added += 1;
        row
    }

    /// Removes `entity_index` from the dense list and marks REMOVED.
    ///
    /// The last entity is swapped into the vacated row and its row entry is
    /// rewritten. Returns the vacated row and the swapped entity's index, if
    /// a swap occurred. Columns are not touched; callers move or drop the
    /// row's values around this call.
    pub(crate) fn remove(&mut self, entity_index: u64) -> Option<(RowId, Option<u64>)> {
        let row = self.rows.remove(&entity_index)?;
        let last = (self.entities.len() - 1) as RowId;
        self.entities.swap_remove(row as usize);

        let swapped = if row != last {
            let moved = self.entities[row as usize];
            self.rows.insert(moved, row);
            Some(moved)
        } else {
            None
        };

        self.counts.removed += 1;
        Some((row, swapped))
    }

    /// Returns `true` if this archetype stores every id in `component_ids`.
    pub fn matches(&self, component_ids: &[ComponentId]) -> bool {
        component_ids.iter().all(|&id| self.signature.has(id))
    }
}
