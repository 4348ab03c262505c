//! The world: owner of every registry, archetype, and cache.
//!
//! `World` is the single entry point for entity and component CRUD. It owns
//! the component registry, the entity registry, the archetype table, the
//! per-entity records, and the query caches, threading them through every
//! operation so no global state exists.
//!
//! ## Archetype graph
//!
//! Archetypes are stored in a table keyed by the order-independent hash of
//! their signature and created lazily on first reference. The root archetype
//! (empty signature, key `0`) is created with the world and anchors the
//! "add one component" transitions for entities that hold nothing yet.
//! Attaching or removing a component computes the destination signature
//! (source plus or minus one id) and migrates the entity's row between the
//! two groups.
//!
//! ## Soft-fail contract
//!
//! Stale handles and absent components are expected, frequent conditions:
//! every accessor answers them with `None`/`false`/no-op. Conditions that
//! can only arise from a broken engine invariant (a record row out of a
//! column's bounds, a column whose element type diverges from its
//! registration) abort with a descriptive panic instead of being reported
//! as recoverable errors.

use std::collections::HashMap;

use crate::engine::archetype::Archetype;
use crate::engine::component::ComponentRegistry;
use crate::engine::entity::{Entity, EntityRegistry, Record};
use crate::engine::query::QueryCache;
use crate::engine::storage::column_mut;
use crate::engine::types::{ArchetypeId, ComponentId, Signature};

/// Archetype-based entity/component storage and query engine.
///
/// Single-threaded and synchronous: every operation runs to completion on
/// the calling thread, and the world exclusively owns all storage for its
/// lifetime. Borrows returned by [`World::get`], [`World::get_mut`], and
/// [`World::query`] are tied to the world borrow that produced them, so the
/// borrow checker rules out structural mutation while they are held.
pub struct World {
    pub(crate) components: ComponentRegistry,
    pub(crate) entities: EntityRegistry,
    pub(crate) archetypes: Vec<Archetype>,
    /// Signature key -> archetype table index.
    pub(crate) archetype_index: HashMap<u64, ArchetypeId>,
    /// Entity index -> storage location, present only while the entity holds
    /// at least one component (or sits in the root after losing them all).
    pub(crate) records: HashMap<u64, Record>,
    /// Query signature key -> cached result state.
    pub(crate) caches: HashMap<u64, QueryCache>,
    root: ArchetypeId,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates an empty world with its root archetype.
    pub fn new() -> Self {
        let mut world = Self {
            components: ComponentRegistry::new(),
            entities: EntityRegistry::new(),
            archetypes: Vec::new(),
            archetype_index: HashMap::new(),
            records: HashMap::new(),
            caches: HashMap::new(),
            root: 0,
        };
        world.root = world.get_or_create_archetype(Signature::empty());
        world
    }

    /// Creates a new entity, recycling a despawned index when one is pooled.
    pub fn entity(&mut self) -> Entity {
        self.entities.create()
    }

    /// Number of currently live entities.
    pub fn alive_count(&self) -> u64 {
        self.entities.alive_count()
    }

    /// Despawns `entity`, dropping its components and invalidating every
    /// outstanding handle to it. Stale handles are a no-op.
    pub fn despawn(&mut self, entity: Entity) {
        if !self.entities.is_alive(entity) {
            return;
        }

        let index = entity.index();
        if let Some(record) = self.records.remove(&index) {
            let archetype = &mut self.archetypes[record.archetype as usize];
            for column in archetype.columns_mut() {
                column
                    .swap_remove(record.row)
                    .expect("column rows out of sync with entity list");
            }
            let (row, swapped) = archetype
                .remove(index)
                .expect("entity with a record must occupy a row");
            if let Some(swapped_index) = swapped {
                if let Some(record) = self.records.get_mut(&swapped_index) {
                    record.row = row;
                }
            }
        }

        self.entities.despawn(entity);
    }

    /// Returns the id for component type `T`, registering it on first use.
    pub fn component_id<T: 'static>(&mut self) -> ComponentId {
        self.components.id_for::<T>()
    }

    /// Attaches `value` to `entity`, migrating it to the matching archetype
    /// when its component set changes. Chainable; stale handles are a no-op.
    pub fn set<T: 'static>(&mut self, entity: Entity, value: T) -> &mut Self {
        if !self.entities.is_alive(entity) {
            return self;
        }

        let index = entity.index();
        let component_id = self.components.id_for::<T>();

        // resolve the archetype and row the value belongs at
        let record = match self.records.get(&index).copied() {
            None => {
                // first component: transition out of the root
                let destination = self.find_archetype_with(self.root, component_id);
                let row = self.archetypes[destination as usize].append(index);
                let record = Record { archetype: destination, row };
                self.records.insert(index, record);
                record
            }
            Some(record) if self.archetypes[record.archetype as usize].has(component_id) => record,
            Some(record) => {
                let destination = self.find_archetype_with(record.archetype, component_id);
                self.move_entity(entity, destination);
                self.records[&index]
            }
        };

        let archetype = &mut self.archetypes[record.archetype as usize];
        let column = typed_column::<T>(archetype, component_id);
        if (record.row as usize) < column.as_slice().len() {
            // overwrite in place; the old value is dropped by assignment
            *column
                .get_mut(record.row)
                .expect("record row out of column bounds") = value;
            archetype.mark_updated();
        } else {
            // the row was appended without a value (fresh append or a move
            // into an archetype that gained this component)
            let pushed = column.push(value);
            assert_eq!(pushed, record.row, "column rows out of sync with entity list");
        }

        self
    }

    /// Returns `entity`'s `T` value, or `None` on a stale handle or absent
    /// component.
    pub fn get<T: 'static>(&self, entity: Entity) -> Option<&T> {
        if !self.entities.is_alive(entity) {
            return None;
        }

        let component_id = self.components.id_of::<T>()?;
        let record = self.records.get(&entity.index())?;
        let archetype = &self.archetypes[record.archetype as usize];
        let column = archetype.column(component_id)?;
        crate::engine::storage::column_ref::<T>(column)
            .expect("column element type diverges from registration")
            .get(record.row)
    }

    /// Returns `entity`'s `T` value mutably and marks the archetype UPDATED,
    /// or `None` on a stale handle or absent component.
    pub fn get_mut<T: 'static>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.entities.is_alive(entity) {
            return None;
        }

        let component_id = self.components.id_of::<T>()?;
        let record = self.records.get(&entity.index()).copied()?;
        let archetype = &mut self.archetypes[record.archetype as usize];
        if !archetype.has(component_id) {
            return None;
        }

        archetype.mark_updated();
        typed_column::<T>(archetype, component_id).get_mut(record.row)
    }

    /// Returns `true` if `entity` is live and holds a `T`. No side effects.
    pub fn has<T: 'static>(&self, entity: Entity) -> bool {
        if !self.entities.is_alive(entity) {
            return false;
        }

        let Some(component_id) = self.components.id_of::<T>() else {
            return false;
        };
        let Some(record) = self.records.get(&entity.index()) else {
            return false;
        };
        self.archetypes[record.archetype as usize].has(component_id)
    }

    /// Detaches `T` from `entity`, dropping the stored value and migrating
    /// the entity. Chainable; stale handles and absent components are a
    /// no-op.
    pub fn remove<T: 'static>(&mut self, entity: Entity) -> &mut Self {
        if !self.entities.is_alive(entity) {
            return self;
        }

        let Some(component_id) = self.components.id_of::<T>() else {
            return self;
        };
        let Some(record) = self.records.get(&entity.index()).copied() else {
            return self;
        };
        if !self.archetypes[record.archetype as usize].has(component_id) {
            return self;
        }

        let destination = self.find_archetype_without(record.archetype, component_id);
        self.move_entity(entity, destination);
        self
    }
}

/* archetype graph */
impl World {
    fn get_or_create_archetype(&mut self, signature: Signature) -> ArchetypeId {
        let key = signature.key();
        if let Some(&id) = self.archetype_index.get(&key) {
            return id;
        }

        let next = self.archetypes.len();
        assert!(next <= ArchetypeId::MAX as usize, "archetype table exhausted");

        let id = next as ArchetypeId;
        self.archetypes.push(Archetype::new(id, signature, &self.components));
        self.archetype_index.insert(key, id);
        id
    }

    /// Creates (or finds) the archetype for an exact component-id set.
    ///
    /// White-box surface for tests and diagnostics; every id must already be
    /// registered.
    pub fn create_archetype(&mut self, component_ids: &[ComponentId]) -> ArchetypeId {
        self.get_or_create_archetype(Signature::from_ids(component_ids))
    }

    /// Looks up the archetype for an exact component-id set without creating
    /// it. Order of `component_ids` is irrelevant.
    pub fn find_archetype(&self, component_ids: &[ComponentId]) -> Option<ArchetypeId> {
        self.archetype_index
            .get(&Signature::from_ids(component_ids).key())
            .copied()
    }

    /// Resolves the archetype whose signature is `source`'s plus
    /// `component_id`, creating it lazily.
    pub fn find_archetype_with(&mut self, source: ArchetypeId, component_id: ComponentId) -> ArchetypeId {
        let signature = self.archetypes[source as usize].signature().with(component_id);
        self.get_or_create_archetype(signature)
    }

    /// Resolves the archetype whose signature is `source`'s minus
    /// `component_id`, creating it lazily.
    pub fn find_archetype_without(&mut self, source: ArchetypeId, component_id: ComponentId) -> ArchetypeId {
        let signature = self.archetypes[source as usize].signature().without(component_id);
        self.get_or_create_archetype(signature)
    }

    /// Read access to an archetype, for tests and diagnostics.
    pub fn archetype(&self, id: ArchetypeId) -> Option<&Archetype> {
        self.archetypes.get(id as usize)
    }

    /// Moves `entity`'s row from its current archetype into `destination`.
    ///
    /// Values for ids present in both signatures move across; values only in
    /// the source are dropped by their columns. Ids only in the destination
    /// are left for the caller to push, restoring the column-length
    /// invariant before the next observation. The moved entity's record and
    /// the swapped entity's record are rewritten.
    ///
    /// White-box surface; no-op if `entity` has no record or is already in
    /// `destination`.
    pub fn move_entity(&mut self, entity: Entity, destination: ArchetypeId) {
        let index = entity.index();
        let Some(record) = self.records.get(&index).copied() else {
            return;
        };
        if record.archetype == destination {
            return;
        }

        let (new_row, vacated, swapped) = {
            let (source, dest) =
                archetype_pair_mut(&mut self.archetypes, record.archetype, destination);

            let new_row = dest.append(index);

            let moved_ids: Vec<ComponentId> = source.signature().ids().to_vec();
            for component_id in moved_ids {
                if dest.has(component_id) {
                    let dest_column = dest
                        .column_mut(component_id)
                        .expect("destination signature lists this component");
                    let source_column = source
                        .column_mut(component_id)
                        .expect("source signature lists this component");
                    dest_column
                        .transfer(source_column, record.row)
                        .expect("column transfer between same-typed columns");
                } else {
                    source
                        .column_mut(component_id)
                        .expect("source signature lists this component")
                        .swap_remove(record.row)
                        .expect("column rows out of sync with entity list");
                }
            }

            let (vacated, swapped) = source
                .remove(index)
                .expect("moving entity must occupy a source row");
            (new_row, vacated, swapped)
        };

        debug_assert_eq!(vacated, record.row, "entity list out of sync with record");

        if let Some(swapped_index) = swapped {
            if let Some(swapped_record) = self.records.get_mut(&swapped_index) {
                swapped_record.row = vacated;
            }
        }
        self.records.insert(index, Record { archetype: destination, row: new_row });

        log::trace!(
            "moved entity {} from archetype {} to {}",
            index,
            record.archetype,
            destination
        );
    }
}

/// Resolves a typed column on `archetype` or aborts: reaching a column whose
/// element type diverges from its registration is a broken engine invariant.
fn typed_column<T: 'static>(
    archetype: &mut Archetype,
    component_id: ComponentId,
) -> &mut crate::engine::storage::TypedColumn<T> {
    let column = archetype
        .column_mut(component_id)
        .expect("archetype signature lists this component");
    column_mut::<T>(column).expect("column element type diverges from registration")
}

/// Mutably borrows two distinct archetypes from the table at once.
fn archetype_pair_mut(
    archetypes: &mut [Archetype],
    a: ArchetypeId,
    b: ArchetypeId,
) -> (&mut Archetype, &mut Archetype) {
    assert!(a != b, "source and destination archetype must differ");

    let (low, high) = if a < b { (a, b) } else { (b, a) };
    let (head, tail) = archetypes.split_at_mut(high as usize);
    let low_ref = &mut head[low as usize];
    let high_ref = &mut tail[0];
    if a < b { (low_ref, high_ref) } else { (high_ref, low_ref) }
}
