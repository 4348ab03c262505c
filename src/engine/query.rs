//! Typed queries and the per-signature result cache.
//!
//! A query names a tuple of component types and yields, once per call, every
//! live entity holding all of them together with borrows of its values.
//!
//! ## Execution model
//!
//! 1. Resolve the tuple to component ids (registering unseen types) and hash
//!    the sorted id set — the same order-independent key archetypes use.
//! 2. Refresh the cache entry for that key by observing the bound
//!    archetype's dirty flags:
//!    * flags clear and entity count unchanged — serve the cached list;
//!    * only ADDED — append entities for the new rows, clear ADDED;
//!    * only REMOVED — drop cached entities that lost their row, clear
//!      REMOVED;
//!    * anything else (UPDATED, mixed flags, cache miss) — rebuild by
//!      scanning every archetype whose signature is a superset of the
//!      requested ids, absorbing the bound archetype's UPDATED flag.
//! 3. Materialize results at point of use: each cached entity resolves
//!    through its live record to `(archetype, row)` and then to component
//!    borrows. Nothing borrowed is ever stored, so cached state cannot
//!    dangle.
//!
//! ## Single-archetype binding
//!
//! A cache entry is bound to one archetype even though a superset query can
//! match several. The incremental paths (and the clean-hit path) therefore
//! require that exactly one archetype matched at the last rebuild and that
//! the archetype table has not grown since; any signature matched by several
//! archetypes rebuilds on every call. Exactly one cache entry exists per
//! distinct signature and entries are never evicted.

use crate::engine::archetype::{Archetype, ChangeCounts};
use crate::engine::component::ComponentRegistry;
use crate::engine::entity::Entity;
use crate::engine::storage::column_ref;
use crate::engine::types::{signature_key, ArchetypeId, ComponentId, DirtyFlags, RowId};
use crate::engine::world::World;

/// Cached result state for one query signature.
///
/// `seen` snapshots the bound archetype's change counters at the last
/// observation; dirty bits are derived against it, so observations by other
/// query signatures cannot disturb this one. `matched` and `table_len`
/// record how many archetypes satisfied the signature at the last rebuild
/// and how large the archetype table was; the fast paths are only sound
/// while the bound archetype is provably still the sole match.
pub(crate) struct QueryCache {
    archetype: Option<ArchetypeId>,
    entity_count: usize,
    seen: ChangeCounts,
    matched: usize,
    table_len: usize,
    entities: Vec<Entity>,
}

/// A tuple of component types usable with [`World::query`].
///
/// Implemented for tuples of arity 1 through 4.
pub trait QueryTuple {
    /// Borrowed component references produced per entity.
    type Refs<'w>;

    /// Registers (if needed) and returns the tuple's component ids, in
    /// declaration order.
    fn component_ids(world: &mut World) -> Vec<ComponentId>;

    /// Resolves the tuple's borrows for one row, or `None` if the archetype
    /// lacks one of the components.
    fn resolve<'w>(
        registry: &ComponentRegistry,
        archetype: &'w Archetype,
        row: RowId,
    ) -> Option<Self::Refs<'w>>;
}

macro_rules! impl_query_tuple {
    ($($ty:ident),+) => {
        impl<$($ty: 'static),+> QueryTuple for ($($ty,)+) {
            type Refs<'w> = ($(&'w $ty,)+);

            fn component_ids(world: &mut World) -> Vec<ComponentId> {
                vec![$(world.components.id_for::<$ty>()),+]
            }

            fn resolve<'w>(
                registry: &ComponentRegistry,
                archetype: &'w Archetype,
                row: RowId,
            ) -> Option<Self::Refs<'w>> {
                Some(($(
                    {
                        let component_id = registry.id_of::<$ty>()?;
                        column_ref::<$ty>(archetype.column(component_id)?)?.get(row)?
                    },
                )+))
            }
        }
    };
}

impl_query_tuple!(A);
impl_query_tuple!(A, B);
impl_query_tuple!(A, B, C);
impl_query_tuple!(A, B, C, D);

impl World {
    /// Enumerates every live entity holding all components in `Q`, with
    /// borrows of its values.
    ///
    /// Results are served from the per-signature cache when its bound
    /// archetype is provably unchanged, patched incrementally after pure
    /// appends or removals, and rebuilt otherwise. Borrows are valid for the
    /// duration of the world borrow; the borrow checker forbids structural
    /// mutation while they are held.
    pub fn query<Q: QueryTuple>(&mut self) -> Vec<(Entity, Q::Refs<'_>)> {
        let ids = Q::component_ids(self);
        let mut sorted = ids;
        sorted.sort_unstable();
        sorted.dedup();
        let key = signature_key(&sorted);

        self.refresh_cache(key, &sorted);

        let cache = self
            .caches
            .get(&key)
            .expect("query cache entry exists after refresh");
        let mut results = Vec::with_capacity(cache.entities.len());
        for &entity in &cache.entities {
            let Some(record) = self.records.get(&entity.index()) else {
                continue;
            };
            let archetype = &self.archetypes[record.archetype as usize];
            let Some(refs) = Q::resolve(&self.components, archetype, record.row) else {
                continue;
            };
            results.push((entity, refs));
        }
        results
    }

    fn refresh_cache(&mut self, key: u64, ids: &[ComponentId]) {
        #[derive(Clone, Copy)]
        enum Plan {
            Serve,
            Append(ArchetypeId),
            Filter(ArchetypeId),
            Rebuild,
        }

        let plan = match self.caches.get(&key) {
            None => Plan::Rebuild,
            Some(cache) => match cache.archetype {
                Some(archetype_id)
                    if cache.matched == 1 && cache.table_len == self.archetypes.len() =>
                {
                    let archetype = &self.archetypes[archetype_id as usize];
                    let flags = archetype.flags_since(cache.seen);
                    if flags.is_clear() && cache.entity_count == archetype.entity_count() {
                        Plan::Serve
                    } else if flags == DirtyFlags::ADDED {
                        Plan::Append(archetype_id)
                    } else if flags == DirtyFlags::REMOVED {
                        Plan::Filter(archetype_id)
                    } else {
                        Plan::Rebuild
                    }
                }
                _ => Plan::Rebuild,
            },
        };

        match plan {
            Plan::Serve => {}
            Plan::Append(archetype_id) => {
                let archetype = &self.archetypes[archetype_id as usize];
                let cache = self.caches.get_mut(&key).expect("cache hit checked above");
                for &entity_index in &archetype.entities()[cache.entity_count..] {
                    let generation = self
                        .entities
                        .generation_of(entity_index)
                        .expect("archetype rows reference allocated entities");
                    cache.entities.push(Entity::encode(entity_index, generation));
                }
                cache.entity_count = archetype.entity_count();
                cache.seen.added = archetype.change_counts().added;
                log::trace!("query {key:#018x}: patched appended rows");
            }
            Plan::Filter(archetype_id) => {
                let archetype = &self.archetypes[archetype_id as usize];
                let cache = self.caches.get_mut(&key).expect("cache hit checked above");
                cache
                    .entities
                    .retain(|entity| archetype.row_of(entity.index()).is_some());
                cache.entity_count = archetype.entity_count();
                cache.seen.removed = archetype.change_counts().removed;
                log::trace!("query {key:#018x}: filtered removed rows");
            }
            Plan::Rebuild => self.rebuild_cache(key, ids),
        }
    }

    fn rebuild_cache(&mut self, key: u64, ids: &[ComponentId]) {
        let mut entities = Vec::new();
        let mut matched = 0usize;
        let mut bound: Option<ArchetypeId> = None;
        let mut bound_count = 0usize;
        let mut seen = ChangeCounts::default();

        for archetype in &self.archetypes {
            if !archetype.matches(ids) {
                continue;
            }

            // a rebuild observes the bound archetype in full
            matched += 1;
            bound = Some(archetype.id());
            bound_count = archetype.entity_count();
            seen = archetype.change_counts();

            for &entity_index in archetype.entities() {
                let generation = self
                    .entities
                    .generation_of(entity_index)
                    .expect("archetype rows reference allocated entities");
                entities.push(Entity::encode(entity_index, generation));
            }
        }

        log::trace!(
            "query {key:#018x}: rebuilt from {matched} archetypes, {} rows",
            entities.len()
        );

        let table_len = self.archetypes.len();
        self.caches.insert(
            key,
            QueryCache {
                archetype: bound,
                entity_count: bound_count,
                seen,
                matched,
                table_len,
                entities,
            },
        );
    }
}
