use crate::engine::types::{
    ArchetypeId, EntityId, Generation, RowId, INDEX_BITS, INDEX_CAP, INDEX_MASK,
};

/// Generation-tagged handle to a dynamic object.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Entity(pub EntityId);

#[inline]
const fn pack(index: u64, generation: Generation) -> EntityId {
    ((generation as EntityId) << INDEX_BITS) | (index & INDEX_MASK)
}

impl Entity {
    /// Packs an index and generation into a handle. Debug/test codec.
    #[inline]
    pub const fn encode(index: u64, generation: Generation) -> Entity {
        Entity(pack(index, generation))
    }

    /// The unmasked entity index.
    #[inline]
    pub const fn index(self) -> u64 {
        self.0 & INDEX_MASK
    }

    /// The generation this handle was issued under.
    #[inline]
    pub const fn generation(self) -> Generation {
        (self.0 >> INDEX_BITS) as Generation
    }
}

/// Non-owning reference to an entity's storage location, rewritten on every
/// structural move and erased on despawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Record {
    /// Archetype currently holding the entity's components.
    pub archetype: ArchetypeId,
    /// Dense row within that archetype.
    pub row: RowId,
}

/// Allocates and recycles entity indices, tracking a generation per slot so
/// stale handles are rejected everywhere.
#[derive(Default)]
pub struct EntityRegistry {
    generations: Vec<Generation>,
    alive: Vec<bool>,
    free: Vec<u64>,
    alive_count: u64,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a live entity, reusing a recycled index when one is pooled.
    ///
    /// Recycled indices carry the generation advanced at despawn, so handles
    /// issued before the recycle stay invalid.
    pub fn create(&mut self) -> Entity {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                let index = self.generations.len() as u64;
                assert!(index <= INDEX_CAP, "entity index space exhausted");
                self.generations.push(0);
                self.alive.push(false);
                index
            }
        };

        self.alive[index as usize] = true;
        self.alive_count += 1;
        Entity::encode(index, self.generations[index as usize])
    }

    /// Invalidates `entity` and returns its index to the pool.
    ///
    /// Stale or dead handles are a no-op; returns whether the despawn took
    /// effect.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        let index = entity.index() as usize;
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.alive[index] = false;
        self.alive_count -= 1;
        self.free.push(index as u64);
        true
    }

    /// Returns `true` if `entity` is live and its generation is current.
    pub fn is_alive(&self, entity: Entity) -> bool {
        let index = entity.index() as usize;
        index < self.generations.len()
            && self.alive[index]
            && self.generations[index] == entity.generation()
    }

    /// The stored generation for `index`, if the slot was ever allocated.
    #[inline]
    pub fn generation_of(&self, index: u64) -> Option<Generation> {
        self.generations.get(index as usize).copied()
    }

    /// Number of currently live entities.
    #[inline]
    pub fn alive_count(&self) -> u64 {
        self.alive_count
    }
}
