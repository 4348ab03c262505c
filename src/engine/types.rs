//! Core identifiers, entity bit layout, signatures, and dirty flags.
//!
//! This module defines the fundamental types shared across all subsystems of
//! the engine: entity handles, component and archetype identifiers, the
//! canonical component-set [`Signature`], and the per-archetype [`DirtyFlags`].
//!
//! ## Entity representation
//!
//! Entities are encoded as a packed 64-bit integer:
//!
//! ```text
//! | generation (16 bits) | index (48 bits) |
//! ```
//!
//! - **Index** identifies the entity's slot in the registry.
//! - **Generation** detects stale handles after a slot is recycled.
//!
//! Bit widths are compile-time constants validated by static assertions.
//!
//! ## Signatures
//!
//! A [`Signature`] is the canonical identity of an archetype: the sorted,
//! deduplicated set of component ids it stores. Signatures hash with an
//! order-independent FNV-1a over the sorted id bytes, so `{1, 2, 3}` and
//! `{3, 1, 2}` resolve to the same archetype regardless of the order in
//! which components were attached. The empty set hashes to `0`, which is the
//! key of the root archetype.

/// Bit-width type used for compile-time layout calculations.
pub type Bits = u8;

/// Packed 64-bit entity handle value.
pub type EntityId = u64;
/// Generation counter used to detect stale entity handles.
pub type Generation = u16;

/// Compact identifier for a registered component type.
pub type ComponentId = u16;
/// Index of an archetype in the world's archetype table.
pub type ArchetypeId = u16;
/// Dense row index within an archetype.
pub type RowId = u32;

/// Total number of bits in an [`EntityId`].
pub const ENTITY_BITS: Bits = 64;
/// Number of bits reserved for the generation counter.
pub const GENERATION_BITS: Bits = 16;
/// Number of bits reserved for the entity index.
pub const INDEX_BITS: Bits = ENTITY_BITS - GENERATION_BITS;

const _: [(); 1] = [(); (GENERATION_BITS < ENTITY_BITS) as usize];
const _: [(); 1] = [(); (INDEX_BITS > 0) as usize];
const _: [(); 1] = [(); (INDEX_BITS < ENTITY_BITS) as usize];

const fn mask(bits: Bits) -> u64 {
    if bits == 0 { 0 } else { (1u64 << bits) - 1 }
}

/// Mask selecting the index portion of an [`EntityId`].
pub const INDEX_MASK: u64 = mask(INDEX_BITS);
/// Largest entity index the handle layout can represent.
pub const INDEX_CAP: u64 = INDEX_MASK;

/// Maximum number of registered component types per world.
pub const COMPONENT_CAP: usize = 4096;

/// Rows reserved by a column on its first append.
pub const COLUMN_MIN_RESERVE: usize = 16;

/* FNV-1a hash parameters */
const FNV_PRIME: u64 = 1_099_511_628_211;
const FNV_OFFSET_BASIS: u64 = 14_695_981_039_346_656_037;

/// Hashes a sorted component-id set with FNV-1a.
///
/// The empty set hashes to `0`. Callers must pass ids in canonical (sorted,
/// deduplicated) order; [`Signature`] maintains that order internally.
pub fn signature_key(ids: &[ComponentId]) -> u64 {
    if ids.is_empty() {
        return 0;
    }

    let mut hash = FNV_OFFSET_BASIS;
    for id in ids {
        for byte in id.to_le_bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash
}

/// Canonical (sorted, deduplicated) component-id set identifying an archetype.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Signature {
    ids: Vec<ComponentId>,
}

impl Signature {
    /// Returns the empty signature (the root archetype's identity).
    #[inline]
    pub fn empty() -> Self {
        Self { ids: Vec::new() }
    }

    /// Builds a canonical signature from an arbitrary id list.
    pub fn from_ids(ids: &[ComponentId]) -> Self {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        Self { ids }
    }

    /// Returns `true` if `component_id` is a member of this signature.
    #[inline]
    pub fn has(&self, component_id: ComponentId) -> bool {
        self.ids.binary_search(&component_id).is_ok()
    }

    /// Returns the column position of `component_id`, if present.
    #[inline]
    pub fn position(&self, component_id: ComponentId) -> Option<usize> {
        self.ids.binary_search(&component_id).ok()
    }

    /// Returns this signature extended with `component_id`.
    pub fn with(&self, component_id: ComponentId) -> Self {
        match self.ids.binary_search(&component_id) {
            Ok(_) => self.clone(),
            Err(at) => {
                let mut ids = self.ids.clone();
                ids.insert(at, component_id);
                Self { ids }
            }
        }
    }

    /// Returns this signature with `component_id` removed.
    pub fn without(&self, component_id: ComponentId) -> Self {
        match self.ids.binary_search(&component_id) {
            Err(_) => self.clone(),
            Ok(at) => {
                let mut ids = self.ids.clone();
                ids.remove(at);
                Self { ids }
            }
        }
    }

    /// Returns `true` if every id in `other` is present in this signature.
    pub fn contains_all(&self, other: &Signature) -> bool {
        other.ids.iter().all(|&id| self.has(id))
    }

    /// The member ids in canonical order.
    #[inline]
    pub fn ids(&self) -> &[ComponentId] {
        &self.ids
    }

    /// Number of member ids.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if the signature has no members.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Order-independent hash key of this signature (empty set keys to `0`).
    #[inline]
    pub fn key(&self) -> u64 {
        signature_key(&self.ids)
    }
}

/// Bits marking the kinds of change an archetype has seen since a given
/// observation point.
///
/// Archetypes track monotonic change counters; a query derives these bits by
/// comparing the counters against its own last-observed snapshot, so two
/// queries watching the same archetype never clear each other's view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirtyFlags(u8);

impl DirtyFlags {
    /// No pending changes.
    pub const NONE: DirtyFlags = DirtyFlags(0);
    /// Rows were appended.
    pub const ADDED: DirtyFlags = DirtyFlags(1 << 0);
    /// Rows were removed.
    pub const REMOVED: DirtyFlags = DirtyFlags(1 << 1);
    /// A stored value was overwritten in place.
    pub const UPDATED: DirtyFlags = DirtyFlags(1 << 2);

    /// Returns `true` if no flag is set.
    #[inline]
    pub fn is_clear(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if any bit of `flag` is set.
    #[inline]
    pub fn intersects(self, flag: DirtyFlags) -> bool {
        self.0 & flag.0 != 0
    }
}

impl std::ops::BitOr for DirtyFlags {
    type Output = DirtyFlags;

    #[inline]
    fn bitor(self, rhs: DirtyFlags) -> DirtyFlags {
        DirtyFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for DirtyFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: DirtyFlags) {
        self.0 |= rhs.0;
    }
}
