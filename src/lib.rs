//! # loam
//!
//! Archetype-based entity/component storage and query engine.
//!
//! Typed, fixed-size components attach to generation-tagged entities;
//! entities migrate between archetypes (structural storage groups, one per
//! distinct component set) as components are attached and removed, and
//! queries enumerate every entity holding a given component-type set once
//! per simulation step, served from a dirty-tracked per-signature cache.
//!
//! ## Design goals
//! - Columnar (structure-of-arrays) storage for cache efficiency
//! - Generation-tagged handles: stale references soft-fail everywhere
//! - Lazily grown archetype graph with order-independent signatures
//! - Incrementally patched query caches, rebuilt only when required
//! - Safe, explicit data access: borrows instead of raw pointers
//!
//! ## Example
//! ```
//! use loam::prelude::*;
//!
//! #[derive(Debug, PartialEq)]
//! struct Position { x: f32, y: f32, z: f32 }
//! #[derive(Debug, PartialEq)]
//! struct Velocity { x: f32, y: f32, z: f32 }
//!
//! let mut world = World::new();
//! let e = world.entity();
//! world
//!     .set(e, Position { x: 1.0, y: 2.0, z: 3.0 })
//!     .set(e, Velocity { x: 10.0, y: 20.0, z: 30.0 });
//!
//! for (entity, (position, velocity)) in world.query::<(Position, Velocity)>() {
//!     assert_eq!(entity, e);
//!     assert_eq!(position.x + velocity.x, 11.0);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod engine;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

pub use engine::world::World;

pub use engine::entity::{Entity, EntityRegistry, Record};

pub use engine::archetype::{Archetype, ChangeCounts};

pub use engine::component::{ComponentInfo, ComponentRegistry};

pub use engine::query::QueryTuple;

pub use engine::storage::{column_mut, column_ref, Column, TypedColumn};

pub use engine::error::{ColumnError, RowOutOfBoundsError, TypeMismatchError};

pub use engine::types::{
    ArchetypeId, ComponentId, DirtyFlags, EntityId, Generation, RowId, Signature,
};

// ─────────────────────────────────────────────────────────────────────────────
// Prelude
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used types.
///
/// Import with:
/// ```rust
/// use loam::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Entity, QueryTuple, World};
}
