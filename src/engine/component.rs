//! Component registry: stable runtime ids and column factories per type.
//!
//! The registry assigns a compact [`ComponentId`] to each distinct Rust type
//! on first use and records the metadata archetypes need to allocate and
//! describe storage for it: type name, size, alignment, and a factory that
//! produces an empty column of the right element type.
//!
//! ## Design
//!
//! - Components register lazily: the first `id_for::<T>()` call allocates
//!   the next id; later calls return the same id.
//! - Ids are assigned monotonically and are stable for the registry's
//!   lifetime. There is no removal.
//! - The registry is owned by its `World`. Two worlds may assign different
//!   ids to the same type; ids must never be carried across worlds.
//!
//! ## Invariants
//!
//! - `infos[id]` exists if and only if id `id` has been assigned.
//! - Every entry in `by_type` has a matching `infos[id]` with the same
//!   `TypeId`.
//! - Ids stay below [`COMPONENT_CAP`]; exceeding the cap is a fatal
//!   assertion, not a recoverable error.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::mem::{align_of, size_of};

use crate::engine::storage::{Column, TypedColumn};
use crate::engine::types::{ComponentId, COMPONENT_CAP};

/// Factory function producing an empty column for a component type.
type ColumnFactory = fn() -> Box<dyn Column>;

fn new_typed_column<T: 'static>() -> Box<dyn Column> {
    Box::new(TypedColumn::<T>::new())
}

/// Describes a registered component type.
#[derive(Clone)]
pub struct ComponentInfo {
    /// Runtime identifier assigned to this component type.
    pub id: ComponentId,

    /// Rust type name for diagnostics.
    pub name: &'static str,

    /// Runtime `TypeId` of the component.
    pub type_id: TypeId,

    /// Size of the component type in bytes.
    pub size: usize,

    /// Alignment of the component type in bytes.
    pub align: usize,

    new_column: ColumnFactory,
}

impl ComponentInfo {
    fn of<T: 'static>(id: ComponentId) -> Self {
        Self {
            id,
            name: type_name::<T>(),
            type_id: TypeId::of::<T>(),
            size: size_of::<T>(),
            align: align_of::<T>(),
            new_column: new_typed_column::<T>,
        }
    }

    /// Allocates an empty column for this component type.
    #[inline]
    pub fn new_column(&self) -> Box<dyn Column> {
        (self.new_column)()
    }

    /// Returns `true` if this descriptor refers to type `T`.
    #[inline]
    pub fn matches_type<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl fmt::Debug for ComponentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInfo")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("size", &self.size)
            .field("align", &self.align)
            .finish()
    }
}

impl fmt::Display for ComponentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ComponentInfo {{ id: {}, name: {}, size: {}, align: {} }}",
            self.id, self.name, self.size, self.align
        )
    }
}

/// Mapping between Rust component types and compact [`ComponentId`] values,
/// scoped to one world.
#[derive(Default)]
pub struct ComponentRegistry {
    by_type: HashMap<TypeId, ComponentId>,
    infos: Vec<ComponentInfo>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `T`, registering it on first use.
    ///
    /// ## Panics
    /// Panics if [`COMPONENT_CAP`] distinct types have already been
    /// registered.
    pub fn id_for<T: 'static>(&mut self) -> ComponentId {
        let type_id = TypeId::of::<T>();
        if let Some(&existing) = self.by_type.get(&type_id) {
            return existing;
        }

        let next = self.infos.len();
        assert!(next < COMPONENT_CAP, "component capacity exceeded ({COMPONENT_CAP} types)");

        let id = next as ComponentId;
        self.by_type.insert(type_id, id);
        self.infos.push(ComponentInfo::of::<T>(id));
        log::debug!("registered component {} as id {}", type_name::<T>(), id);
        id
    }

    /// Returns the id for `T` without registering it.
    #[inline]
    pub fn id_of<T: 'static>(&self) -> Option<ComponentId> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the descriptor for `component_id`, if registered.
    #[inline]
    pub fn info(&self, component_id: ComponentId) -> Option<&ComponentInfo> {
        self.infos.get(component_id as usize)
    }

    /// Number of registered component types.
    #[inline]
    pub fn count(&self) -> usize {
        self.infos.len()
    }

    /// Allocates an empty column for `component_id`.
    ///
    /// ## Panics
    /// Panics if `component_id` was never registered; archetypes can only be
    /// built over registered components.
    pub fn new_column(&self, component_id: ComponentId) -> Box<dyn Column> {
        self.info(component_id)
            .expect("component must be registered before its archetype is created")
            .new_column()
    }
}
