use loam::prelude::*;
use loam::ComponentId;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Velocity {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Health {
    value: i32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Tag;

fn component_ids(world: &mut World) -> (ComponentId, ComponentId, ComponentId, ComponentId) {
    (
        world.component_id::<Position>(),
        world.component_id::<Velocity>(),
        world.component_id::<Health>(),
        world.component_id::<Tag>(),
    )
}

#[test]
fn archetype_identity_ignores_attachment_order() {
    let mut world = World::new();
    let (a, b, c, d) = component_ids(&mut world);

    let created = world.create_archetype(&[a, b, c]);
    let archetype = world.archetype(created).unwrap();
    assert!(archetype.has(a));
    assert!(archetype.has(b));
    assert!(archetype.has(c));
    assert!(!archetype.has(d));

    assert_eq!(world.find_archetype(&[a, b, c]), Some(created));
    assert_eq!(world.find_archetype(&[c, a, b]), Some(created));
    assert_eq!(world.find_archetype(&[b, c, a]), Some(created));

    // not created yet
    assert_eq!(world.find_archetype(&[a, b, d]), None);

    let other = world.create_archetype(&[a, b, d]);
    assert_ne!(other, created);
    assert_eq!(world.find_archetype(&[d, b, a]), Some(other));
}

#[test]
fn root_archetype_has_the_empty_signature() {
    let mut world = World::new();
    let root = world.find_archetype(&[]).expect("root exists from construction");
    assert!(world.archetype(root).unwrap().signature().is_empty());
    assert_eq!(world.create_archetype(&[]), root);
}

#[test]
fn transitions_resolve_and_create_lazily() {
    let mut world = World::new();
    let (a, b, _, _) = component_ids(&mut world);

    let source = world.create_archetype(&[a]);

    let with_b = world.find_archetype_with(source, b);
    let with_b_archetype = world.archetype(with_b).unwrap();
    assert!(with_b_archetype.has(a));
    assert!(with_b_archetype.has(b));

    // the transition is stable
    assert_eq!(world.find_archetype_with(source, b), with_b);
    assert_eq!(world.find_archetype(&[a, b]), Some(with_b));

    let without_b = world.find_archetype_without(with_b, b);
    assert_eq!(without_b, source);
    assert!(!world.archetype(without_b).unwrap().has(b));

    // adding an id the source already has resolves to the source itself
    assert_eq!(world.find_archetype_with(source, a), source);
}

#[test]
fn set_migrates_between_archetypes() {
    let mut world = World::new();
    let (a, b, _, _) = component_ids(&mut world);

    let entity = world.entity();
    world.set(entity, Position { x: 1.0, y: 2.0, z: 3.0 });

    let only_position = world.find_archetype(&[a]).unwrap();
    assert_eq!(world.archetype(only_position).unwrap().entity_count(), 1);

    world.set(entity, Velocity { x: 10.0, y: 20.0, z: 30.0 });

    let both = world.find_archetype(&[a, b]).unwrap();
    assert_eq!(world.archetype(only_position).unwrap().entity_count(), 0);
    assert_eq!(world.archetype(both).unwrap().entity_count(), 1);
    assert_eq!(world.get::<Position>(entity), Some(&Position { x: 1.0, y: 2.0, z: 3.0 }));

    // the emptied archetype survives for reuse
    assert!(world.find_archetype(&[a]).is_some());
}

#[test]
fn move_entity_transfers_shared_values() {
    let mut world = World::new();
    let (a, b, c, _) = component_ids(&mut world);

    let entity = world.entity();
    world
        .set(entity, Position { x: 42.0, y: 0.0, z: 0.0 })
        .set(entity, Velocity { x: 99.0, y: 0.0, z: 0.0 });

    let source = world.find_archetype(&[a, b]).unwrap();
    let destination = world.create_archetype(&[a, c]);

    world.move_entity(entity, destination);

    assert_eq!(world.archetype(source).unwrap().entity_count(), 0);
    assert_eq!(world.archetype(destination).unwrap().entity_count(), 1);

    // the shared column moved, the source-only column was dropped
    assert_eq!(world.get::<Position>(entity), Some(&Position { x: 42.0, y: 0.0, z: 0.0 }));
    assert!(!world.has::<Velocity>(entity));

    // the destination-only column is unfilled until a value is pushed
    assert!(world.get::<Health>(entity).is_none());
    world.set(entity, Health { value: 7 });
    assert_eq!(world.get::<Health>(entity), Some(&Health { value: 7 }));
}

#[test]
fn swap_removal_keeps_surviving_rows_addressable() {
    let mut world = World::new();

    let entities: Vec<Entity> = (0..4)
        .map(|i| {
            let e = world.entity();
            world.set(e, Health { value: i });
            e
        })
        .collect();

    // removing the first row swaps the last into its place
    world.despawn(entities[0]);

    for (i, &e) in entities.iter().enumerate().skip(1) {
        assert_eq!(world.get::<Health>(e), Some(&Health { value: i as i32 }));
    }
}
