use loam::prelude::*;

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

fn position(x: f32) -> Position {
    Position { x, y: 0.0, z: 0.0 }
}

fn velocity(y: f32) -> Velocity {
    Velocity { x: 0.0, y, z: 0.0 }
}

#[test]
fn query_counts_one_archetype() {
    let mut world = World::new();
    for i in 0..5 {
        let e = world.entity();
        world.set(e, position(i as f32)).set(e, velocity(i as f32));
    }

    assert_eq!(world.query::<(Position, Velocity)>().len(), 5);
    assert_eq!(world.query::<(Velocity, Position)>().len(), 5);
}

#[test]
fn query_counts_across_archetypes() {
    let mut world = World::new();

    for i in 0..5 {
        let e = world.entity();
        world.set(e, position(i as f32));
    }
    for i in 0..3 {
        let e = world.entity();
        world.set(e, position(i as f32)).set(e, velocity(i as f32));
    }
    for i in 0..2 {
        let e = world.entity();
        world.set(e, position(i as f32)).set(e, Health { value: i * 10 });
    }
    for i in 0..4 {
        let e = world.entity();
        world
            .set(e, position(i as f32))
            .set(e, velocity(i as f32))
            .set(e, Health { value: i * 20 });
    }

    assert_eq!(world.query::<(Position,)>().len(), 5 + 3 + 2 + 4);
    assert_eq!(world.query::<(Position, Velocity)>().len(), 3 + 4);
    assert_eq!(world.query::<(Position, Health)>().len(), 2 + 4);
    assert_eq!(world.query::<(Position, Velocity, Health)>().len(), 4);
}

#[test]
fn query_yields_entities_and_values() {
    let mut world = World::new();
    let e = world.entity();
    world.set(e, position(1.0)).set(e, velocity(10.0));

    let results = world.query::<(Position, Velocity)>();
    assert_eq!(results.len(), 1);

    let (entity, (p, v)) = results[0];
    assert_eq!(entity, e);
    assert_eq!(p.x, 1.0);
    assert_eq!(v.y, 10.0);

    // tuple order is independent of archetype layout
    let results = world.query::<(Velocity, Position)>();
    let (_, (v, p)) = results[0];
    assert_eq!(v.y, 10.0);
    assert_eq!(p.x, 1.0);
}

#[test]
fn large_scan_with_modulo_components() {
    let mut world = World::new();
    for i in 0..1000 {
        let e = world.entity();
        world.set(e, position(i as f32));
        if i % 3 == 0 {
            world.set(e, velocity(i as f32));
        }
        if i % 5 == 0 {
            world.set(e, Health { value: i });
        }
    }

    assert_eq!(world.query::<(Position,)>().len(), 1000);
    assert_eq!(world.query::<(Position, Velocity)>().len(), 334);
    assert_eq!(world.query::<(Position, Health)>().len(), 200);
    assert_eq!(world.query::<(Position, Velocity, Health)>().len(), 67);
}

#[test]
fn migration_scenario_preserves_values() {
    let mut world = World::new();
    let e = world.entity();
    world.set(e, Position { x: 1.0, y: 2.0, z: 3.0 });
    world.set(e, Velocity { x: 10.0, y: 20.0, z: 30.0 });

    let results = world.query::<(Position, Velocity)>();
    assert_eq!(results.len(), 1);
    let (_, (p, v)) = results[0];
    assert_eq!(*p, Position { x: 1.0, y: 2.0, z: 3.0 });
    assert_eq!(*v, Velocity { x: 10.0, y: 20.0, z: 30.0 });
}

#[test]
fn cached_query_tracks_additions() {
    let mut world = World::new();
    for i in 0..10 {
        let e = world.entity();
        world.set(e, position(i as f32)).set(e, velocity(i as f32));
    }
    assert_eq!(world.query::<(Position, Velocity)>().len(), 10);

    // pure appends take the incremental patch path
    for i in 10..25 {
        let e = world.entity();
        world.set(e, position(i as f32)).set(e, velocity(i as f32));
    }
    let results = world.query::<(Position, Velocity)>();
    assert_eq!(results.len(), 25);

    let mut xs: Vec<f32> = results.iter().map(|(_, (p, _))| p.x).collect();
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(xs, (0..25).map(|i| i as f32).collect::<Vec<_>>());
}

#[test]
fn cached_query_tracks_removals() {
    let mut world = World::new();
    let entities: Vec<Entity> = (0..10)
        .map(|i| {
            let e = world.entity();
            world.set(e, position(i as f32)).set(e, velocity(i as f32));
            e
        })
        .collect();
    assert_eq!(world.query::<(Position, Velocity)>().len(), 10);

    // pure removals take the filtering patch path
    for &e in &entities[..4] {
        world.despawn(e);
    }
    let results = world.query::<(Position, Velocity)>();
    assert_eq!(results.len(), 6);
    for (entity, _) in &results {
        assert!(entities[4..].contains(entity));
    }
}

#[test]
fn cached_query_observes_updates() {
    let mut world = World::new();
    let e = world.entity();
    world.set(e, position(1.0)).set(e, velocity(1.0));
    assert_eq!(world.query::<(Position, Velocity)>()[0].1 .0.x, 1.0);

    // in-place overwrite marks UPDATED and forces a rebuild
    world.set(e, position(2.0));
    assert_eq!(world.query::<(Position, Velocity)>()[0].1 .0.x, 2.0);

    world.get_mut::<Position>(e).unwrap().x = 3.0;
    assert_eq!(world.query::<(Position, Velocity)>()[0].1 .0.x, 3.0);
}

#[test]
fn cached_query_survives_mixed_mutations() {
    let mut world = World::new();
    let entities: Vec<Entity> = (0..8)
        .map(|i| {
            let e = world.entity();
            world.set(e, position(i as f32)).set(e, velocity(i as f32));
            e
        })
        .collect();
    assert_eq!(world.query::<(Position, Velocity)>().len(), 8);

    // interleave removals and additions before the next observation
    world.despawn(entities[0]);
    world.despawn(entities[3]);
    let e = world.entity();
    world.set(e, position(100.0)).set(e, velocity(100.0));

    assert_eq!(world.query::<(Position, Velocity)>().len(), 7);
}

#[test]
fn queries_with_distinct_signatures_do_not_disturb_each_other() {
    let mut world = World::new();
    let entities: Vec<Entity> = (0..6)
        .map(|i| {
            let e = world.entity();
            world.set(e, position(i as f32)).set(e, velocity(i as f32));
            e
        })
        .collect();

    // both signatures bind the same archetype
    assert_eq!(world.query::<(Position,)>().len(), 6);
    assert_eq!(world.query::<(Position, Velocity)>().len(), 6);

    world.despawn(entities[1]);
    assert_eq!(world.query::<(Position,)>().len(), 5);

    // the first query's observation must not hide the removal from the second
    assert_eq!(world.query::<(Position, Velocity)>().len(), 5);

    let e = world.entity();
    world.set(e, position(50.0)).set(e, velocity(50.0));
    assert_eq!(world.query::<(Position, Velocity)>().len(), 6);
    assert_eq!(world.query::<(Position,)>().len(), 6);
}

#[test]
fn multi_archetype_signatures_stay_exact() {
    let mut world = World::new();

    // Position+Velocity entities live in two archetypes
    for i in 0..3 {
        let e = world.entity();
        world.set(e, position(i as f32)).set(e, velocity(i as f32));
    }
    let upgraded: Vec<Entity> = (0..4)
        .map(|i| {
            let e = world.entity();
            world
                .set(e, position(i as f32))
                .set(e, velocity(i as f32))
                .set(e, Health { value: i });
            e
        })
        .collect();

    assert_eq!(world.query::<(Position, Velocity)>().len(), 7);

    // mutations in either matching archetype are reflected immediately
    world.despawn(upgraded[0]);
    assert_eq!(world.query::<(Position, Velocity)>().len(), 6);

    world.remove::<Health>(upgraded[1]);
    assert_eq!(world.query::<(Position, Velocity)>().len(), 6);
    assert_eq!(world.query::<(Position, Velocity, Health)>().len(), 2);
}

#[test]
fn despawn_half_then_respawn_restores_population() {
    let mut world = World::new();
    let n = 100;

    let entities: Vec<Entity> = (0..n)
        .map(|i| {
            let e = world.entity();
            world.set(e, position(i as f32));
            e
        })
        .collect();
    assert_eq!(world.query::<(Position,)>().len(), n);

    for &e in &entities[..n / 2] {
        world.despawn(e);
    }
    assert_eq!(world.query::<(Position,)>().len(), n / 2);
    assert_eq!(world.alive_count(), (n / 2) as u64);

    for i in 0..n / 2 {
        let e = world.entity();
        world.set(e, position(i as f32));
    }
    assert_eq!(world.query::<(Position,)>().len(), n);
    assert_eq!(world.alive_count(), n as u64);
}

#[test]
fn query_after_despawn_skips_stale_rows() {
    let mut world = World::new();
    let keep = world.entity();
    let kill = world.entity();
    world.set(keep, position(1.0));
    world.set(kill, position(2.0));

    assert_eq!(world.query::<(Position,)>().len(), 2);
    world.despawn(kill);

    let results = world.query::<(Position,)>();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0, keep);
}
