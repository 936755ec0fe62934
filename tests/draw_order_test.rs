use cgmath::{MetricSpace, Point3};
use render_lessons::render::{Renderable, resolve_draw_order};

#[derive(Debug)]
struct Item {
    name: &'static str,
    position: Point3<f32>,
    transparent: bool,
}

impl Item {
    fn opaque(name: &'static str, x: f32, y: f32, z: f32) -> Self {
        Self {
            name,
            position: Point3::new(x, y, z),
            transparent: false,
        }
    }

    fn transparent(name: &'static str, x: f32, y: f32, z: f32) -> Self {
        Self {
            transparent: true,
            ..Self::opaque(name, x, y, z)
        }
    }
}

impl Renderable for Item {
    fn position(&self) -> Point3<f32> {
        self.position
    }

    fn is_transparent(&self) -> bool {
        self.transparent
    }
}

fn names(items: &[Item], order: &[usize]) -> Vec<&'static str> {
    order.iter().map(|&i| items[i].name).collect()
}

/// A mixed registry with opaque and transparent items scattered around.
fn scattered() -> Vec<Item> {
    let mut items = Vec::new();
    for i in 0..24 {
        let f = i as f32;
        let (x, y, z) = ((f * 7.3) % 11.0 - 5.0, (f * 3.1) % 4.0, (f * 5.7) % 13.0 - 6.0);
        if i % 3 == 0 {
            items.push(Item::opaque("opaque", x, y, z));
        } else {
            items.push(Item::transparent("transparent", x, y, z));
        }
    }
    items
}

#[test]
fn transparent_items_are_drawn_back_to_front_after_opaque_ones() {
    let items = [
        Item::opaque("A", 0.0, 0.0, 0.0),
        Item::transparent("B", 0.0, 0.0, 5.0),
        Item::transparent("C", 0.0, 0.0, 2.0),
    ];
    let order = resolve_draw_order(&items, Point3::new(0.0, 0.0, 0.0), true);
    assert_eq!(names(&items, &order), ["A", "B", "C"]);
}

#[test]
fn disabled_sorting_keeps_registry_order() {
    let items = scattered();
    let order = resolve_draw_order(&items, Point3::new(1.0, 2.0, 3.0), false);
    assert_eq!(order, (0..items.len()).collect::<Vec<_>>());
}

#[test]
fn every_opaque_item_precedes_every_transparent_one() {
    let items = scattered();
    let order = resolve_draw_order(&items, Point3::new(3.0, 3.0, 3.0), true);
    let first_transparent = order
        .iter()
        .position(|&i| items[i].transparent)
        .unwrap_or(order.len());
    assert!(order[first_transparent..].iter().all(|&i| items[i].transparent));
    assert!(order[..first_transparent].iter().all(|&i| !items[i].transparent));
}

#[test]
fn distances_are_monotonic_within_each_class() {
    let items = scattered();
    for camera in [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(3.0, 3.0, 3.0),
        Point3::new(-8.0, 1.0, 4.0),
    ] {
        let order = resolve_draw_order(&items, camera, true);
        let distance = |i: usize| items[i].position.distance2(camera);

        let (opaque, transparent): (Vec<usize>, Vec<usize>) =
            order.iter().partition(|&&i| !items[i].transparent);
        assert!(opaque.windows(2).all(|w| distance(w[0]) <= distance(w[1])));
        assert!(transparent.windows(2).all(|w| distance(w[0]) >= distance(w[1])));
    }
}

#[test]
fn ordering_is_a_permutation() {
    let items = scattered();
    let mut order = resolve_draw_order(&items, Point3::new(2.0, 0.5, -1.0), true);
    order.sort_unstable();
    assert_eq!(order, (0..items.len()).collect::<Vec<_>>());
}

#[test]
fn ties_keep_registry_order() {
    let items = [
        Item::transparent("east", 2.0, 0.0, 0.0),
        Item::transparent("north", 0.0, 0.0, -2.0),
        Item::transparent("west", -2.0, 0.0, 0.0),
        Item::transparent("near", 0.0, 0.0, 1.0),
    ];
    let order = resolve_draw_order(&items, Point3::new(0.0, 0.0, 0.0), true);
    assert_eq!(names(&items, &order), ["east", "north", "west", "near"]);
}

#[test]
fn nan_positions_keep_the_order_total() {
    let mut items = Vec::new();
    for i in 0..200 {
        let z = if i % 7 == 0 { f32::NAN } else { (i % 23) as f32 - 11.0 };
        if i % 4 == 0 {
            items.push(Item::opaque("opaque", 0.5, 0.0, z));
        } else {
            items.push(Item::transparent("transparent", 0.5, 0.0, z));
        }
    }
    let camera = Point3::new(0.0, 0.0, 0.0);
    let order = resolve_draw_order(&items, camera, true);

    let mut sorted = order.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..items.len()).collect::<Vec<_>>());

    let (opaque, transparent): (Vec<usize>, Vec<usize>) =
        order.iter().partition(|&&i| !items[i].transparent);
    assert_eq!(order[..opaque.len()], opaque[..]);

    // Finite distances stay monotonic around the NaN entries.
    let finite = |run: &[usize]| -> Vec<f32> {
        run.iter()
            .map(|&i| items[i].position.distance2(camera))
            .filter(|d| !d.is_nan())
            .collect()
    };
    assert!(finite(&opaque).windows(2).all(|w| w[0] <= w[1]));
    assert!(finite(&transparent).windows(2).all(|w| w[0] >= w[1]));
}
