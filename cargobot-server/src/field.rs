use cargobot::core::pose;
use cargobot::device::sim::World;

/// Cargo on our half of the field, in meters.
const CARGO: [(f64, f64); 5] = [
    (7.59, 1.0),
    (7.59, 0.25),
    (6.4, 1.25),
    (5.6, 1.68),
    (5.1, 6.3),
];

/// Robot position before the match, in meters and degrees.
const START: (f64, f64, f64) = (7.59, 1.75, 90.0);

/// Construct the simulated field at the start of a match.
///
/// The robot holds one preloaded cargo.
pub fn world() -> World {
    let (x, y, heading) = START;

    CARGO.iter().fold(
        World::default().with_pose(pose(x, y, heading.to_radians())),
        |world, (x, y)| world.with_cargo(*x, *y),
    )
}
