//! Occupancy system - who stands in which room, taken before anyone moves

use hecs::World;
use wayfinder_logic::graph::NavGraph;
use wayfinder_logic::weighting::Occupancy;

use crate::components::{Navigator, Walker};

/// Count walkers per room. Walkers outside every room are not counted.
pub fn occupancy_system(world: &World, graph: &NavGraph) -> Occupancy {
    let mut occupancy = Occupancy::new();
    for (_entity, (walker, navigator)) in world.query::<(&Walker, &Navigator)>().iter() {
        // The planning room is the likeliest hit
        if let Some(room) = graph.locate(walker.0.position, &[navigator.0.current_room()]) {
            occupancy.add(room);
        }
    }
    occupancy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GridLayout;
    use wayfinder_logic::geometry::Vec2;
    use wayfinder_logic::navigation::{NavigationMachine, Pedestrian};
    use wayfinder_logic::strategy::Pursuing;

    fn spawn(world: &mut World, x: f64, y: f64) {
        let pedestrian = Pedestrian::new(Vec2::new(x, y), 0.25, 1.0);
        let machine = NavigationMachine::new(Pursuing::new(Vec2::ZERO));
        world.spawn((Walker(pedestrian), Navigator(machine)));
    }

    #[test]
    fn test_counts_per_room() {
        let layout = GridLayout::new(2, 1, 10.0);
        let g = layout.open_grid().unwrap();
        let mut world = World::new();
        spawn(&mut world, 2.0, 2.0);
        spawn(&mut world, 8.0, 3.0);
        spawn(&mut world, 15.0, 5.0);
        spawn(&mut world, 50.0, 50.0);

        let occupancy = occupancy_system(&world, &g);
        assert_eq!(occupancy.count(layout.room((0, 0))), 2);
        assert_eq!(occupancy.count(layout.room((1, 0))), 1);
        assert_eq!(occupancy.total(), 3);
    }
}
