//! Goal-seeking movement with barrier checks

use glam::Vec2;
use hecs::World;

use crate::ecs::{Actor, Navigation};
use crate::map::Map;

/// Move every navigating actor one tick toward its goal
pub fn movement_system(world: &mut World, map: &Map, dt: f32) {
    for (_, (actor, nav)) in world.query_mut::<(&mut Actor, &mut Navigation)>() {
        step_toward_goal(actor, nav, map, dt);
    }
}

/// Step `actor` toward its goal by at most `speed * dt`.
///
/// The move is only committed if the actor's center stays on the map and its
/// footprint at the new position is clear of barriers. The footprint may
/// hang over the map edge. A refused move leaves the position unchanged,
/// which the AI sees as being stuck.
pub fn step_toward_goal(actor: &mut Actor, nav: &mut Navigation, map: &Map, dt: f32) {
    actor.prev_position = actor.position;
    actor.velocity = Vec2::ZERO;
    nav.blocked = false;

    let to_goal = actor.goal - actor.position;
    let distance = to_goal.length();
    if distance <= nav.arrive_radius || nav.speed <= 0.0 {
        return;
    }

    let direction = to_goal / distance;
    let step = (nav.speed * dt).min(distance);
    let candidate = actor.position + direction * step;
    actor.forward = direction;

    if map.grid().world_to_cell(candidate).is_none()
        || map.collides_with_barrier(candidate, actor.width, actor.height)
    {
        log::trace!("Move to {candidate} blocked");
        nav.blocked = true;
        return;
    }

    actor.position = candidate;
    if dt > 0.0 {
        actor.velocity = direction * (step / dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{BARRIER, Grid};

    fn open_map() -> Map {
        Map::new(Grid::open(10, 10, Vec2::splat(100.0)).unwrap())
    }

    #[test]
    fn test_steps_toward_goal_at_speed() {
        let map = open_map();
        let mut actor = Actor::new(Vec2::new(20.0, 20.0), 4.0, 4.0);
        let mut nav = Navigation::new(10.0);
        actor.set_goal(Vec2::new(60.0, 20.0));

        step_toward_goal(&mut actor, &mut nav, &map, 0.5);

        assert_eq!(actor.position(), Vec2::new(25.0, 20.0));
        assert_eq!(actor.prev_position(), Vec2::new(20.0, 20.0));
        assert_eq!(actor.forward, Vec2::X);
        assert!((actor.velocity - Vec2::new(10.0, 0.0)).length() < 1e-4);
        assert!(!nav.blocked);
    }

    #[test]
    fn test_does_not_overshoot() {
        let map = open_map();
        let mut actor = Actor::new(Vec2::new(20.0, 20.0), 4.0, 4.0);
        let mut nav = Navigation::new(100.0);
        actor.set_goal(Vec2::new(23.0, 24.0));

        step_toward_goal(&mut actor, &mut nav, &map, 1.0);

        assert!(actor.reached_goal(1e-3));
        assert!(!actor.is_stuck());
    }

    #[test]
    fn test_stops_inside_arrive_radius() {
        let map = open_map();
        let mut actor = Actor::new(Vec2::new(20.0, 20.0), 4.0, 4.0);
        let mut nav = Navigation::new(100.0);
        actor.set_goal(Vec2::new(20.2, 20.0));

        step_toward_goal(&mut actor, &mut nav, &map, 1.0);

        assert_eq!(actor.position(), Vec2::new(20.0, 20.0));
        assert!(actor.is_stuck());
        assert!(!nav.blocked);
    }

    #[test]
    fn test_barrier_blocks_move() {
        let mut grid = Grid::open(10, 10, Vec2::splat(100.0)).unwrap();
        grid.set_cell(grid.index(3, 2).unwrap(), BARRIER);
        let map = Map::new(grid);
        let mut actor = Actor::new(Vec2::new(25.0, 25.0), 4.0, 4.0);
        let mut nav = Navigation::new(10.0);
        actor.set_goal(Vec2::new(45.0, 25.0));

        // 25 -> 27 leaves the footprint touching x = 29, still clear
        step_toward_goal(&mut actor, &mut nav, &map, 0.2);
        assert_eq!(actor.position(), Vec2::new(27.0, 25.0));

        // 27 -> 29 would reach into the barrier cell at x >= 30
        step_toward_goal(&mut actor, &mut nav, &map, 0.2);
        assert_eq!(actor.position(), Vec2::new(27.0, 25.0));
        assert!(nav.blocked);
        assert!(actor.is_stuck());
        assert_eq!(actor.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_footprint_may_overhang_map_edge() {
        let map = open_map();
        let mut actor = Actor::new(Vec2::new(5.0, 5.0), 32.0, 32.0);
        let mut nav = Navigation::new(10.0);
        actor.set_goal(Vec2::new(-20.0, 5.0));

        // Center lands on the edge, half the footprint hangs off the map
        step_toward_goal(&mut actor, &mut nav, &map, 0.5);
        assert!(!nav.blocked);
        assert_eq!(actor.position(), Vec2::new(0.0, 5.0));

        // The center itself can't leave
        step_toward_goal(&mut actor, &mut nav, &map, 0.5);
        assert!(nav.blocked);
        assert_eq!(actor.position(), Vec2::new(0.0, 5.0));
    }

    #[test]
    fn test_system_moves_only_navigating_actors() {
        let map = open_map();
        let mut world = World::new();
        let mut walker = Actor::new(Vec2::new(20.0, 20.0), 4.0, 4.0);
        walker.set_goal(Vec2::new(20.0, 60.0));
        let mut statue = Actor::new(Vec2::new(50.0, 50.0), 4.0, 4.0);
        statue.set_goal(Vec2::new(90.0, 50.0));
        let walker = world.spawn((walker, Navigation::new(20.0)));
        let statue = world.spawn((statue,));

        movement_system(&mut world, &map, 0.5);

        assert_eq!(
            world.get::<&Actor>(walker).unwrap().position(),
            Vec2::new(20.0, 30.0)
        );
        assert_eq!(
            world.get::<&Actor>(statue).unwrap().position(),
            Vec2::new(50.0, 50.0)
        );
    }
}
