//! Sample hunt game
//!
//! A stationary player and a group of enemies that patrol the level, hunt
//! the player down along grid paths and shoot once in range. Each tick runs
//! the same systems in the same order: event bookkeeping, movement, AI,
//! projectiles.

mod combat;
mod movement;

use std::time::Instant;

use glam::Vec2;
use hecs::{Entity, World};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::ai::{AiCommand, AiComponent, AiContext, StateName, enemy_brain};
use crate::core::{
    DebugInfo, EngineConfig, EngineContext, EngineError, EventQueue, Game, GameConfig, GameEvent,
    MapSource, Stage,
};
use crate::ecs::{Actor, Enemy, Name, Navigation, Player};
use crate::map::Map;

pub use combat::{projectile_system, spawn_projectile};
pub use movement::{movement_system, step_toward_goal};

/// Running totals collected from game events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HuntStats {
    pub state_changes: u64,
    pub shots_fired: u64,
    pub player_hits: u64,
    pub projectiles_destroyed: u64,
}

impl HuntStats {
    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::StateChanged { .. } => self.state_changes += 1,
            GameEvent::ProjectileFired { .. } => self.shots_fired += 1,
            GameEvent::PlayerHit { .. } => self.player_hits += 1,
            GameEvent::ProjectileDestroyed { .. } => self.projectiles_destroyed += 1,
        }
    }
}

fn record_transition(debug: &mut DebugInfo, event: &GameEvent) {
    if let GameEvent::StateChanged { from, to, .. } = event {
        debug.record_transition(*from, *to);
    }
}

/// Game state that lives outside the ECS world
pub struct HuntGame {
    config: GameConfig,
    map: Map,
    rng: SmallRng,
    player: Option<Entity>,
    enemies: Vec<Entity>,
    /// Reused buffer for AI fire requests
    commands: Vec<AiCommand>,
    stats: HuntStats,
}

impl HuntGame {
    /// Build the level described by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the level can't
    /// be loaded
    pub fn new(config: GameConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let mut rng = SmallRng::seed_from_u64(config.seed);
        let world_size = config.world_size();
        let map = match &config.map {
            MapSource::File { path } => Map::load(path, world_size)?,
            MapSource::Generate {
                rows,
                cols,
                walks,
                write_to,
            } => {
                let map = Map::generate(*rows, *cols, *walks, world_size, &mut rng)?;
                if let Some(path) = write_to {
                    map.grid().save_csv(path)?;
                    log::info!("Saved generated level to {}", path.display());
                }
                map
            }
        };

        Ok(Self::with_rng(config, map, rng))
    }

    /// Use an already built map
    #[must_use]
    pub fn with_map(config: GameConfig, map: Map) -> Self {
        let rng = SmallRng::seed_from_u64(config.seed);
        Self::with_rng(config, map, rng)
    }

    fn with_rng(config: GameConfig, map: Map, rng: SmallRng) -> Self {
        let map = map.with_mode(config.search_mode);
        Self {
            config,
            map,
            rng,
            player: None,
            enemies: Vec::new(),
            commands: Vec::new(),
            stats: HuntStats::default(),
        }
    }

    /// Engine settings matching the configuration
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_title("gridhunt")
            .with_ticks_per_second(self.config.ticks_per_second)
            .with_max_ticks(self.config.max_ticks)
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn map(&self) -> &Map {
        &self.map
    }

    #[must_use]
    pub fn player(&self) -> Option<Entity> {
        self.player
    }

    #[must_use]
    pub fn enemies(&self) -> &[Entity] {
        &self.enemies
    }

    #[must_use]
    pub fn stats(&self) -> HuntStats {
        self.stats
    }

    /// Move a spawn point off barrier cells
    fn spawn_point(&self, requested: Vec2) -> Vec2 {
        let grid = self.map.grid();
        if grid
            .world_to_cell(requested)
            .is_some_and(|cell| !grid.is_barrier(cell))
        {
            return requested;
        }

        match self.map.node_at(requested).and_then(|id| self.map.graph().node(id)) {
            Some(node) => {
                log::debug!("Spawn {requested} is blocked, using {}", node.position);
                node.position
            }
            None => requested,
        }
    }

    fn player_position(&self, world: &World) -> Vec2 {
        self.player
            .and_then(|p| world.get::<&Actor>(p).ok().map(|actor| actor.position()))
            .unwrap_or(self.config.player_spawn)
    }

    /// Run every enemy's state machine and turn fire requests into
    /// projectiles
    fn ai_system(&mut self, world: &mut World, events: &mut EventQueue, dt: f32) {
        let player_position = self.player_position(world);
        let mut fired = Vec::new();

        for (entity, (actor, ai)) in world.query_mut::<(&mut Actor, &mut AiComponent)>() {
            let before = ai.current_state();
            let mut ctx = AiContext {
                dt,
                map: &self.map,
                actor,
                player_position,
                tuning: &self.config.ai,
                rng: &mut self.rng,
                commands: &mut self.commands,
            };
            ai.update(&mut ctx);

            let after = ai.current_state();
            if before != after
                && let Some(to) = after
            {
                events.push(GameEvent::StateChanged {
                    entity,
                    from: before,
                    to,
                });
            }
            fired.extend(self.commands.drain(..).map(|command| (entity, command)));
        }

        for (shooter, command) in fired {
            match command {
                AiCommand::FireProjectile { origin, velocity } => {
                    spawn_projectile(
                        world,
                        events,
                        shooter,
                        origin,
                        velocity,
                        self.config.projectile_radius,
                    );
                }
            }
        }
    }
}

impl Game for HuntGame {
    fn init(&mut self, engine: &mut EngineContext) {
        let grid = self.map.grid();
        log::info!(
            "Hunt on a {}x{} grid with {} open cells, {:?} search",
            grid.cols(),
            grid.rows(),
            self.map.graph().len(),
            self.map.mode()
        );

        let size = self.config.player_size;
        let player = engine.world.spawn((
            Player::default(),
            Actor::new(self.spawn_point(self.config.player_spawn), size, size),
            Name::new("Player"),
        ));
        self.player = Some(player);

        let size = self.config.enemy_size;
        for (i, &spawn) in self.config.enemy_spawns.iter().enumerate() {
            let enemy = engine.world.spawn((
                Enemy,
                Actor::new(self.spawn_point(spawn), size, size),
                Navigation::new(self.config.enemy_speed),
                enemy_brain(),
                Name::new(format!("Enemy {i}")),
            ));
            self.enemies.push(enemy);
        }

        let dt = engine.time.delta();
        let player_position = self.player_position(&engine.world);
        for (entity, (actor, ai)) in engine
            .world
            .query_mut::<(&mut Actor, &mut AiComponent)>()
        {
            let mut ctx = AiContext {
                dt,
                map: &self.map,
                actor,
                player_position,
                tuning: &self.config.ai,
                rng: &mut self.rng,
                commands: &mut self.commands,
            };
            if ai.change_state(StateName::Patrol, &mut ctx) {
                engine.events.push(GameEvent::StateChanged {
                    entity,
                    from: None,
                    to: StateName::Patrol,
                });
            }
        }
        log::info!("Spawned {} enemies", self.enemies.len());
    }

    fn update(&mut self, engine: &mut EngineContext) {
        for event in engine.events.iter() {
            self.stats.record(event);
            record_transition(&mut engine.debug, event);
        }

        // Movement first so the AI judges "stuck" on this tick's step
        let dt = engine.time.delta();
        let started = Instant::now();
        movement_system(&mut engine.world, &self.map, dt);
        engine.debug.record(Stage::Movement, started.elapsed());

        let started = Instant::now();
        self.ai_system(&mut engine.world, &mut engine.events, dt);
        engine.debug.record(Stage::Ai, started.elapsed());

        let started = Instant::now();
        projectile_system(
            &mut engine.world,
            &mut engine.events,
            &self.map,
            self.player,
            dt,
        );
        engine.debug.record(Stage::Projectiles, started.elapsed());
    }

    fn shutdown(&mut self, engine: &mut EngineContext) {
        // Events from the final tick were never swapped in
        for event in engine.events.iter_pending() {
            self.stats.record(event);
            record_transition(&mut engine.debug, event);
        }

        let stats = self.stats;
        engine.debug.add_line(format!(
            "State changes: {} | Shots: {} | Player hits: {} | Wall hits: {}",
            stats.state_changes, stats.shots_fired, stats.player_hits, stats.projectiles_destroyed
        ));
        for (_, (name, ai)) in engine.world.query_mut::<(&Name, &AiComponent)>() {
            let state = ai.current_state().map_or("none", |s| s.as_str());
            engine.debug.add_line(format!("{}: {state}", name.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Engine;
    use crate::ecs::Projectile;
    use crate::map::{BARRIER, Grid};

    fn open_map() -> Map {
        Map::new(Grid::open(15, 15, Vec2::splat(800.0)).unwrap())
    }

    fn state_of(engine: &Engine<HuntGame>, enemy: Entity) -> Option<StateName> {
        engine
            .context()
            .world
            .get::<&AiComponent>(enemy)
            .unwrap()
            .current_state()
    }

    fn teleport(engine: &mut Engine<HuntGame>, entity: Entity, position: Vec2) {
        engine
            .context_mut()
            .world
            .get::<&mut Actor>(entity)
            .unwrap()
            .teleport(position);
    }

    fn pending_state_changes(engine: &Engine<HuntGame>) -> Vec<(Option<StateName>, StateName)> {
        engine
            .context()
            .events
            .iter_pending()
            .filter_map(|e| match e {
                GameEvent::StateChanged { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_enemies_start_in_patrol() {
        let config = GameConfig::default()
            .with_enemy_spawns(vec![Vec2::new(100.0, 100.0), Vec2::new(700.0, 100.0)]);
        let mut engine = Engine::new(
            EngineConfig::default(),
            HuntGame::with_map(config, open_map()),
        );

        engine.init();

        let enemies = engine.game().enemies().to_vec();
        assert_eq!(enemies.len(), 2);
        for enemy in enemies {
            assert_eq!(state_of(&engine, enemy), Some(StateName::Patrol));
        }
        assert_eq!(
            pending_state_changes(&engine),
            vec![(None, StateName::Patrol), (None, StateName::Patrol)]
        );
    }

    fn distance_to_player(engine: &Engine<HuntGame>, enemy: Entity) -> f32 {
        let world = &engine.context().world;
        let player = engine.game().player().unwrap();
        let player = world.get::<&Actor>(player).unwrap().position();
        world.get::<&Actor>(enemy).unwrap().position().distance(player)
    }

    #[test]
    fn test_hunt_scenario_transitions() {
        // Player pinned to the world origin, enemy 500 away at default speed
        let config = GameConfig::default()
            .with_player_spawn(Vec2::ZERO)
            .with_enemy_spawns(vec![Vec2::new(400.0, 300.0)]);
        let mut engine = Engine::new(
            EngineConfig::default(),
            HuntGame::with_map(config, open_map()),
        );
        engine.init();
        let enemy = engine.game().enemies()[0];
        let player = engine.game().player().unwrap();
        assert!((distance_to_player(&engine, enemy) - 500.0).abs() < 1e-3);

        let mut seen = vec![StateName::Patrol];
        for _ in 0..36_000 {
            engine.step();
            if let Some(state) = state_of(&engine, enemy)
                && seen.last() != Some(&state)
            {
                seen.push(state);
            }
            if seen.last() == Some(&StateName::Attack) {
                break;
            }
        }

        assert_eq!(seen.last(), Some(&StateName::Attack), "states: {seen:?}");
        assert_eq!(seen[seen.len() - 2], StateName::Hunt);
        assert!(distance_to_player(&engine, enemy) < 10.0);

        // Player walks away: one step back per tick
        teleport(&mut engine, player, Vec2::new(700.0, 700.0));
        engine.step();
        assert_eq!(state_of(&engine, enemy), Some(StateName::Hunt));
        assert_eq!(
            pending_state_changes(&engine),
            vec![(Some(StateName::Attack), StateName::Hunt)]
        );
        engine.step();
        assert_eq!(state_of(&engine, enemy), Some(StateName::Patrol));
        assert_eq!(
            pending_state_changes(&engine),
            vec![(Some(StateName::Hunt), StateName::Patrol)]
        );
    }

    #[test]
    fn test_enemy_reaches_and_shoots_player() {
        let config = GameConfig::default()
            .with_player_spawn(Vec2::new(400.0, 400.0))
            .with_enemy_spawns(vec![Vec2::new(80.0, 80.0)]);
        let mut engine = Engine::new(
            EngineConfig::default(),
            HuntGame::with_map(config, open_map()),
        );
        let enemy = {
            engine.init();
            engine.game().enemies()[0]
        };

        let mut seen = vec![StateName::Patrol];
        for _ in 0..1800 {
            engine.step();
            if let Some(state) = state_of(&engine, enemy)
                && seen.last() != Some(&state)
            {
                seen.push(state);
            }
            if engine.game().stats().player_hits > 0 {
                break;
            }
        }

        assert_eq!(
            &seen[..3],
            &[StateName::Patrol, StateName::Hunt, StateName::Attack]
        );
        let stats = engine.game().stats();
        assert!(stats.shots_fired >= 1);
        assert!(stats.player_hits >= 1);
        let player = engine.game().player().unwrap();
        assert!(engine.context().world.get::<&Player>(player).unwrap().hits >= 1);
    }

    #[test]
    fn test_walled_off_enemy_never_attacks() {
        // Column 7 splits the level; the player is on the other side
        let mut grid = Grid::open(15, 15, Vec2::splat(800.0)).unwrap();
        for row in 0..15 {
            grid.set_cell(grid.index(7, row).unwrap(), BARRIER);
        }
        let config = GameConfig::default()
            .with_player_spawn(Vec2::new(200.0, 400.0))
            .with_enemy_spawns(vec![Vec2::new(600.0, 400.0)]);
        let mut engine = Engine::new(
            EngineConfig::default(),
            HuntGame::with_map(config, Map::new(grid)),
        );
        engine.init();
        let enemy = engine.game().enemies()[0];

        for _ in 0..600 {
            engine.step();
            assert_ne!(state_of(&engine, enemy), Some(StateName::Attack));
        }

        // Pressed against the wall, but never through it
        let actor = *engine.context().world.get::<&Actor>(enemy).unwrap();
        assert!(actor.position().x > 426.0);
        assert_eq!(engine.game().stats().shots_fired, 0);
    }

    #[test]
    fn test_blocked_spawn_moves_to_open_cell() {
        let mut grid = Grid::open(15, 15, Vec2::splat(800.0)).unwrap();
        grid.set_cell(0, BARRIER);
        let config = GameConfig::default().with_enemy_spawns(vec![Vec2::new(10.0, 10.0)]);
        let mut engine = Engine::new(
            EngineConfig::default(),
            HuntGame::with_map(config, Map::new(grid)),
        );
        engine.init();
        let enemy = engine.game().enemies()[0];

        let position = engine.context().world.get::<&Actor>(enemy).unwrap().position();
        let grid = engine.game().map().grid();
        assert_eq!(position, grid.cell_center(1));
    }

    #[test]
    fn test_generated_level_spawns_on_open_cells() {
        let config = GameConfig::default()
            .with_seed(1234)
            .with_enemy_spawns(vec![Vec2::new(80.0, 80.0), Vec2::new(720.0, 720.0)]);
        let game = HuntGame::new(config).unwrap();
        let mut engine = Engine::new(game.engine_config(), game);
        engine.init();

        let grid = engine.game().map().grid().clone();
        for &enemy in engine.game().enemies() {
            let position = engine.context().world.get::<&Actor>(enemy).unwrap().position();
            let cell = grid.world_to_cell(position).unwrap();
            assert!(!grid.is_barrier(cell));
        }
    }

    #[test]
    fn test_generated_level_round_trips_through_file() {
        let path = std::env::temp_dir().join(format!("gridhunt-level-{}.csv", std::process::id()));
        let config = GameConfig::default().with_seed(77).with_map(MapSource::Generate {
            rows: 15,
            cols: 15,
            walks: 10,
            write_to: Some(path.clone()),
        });
        let generated = HuntGame::new(config).unwrap();

        let config = GameConfig::default().with_map(MapSource::File { path: path.clone() });
        let loaded = HuntGame::new(config).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(generated.map().grid(), loaded.map().grid());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = GameConfig::default().with_world_size(-1.0, 800.0);

        assert!(matches!(HuntGame::new(config), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_missing_level_file() {
        let config = GameConfig::default().with_map(MapSource::File {
            path: "no/such/level.csv".into(),
        });

        assert!(matches!(HuntGame::new(config), Err(EngineError::Map(_))));
    }

    #[test]
    fn test_run_reports_stats() {
        let config = GameConfig::default()
            .with_player_spawn(Vec2::new(400.0, 400.0))
            .with_enemy_spawns(vec![Vec2::new(380.0, 400.0)])
            .with_max_ticks(Some(120));
        let game = HuntGame::with_map(config, open_map());
        let mut engine = Engine::new(game.engine_config(), game);

        engine.run().unwrap();

        assert_eq!(engine.context().time.tick(), 120);
        let stats = engine.game().stats();
        assert!(stats.state_changes >= 3);
        assert!(stats.shots_fired >= 1);
        assert!(engine.context().world.query::<&Projectile>().iter().count() <= 1);
        let debug = &engine.context().debug;
        assert_eq!(debug.ticks(), 120);
        assert_eq!(debug.stage(Stage::Ai).runs, 120);
        assert_eq!(debug.transitions(None, StateName::Patrol), 1);
        assert!(debug.transitions(Some(StateName::Hunt), StateName::Attack) >= 1);
        let lines = debug.get_all_lines();
        assert!(lines.iter().any(|l| l.starts_with("AI: ")));
        assert!(lines.iter().any(|l| l == "start -> Patrol: 1"));
        assert!(lines.iter().any(|l| l.starts_with("State changes:")));
        assert!(lines.iter().any(|l| l == "Enemy 0: Attack"));
    }
}
