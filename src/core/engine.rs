//! Core Engine struct and fixed-step simulation loop

use std::time::Instant;

use hecs::World;

use crate::core::Time;
use crate::core::config::ConfigError;
use crate::core::debug::{DebugInfo, Stage};
use crate::core::events::EventQueue;
use crate::map::MapError;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Name used in logs
    pub title: String,
    /// Simulation ticks per second
    pub ticks_per_second: u32,
    /// Stop after this many ticks (`None` for no limit)
    pub max_ticks: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: String::from("Engine"),
            ticks_per_second: 60,
            max_ticks: None,
        }
    }
}

impl EngineConfig {
    /// Create a new config with a title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the tick rate
    #[must_use]
    pub fn with_ticks_per_second(mut self, ticks: u32) -> Self {
        self.ticks_per_second = ticks;
        self
    }

    /// Set the tick limit
    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }
}

/// Game trait that users implement
pub trait Game: 'static {
    /// Called once before the first tick
    fn init(&mut self, engine: &mut EngineContext);

    /// Called every tick for game logic updates
    fn update(&mut self, engine: &mut EngineContext);

    /// Called when the engine stops
    fn shutdown(&mut self, _engine: &mut EngineContext) {}
}

/// Context passed to game callbacks
pub struct EngineContext {
    /// Time tracking
    pub time: Time,
    /// ECS world
    pub world: World,
    /// Events from the previous tick and pushes for the next
    pub events: EventQueue,
    /// Debug information and stats
    pub debug: DebugInfo,
    /// Should the engine quit
    should_quit: bool,
}

impl EngineContext {
    /// Create a context ticking at `ticks_per_second`
    #[must_use]
    pub fn new(ticks_per_second: u32) -> Self {
        Self {
            time: Time::new(ticks_per_second),
            world: World::new(),
            events: EventQueue::new(),
            debug: DebugInfo::new(),
            should_quit: false,
        }
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Check if engine should quit
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

/// Main engine struct
pub struct Engine<G: Game> {
    config: EngineConfig,
    game: G,
    context: EngineContext,
    initialized: bool,
}

impl<G: Game> Engine<G> {
    /// Create a new engine with the given game
    #[must_use]
    pub fn new(config: EngineConfig, game: G) -> Self {
        let context = EngineContext::new(config.ticks_per_second);
        Self {
            config,
            game,
            context,
            initialized: false,
        }
    }

    /// Initialize the game if that hasn't happened yet
    pub fn init(&mut self) {
        if !self.initialized {
            self.game.init(&mut self.context);
            self.initialized = true;
            log::info!("Engine initialized successfully");
        }
    }

    /// Simulate one tick
    pub fn step(&mut self) {
        self.init();

        self.context.events.swap();
        self.context.time.advance();

        let started = Instant::now();
        self.game.update(&mut self.context);
        self.context.debug.record(Stage::Update, started.elapsed());
    }

    /// Run until the tick limit or until the game quits
    ///
    /// # Errors
    ///
    /// Returns an error if the tick rate is zero
    pub fn run(&mut self) -> Result<(), EngineError> {
        if self.config.ticks_per_second == 0 {
            return Err(EngineError::Config(ConfigError::Invalid(
                "ticks_per_second must be at least 1".to_string(),
            )));
        }
        log::info!(
            "Starting engine: {} at {} ticks/s",
            self.config.title,
            self.config.ticks_per_second
        );

        self.init();
        while !self.context.should_quit()
            && self
                .config
                .max_ticks
                .is_none_or(|max| self.context.time.tick() < max)
        {
            self.step();
        }

        self.game.shutdown(&mut self.context);
        log::info!(
            "Engine stopped after {} ticks ({:.1}s simulated)",
            self.context.time.tick(),
            self.context.time.elapsed_secs()
        );
        for line in self.context.debug.get_all_lines() {
            log::info!("{line}");
        }

        Ok(())
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn game(&self) -> &G {
        &self.game
    }

    #[must_use]
    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut EngineContext {
        &mut self.context
    }
}

/// Errors that stop the engine from starting
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Bad or unreadable configuration
    Config(ConfigError),
    /// The level could not be loaded
    Map(MapError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Config error: {e}"),
            Self::Map(e) => write!(f, "Map error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Map(e) => Some(e),
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<MapError> for EngineError {
    fn from(e: MapError) -> Self {
        Self::Map(e)
    }
}
