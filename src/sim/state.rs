//! Race state and core simulation types
//!
//! A single `SimContext` owns every entity plus the race and campaign
//! counters. Renderers and input adapters only borrow it between ticks.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::settings::{Difficulty, Settings};
use crate::tuning::{CraftConfig, Tuning, TuningError};

/// Index of the player craft in `SimContext::crafts`
pub const PLAYER_INDEX: usize = 0;

/// Player start position
pub const PLAYER_START: Vec3 = Vec3::new(0.0, 0.0, HOVER_ALTITUDE);

/// AI start grid; extra AI beyond these are scattered behind them
pub const AI_START_GRID: [Vec3; 3] = [
    Vec3::new(-180.0, 150.0, HOVER_ALTITUDE),
    Vec3::new(180.0, 150.0, HOVER_ALTITUDE),
    Vec3::new(0.0, 300.0, HOVER_ALTITUDE),
];

/// Race flow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RacePhase {
    /// Title screen (initial)
    Menu,
    /// Choosing laps and difficulty for a custom race
    CustomRaceSetup,
    /// Active race
    Racing,
    /// Race suspended, no entity updates
    Paused,
    /// Race over, outcome on screen
    Finished,
    /// Every campaign level cleared; restarts automatically
    CampaignComplete,
}

/// How the last race ended for the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceOutcome {
    Crashed,
    Won,
    /// Finished, but an AI craft posted a faster time
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CraftRole {
    Player,
    Ai,
}

/// A racing jet (player or AI)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Craft {
    pub role: CraftRole,
    pub pos: Vec3,
    /// (lateral, longitudinal) velocity in units per reference frame
    pub vel: Vec2,
    /// Nose heading in degrees
    pub heading: f32,
    /// Cosmetic roll in degrees
    pub bank: f32,
    /// Always `vel.length()`; refreshed by every velocity mutation
    pub speed: f32,
    pub config: CraftConfig,
    /// Monotonic within a race
    pub crashed: bool,
    pub finished: bool,
    pub has_shield: bool,
    pub laps_completed: u32,
    /// Race clock reading when the final lap completed (set once)
    pub race_time: Option<f32>,
}

impl Craft {
    pub fn new(role: CraftRole, config: CraftConfig, pos: Vec3) -> Self {
        Self {
            role,
            pos,
            vel: Vec2::ZERO,
            heading: 0.0,
            bank: 0.0,
            speed: 0.0,
            config,
            crashed: false,
            finished: false,
            has_shield: false,
            laps_completed: 0,
            race_time: None,
        }
    }

    #[inline]
    pub fn is_player(&self) -> bool {
        self.role == CraftRole::Player
    }

    /// Still racing: neither crashed nor finished
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.crashed && !self.finished
    }

    /// Put the craft back on the grid with all per-race state cleared
    pub fn reset(&mut self, pos: Vec3, config: CraftConfig) {
        *self = Self::new(self.role, config, pos);
    }

    #[inline]
    pub fn refresh_speed(&mut self) {
        self.speed = self.vel.length();
    }

    /// Mark crashed; returns false if it already was
    pub fn crash(&mut self) -> bool {
        if self.crashed {
            return false;
        }
        self.crashed = true;
        true
    }
}

/// A collectible coin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub pos: Vec3,
    pub collected: bool,
}

impl Coin {
    /// Flip to collected; returns false if it already was
    pub fn collect(&mut self) -> bool {
        debug_assert!(!self.collected, "coin collected twice");
        if self.collected {
            return false;
        }
        self.collected = true;
        true
    }
}

/// The single shield pickup of a race
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldToken {
    pub pos: Vec3,
    pub collected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleShape {
    Cube,
    Cone,
}

/// What removed an obstacle from play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestroyCause {
    Shield,
    Projectile,
}

/// A static hazard on the track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub pos: Vec3,
    pub shape: ObstacleShape,
    pub destroyed: bool,
}

impl Obstacle {
    #[inline]
    pub fn is_live(&self) -> bool {
        !self.destroyed
    }

    /// Remove from play; returns false if it already was
    pub fn destroy(&mut self) -> bool {
        debug_assert!(!self.destroyed, "obstacle {} destroyed twice", self.id);
        if self.destroyed {
            return false;
        }
        self.destroyed = true;
        true
    }
}

/// A player-fired round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec3,
    /// Units per second (not per reference frame)
    pub vel: Vec2,
}

/// Track geometry for one campaign level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub width: f32,
    pub length: f32,
    /// Longitudinal position of the finish line
    pub finish_line: f32,
}

impl Track {
    /// Tracks grow with every campaign level
    pub fn for_level(level: u32) -> Self {
        let length = BASE_TRACK_LENGTH + level as f32 * TRACK_LENGTH_PER_LEVEL;
        Self {
            width: TRACK_WIDTH,
            length,
            finish_line: length - FINISH_LINE_INSET,
        }
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    /// Largest |x| a craft may occupy before bouncing off the wall
    #[inline]
    pub fn lateral_limit(&self) -> f32 {
        self.half_width() - BOUNDARY_MARGIN
    }
}

/// Settings for the race in progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaceConfig {
    pub total_laps: u32,
    pub difficulty: Difficulty,
    pub track: Track,
}

/// Counters that persist across races until the campaign restarts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    /// Current level (1-based)
    pub level: u32,
    /// Coins collected across the campaign
    pub score: u64,
    pub races_won: u32,
}

impl Default for Campaign {
    fn default() -> Self {
        Self {
            level: 1,
            score: 0,
            races_won: 0,
        }
    }
}

/// Notable things that happened during a tick, for audio/visual cues
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RaceStarted { level: u32, laps: u32 },
    CoinCollected { index: usize },
    ShieldCollected,
    ObstacleDestroyed { id: u32, cause: DestroyCause },
    ProjectileFired { id: u32 },
    CraftCrashed { craft: usize },
    LapCompleted { craft: usize, lap: u32 },
    CraftFinished { craft: usize, time: f32 },
    RaceFinished { outcome: RaceOutcome },
    LevelUp { level: u32 },
    CampaignComplete,
    CampaignRestarted,
}

/// Complete simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimContext {
    pub tuning: Tuning,
    pub settings: Settings,
    pub phase: RacePhase,
    pub race: RaceConfig,
    pub campaign: Campaign,
    /// Player at `PLAYER_INDEX`, AI after it
    pub crafts: Vec<Craft>,
    pub coins: Vec<Coin>,
    pub shield: Option<ShieldToken>,
    pub obstacles: Vec<Obstacle>,
    pub projectiles: Vec<Projectile>,
    /// Seconds of unpaused simulation; drives cosmetic motion and AI gating
    pub sim_time: f32,
    /// Seconds since the current race started (excludes pauses)
    pub race_clock: f32,
    /// Seconds spent in `CampaignComplete`
    pub complete_timer: f32,
    /// Outcome of the most recent finished race
    pub outcome: Option<RaceOutcome>,
    /// Events since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Seed the RNG was created from
    pub seed: u64,
    pub rng: Pcg32,
    next_id: u32,
}

impl SimContext {
    /// Create a context with default tuning
    pub fn new(seed: u64) -> Self {
        Self::build(seed, Tuning::default())
    }

    /// Create a context with custom tuning (validated)
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::build(seed, tuning))
    }

    /// Create a context seeded from the thread RNG
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    fn build(seed: u64, tuning: Tuning) -> Self {
        let mut crafts = Vec::with_capacity(1 + tuning.campaign.ai_count);
        crafts.push(Craft::new(CraftRole::Player, tuning.player, PLAYER_START));
        let mut rng = Pcg32::seed_from_u64(seed);
        for i in 0..tuning.campaign.ai_count {
            let pos = ai_start_position(i, &mut rng);
            crafts.push(Craft::new(CraftRole::Ai, tuning.ai, pos));
        }

        Self {
            settings: Settings::default(),
            phase: RacePhase::Menu,
            race: RaceConfig {
                total_laps: 1,
                difficulty: Difficulty::Cadet,
                track: Track::for_level(1),
            },
            campaign: Campaign::default(),
            crafts,
            coins: Vec::new(),
            shield: None,
            obstacles: Vec::new(),
            projectiles: Vec::new(),
            sim_time: 0.0,
            race_clock: 0.0,
            complete_timer: 0.0,
            outcome: None,
            events: Vec::new(),
            seed,
            rng,
            next_id: 1,
            tuning,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    #[inline]
    pub fn player(&self) -> &Craft {
        &self.crafts[PLAYER_INDEX]
    }

    #[inline]
    pub fn player_mut(&mut self) -> &mut Craft {
        &mut self.crafts[PLAYER_INDEX]
    }

    #[inline]
    pub fn ai_crafts(&self) -> &[Craft] {
        &self.crafts[PLAYER_INDEX + 1..]
    }

    /// Lap the player is currently flying (1-based, capped at the total)
    pub fn current_lap(&self) -> u32 {
        (self.player().laps_completed + 1).min(self.race.total_laps)
    }

    pub fn max_level(&self) -> u32 {
        self.tuning.campaign.max_level
    }

    /// Take all events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    #[inline]
    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Return every craft to the start grid with fresh per-race state
    pub fn reset_crafts(&mut self) {
        let Self {
            crafts,
            rng,
            tuning,
            ..
        } = self;
        for (index, craft) in crafts.iter_mut().enumerate() {
            if craft.is_player() {
                craft.reset(PLAYER_START, tuning.player);
            } else {
                let pos = ai_start_position(index - 1, rng);
                craft.reset(pos, tuning.ai);
            }
        }
    }
}

/// Grid slot for the `ai_index`-th AI craft
pub fn ai_start_position<R: Rng + ?Sized>(ai_index: usize, rng: &mut R) -> Vec3 {
    match AI_START_GRID.get(ai_index) {
        Some(&pos) => pos,
        None => Vec3::new(
            rng.random_range(-100.0..=100.0),
            rng.random_range(200.0..=400.0),
            HOVER_ALTITUDE,
        ),
    }
}
