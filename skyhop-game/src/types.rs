//! Game state and world generation.
//!
//! Coordinates are world-space pixels: x grows rightward, y grows downward,
//! so climbing means y decreases. The camera holds the world-y rendered at
//! the top of the screen; `screen_y = world_y - camera_y`.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Downward acceleration applied every tick.
pub const GRAVITY: f64 = 0.3;
/// Vertical velocity set on landing (negative = upward).
pub const JUMP_IMPULSE: f64 = -8.0;
/// Horizontal pixels moved per tick while a direction key is held.
pub const MOVE_SPEED: f64 = 3.0;

pub const PLAYER_WIDTH: f64 = 30.0;
pub const PLAYER_HEIGHT: f64 = 30.0;
pub const PLATFORM_WIDTH: f64 = 60.0;
pub const PLATFORM_HEIGHT: f64 = 15.0;

/// Playfield dimensions in world pixels.
pub const WORLD_WIDTH: f64 = 400.0;
pub const WORLD_HEIGHT: f64 = 600.0;

/// The camera scrolls up once the player rises above this screen-y.
pub const CAMERA_THRESHOLD: f64 = 200.0;
/// The session ends once the player falls this far below the bottom edge.
pub const GAME_OVER_MARGIN: f64 = 100.0;

/// Sliding-window size of the platform collection.
pub const PLATFORM_COUNT: usize = 20;
/// Vertical gap between consecutive platforms, sampled uniformly.
pub const MIN_PLATFORM_SPACING: f64 = 50.0;
pub const MAX_PLATFORM_SPACING: f64 = 80.0;
/// Chance for a freshly generated platform to be tagged `Moving`.
pub const MOVING_PLATFORM_CHANCE: f64 = 0.15;
/// A platform lower than `camera_y + WORLD_HEIGHT + RECYCLE_MARGIN` is dropped.
pub const RECYCLE_MARGIN: f64 = 50.0;

/// Player bottom may land up to this far past a platform's top edge.
pub const LANDING_TOLERANCE: f64 = 5.0;
/// Score is the climbed distance divided by this, floored.
pub const SCORE_DIVISOR: f64 = 5.0;

pub const CLOUD_COUNT: usize = 5;
/// Clouds scroll at a fraction of the camera speed.
pub const CLOUD_PARALLAX: f64 = 0.3;

/// The player's avatar. Horizontal motion is input-driven; vertical motion
/// integrates gravity and landing impulses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Player {
    pub x: f64,
    pub y: f64,
    pub velocity_y: f64,
}

/// Platform flavor. `Moving` is recorded during generation but currently has
/// no effect on animation or collision; the tag is kept for score parity with
/// the deployed leaderboard population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    Normal,
    Moving,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Platform {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub kind: PlatformKind,
}

impl Platform {
    /// Top edge in screen space for the given camera position.
    pub fn screen_y(&self, camera_y: f64) -> f64 {
        self.y - camera_y
    }

    /// Whether any part of the platform is inside the viewport.
    pub fn is_visible(&self, camera_y: f64) -> bool {
        let screen_y = self.screen_y(camera_y);
        screen_y >= -PLATFORM_HEIGHT && screen_y <= WORLD_HEIGHT
    }
}

/// Decorative background element with no gameplay effect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cloud {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

impl Cloud {
    /// Screen-space y with parallax, wrapped so clouds recur while climbing.
    pub fn screen_y(&self, camera_y: f64) -> f64 {
        self.y - (camera_y * CLOUD_PARALLAX) % (WORLD_HEIGHT + 100.0)
    }
}

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Menu,
    Playing,
    GameOver,
}

/// Directional input sampled once per tick by the loop driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
}

/// One game session. Owned by the frame-loop driver and mutated once per tick;
/// there is no shared or persistent game state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JumpGame {
    pub phase: GamePhase,
    pub player: Player,
    pub platforms: Vec<Platform>,
    pub clouds: Vec<Cloud>,
    /// World-y currently rendered at the top of the screen.
    pub camera_y: f64,
    /// Player's world-y at session start, anchor for the score.
    pub start_y: f64,
    /// Highest point reached so far (smallest world-y).
    pub min_y: f64,
    pub score: u32,
    pub high_score: u32,
}

impl JumpGame {
    /// A fresh session sitting in the menu phase.
    pub fn new() -> Self {
        let start_y = WORLD_HEIGHT - 100.0;
        Self {
            phase: GamePhase::Menu,
            player: Player {
                x: WORLD_WIDTH / 2.0,
                y: start_y,
                velocity_y: 0.0,
            },
            platforms: Vec::new(),
            clouds: Vec::new(),
            camera_y: 0.0,
            start_y,
            min_y: start_y,
            score: 0,
            high_score: 0,
        }
    }

    /// Reset the session and enter the playing phase. The high score carries
    /// over; everything else is regenerated.
    pub fn start<R: Rng>(&mut self, rng: &mut R) {
        self.platforms = generate_platforms(rng);
        self.clouds = generate_clouds(rng);

        let start_y = WORLD_HEIGHT - 100.0;
        self.player = Player {
            x: WORLD_WIDTH / 2.0,
            y: start_y,
            velocity_y: 0.0,
        };
        self.camera_y = 0.0;
        self.start_y = start_y;
        self.min_y = start_y;
        self.score = 0;
        self.phase = GamePhase::Playing;
    }

    /// Player top edge in screen space.
    pub fn player_screen_y(&self) -> f64 {
        self.player.y - self.camera_y
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}

impl Default for JumpGame {
    fn default() -> Self {
        Self::new()
    }
}

/// Initial platform layout: one platform centred under the spawn point, then
/// a column of randomly placed platforms climbing off the top of the screen.
pub fn generate_platforms<R: Rng>(rng: &mut R) -> Vec<Platform> {
    let mut platforms = Vec::with_capacity(PLATFORM_COUNT);
    platforms.push(Platform {
        x: WORLD_WIDTH / 2.0 - PLATFORM_WIDTH / 2.0,
        y: WORLD_HEIGHT - 50.0,
        width: PLATFORM_WIDTH,
        kind: PlatformKind::Normal,
    });

    while platforms.len() < PLATFORM_COUNT {
        let last_y = platforms[platforms.len() - 1].y;
        platforms.push(spawn_platform_above(last_y, rng));
    }

    platforms
}

/// A new platform placed one random spacing step above `last_y`.
pub fn spawn_platform_above<R: Rng>(last_y: f64, rng: &mut R) -> Platform {
    let spacing = rng.gen_range(MIN_PLATFORM_SPACING..MAX_PLATFORM_SPACING);
    let kind = if rng.gen::<f64>() < MOVING_PLATFORM_CHANCE {
        PlatformKind::Moving
    } else {
        PlatformKind::Normal
    };

    Platform {
        x: rng.gen_range(0.0..WORLD_WIDTH - PLATFORM_WIDTH),
        y: last_y - spacing,
        width: PLATFORM_WIDTH,
        kind,
    }
}

pub fn generate_clouds<R: Rng>(rng: &mut R) -> Vec<Cloud> {
    (0..CLOUD_COUNT)
        .map(|_| Cloud {
            x: rng.gen_range(0.0..WORLD_WIDTH),
            y: rng.gen_range(0.0..WORLD_HEIGHT),
            size: 30.0 + rng.gen::<f64>() * 20.0,
        })
        .collect()
}
