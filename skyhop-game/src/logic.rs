//! Per-tick simulation: input, gravity, landings, camera scroll, platform
//! recycling, scoring and the game-over check.

use crate::types::{
    GamePhase, InputState, JumpGame, CAMERA_THRESHOLD, GAME_OVER_MARGIN, GRAVITY, JUMP_IMPULSE,
    LANDING_TOLERANCE, MOVE_SPEED, PLATFORM_COUNT, PLATFORM_HEIGHT, PLAYER_HEIGHT, PLAYER_WIDTH,
    RECYCLE_MARGIN, SCORE_DIVISOR, WORLD_HEIGHT, WORLD_WIDTH,
};
use rand::Rng;

/// Advance the session by one frame. Does nothing outside the playing phase.
pub fn process_tick<R: Rng>(game: &mut JumpGame, input: InputState, rng: &mut R) {
    if game.phase != GamePhase::Playing {
        return;
    }

    apply_horizontal_input(game, input);
    apply_gravity(game);
    check_landing(game);
    scroll_camera(game);
    update_score(game);
    recycle_platforms(game, rng);
    check_game_over(game);
}

fn apply_horizontal_input(game: &mut JumpGame, input: InputState) {
    let player = &mut game.player;

    if input.left {
        player.x = (player.x - MOVE_SPEED).max(0.0);
    }
    if input.right {
        player.x = (player.x + MOVE_SPEED).min(WORLD_WIDTH - PLAYER_WIDTH);
    }

    // Edge wrap for any motion source that overshoots the clamp above.
    if player.x < 0.0 {
        player.x = WORLD_WIDTH - PLAYER_WIDTH;
    } else if player.x > WORLD_WIDTH - PLAYER_WIDTH {
        player.x = 0.0;
    }
}

fn apply_gravity(game: &mut JumpGame) {
    game.player.velocity_y += GRAVITY;
    game.player.y += game.player.velocity_y;
}

/// Bounce off the first visible platform whose top edge the falling player
/// overlaps. Landings only happen while falling; a rising player passes
/// through platforms from below.
fn check_landing(game: &mut JumpGame) {
    if game.player.velocity_y <= 0.0 {
        return;
    }

    let player = game.player;
    let player_bottom = player.y + PLAYER_HEIGHT;

    for platform in &game.platforms {
        if !platform.is_visible(game.camera_y) {
            continue;
        }

        let overlaps_x =
            player.x < platform.x + platform.width && player.x + PLAYER_WIDTH > platform.x;
        let on_top_edge = player_bottom >= platform.y
            && player_bottom <= platform.y + PLATFORM_HEIGHT + LANDING_TOLERANCE
            && player.y < platform.y + PLATFORM_HEIGHT;

        if overlaps_x && on_top_edge {
            game.player.velocity_y = JUMP_IMPULSE;
            game.player.y = platform.y - PLAYER_HEIGHT;
            break;
        }
    }
}

fn scroll_camera(game: &mut JumpGame) {
    if game.player_screen_y() < CAMERA_THRESHOLD {
        game.camera_y = game.player.y - CAMERA_THRESHOLD;
    }
}

/// Score is the integer-scaled climb from the start position to the highest
/// point reached, so it never decreases within a session.
fn update_score(game: &mut JumpGame) {
    if game.player.y < game.min_y {
        game.min_y = game.player.y;
    }
    let climbed = game.start_y - game.min_y;
    game.score = (climbed / SCORE_DIVISOR).floor().max(0.0) as u32;
}

/// Drop platforms that scrolled out below the view and top the column back up
/// to `PLATFORM_COUNT`, keeping the collection a fixed-size sliding window.
fn recycle_platforms<R: Rng>(game: &mut JumpGame, rng: &mut R) {
    let cutoff = game.camera_y + WORLD_HEIGHT + RECYCLE_MARGIN;
    game.platforms.retain(|p| p.y <= cutoff);

    while game.platforms.len() < PLATFORM_COUNT {
        let last_y = game
            .platforms
            .last()
            .map(|p| p.y)
            .unwrap_or(game.camera_y);
        game.platforms
            .push(crate::types::spawn_platform_above(last_y, rng));
    }
}

fn check_game_over(game: &mut JumpGame) {
    if game.player_screen_y() > WORLD_HEIGHT + GAME_OVER_MARGIN {
        game.phase = GamePhase::GameOver;
        if game.score > game.high_score {
            game.high_score = game.score;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Platform, PlatformKind, JUMP_IMPULSE};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn playing_game(seed: u64) -> (JumpGame, ChaCha8Rng) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut game = JumpGame::new();
        game.start(&mut rng);
        (game, rng)
    }

    /// A game with a single platform positioned for a controlled landing test.
    fn game_with_platform(platform: Platform) -> JumpGame {
        let mut game = JumpGame::new();
        game.phase = GamePhase::Playing;
        game.platforms = vec![platform];
        game
    }

    fn platform_at(x: f64, y: f64) -> Platform {
        Platform {
            x,
            y,
            width: crate::types::PLATFORM_WIDTH,
            kind: PlatformKind::Normal,
        }
    }

    #[test]
    fn test_gravity_increments_velocity_each_tick() {
        let (mut game, mut rng) = playing_game(9);
        // Lift the player clear of every platform so no bounce interferes.
        game.player.y = 100.0;
        game.player.velocity_y = -2.0;
        game.platforms.clear();

        let mut prev = game.player.velocity_y;
        for _ in 0..10 {
            process_tick(&mut game, InputState::default(), &mut rng);
            if game.phase != GamePhase::Playing {
                break;
            }
            assert!((game.player.velocity_y - (prev + GRAVITY)).abs() < 1e-9);
            prev = game.player.velocity_y;
        }
    }

    #[test]
    fn test_landing_resets_velocity_to_jump_impulse() {
        let mut game = game_with_platform(platform_at(180.0, 400.0));
        game.player.x = 190.0;
        game.player.y = 400.0 - PLAYER_HEIGHT - 1.0;
        game.player.velocity_y = 2.0;

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        process_tick(&mut game, InputState::default(), &mut rng);

        assert!((game.player.velocity_y - JUMP_IMPULSE).abs() < f64::EPSILON);
        assert!((game.player.y - (400.0 - PLAYER_HEIGHT)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_landing_while_rising() {
        let mut game = game_with_platform(platform_at(180.0, 400.0));
        game.player.x = 190.0;
        game.player.y = 400.0 - PLAYER_HEIGHT - 1.0;
        game.player.velocity_y = -5.0;

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        process_tick(&mut game, InputState::default(), &mut rng);

        // Still rising: gravity applied, no impulse.
        assert!((game.player.velocity_y - (-5.0 + GRAVITY)).abs() < 1e-9);
    }

    #[test]
    fn test_no_landing_without_horizontal_overlap() {
        let mut game = game_with_platform(platform_at(0.0, 400.0));
        game.player.x = 200.0;
        game.player.y = 400.0 - PLAYER_HEIGHT - 1.0;
        game.player.velocity_y = 2.0;

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        process_tick(&mut game, InputState::default(), &mut rng);

        assert!(game.player.velocity_y > 0.0);
    }

    #[test]
    fn test_no_landing_past_tolerance() {
        let mut game = game_with_platform(platform_at(180.0, 400.0));
        game.player.x = 190.0;
        // Player bottom already far below the platform's landing band.
        game.player.y = 400.0 + PLATFORM_HEIGHT + LANDING_TOLERANCE + 5.0 - PLAYER_HEIGHT;
        game.player.velocity_y = 2.0;

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        process_tick(&mut game, InputState::default(), &mut rng);

        assert!(game.player.velocity_y > 0.0);
    }

    #[test]
    fn test_horizontal_input_moves_and_clamps() {
        let (mut game, mut rng) = playing_game(5);
        game.player.x = 1.0;
        let input = InputState {
            left: true,
            right: false,
        };
        process_tick(&mut game, input, &mut rng);
        assert!((game.player.x - 0.0).abs() < f64::EPSILON);

        game.player.x = WORLD_WIDTH - PLAYER_WIDTH - 1.0;
        let input = InputState {
            left: false,
            right: true,
        };
        process_tick(&mut game, input, &mut rng);
        assert!((game.player.x - (WORLD_WIDTH - PLAYER_WIDTH)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_score_formula() {
        let (mut game, mut rng) = playing_game(11);
        game.start_y = 500.0;
        game.min_y = 500.0;
        game.player.y = 100.0;
        game.player.velocity_y = -1.0;
        game.platforms.clear();

        process_tick(&mut game, InputState::default(), &mut rng);

        // floor((500 - min_y) / 5) with min_y captured after this tick's move.
        let expected = ((500.0 - game.min_y) / SCORE_DIVISOR).floor() as u32;
        assert_eq!(game.score, expected);
        assert!(game.score >= 79);
    }

    #[test]
    fn test_score_monotonic_over_session() {
        let (mut game, mut rng) = playing_game(13);
        let mut last_score = 0;
        for _ in 0..2000 {
            if game.phase != GamePhase::Playing {
                break;
            }
            process_tick(&mut game, InputState::default(), &mut rng);
            assert!(game.score >= last_score);
            last_score = game.score;
        }
    }

    #[test]
    fn test_score_floors_at_zero_when_falling_below_start() {
        let (mut game, mut rng) = playing_game(17);
        game.player.velocity_y = 5.0;
        game.platforms.clear();
        process_tick(&mut game, InputState::default(), &mut rng);
        assert_eq!(game.score, 0);
    }

    #[test]
    fn test_platform_window_stays_at_count() {
        let (mut game, mut rng) = playing_game(19);
        for _ in 0..1500 {
            if game.phase != GamePhase::Playing {
                break;
            }
            process_tick(&mut game, InputState::default(), &mut rng);
            assert_eq!(game.platforms.len(), PLATFORM_COUNT);
        }
    }

    #[test]
    fn test_camera_follows_player_upward() {
        let (mut game, mut rng) = playing_game(23);
        game.player.y = game.camera_y + CAMERA_THRESHOLD - 50.0;
        game.player.velocity_y = 0.0;
        game.platforms.clear();
        process_tick(&mut game, InputState::default(), &mut rng);
        assert!((game.camera_y - (game.player.y - CAMERA_THRESHOLD)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_game_over_exactly_past_margin() {
        let (mut game, mut rng) = playing_game(29);
        game.platforms.clear();

        // Just inside the margin: still alive.
        game.player.velocity_y = 0.0;
        game.player.y = game.camera_y + WORLD_HEIGHT + GAME_OVER_MARGIN - GRAVITY - 1.0;
        process_tick(&mut game, InputState::default(), &mut rng);
        assert_eq!(game.phase, GamePhase::Playing);

        // Past the margin: over.
        game.player.velocity_y = 0.0;
        game.player.y = game.camera_y + WORLD_HEIGHT + GAME_OVER_MARGIN + 1.0;
        process_tick(&mut game, InputState::default(), &mut rng);
        assert_eq!(game.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_game_over_records_high_score() {
        let (mut game, mut rng) = playing_game(31);
        game.platforms.clear();
        game.score = 0;
        game.min_y = game.start_y - 400.0; // score 80 on next update
        game.player.y = game.camera_y + WORLD_HEIGHT + GAME_OVER_MARGIN + 10.0;
        game.player.velocity_y = 1.0;
        process_tick(&mut game, InputState::default(), &mut rng);
        assert_eq!(game.phase, GamePhase::GameOver);
        assert_eq!(game.high_score, game.score);
    }

    #[test]
    fn test_tick_ignored_outside_playing_phase() {
        let mut game = JumpGame::new();
        let snapshot_y = game.player.y;
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        process_tick(&mut game, InputState::default(), &mut rng);
        assert_eq!(game.phase, GamePhase::Menu);
        assert!((game.player.y - snapshot_y).abs() < f64::EPSILON);
    }

    #[test]
    fn test_session_survives_on_platforms() {
        // With no input the player should bounce on the spawn platform
        // indefinitely rather than die instantly.
        let (mut game, mut rng) = playing_game(37);
        for _ in 0..300 {
            process_tick(&mut game, InputState::default(), &mut rng);
        }
        assert_eq!(game.phase, GamePhase::Playing);
    }
}
