use crate::commands::{submit, App};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::Print;
use crossterm::terminal::{self, ClearType};
use crossterm::{cursor, execute, queue};
use dialoguer::Confirm;
use skyhop_core::{Result, SkyhopError};
use skyhop_game::types::{PLATFORM_HEIGHT, WORLD_HEIGHT, WORLD_WIDTH};
use skyhop_game::{process_tick, GamePhase, InputState, JumpGame};
use std::io::{stdout, Write};
use std::time::{Duration, Instant};

// Terminal cells are taller than wide, so the world is squashed more
// vertically than horizontally.
const COLS: usize = 50;
const ROWS: usize = 30;
const SCALE_X: f64 = WORLD_WIDTH / COLS as f64;
const SCALE_Y: f64 = WORLD_HEIGHT / ROWS as f64;

const TICK: Duration = Duration::from_millis(33);

pub async fn handle_play(app: &App) -> Result<()> {
    let high_score = app.storage.sessions().high_score().await?;

    let score = tokio::task::spawn_blocking(move || run_game(high_score))
        .await
        .map_err(|e| SkyhopError::internal(format!("game task failed: {}", e)))??;

    let record = app.storage.sessions().record_session(score).await?;
    println!("Game over! Score: {}", score);
    if score > high_score {
        println!("New personal best (was {})", high_score);
    }

    if score > 0 && app.config.validate().is_ok() {
        let wants_submit = Confirm::new()
            .with_prompt("Submit this score to the encrypted leaderboard?")
            .default(false)
            .interact()
            .map_err(|e| SkyhopError::internal(format!("prompt failed: {}", e)))?;

        if wants_submit {
            submit::submit_session(app, &record).await?;
        }
    }

    Ok(())
}

/// Blocking terminal game loop. Returns the final score once the player quits
/// or acknowledges the game-over screen.
fn run_game(high_score: u32) -> Result<u32> {
    let mut game = JumpGame::new();
    game.high_score = high_score;

    terminal::enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, terminal::EnterAlternateScreen, cursor::Hide)?;

    let result = game_loop(&mut out, &mut game);

    execute!(out, terminal::LeaveAlternateScreen, cursor::Show)?;
    terminal::disable_raw_mode()?;
    result
}

fn game_loop(out: &mut impl Write, game: &mut JumpGame) -> Result<u32> {
    let mut rng = rand::thread_rng();

    loop {
        let frame_start = Instant::now();

        let mut input = InputState::default();
        let mut confirm = false;
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press && key.kind != KeyEventKind::Repeat {
                    continue;
                }
                match key.code {
                    KeyCode::Left | KeyCode::Char('a') => input.left = true,
                    KeyCode::Right | KeyCode::Char('d') => input.right = true,
                    KeyCode::Char(' ') | KeyCode::Enter => confirm = true,
                    KeyCode::Esc | KeyCode::Char('q') => return Ok(game.score),
                    _ => {}
                }
            }
        }

        match game.phase {
            GamePhase::Menu => {
                if confirm {
                    game.start(&mut rng);
                }
            }
            GamePhase::Playing => process_tick(game, input, &mut rng),
            GamePhase::GameOver => {
                if confirm {
                    return Ok(game.score);
                }
            }
        }

        draw(out, game)?;

        if let Some(rest) = TICK.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }
}

fn draw(out: &mut impl Write, game: &JumpGame) -> Result<()> {
    let mut grid = vec![vec![' '; COLS]; ROWS];

    for cloud in &game.clouds {
        let row = cloud.screen_y(game.camera_y) / SCALE_Y;
        let col = cloud.x / SCALE_X;
        plot(&mut grid, col, row, '~');
        plot(&mut grid, col + 1.0, row, '~');
    }

    for platform in &game.platforms {
        if !platform.is_visible(game.camera_y) {
            continue;
        }
        let row = (platform.screen_y(game.camera_y) + PLATFORM_HEIGHT / 2.0) / SCALE_Y;
        let start = platform.x / SCALE_X;
        let cells = (platform.width / SCALE_X).round().max(1.0) as usize;
        for i in 0..cells {
            plot(&mut grid, start + i as f64, row, '=');
        }
    }

    plot(
        &mut grid,
        game.player.x / SCALE_X,
        game.player_screen_y() / SCALE_Y,
        '@',
    );

    queue!(out, terminal::Clear(ClearType::All), cursor::MoveTo(0, 0))?;
    queue!(
        out,
        Print(format!(
            "Score: {}  High: {}\r\n",
            game.score, game.high_score
        ))
    )?;
    for row in &grid {
        let line: String = row.iter().collect();
        queue!(out, Print(line), Print("\r\n"))?;
    }

    match game.phase {
        GamePhase::Menu => queue!(
            out,
            Print("Space to start, a/d or arrows to move, q to quit")
        )?,
        GamePhase::Playing => queue!(out, Print("a/d or arrows to move, q to quit"))?,
        GamePhase::GameOver => queue!(out, Print("Game over! Space to finish"))?,
    }

    out.flush()?;
    Ok(())
}

fn plot(grid: &mut [Vec<char>], col: f64, row: f64, glyph: char) {
    let (col, row) = (col as isize, row as isize);
    if col >= 0 && (col as usize) < COLS && row >= 0 && (row as usize) < ROWS {
        grid[row as usize][col as usize] = glyph;
    }
}
