use crate::commands::App;
use comfy_table::{presets::UTF8_FULL, Table};
use skyhop_core::{Leaderboard, Result, B256};
use std::time::Duration;

pub async fn handle_leaderboard(app: &App, watch: bool) -> Result<()> {
    app.config.validate()?;

    if !watch {
        let board = app.reader.refresh().await?;
        print_board(&board);
        return Ok(());
    }

    // The background task owns the refresh cadence; this loop renders each
    // new snapshot as it lands. Dropping the handle stops the task.
    let _poll = app.reader.spawn_polling(app.config.poll_interval);
    println!(
        "Watching the leaderboard (every {}s), Ctrl-C to stop",
        app.config.poll_interval.as_secs()
    );

    let mut last_fetch = None;
    loop {
        if let Some(board) = app.reader.snapshot() {
            if last_fetch != Some(board.fetched_at) {
                last_fetch = Some(board.fetched_at);
                print_board(&board);
            }
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(Duration::from_millis(500)) => {}
        }
    }

    Ok(())
}

fn print_board(board: &Leaderboard) {
    if board.entries.is_empty() {
        println!("No scores submitted yet.");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Rank", "Player", "Encrypted Score", "Submitted"]);

    for entry in &board.entries {
        table.add_row(vec![
            entry.rank.to_string(),
            entry.short_player(),
            short_handle(entry.encrypted_score),
            entry.timestamp.format("%Y-%m-%d %H:%M UTC").to_string(),
        ]);
    }

    println!("{}", table);
    println!(
        "Showing {} of {} submissions (scores stay encrypted on-chain)",
        board.entries.len(),
        board.total
    );
}

fn short_handle(handle: B256) -> String {
    let full = format!("{}", handle);
    format!("{}...{}", &full[..10], &full[full.len() - 6..])
}
