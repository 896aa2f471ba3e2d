use crate::commands::App;
use comfy_table::{presets::UTF8_FULL, Table};
use skyhop_core::Result;

pub async fn handle_history(app: &App, limit: u32) -> Result<()> {
    let store = app.storage.sessions();
    let sessions = store.recent_sessions(limit).await?;

    if sessions.is_empty() {
        println!("No sessions recorded yet. Run 'skyhop play' first.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Played", "Score", "Submission"]);

    for session in &sessions {
        table.add_row(vec![
            session.played_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            session.score.to_string(),
            session
                .submitted_tx
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }

    println!("{}", table);
    println!("Personal best: {}", store.high_score().await?);
    Ok(())
}
