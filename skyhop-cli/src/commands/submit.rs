use crate::commands::App;
use skyhop_core::{Result, SessionRecord, SkyhopError, WalletSession};
use std::sync::Arc;

pub async fn handle_submit(app: &App, score: Option<u32>) -> Result<()> {
    app.config.validate()?;

    let session = match score {
        Some(score) => app.storage.sessions().record_session(score).await?,
        None => app
            .storage
            .sessions()
            .last_session()
            .await?
            .ok_or_else(|| {
                SkyhopError::invalid_state("no recorded sessions; play a round first")
            })?,
    };

    if let Some(tx) = &session.submitted_tx {
        return Err(SkyhopError::invalid_state(format!(
            "this session was already submitted in {}",
            tx
        )));
    }

    submit_session(app, &session).await
}

/// The interactive submission flow shared by `submit` and post-game prompts.
pub async fn submit_session(app: &App, session: &SessionRecord) -> Result<()> {
    println!("Initializing relayer at {}...", app.config.relayer_url);
    app.relayer.init().await?;

    println!(
        "Connecting wallet provider at {}...",
        app.config.wallet_rpc_url
    );
    let wallet = Arc::new(WalletSession::connect(&app.config.wallet_rpc_url).await?);
    println!("Connected account {}", wallet.address());
    app.submitter.set_wallet(wallet);

    println!("Encrypting and submitting score {}...", session.score);
    let outcome = app.submitter.submit(session.score).await?;

    app.storage
        .sessions()
        .mark_submitted(&session.id, &outcome.tx_hash.to_string())
        .await?;

    match outcome.receipt.block_number {
        Some(block) => println!(
            "Score {} confirmed in block {} ({})",
            outcome.submitted_score, block, outcome.tx_hash
        ),
        None => println!(
            "Score {} submitted ({})",
            outcome.submitted_score, outcome.tx_hash
        ),
    }

    Ok(())
}
