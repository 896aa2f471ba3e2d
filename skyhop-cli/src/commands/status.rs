use crate::commands::App;
use skyhop_core::{Result, WalletSession};

pub async fn handle_status(app: &App) -> Result<()> {
    println!(
        "Network: {} (chain id {})",
        app.config.network, app.config.chain_id
    );
    println!("RPC endpoint: {}", app.config.rpc_url);
    println!("Relayer: {}", app.config.relayer_url);
    println!(
        "Personal best: {}",
        app.storage.sessions().high_score().await?
    );

    if app.config.validate().is_err() {
        println!("Contract: not configured (set with '--contract <address>')");
        return Ok(());
    }
    println!("Contract: {}", app.contract.address());

    match app.contract.get_score_count().await {
        Ok(total) => println!("Submissions on-chain: {}", total),
        Err(e) => println!("Submissions on-chain: unavailable ({})", e),
    }

    match app.relayer.init().await {
        Ok(()) => println!("Relayer status: ready"),
        Err(e) => println!("Relayer status: unavailable ({})", e),
    }

    match WalletSession::connect(&app.config.wallet_rpc_url).await {
        Ok(wallet) => {
            println!("Wallet account: {}", wallet.address());
            match wallet.chain_id().await {
                Ok(id) if id == app.config.chain_id => println!("Wallet chain: {} (ok)", id),
                Ok(id) => println!(
                    "Wallet chain: {} (expected {}, will request a switch on submit)",
                    id, app.config.chain_id
                ),
                Err(e) => println!("Wallet chain: unknown ({})", e),
            }
            match app.contract.has_player_submitted(wallet.address()).await {
                Ok(true) => {
                    if let Ok(handle) = app.contract.get_player_best_score(wallet.address()).await
                    {
                        println!("Best submitted score: {} (encrypted)", handle);
                    } else {
                        println!("Best submitted score: on-chain (encrypted)");
                    }
                }
                Ok(false) => println!("Best submitted score: none yet"),
                Err(e) => println!("Best submitted score: unavailable ({})", e),
            }
        }
        Err(e) => println!(
            "Wallet: not connected at {} ({})",
            app.config.wallet_rpc_url, e
        ),
    }

    Ok(())
}
