pub mod history;
pub mod leaderboard;
pub mod play;
pub mod status;
pub mod submit;

pub use history::handle_history;
pub use leaderboard::handle_leaderboard;
pub use play::handle_play;
pub use status::handle_status;
pub use submit::handle_submit;

use skyhop_core::rpc::RpcClient;
use skyhop_core::storage::Storage;
use skyhop_core::{ChainConfig, LeaderboardReader, RelayerClient, ScoreSubmitter, ScoreboardContract};
use skyhop_core::Result;
use std::path::Path;
use std::sync::Arc;

/// Shared wiring for all subcommands. Construction touches no network;
/// commands that need the chain validate the config themselves.
pub struct App {
    pub config: ChainConfig,
    pub storage: Storage,
    pub relayer: Arc<RelayerClient>,
    pub contract: Arc<ScoreboardContract>,
    pub reader: Arc<LeaderboardReader>,
    pub submitter: ScoreSubmitter,
}

impl App {
    pub async fn new(config: ChainConfig, data_dir: &Path) -> Result<Self> {
        let storage = Storage::new(&data_dir.join("skyhop.db")).await?;

        let relayer = Arc::new(RelayerClient::new(
            config.relayer_url.clone(),
            config.encryption_timeout,
        ));
        let reader_rpc = Arc::new(RpcClient::new(config.rpc_url.clone()));
        let contract = Arc::new(ScoreboardContract::new(config.contract_address, reader_rpc));
        let reader = Arc::new(LeaderboardReader::new(Arc::clone(&contract)));
        let submitter = ScoreSubmitter::new(
            config.clone(),
            Arc::clone(&relayer),
            Arc::clone(&contract),
        );

        Ok(Self {
            config,
            storage,
            relayer,
            contract,
            reader,
            submitter,
        })
    }
}
