/// Errors that end a verification pass early.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("cannot check path of game {game}: {source}")]
    PathCheck {
        game: String,
        source: std::io::Error,
    },

    #[error("loading the path cache failed: {0}")]
    CacheLoad(#[from] tokio::task::JoinError),
}
