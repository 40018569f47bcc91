//! エラー型定義
//!
//! バックグラウンドループ内のエラー（取得失敗・プローブ失敗）はログに記録されるだけで、
//! ここに現れるのは構築時とCLIのエラーのみ。

use thiserror::Error;

use crate::common::error::CommonError;
use crate::sync::FetchError;

/// endpoint-finder error type
#[derive(Debug, Error)]
pub enum FinderError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// Initial remote fetch failed during construction
    #[error("Initial endpoint fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Malformed `KEY=ADDR[,ADDR...]` seed argument
    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// endpoint-finder result type
pub type FinderResult<T> = Result<T, FinderError>;
