use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value exists but cannot be decoded; the whole read fails.
    #[error("corrupt value under key '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Isi semua kolom!")]
    MissingField,

    #[error("tanggal tidak valid '{0}' (format: YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("notifikasi tidak ditemukan: {id}")]
    NotificationNotFound { id: Uuid },
}

pub type Result<T> = std::result::Result<T, Error>;
