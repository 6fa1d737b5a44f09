pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Unexpected response from {source_name}: {message}")]
    UnexpectedResponse { source_name: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel export error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),
}

impl Error {
    pub fn unexpected(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::UnexpectedResponse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by the caller's input rather than by I/O.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Error::BadRequest(_) | Error::Validation(_))
    }
}
