use thiserror::Error;

/// Structural failures: no ledger can be built from the extracted tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("expected at least {required} extracted tables, found {found}")]
    InsufficientTables { found: usize, required: usize },

    #[error("no transaction tables selected by policy '{policy}'")]
    NoTablesSelected { policy: String },

    #[error("required column '{column}' not found in the statement")]
    MissingColumn { column: String },
}

impl BuildError {
    /// Message suitable for showing to the person who uploaded the statement.
    pub fn user_message(&self) -> String {
        format!("Statement format not recognized: {self}")
    }
}

/// Failures of the table extraction engine.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("incorrect password for the encrypted statement")]
    BadPassword,

    #[error("statement file is corrupt or not a PDF: {0}")]
    Corrupt(String),

    #[error("statement could not be read by the extraction engine: {0}")]
    Unsupported(String),

    #[error("extraction engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Actionable hint for the user
    pub fn hint(&self) -> &'static str {
        match self {
            ExtractError::BadPassword => {
                "Use the password you set when downloading the statement."
            }
            ExtractError::Corrupt(_) => "Download the statement again and retry.",
            ExtractError::Unsupported(_) => {
                "Only the provider's PDF statement layout is supported."
            }
            ExtractError::EngineUnavailable(_) => {
                "Install tabula-java and set extractor.command in ~/.mpesa/config.toml."
            }
            ExtractError::Io(_) => "Check that the file exists and is readable.",
        }
    }
}
