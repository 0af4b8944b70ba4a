//! Error taxonomy for image requests.

use thiserror::Error;

/// Result type alias using TerraError.
pub type TerraResult<T> = Result<T, TerraError>;

/// Outcome of a failed view or image request.
///
/// `Display` is the log-oriented message; [`TerraError::user_message`] is the
/// text shown to visitors and never carries gateway details.
#[derive(Debug, Error)]
pub enum TerraError {
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    /// Zero images matched the date filter. Expected for sparse coverage.
    #[error("No {family} data for date {date}")]
    NoData { family: String, date: String },

    /// Dataset is in the catalog but no processor is wired for it.
    #[error("No processor wired for dataset {0}")]
    NotImplemented(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("{family} processing failed: {detail}")]
    Upstream { family: String, detail: String },

    #[error("Imagery service initialization failed: {0}")]
    Init(String),
}

impl TerraError {
    /// Get the HTTP status code for this error.
    ///
    /// `NoData` stays at 200: the JSON client treats it as a soft outcome.
    pub fn status_code(&self) -> u16 {
        match self {
            TerraError::DatasetNotFound(_) => 404,
            TerraError::NoData { .. } => 200,
            TerraError::NotImplemented(_) => 501,
            TerraError::InvalidDate(_) => 400,
            TerraError::Upstream { .. } | TerraError::Init(_) => 500,
        }
    }

    /// Message shown to the visitor.
    pub fn user_message(&self) -> String {
        match self {
            TerraError::DatasetNotFound(_) => "Dataset non trouvé".to_string(),
            TerraError::NoData { family, date } => {
                format!("Aucune donnée {} disponible pour cette date: {}.", family, date)
            }
            TerraError::NotImplemented(id) => {
                format!("Traitement non implémenté pour le dataset {}", id)
            }
            TerraError::InvalidDate(raw) => {
                format!("Date invalide: {} (format attendu: AAAA-MM-JJ)", raw)
            }
            TerraError::Upstream { family, .. } => {
                format!("Erreur lors du traitement {}", family)
            }
            TerraError::Init(_) => "Échec de l'initialisation de Earth Engine".to_string(),
        }
    }

    /// Gateway-side detail, kept out of the default user payload.
    pub fn detail(&self) -> Option<&str> {
        match self {
            TerraError::Upstream { detail, .. } | TerraError::Init(detail) => Some(detail),
            _ => None,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TerraError::DatasetNotFound(_) => "not_found",
            TerraError::NoData { .. } => "no_data",
            TerraError::NotImplemented(_) => "not_implemented",
            TerraError::InvalidDate(_) => "invalid_date",
            TerraError::Upstream { .. } => "upstream_failure",
            TerraError::Init(_) => "init_failure",
        }
    }
}
