//! Error types for the tr-app service layer.

/// Application error type that flattens backend errors into messages for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("Scenario validation failed: {0}")]
    Validation(String),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Compilation failed: {0}")]
    Compile(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for tr-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<tr_project::ProjectError> for AppError {
    fn from(err: tr_project::ProjectError) -> Self {
        match err {
            tr_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Scenario(other.to_string()),
        }
    }
}

impl From<tr_project::ValidationError> for AppError {
    fn from(err: tr_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<tr_models::ModelError> for AppError {
    fn from(err: tr_models::ModelError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<tr_sim::SimError> for AppError {
    fn from(err: tr_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<tr_results::ResultsError> for AppError {
    fn from(err: tr_results::ResultsError) -> Self {
        match err {
            tr_results::ResultsError::DeviceNotFound { device_id, .. } => {
                AppError::DeviceNotFound(device_id)
            }
            other => AppError::Results(other.to_string()),
        }
    }
}
