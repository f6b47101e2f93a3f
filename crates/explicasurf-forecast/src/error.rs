//! Forecast-specific error types.

use explicasurf_core::{AppError, ForecastServiceError, NetworkError, ReqwestErrorExt};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}

impl ForecastError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Erro ao carregar dados do oceano".to_string(),
            Self::Status { status, .. } if *status >= 500 => {
                "O serviço de previsão está indisponível. Tente novamente.".to_string()
            }
            Self::Status { status, .. } => format!("Falha ao buscar dados ({})", status),
            Self::Parse(_) => "Resposta inesperada do serviço de previsão".to_string(),
            Self::InvalidSelection(msg) => format!("Seleção inválida: {}", msg),
        }
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status >= 500 || *status == 429 || *status == 408,
            Self::Parse(_) | Self::InvalidSelection(_) => false,
        }
    }
}

impl From<ForecastError> for AppError {
    fn from(e: ForecastError) -> Self {
        match e {
            ForecastError::Network(err) => AppError::Network(err.into_network_error()),
            ForecastError::Status { status, body } => {
                AppError::Network(NetworkError::ServerError {
                    status,
                    message: body,
                })
            }
            ForecastError::Parse(msg) => AppError::Forecast(ForecastServiceError::Malformed(msg)),
            ForecastError::InvalidSelection(msg) => {
                AppError::Forecast(ForecastServiceError::InvalidSelection(msg))
            }
        }
    }
}
