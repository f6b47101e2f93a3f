//! Centralized error types for ExplicaSurf.
//!
//! Every failure the CLI reports goes through [`AppError`], which keeps the
//! technical detail for logs and offers a short Portuguese message for the
//! user.

use thiserror::Error;

/// Top-level application error type.
///
/// Errors raised by the forecast crate convert into this type.
/// Use `user_message()` to get a display-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Forecast service error: {0}")]
    Forecast(#[from] ForecastServiceError),

    #[error("{0:#}")]
    Other(anyhow::Error),
}

impl From<anyhow::Error> for AppError {
    /// Recovers a typed [`ConfigError`] when the chain carries one.
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ConfigError>() {
            Ok(config) => AppError::Config(config),
            Err(other) => AppError::Other(other),
        }
    }
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Forecast(e) => e.user_message(),
            AppError::Other(_) => "Ocorreu um erro inesperado. Tente novamente.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => "Erro ao carregar dados do oceano",
            NetworkError::Timeout => {
                "O serviço demorou para responder. Ele pode estar acordando; tente novamente."
            }
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "O serviço de previsão está indisponível. Tente novamente."
            }
            NetworkError::ServerError { .. } => "Falha ao buscar dados do oceano.",
            NetworkError::InvalidResponse(_) => "Resposta inesperada do serviço de previsão",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Configuração inválida. Verifique o arquivo config.toml.",
            ConfigError::ParseError(_) => {
                "Não foi possível ler o arquivo config.toml. Verifique a sintaxe."
            }
        }
    }
}

/// Forecast service errors, as seen by the application layer.
#[derive(Debug, Error)]
pub enum ForecastServiceError {
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Unreadable forecast payload: {0}")]
    Malformed(String),
}

impl ForecastServiceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ForecastServiceError::InvalidSelection(_) => {
                "Seleção inválida: escolha um nível e um dia (hoje, amanhã ou depois de amanhã)."
            }
            ForecastServiceError::Malformed(_) => "Resposta inesperada do serviço de previsão",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
