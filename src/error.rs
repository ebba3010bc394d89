use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Data de nascimento inválida.")]
    InvalidDate,

    #[error("Limite de participantes atingido. Inscrições encerradas.")]
    CapacityExceeded,

    #[error("Participante não encontrado.")]
    NotFound,

    #[error("Credenciais inválidas.")]
    Auth,

    #[error("Erro ao acessar o banco de dados: {0}")]
    Persistence(#[from] redis::RedisError),

    #[error("Registro inválido no banco de dados: {0}")]
    Document(#[from] serde_json::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Validation { .. } | AppError::InvalidDate => StatusCode::BAD_REQUEST,
            AppError::Auth => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::CapacityExceeded => StatusCode::CONFLICT,
            AppError::Persistence { .. } | AppError::Document { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}
