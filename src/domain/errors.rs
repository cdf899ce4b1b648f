use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entrada inválida: {0}")]
    InvalidInput(String),
    #[error("Error de operación: {0}")]
    OperationFailed(String),
    #[error("Error de persistencia: {0}")]
    Persistence(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
