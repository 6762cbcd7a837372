use gepn_storage::StoreError;
use thiserror::Error;

/// Why a bearer token was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum UnauthorizedReason {
    /// No token was presented.
    Missing,
    /// The token is malformed or its signature does not verify.
    Invalid,
    Expired,
    Revoked,
    /// The token's subject no longer exists.
    UnknownSubject,
    /// The live identity could not be fetched.
    StoreUnavailable,
    /// The token was issued to a different identity variant.
    WrongKind,
}

impl UnauthorizedReason {
    /// Client-facing message.
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Missing => "Token no proporcionado",
            Self::Expired => "Token expirado",
            Self::Revoked => "Sesión finalizada",
            _ => "Token inválido",
        }
    }
}

/// Errors surfaced by authentication and authorization.
///
/// Every variant maps to one stable machine code and HTTP status.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The request is missing a field or has an invalid one.
    #[error("{0}")]
    Malformed(String),
    /// Unknown login key or wrong secret. Carries the flow's fixed message.
    #[error("{0}")]
    InvalidCredentials(&'static str),
    #[error("{0}")]
    Inactive(&'static str),
    #[error("Funcionario no tiene PIN configurado para patrullaje")]
    PinNotConfigured,
    #[error("unauthorized: {0}")]
    Unauthorized(UnauthorizedReason),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    /// Never shown to clients; logged at the boundary.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Stable machine code of the error kind.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "malformed_request",
            Self::InvalidCredentials(_) => "invalid_credentials",
            Self::Inactive(_) => "inactive_identity",
            Self::PinNotConfigured => "pin_not_configured",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::Conflict(_) => "conflict",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
        }
    }

    /// Message safe to return to the client.
    pub fn client_message(&self) -> String {
        match self {
            Self::Unauthorized(reason) => reason.message().to_owned(),
            Self::Internal(_) => "Error interno del servidor".to_owned(),
            other => other.to_string(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { field } => Self::Conflict(conflict_message(field).to_owned()),
            StoreError::NotFound => Self::NotFound("Registro no encontrado".to_owned()),
            other => Self::Internal(other.to_string()),
        }
    }
}

fn conflict_message(field: &str) -> &'static str {
    match field {
        "credential" => "La credencial ya está registrada",
        "national_id" => "La cédula ya está registrada",
        "username" => "El nombre de usuario ya existe",
        "email" => "El email ya está registrado",
        _ => "El registro ya existe",
    }
}
