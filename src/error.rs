use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Gym,
    Wall,
    Route,
    UserRating,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceType::Gym => write!(f, "gym"),
            ResourceType::Wall => write!(f, "wall"),
            ResourceType::Route => write!(f, "route"),
            ResourceType::UserRating => write!(f, "user rating"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CragErrorCode {
    GymNotFound,
    WallNotFound,
    RouteNotFound,
    UserRatingNotFound,
    Conflict,
    Validation,
    Storage,
    TransactionNotCommitted,
}

impl CragErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            CragErrorCode::GymNotFound => "gym_not_found",
            CragErrorCode::WallNotFound => "wall_not_found",
            CragErrorCode::RouteNotFound => "route_not_found",
            CragErrorCode::UserRatingNotFound => "user_rating_not_found",
            CragErrorCode::Conflict => "conflict",
            CragErrorCode::Validation => "validation",
            CragErrorCode::Storage => "storage",
            CragErrorCode::TransactionNotCommitted => "transaction_not_committed",
        }
    }
}

#[derive(Debug, Error)]
pub enum CragError {
    #[error("{resource_type} '{resource_id}' not found")]
    NotFound {
        resource_type: ResourceType,
        resource_id: String,
    },
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("transaction on '{path}' not committed")]
    TransactionNotCommitted { path: String },
}

impl CragError {
    pub fn not_found(resource_type: ResourceType, resource_id: impl Into<String>) -> Self {
        CragError::NotFound {
            resource_type,
            resource_id: resource_id.into(),
        }
    }

    pub fn code(&self) -> CragErrorCode {
        match self {
            CragError::NotFound { resource_type, .. } => match resource_type {
                ResourceType::Gym => CragErrorCode::GymNotFound,
                ResourceType::Wall => CragErrorCode::WallNotFound,
                ResourceType::Route => CragErrorCode::RouteNotFound,
                ResourceType::UserRating => CragErrorCode::UserRatingNotFound,
            },
            CragError::Conflict(_) => CragErrorCode::Conflict,
            CragError::Validation(_) => CragErrorCode::Validation,
            CragError::Storage(_) => CragErrorCode::Storage,
            CragError::TransactionNotCommitted { .. } => CragErrorCode::TransactionNotCommitted,
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code().as_str()
    }

    /// Status class the HTTP layer reports for this error: 404 for missing
    /// resources, 400 for state conflicts and rejected input, 500 for storage
    /// faults (including non-committed transactions).
    pub fn http_status(&self) -> u16 {
        match self {
            CragError::NotFound { .. } => 404,
            CragError::Conflict(_) | CragError::Validation(_) => 400,
            CragError::Storage(_) | CragError::TransactionNotCommitted { .. } => 500,
        }
    }
}
