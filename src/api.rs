//! Request/response contracts exposed to the HTTP layer.
//!
//! No framework types here: these are the JSON bodies an HTTP adapter
//! serializes, with the status class supplied by
//! [`CragError::http_status`](crate::error::CragError::http_status).

use serde::{Deserialize, Serialize};

use crate::error::CragError;

/// Body of a successful complete / uncomplete request: the user's new
/// completion state for the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRouteResponse {
    pub user_completed_route: bool,
}

/// Body of a successful rating set / clear request. `None` after a clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRatingResponse {
    pub user_rating: Option<i64>,
}

/// Uniform error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&CragError> for ErrorResponse {
    fn from(err: &CragError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResourceType;

    #[test]
    fn responses_use_the_wire_field_names() {
        let body = serde_json::to_value(CompleteRouteResponse {
            user_completed_route: true,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "userCompletedRoute": true }));

        let body = serde_json::to_value(UserRatingResponse { user_rating: None }).unwrap();
        assert_eq!(body, serde_json::json!({ "userRating": null }));
    }

    #[test]
    fn error_body_carries_the_message() {
        let err = CragError::not_found(ResourceType::Gym, "g1");
        let body = ErrorResponse::from(&err);
        assert_eq!(body.error, "gym 'g1' not found");
    }
}
