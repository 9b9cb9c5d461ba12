use serde::{Deserialize, Serialize};

/// Lowest allowed per-user rating.
pub const RATING_MIN: i64 = -2;
/// Highest allowed per-user rating.
pub const RATING_MAX: i64 = 2;

/// Full identifier of a route: every route lives under exactly one wall,
/// every wall under exactly one gym.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub gym_id: String,
    pub wall_id: String,
    pub route_id: String,
}

impl RouteKey {
    pub fn new(
        gym_id: impl Into<String>,
        wall_id: impl Into<String>,
        route_id: impl Into<String>,
    ) -> Self {
        Self {
            gym_id: gym_id.into(),
            wall_id: wall_id.into(),
            route_id: route_id.into(),
        }
    }
}

impl std::fmt::Display for RouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.gym_id, self.wall_id, self.route_id)
    }
}

/// Route payload as stored. `difficulty` is an index into the gym's ordered
/// difficulty palette; `features` is the comma-joined token encoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Route {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_ratings: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Wall {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<String>,
}

/// Splits the comma-joined feature encoding into tokens. Blank entries are
/// dropped, so an absent or empty string is the empty set.
pub fn split_features(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
