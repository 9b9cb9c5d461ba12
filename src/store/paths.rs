//! Path layout of the backing store.
//!
//! One function per addressable node so the layout lives in exactly one
//! place. Hierarchy roots: `/gyms`, `/walls`, `/routes`, `/completed`,
//! `/userRatings`, `/users`.

use crate::model::RouteKey;

pub fn gym(gym_id: &str) -> String {
    format!("/gyms/{gym_id}")
}

pub fn wall(gym_id: &str, wall_id: &str) -> String {
    format!("/walls/{gym_id}/{wall_id}")
}

pub fn route(key: &RouteKey) -> String {
    format!("/routes/{}/{}/{}", key.gym_id, key.wall_id, key.route_id)
}

pub fn route_features(key: &RouteKey) -> String {
    format!("{}/features", route(key))
}

pub fn route_difficulty(key: &RouteKey) -> String {
    format!("{}/difficulty", route(key))
}

pub fn route_completed_count(key: &RouteKey) -> String {
    format!("{}/completedCount", route(key))
}

pub fn route_user_ratings(key: &RouteKey) -> String {
    format!("{}/userRatings", route(key))
}

/// Completion record; existence of this node is the "has completed" signal.
pub fn completion(key: &RouteKey, user_id: &str) -> String {
    format!(
        "/completed/{}/{}/{}/{user_id}",
        key.gym_id, key.wall_id, key.route_id
    )
}

pub fn user_rating(key: &RouteKey, user_id: &str) -> String {
    format!(
        "/userRatings/{}/{}/{}/{user_id}",
        key.gym_id, key.wall_id, key.route_id
    )
}

pub fn user_completed_routes(user_id: &str) -> String {
    format!("/users/{user_id}/completedRoutes")
}

pub fn user_avg_difficulty(user_id: &str) -> String {
    format!("/users/{user_id}/avgDifficulty")
}

pub fn user_completed_features(user_id: &str) -> String {
    format!("/users/{user_id}/completedFeatures")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RouteKey;

    #[test]
    fn route_scoped_paths_nest_under_the_full_triple() {
        let key = RouteKey::new("g1", "w1", "r1");
        assert_eq!(route(&key), "/routes/g1/w1/r1");
        assert_eq!(route_completed_count(&key), "/routes/g1/w1/r1/completedCount");
        assert_eq!(completion(&key, "u1"), "/completed/g1/w1/r1/u1");
        assert_eq!(user_rating(&key, "u1"), "/userRatings/g1/w1/r1/u1");
    }

    #[test]
    fn user_scoped_paths_are_keyed_by_user_alone() {
        assert_eq!(user_completed_routes("u1"), "/users/u1/completedRoutes");
        assert_eq!(user_avg_difficulty("u1"), "/users/u1/avgDifficulty");
        assert_eq!(
            user_completed_features("u1"),
            "/users/u1/completedFeatures"
        );
    }
}
