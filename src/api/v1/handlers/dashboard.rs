/*
 * Responsibility
 * - GET /dashboard: the one protected page; shows who is signed in
 */
use axum::Json;

use crate::api::v1::{dto::auth::DashboardResponse, extractors::CurrentUser};

pub async fn dashboard(CurrentUser(identity): CurrentUser) -> Json<DashboardResponse> {
    Json(DashboardResponse {
        user: identity.user,
        source: identity.source,
    })
}
