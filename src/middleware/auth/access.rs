//! Identity resolution → `Identity` in request extensions.
//!
//! - cookie session first, then `Authorization: Bearer <jwt>`
//! - no identity → 401 before the handler runs
//! - handlers read the result through `CurrentUser`

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::error::AppError;
use crate::services::session::SessionCookies;
use crate::state::AppState;

/// Require an identity on every route of `router`.
///
/// ```ignore
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // from_fn cannot take a State extractor, so hand the state over explicitly
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(req.headers());
    let session = SessionCookies::from_jar(&jar, state.cookies());

    let Some(identity) = state.resolver.resolve(req.headers(), &session).await else {
        tracing::info!(path = %req.uri().path(), "request without identity rejected");
        return Err(AppError::Unauthorized);
    };

    tracing::debug!(
        user_id = %identity.user.id,
        source = ?identity.source,
        "identity resolved"
    );

    // middleware → extractor
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
