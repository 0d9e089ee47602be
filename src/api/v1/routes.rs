/*
 * Responsibility
 * - v1 URL layout
 * - Which routes sit behind the identity middleware is decided here
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth::access;
use crate::state::AppState;

use crate::api::v1::handlers::{
    auth::{current_user, forgot_password, login, sign_out, sign_up, update_password},
    dashboard::dashboard,
};

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/signup", post(sign_up))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/signout", post(sign_out));

    let protected = Router::new()
        .route("/auth/user", get(current_user))
        .route("/auth/update-password", post(update_password))
        .route("/dashboard", get(dashboard));

    public.merge(access::apply(protected, state))
}
