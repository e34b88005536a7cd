/// Route guards
///
/// `guard::<S>` runs a token [`Strategy`] against the `Authorization` header
/// and stores the authenticated user in the request extensions, where
/// handlers pick it up through [`CurrentUser`].
///
/// # Example
///
/// ```no_run
/// use axum::{middleware::from_fn_with_state, routing::get, Router};
/// use lms_api::{app::AppState, middleware::guard::guard};
/// use lms_shared::auth::strategy::AdminOnly;
///
/// # fn example(state: AppState) -> Router<AppState> {
/// async fn report() -> &'static str { "ok" }
///
/// Router::new().route(
///     "/report",
///     get(report).route_layer(from_fn_with_state(state, guard::<AdminOnly>)),
/// )
/// # }
/// ```

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use lms_shared::auth::strategy::{bearer_token, AuthError, Strategy};

use crate::{app::AppState, error::ApiError, extract::CurrentUser};

/// Rejects the request with 401 unless strategy `S` accepts the caller
pub async fn guard<S>(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, ApiError>
where
    S: Strategy + Default,
{
    let strategy = S::default();
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let user = match authenticate(&strategy, header.as_deref(), &state).await {
        Ok(user) => user,
        Err(err) => {
            tracing::debug!(strategy = strategy.name(), error = %err, "Guard rejected request");
            return Err(err.into());
        }
    };

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

async fn authenticate<S: Strategy>(
    strategy: &S,
    header: Option<&str>,
    state: &AppState,
) -> Result<lms_shared::models::user::User, AuthError> {
    let token = bearer_token(header)?;
    strategy
        .validate(token, &state.config.jwt.secret, state.store.as_ref())
        .await
}
