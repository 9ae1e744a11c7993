//! Identity attachment middleware
//!
//! Asks the configured [`IdentityProvider`](crate::auth::IdentityProvider)
//! who is calling and stores the answer in the request extensions. It never
//! rejects: a request it cannot identify simply carries no identity, and the
//! access gate fails closed on it.

use crate::auth::SharedIdentityProvider;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{trace, warn};

/// Attach the caller identity, if any, to the request
pub async fn authenticate(
    State(provider): State<SharedIdentityProvider>,
    mut request: Request,
    next: Next,
) -> Response {
    match provider.identify(request.headers()).await {
        Ok(Some(identity)) => {
            trace!(role = %identity.role, user_id = identity.user_id, "Identity attached");
            request.extensions_mut().insert(identity);
        }
        Ok(None) => trace!("Anonymous request"),
        Err(e) => warn!(
            error = %e,
            provider = provider.provider_type(),
            "Ignoring unusable identity"
        ),
    }

    next.run(request).await
}
