//! Ordered walk over texture providers.

use std::future::Future;

/// Queries `providers` in order and returns the first result accepted by
/// `is_success`. Providers after the first success are never queried.
pub async fn first_success<P, T, F, Fut>(
    providers: impl IntoIterator<Item = P>,
    mut query: F,
    is_success: impl Fn(&T) -> bool,
) -> Option<T>
where
    F: FnMut(P) -> Fut,
    Fut: Future<Output = T>,
{
    for provider in providers {
        let result = query(provider).await;
        if is_success(&result) {
            return Some(result);
        }
    }
    None
}
