use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::error::ClientError;

/// Run `f` over `items` one at a time with `delay` between requests, for
/// providers that rate-limit per-asset lookups. Stops at the first error.
pub async fn paced<I, T, R, F, Fut>(items: I, delay: Duration, mut f: F) -> Result<Vec<R>, ClientError>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<R, ClientError>>,
{
    let mut results = Vec::new();
    for (n, item) in items.into_iter().enumerate() {
        if n > 0 && !delay.is_zero() {
            sleep(delay).await;
        }
        results.push(f(item).await?);
    }
    Ok(results)
}
