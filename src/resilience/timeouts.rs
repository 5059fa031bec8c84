//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap every upstream hop with a fixed deadline
//! - Cancel the in-flight connection when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; dropping the future tears the
//!   connection down
//! - Timeout errors are distinct from other errors
//! - Timed-out requests return 504 Gateway Timeout

use std::future::Future;
use std::time::Duration;

use crate::error::CorsProxyError;
use crate::observability::metrics;

/// Deadline applied to each upstream hop.
pub const DEFAULT_HOP_TIMEOUT: Duration = Duration::from_secs(30);

/// Run `fut` under `deadline`, mapping expiry to a 504.
pub async fn with_hop_timeout<T, F>(deadline: Duration, fut: F) -> Result<T, CorsProxyError>
where
    F: Future<Output = Result<T, CorsProxyError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => {
            metrics::record_upstream_error("timeout");
            Err(CorsProxyError::gateway_timeout("Request timeout"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let result =
            with_hop_timeout(Duration::from_millis(200), async { Ok::<_, CorsProxyError>(7) })
                .await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_expiry_is_504() {
        let result = with_hop_timeout(Duration::from_millis(20), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, CorsProxyError>(())
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.message(), "Request timeout");
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let result = with_hop_timeout(Duration::from_millis(200), async {
            Err::<(), _>(CorsProxyError::bad_gateway("refused"))
        })
        .await;
        assert_eq!(result.unwrap_err().status(), StatusCode::BAD_GATEWAY);
    }
}
