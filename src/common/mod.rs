pub mod error;

use std::future::Future;
use std::time::Duration;

pub use error::{DiscoveryError, DiscoveryErrorKind};

/// 为一次网络等待加上超时，超时转换为普通错误，交给调用方按失败处理
pub async fn bounded<T, F>(timeout: Duration, what: &str, fut: F) -> anyhow::Result<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!("{} timed out after {}ms", what, timeout.as_millis()),
        )
        .into()),
    }
}
