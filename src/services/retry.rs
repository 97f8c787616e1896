//! 有界重试 - 业务能力层
//!
//! 只负责"重复执行直到成功或次数耗尽"，不带退避延时，
//! 延时由调用方自己安排。

use anyhow::{anyhow, Result};
use std::future::Future;
use tracing::warn;

/// 执行 task 至多 attempts 次，返回首个成功结果
///
/// 每次失败都会记录日志；全部失败时抛出最后一次的错误。
pub async fn retry<T, F, Fut>(attempts: usize, mut task: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;

    for i in 0..attempts {
        match task().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!("第 {}/{} 次尝试失败: {}", i + 1, attempts, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow!("重试次数必须大于 0")))
}
