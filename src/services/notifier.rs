//! 通知协作方 - 业务能力层
//!
//! 紧急告警（缓存不一致、致命错误）通过注入的 Notifier 发出，
//! 默认实现走 Webhook。

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

/// 外部通知协作方
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<()>;
}

/// Webhook 通知实现
///
/// URL 为空时静默丢弃消息，方便本地调试。
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        if self.url.is_empty() {
            debug!("未配置 webhook，丢弃通知: {}", message);
            return Ok(());
        }

        self.client
            .post(&self.url)
            .json(&serde_json::json!({ "content": message }))
            .send()
            .await
            .with_context(|| format!("webhook 发送失败: {}", self.url))?;

        info!("已发送 webhook 通知");
        Ok(())
    }
}
