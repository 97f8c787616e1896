//! 验证码协作方 - 业务能力层
//!
//! 识别服务和答案缓存都是外部协作方，这里只定义缝合点
//! 和一个基于 HTTP API + 本地缓存文件的默认实现。
//! 缓存以图片 URL 为键，多个并发任务可以安全读取。

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::Config;

/// 候选答案是否可提交：恰好 6 位且全为数字
pub fn is_valid_answer(answer: &str) -> bool {
    match Regex::new(r"^\d{6}$") {
        Ok(re) => re.is_match(answer),
        Err(_) => false,
    }
}

/// 验证码解析协作方
#[async_trait]
pub trait CaptchaResolver: Send + Sync {
    /// 调用识别服务，输入 base64 图片数据，返回候选答案
    async fn solve(&self, image_base64: &str) -> Result<String>;

    /// 按图片标识键查缓存，未命中返回 None
    async fn cache_lookup(&self, image_key: &str) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct SolveResponse {
    answer: String,
}

/// HTTP 识别服务 + 本地缓存文件实现
pub struct HttpCaptchaResolver {
    client: reqwest::Client,
    api_url: String,
    cache: RwLock<HashMap<String, String>>,
}

impl HttpCaptchaResolver {
    /// 创建实现并加载缓存文件（文件不存在视为空缓存）
    pub fn new(config: &Config) -> Self {
        let cache = match std::fs::read_to_string(&config.captcha_cache_file) {
            Ok(content) => match serde_json::from_str::<HashMap<String, String>>(&content) {
                Ok(map) => {
                    info!("已加载验证码缓存: {} 条", map.len());
                    map
                }
                Err(e) => {
                    warn!("验证码缓存文件解析失败，按空缓存处理: {}", e);
                    HashMap::new()
                }
            },
            Err(_) => {
                debug!("验证码缓存文件不存在: {}", config.captcha_cache_file);
                HashMap::new()
            }
        };

        Self {
            client: reqwest::Client::new(),
            api_url: config.captcha_api_url.clone(),
            cache: RwLock::new(cache),
        }
    }
}

#[async_trait]
impl CaptchaResolver for HttpCaptchaResolver {
    async fn solve(&self, image_base64: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.api_url)
            .json(&serde_json::json!({ "image": image_base64 }))
            .send()
            .await
            .with_context(|| format!("验证码识别请求失败: {}", self.api_url))?;

        let body: SolveResponse = response
            .json()
            .await
            .context("验证码识别响应解析失败")?;

        debug!("识别服务返回: {}", body.answer);
        Ok(body.answer.trim().to_string())
    }

    async fn cache_lookup(&self, image_key: &str) -> Option<String> {
        let cache = self.cache.read().ok()?;
        cache.get(image_key).cloned()
    }
}
