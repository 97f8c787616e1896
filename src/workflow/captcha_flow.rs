//! 验证码解析循环 - 流程层
//!
//! 外层 ≤2 轮：一轮 = 解析出候选答案、提交、检查服务端回应。
//! 内层 ≤10 次：取图、缓存优先、校验候选答案，拿到首个可用答案即止。
//! 内层整体再套一层 5 次有界重试，吸收取图/识别的偶发失败。

use anyhow::{bail, Result};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{error, info, warn};

use crate::error::EngineError;
use crate::infrastructure::PageDriver;
use crate::services::captcha::{is_valid_answer, CaptchaResolver};
use crate::services::notifier::Notifier;
use crate::services::retry::retry;
use crate::services::timing::TimingController;
use crate::workflow::lottery_ctx::LotteryCtx;
use crate::workflow::stages::selectors::{
    CAPTCHA_INPUT, CAPTCHA_REFRESH, FAST_REGIST_TOGGLE, SUBMIT_ERROR, TERMS_CHECKBOX,
};

/// 外层提交尝试上限
const MAX_OUTER_ATTEMPTS: usize = 2;
/// 内层解析迭代上限
const MAX_INNER_ITERATIONS: usize = 10;
/// 内层过程的有界重试预算
const SOLVE_RETRY_BUDGET: usize = 5;
/// 每次取图前的名义停顿（毫秒）
const INNER_PAUSE_MS: u64 = 1000;
/// 刷新验证码后的名义停顿（毫秒）
const REFRESH_PAUSE_MS: u64 = 6688;
/// 缓存答案被拒后的固定冷却（毫秒）
const CACHE_REJECT_COOLDOWN_MS: u64 = 5000;

/// 站点在验证码错误时显示的两种文案
const INCORRECT_CAPTCHA_MESSAGES: [&str; 2] = [
    "画像認証を正しく入力してください。",
    "Please re-enter Authentication Characters correctry.",
];

fn is_incorrect_captcha_message(message: &str) -> bool {
    INCORRECT_CAPTCHA_MESSAGES.contains(&message)
}

/// 一次解析得到的候选答案（仅存活于单轮解析循环）
#[derive(Debug, Clone)]
pub struct CaptchaAttempt {
    /// 图片标识键（来源 URL）
    pub image_key: String,
    pub answer: String,
    /// 答案是否来自缓存
    pub cached: bool,
}

/// 解析循环的结果
#[derive(Debug, Clone)]
pub struct CaptchaOutcome {
    pub passed: bool,
    /// 最近一次确认页摘要
    pub summary: String,
    pub solve_tries: u32,
    pub submit_tries: u32,
}

/// 验证码解析循环
pub struct CaptchaFlow<'a> {
    driver: &'a dyn PageDriver,
    resolver: &'a dyn CaptchaResolver,
    notifier: &'a dyn Notifier,
    timing: &'a TimingController,
    seven_reject_probability: f64,
}

impl<'a> CaptchaFlow<'a> {
    pub fn new(
        driver: &'a dyn PageDriver,
        resolver: &'a dyn CaptchaResolver,
        notifier: &'a dyn Notifier,
        timing: &'a TimingController,
        seven_reject_probability: f64,
    ) -> Self {
        Self {
            driver,
            resolver,
            notifier,
            timing,
            seven_reject_probability,
        }
    }

    pub async fn run(&self, ctx: &LotteryCtx) -> Result<CaptchaOutcome> {
        let solve_tries = AtomicU32::new(0);
        let submit_tries = AtomicU32::new(0);
        let mut passed = false;
        let mut summary = String::new();
        // 同一张缓存图片只告警一次
        let mut alerted_keys: HashSet<String> = HashSet::new();

        for outer in 0..MAX_OUTER_ATTEMPTS {
            summary = self.driver.page_summary().await?;

            let attempt = match retry(SOLVE_RETRY_BUDGET, || {
                self.solve_and_fill(&solve_tries, &submit_tries)
            })
            .await
            {
                Ok(attempt) => attempt,
                Err(e) => {
                    self.timing.cooldown().await;
                    return Err(
                        EngineError::lottery(format!("验证码求解阶段失败: {}", e)).into()
                    );
                }
            };

            // 两个无条件确认点击：条款同意、快速登录开关
            self.driver.click(TERMS_CHECKBOX).await?;
            self.driver.click(FAST_REGIST_TOGGLE).await?;
            self.timing.pause_choice(&[2000, 10000]).await;

            if self.driver.exists(SUBMIT_ERROR).await? {
                let message = self.driver.inner_text(SUBMIT_ERROR).await?.trim().to_string();
                if !message.is_empty() {
                    if is_incorrect_captcha_message(&message) {
                        warn!(
                            "{} 验证码被拒绝 (第 {}/{} 轮)",
                            ctx,
                            outer + 1,
                            MAX_OUTER_ATTEMPTS
                        );
                        if attempt.cached && alerted_keys.insert(attempt.image_key.clone()) {
                            let alert = format!(
                                "URGENT: 本地验证码缓存不一致 {}\nURL: {}",
                                ctx, attempt.image_key
                            );
                            if let Err(e) = self.notifier.send(&alert).await {
                                error!("缓存不一致告警发送失败: {}", e);
                            }
                        }
                        self.timing.fixed(CACHE_REJECT_COOLDOWN_MS).await;
                        continue;
                    }
                    self.timing.cooldown().await;
                    return Err(EngineError::lottery(format!("提交抽选失败: {}", message)).into());
                }
            }

            passed = true;
            break;
        }

        Ok(CaptchaOutcome {
            passed,
            summary,
            solve_tries: solve_tries.load(Ordering::Relaxed),
            submit_tries: submit_tries.load(Ordering::Relaxed),
        })
    }

    /// 内层解析：取到首个可提交的候选答案并填入表单
    async fn solve_and_fill(
        &self,
        solve_tries: &AtomicU32,
        submit_tries: &AtomicU32,
    ) -> Result<CaptchaAttempt> {
        for _ in 0..MAX_INNER_ITERATIONS {
            self.timing.pause(INNER_PAUSE_MS).await;
            solve_tries.fetch_add(1, Ordering::Relaxed);

            let image_data = self.driver.captcha_image_base64().await?;
            let image_key = self.driver.captcha_image_src().await?;

            // 缓存优先；未命中时每次迭代至多调用一次识别服务
            let (answer, cached) = match self.resolver.cache_lookup(&image_key).await {
                Some(answer) => {
                    info!("验证码缓存命中, 答案 = {}", answer);
                    (answer, true)
                }
                None => (self.resolver.solve(&image_data).await?, false),
            };

            if !is_valid_answer(&answer) {
                warn!("候选答案 {} 不是 6 位数字，刷新重试", answer);
                self.refresh_captcha().await?;
                continue;
            }

            // 识别服务对数字 7 的误判率偏高，按概率丢弃含 7 的候选
            if answer.contains('7') && rand::random::<f64>() < self.seven_reject_probability {
                warn!("候选答案含 7，按启发式丢弃");
                self.refresh_captcha().await?;
                continue;
            }

            submit_tries.fetch_add(1, Ordering::Relaxed);
            self.driver.fill(CAPTCHA_INPUT, &answer).await?;
            return Ok(CaptchaAttempt {
                image_key,
                answer,
                cached,
            });
        }

        bail!("连续 {} 次迭代未得到可用的候选答案", MAX_INNER_ITERATIONS)
    }

    async fn refresh_captcha(&self) -> Result<()> {
        self.driver.click(CAPTCHA_REFRESH).await?;
        self.timing.pause(REFRESH_PAUSE_MS).await;
        Ok(())
    }
}
