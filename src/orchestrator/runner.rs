//! 抽选任务编排 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：连接浏览器、创建页面驱动和外部协作方
//! 2. **批量加载**：扫描记录目录，挑出 CREATED 状态的记录
//! 3. **顺序执行**：一条记录一条记录地跑，页面状态严格串行
//! 4. **状态流转**：扮演"外部调用方"角色，把结果写回记录文件
//! 5. **全局统计**：汇总成功/失败数量
//!
//! 引擎本身对记录只读；状态和受理编号的持久化都发生在这一层。

use anyhow::Result;
use chromiumoxide::Browser;
use chrono::Local;
use tracing::{error, info};

use crate::browser;
use crate::config::Config;
use crate::error::EngineError;
use crate::infrastructure::ChromiumDriver;
use crate::models::lottery::{LotteryApplication, LotteryResult, LotteryStatus, LotteryVariant};
use crate::models::{load_all_applications, save_application};
use crate::services::{HttpCaptchaResolver, Notifier, TimingController, WebhookNotifier};
use crate::utils::logging;
use crate::workflow::{LotteryCtx, LotteryFlow};

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    driver: ChromiumDriver,
    resolver: HttpCaptchaResolver,
    notifier: WebhookNotifier,
    timing: TimingController,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::log_startup(&config);

        let (browser, page) =
            browser::connect_to_browser_and_page(config.browser_debug_port).await?;

        let driver = ChromiumDriver::new(page);
        let resolver = HttpCaptchaResolver::new(&config);
        let notifier = WebhookNotifier::new(config.webhook_url.clone());
        let timing = TimingController::new(config.timing_scale);

        Ok(Self {
            config,
            _browser: browser,
            driver,
            resolver,
            notifier,
            timing,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let applications = load_all_applications(&self.config.record_folder).await?;
        let pending: Vec<LotteryApplication> = applications
            .into_iter()
            .filter(|a| a.status == LotteryStatus::Created)
            .collect();

        info!("✓ 找到 {} 条待处理记录", pending.len());

        let mut success = 0usize;
        let mut failed = 0usize;

        for (index, application) in pending.into_iter().enumerate() {
            let ctx = LotteryCtx::new(
                application.bundle.clone(),
                application.round.clone(),
                index + 1,
                application.variant,
            );

            match self.process_one(application, &ctx).await {
                Ok(()) => success += 1,
                Err(e) => {
                    failed += 1;
                    error!("{} 处理失败: {}", ctx, e);
                }
            }
        }

        logging::print_final_stats(success, failed);
        Ok(())
    }

    /// 处理单条记录并把结果写回
    async fn process_one(&self, mut application: LotteryApplication, ctx: &LotteryCtx) -> Result<()> {
        info!("{} 开始处理", ctx);

        application.status = LotteryStatus::Working;
        save_application(&application).await?;

        let entry_url = match application.variant {
            LotteryVariant::Oversea => &self.config.oversea_entry_url,
            LotteryVariant::Inland => &self.config.inland_entry_url,
        };

        let flow = LotteryFlow::new(
            &self.driver,
            &self.resolver,
            &self.notifier,
            &self.timing,
            self.config.seven_reject_probability,
        );

        match flow.run(&application, ctx, entry_url).await {
            Ok(outcome) => {
                application.status = LotteryStatus::Completed;
                application.result = LotteryResult::Pending;
                application.acpt_no = Some(outcome.acpt_no.clone());
                application.complete_date =
                    Some(Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
                save_application(&application).await?;

                if let Err(e) = self.notifier.send(&outcome.summary).await {
                    error!("{} 受理通知发送失败: {}", ctx, e);
                }
                info!("{} ✅ 已受理: {}", ctx, outcome.acpt_no);
                Ok(())
            }
            Err(e) => {
                let kind = match e.downcast_ref::<EngineError>() {
                    Some(EngineError::Captcha { .. }) => "captcha",
                    Some(EngineError::Lottery { .. }) => "lottery",
                    None => "other",
                };
                application.status = LotteryStatus::Error;
                application.last_error_message = Some(e.to_string());
                save_application(&application).await?;

                let alert = format!("{} 提交失败 ({}): {}", ctx, kind, e);
                if let Err(send_err) = self.notifier.send(&alert).await {
                    error!("{} 失败通知发送失败: {}", ctx, send_err);
                }
                Err(e)
            }
        }
    }
}
