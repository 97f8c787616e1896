//! 抽选提交序列器 - 流程层
//!
//! 按变体的阶段表逐阶段推进：停顿、确认检查点、填表、提交。
//! 检查点只会被确认，绝不被假定；任何不匹配立即以 LotteryError 终止。

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use crate::error::EngineError;
use crate::infrastructure::PageDriver;
use crate::models::lottery::{required_field, LotteryApplication, LotteryVariant};
use crate::services::captcha::CaptchaResolver;
use crate::services::fields::{phone_full, split_date, split_peer_name, split_phone, split_zipcode};
use crate::services::notifier::Notifier;
use crate::services::timing::TimingController;
use crate::workflow::captcha_flow::{CaptchaFlow, CaptchaOutcome};
use crate::workflow::lottery_ctx::LotteryCtx;
use crate::workflow::stages::selectors::*;
use crate::workflow::stages::{
    Checkpoint, PauseSpec, StageAction, StageSpec, INLAND_STAGES, NO_HOUSE_NUMBER_PLACEHOLDER,
    OVERSEA_STAGES, TICKET_COUNT_VALUE,
};

/// 地址自动填充轮询上限
const ADDRESS_POLL_LIMIT: usize = 250;
/// 地址轮询间隔（毫秒，固定节奏）
const ADDRESS_POLL_INTERVAL_MS: u64 = 1000;
/// 每多少次轮询重新触发一次邮编检索
const ADDRESS_RETRIGGER_EVERY: usize = 25;

/// 海外版出票方式页面轮询上限
const TICKET_WAIT_LIMIT: usize = 100;
/// 出票方式页面轮询间隔（毫秒）
const TICKET_WAIT_INTERVAL_MS: u64 = 600;
/// 出票方式页面的标题字面量
const TICKET_ISSUANCE_HEADING: &str = "Ticket Issuance select";

/// 一次成功提交的产出，由调用方负责持久化
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    /// 服务端签发的受理编号
    pub acpt_no: String,
    pub summary: String,
    pub solve_tries: u32,
    pub submit_tries: u32,
}

/// 页面文本归一化：去首尾空白、去换行和制表符
fn normalize(text: &str) -> String {
    text.trim().replace(['\n', '\t'], "")
}

pub struct LotteryFlow<'a> {
    driver: &'a dyn PageDriver,
    resolver: &'a dyn CaptchaResolver,
    notifier: &'a dyn Notifier,
    timing: &'a TimingController,
    seven_reject_probability: f64,
}

impl<'a> LotteryFlow<'a> {
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

    /// 跑完一条记录的完整提交流程
    pub async fn run(
        &self,
        application: &LotteryApplication,
        ctx: &LotteryCtx,
        entry_url: &str,
    ) -> Result<SubmissionOutcome> {
        let stages: &[StageSpec] = match ctx.variant {
            LotteryVariant::Oversea => OVERSEA_STAGES,
            LotteryVariant::Inland => INLAND_STAGES,
        };

        let mut captcha: Option<CaptchaOutcome> = None;
        let mut outcome: Option<SubmissionOutcome> = None;

        for stage in stages {
            info!("{} 阶段: {}", ctx, stage.name);

            self.apply_pause(&stage.pause_before).await;

            for checkpoint in stage.checkpoints {
                self.assert_checkpoint(checkpoint, stage.name).await?;
            }

            self.run_action(stage.action, application, ctx, entry_url, &mut captcha, &mut outcome)
                .await?;

            self.apply_pause(&stage.pause_before_submit).await;
            if let Some(selector) = stage.submit {
                self.driver.click(selector).await?;
            }
            self.apply_pause(&stage.pause_after_submit).await;

            if let Some(selector) = stage.error_check {
                self.check_server_error(selector, stage.name).await?;
            }
        }

        outcome.ok_or_else(|| anyhow!("阶段表执行完毕但没有产生提交结果"))
    }

    async fn apply_pause(&self, pause: &PauseSpec) {
        match pause {
            PauseSpec::None => {}
            PauseSpec::Fixed(ms) => self.timing.fixed(*ms).await,
            PauseSpec::Jitter(ms) => self.timing.pause(*ms).await,
            PauseSpec::Choice(candidates) => self.timing.pause_choice(candidates).await,
        }
    }

    /// 确认检查点，失败即冷却后抛 LotteryError
    async fn assert_checkpoint(&self, checkpoint: &Checkpoint, stage_name: &str) -> Result<()> {
        let (selector, expected) = match checkpoint {
            Checkpoint::Navigation(expected) => (NAV_CURRENT, *expected),
            Checkpoint::Heading(expected) => (SECTION_HEADING, *expected),
        };
        let actual = normalize(&self.driver.inner_text(selector).await?);
        if actual != expected {
            self.timing.cooldown().await;
            return Err(EngineError::lottery(format!(
                "未到达预期页面 {} (阶段 {}, 实际 {})",
                expected, stage_name, actual
            ))
            .into());
        }
        Ok(())
    }

    /// 提交后的服务端校验错误元素检查
    async fn check_server_error(&self, selector: &str, stage_name: &str) -> Result<()> {
        if self.driver.exists(selector).await? {
            let message = self.driver.inner_text(selector).await?.trim().to_string();
            if !message.is_empty() {
                self.timing.cooldown().await;
                return Err(EngineError::lottery(format!(
                    "阶段 {} 被服务端拒绝: {}",
                    stage_name, message
                ))
                .into());
            }
        }
        Ok(())
    }

    async fn run_action(
        &self,
        action: StageAction,
        application: &LotteryApplication,
        ctx: &LotteryCtx,
        entry_url: &str,
        captcha: &mut Option<CaptchaOutcome>,
        outcome: &mut Option<SubmissionOutcome>,
    ) -> Result<()> {
        match action {
            StageAction::NoOp => {}

            StageAction::OverseaEntry => {
                self.driver.goto(entry_url).await?;
                self.driver.click(OVERSEA_ENTRY_BUTTON).await?;
                self.driver.click(TERMS_CHECKBOX).await?;
                self.driver.click(FAST_REGIST_TOGGLE).await?;
            }

            StageAction::InlandEntry => {
                self.driver.goto(entry_url).await?;
                self.driver.click(INLAND_LANDING_BUTTON).await?;
                self.driver.click(INLAND_ENTRY_BUTTON).await?;
                self.driver.click(TERMS_CHECKBOX).await?;
                self.driver.click(FAST_REGIST_TOGGLE).await?;
            }

            StageAction::OverseaCustomerInfo => {
                self.fill_oversea_customer_info(application).await?;
            }

            StageAction::InlandCustomerInfo => {
                self.fill_inland_customer_info(application).await?;
            }

            StageAction::SelectShow => {
                // show_no 是 1 起始的下标
                self.driver.select_show(application.show_no).await?;
            }

            StageAction::SelectSeat => {
                self.driver.select_general_seat().await?;
            }

            StageAction::SelectCount => {
                self.driver
                    .select_value(TICKET_COUNT_SELECT, TICKET_COUNT_VALUE)
                    .await?;
            }

            StageAction::OverseaPayment => {
                self.fill_oversea_payment(application).await?;
            }

            StageAction::InlandPaymentMethod => {
                self.driver.click(INLAND_PAYMENT_711_RADIO).await?;
            }

            StageAction::InlandPickupAccount => {
                let account = required_field(&application.pia_account, "pia_account")?;
                let password = required_field(&application.pia_password, "pia_password")?;
                self.driver.fill(INLAND_PIA_ACCOUNT, account).await?;
                self.driver.fill(INLAND_PIA_PASSWORD, password).await?;
            }

            StageAction::WaitTicketIssuance => {
                self.wait_ticket_issuance().await?;
            }

            StageAction::SolveCaptcha => {
                let flow = CaptchaFlow::new(
                    self.driver,
                    self.resolver,
                    self.notifier,
                    self.timing,
                    self.seven_reject_probability,
                );
                let result = flow.run(ctx).await?;
                if !result.passed {
                    self.timing.cooldown().await;
                    return Err(EngineError::captcha("验证码解析重试次数耗尽").into());
                }
                *captcha = Some(result);
            }

            StageAction::FinishOversea => {
                *outcome = Some(
                    self.finish(ctx, captcha, OVERSEA_ACPT_NO, "Oversea Accepted")
                        .await?,
                );
            }

            StageAction::FinishInland => {
                *outcome = Some(
                    self.finish(ctx, captcha, INLAND_ACPT_NO, "Inland Accepted")
                        .await?,
                );
            }
        }
        Ok(())
    }

    async fn fill_oversea_customer_info(&self, application: &LotteryApplication) -> Result<()> {
        self.driver
            .fill(OVERSEA_FIRST_NAME, application.first_name.trim())
            .await?;
        self.driver
            .fill(OVERSEA_LAST_NAME, application.last_name.trim())
            .await?;

        if application.male {
            self.driver.check(OVERSEA_GENDER_MALE).await?;
        } else {
            self.driver.check(OVERSEA_GENDER_FEMALE).await?;
        }
        self.timing.pause(1000).await;

        let birth = split_date(&application.birth)?;
        self.driver.select_value(OVERSEA_BIRTH_YEAR, &birth.year).await?;
        self.driver.select_value(OVERSEA_BIRTH_MONTH, &birth.month).await?;
        self.driver.select_value(OVERSEA_BIRTH_DAY, &birth.day).await?;

        let phone = split_phone(&application.phone);
        self.driver.fill(OVERSEA_PHONE_FIRST, &phone.first_three).await?;
        self.driver.fill(OVERSEA_PHONE_MIDDLE, &phone.middle_four).await?;
        self.driver.fill(OVERSEA_PHONE_LAST, &phone.last_four).await?;
        self.timing.pause(1000).await;

        self.driver.fill(OVERSEA_EMAIL, application.email.trim()).await?;
        self.driver
            .fill(OVERSEA_EMAIL_CONFIRM, application.email.trim())
            .await?;
        self.timing.pause(1000).await;

        let nationality = required_field(&application.nationality, "nationality")?;
        self.driver.select_label(OVERSEA_NATIONALITY, nationality).await?;

        self.driver
            .fill(OVERSEA_PASSWORD, application.password.trim())
            .await?;

        let (peer_first, peer_last) = split_peer_name(&application.peer_name)?;
        self.driver.fill(OVERSEA_PEER_FIRST_NAME, &peer_first).await?;
        self.driver.fill(OVERSEA_PEER_LAST_NAME, &peer_last).await?;
        self.driver
            .fill(OVERSEA_PEER_PHONE, phone_full(&application.peer_phone))
            .await?;

        Ok(())
    }

    async fn fill_inland_customer_info(&self, application: &LotteryApplication) -> Result<()> {
        self.driver
            .fill(INLAND_LAST_NAME, application.last_name.trim())
            .await?;
        self.driver
            .fill(INLAND_FIRST_NAME, application.first_name.trim())
            .await?;
        let last_kana = required_field(&application.last_name_katakana, "last_name_katakana")?;
        let first_kana = required_field(&application.first_name_katakana, "first_name_katakana")?;
        self.driver.fill(INLAND_LAST_NAME_KANA, last_kana).await?;
        self.driver.fill(INLAND_FIRST_NAME_KANA, first_kana).await?;

        if application.male {
            self.driver.check(INLAND_GENDER_MALE).await?;
        } else {
            self.driver.check(INLAND_GENDER_FEMALE).await?;
        }
        self.timing.pause(1000).await;

        let birth = split_date(&application.birth)?;
        self.driver.select_value(INLAND_BIRTH_YEAR, &birth.year).await?;
        self.driver.select_value(INLAND_BIRTH_MONTH, &birth.month).await?;
        self.driver.select_value(INLAND_BIRTH_DAY, &birth.day).await?;

        let phone = split_phone(&application.phone);
        self.driver.fill(INLAND_PHONE_FIRST, &phone.first_three).await?;
        self.driver.fill(INLAND_PHONE_MIDDLE, &phone.middle_four).await?;
        self.driver.fill(INLAND_PHONE_LAST, &phone.last_four).await?;
        self.timing.pause(1000).await;

        self.driver.fill(INLAND_EMAIL, application.email.trim()).await?;
        self.driver
            .fill(INLAND_EMAIL_CONFIRM, application.email.trim())
            .await?;
        self.timing.pause(1000).await;

        // 邮编检索触发地址自动填充
        let postal_code = required_field(&application.postal_code, "postal_code")?;
        let zip = split_zipcode(postal_code)?;
        self.driver.fill(INLAND_ZIP_FIRST, &zip.first).await?;
        self.driver.fill(INLAND_ZIP_LAST, &zip.last).await?;
        self.driver.click(INLAND_ZIP_SEARCH).await?;
        self.wait_address_populated().await?;

        self.driver
            .fill(INLAND_PASSWORD, application.password.trim())
            .await?;

        // 国内版同行者姓名是单个输入框，不拆分
        self.driver
            .fill(INLAND_PEER_NAME, application.peer_name.trim())
            .await?;
        self.driver
            .fill(INLAND_PEER_PHONE, phone_full(&application.peer_phone))
            .await?;

        Ok(())
    }

    /// 等待地址第一行被服务端填充
    ///
    /// 校验错误元素一旦出现非空文本立即终止；轮询耗尽按超时处理。
    async fn wait_address_populated(&self) -> Result<()> {
        let mut found = false;

        for i in 0..ADDRESS_POLL_LIMIT {
            if i != 0 && i % ADDRESS_RETRIGGER_EVERY == 0 {
                self.driver.click(INLAND_ZIP_SEARCH).await?;
            }

            if self.driver.exists(INLAND_ZIP_ERROR).await? {
                let message = self.driver.inner_text(INLAND_ZIP_ERROR).await?;
                if !message.trim().is_empty() {
                    self.timing.cooldown().await;
                    return Err(EngineError::lottery(format!(
                        "邮编检索被拒绝: {}",
                        message.trim()
                    ))
                    .into());
                }
            }

            if !self.driver.input_value(INLAND_ADDRESS_1).await?.is_empty() {
                found = true;
                break;
            }

            self.timing.fixed(ADDRESS_POLL_INTERVAL_MS).await;
        }

        if !found {
            self.timing.cooldown().await;
            return Err(EngineError::lottery("地址自动填充超时（网络问题）").into());
        }

        self.timing.pause(2000).await;

        // 第二行为空时复制第一行
        let address_2 = self.driver.input_value(INLAND_ADDRESS_2).await?;
        if address_2.is_empty() {
            warn!("地址第二行为空，复制第一行");
            let address_1 = self.driver.input_value(INLAND_ADDRESS_1).await?;
            self.driver.fill(INLAND_ADDRESS_2, &address_1).await?;
        }
        // 第三行为空时填占位字面量
        let address_3 = self.driver.input_value(INLAND_ADDRESS_3).await?;
        if address_3.is_empty() {
            self.driver
                .fill(INLAND_ADDRESS_3, NO_HOUSE_NUMBER_PLACEHOLDER)
                .await?;
        }

        Ok(())
    }

    async fn fill_oversea_payment(&self, application: &LotteryApplication) -> Result<()> {
        let card_no = required_field(&application.credit_card_no, "credit_card_no")?;
        let card_month = required_field(&application.credit_card_month, "credit_card_month")?;
        let card_year = required_field(&application.credit_card_year, "credit_card_year")?;
        let card_cvv = required_field(&application.credit_card_cvv, "credit_card_cvv")?;

        self.driver.fill(OVERSEA_CARD_NO, card_no).await?;
        self.driver.select_value(OVERSEA_CARD_MONTH, card_month).await?;
        // 年份输入框带预填内容，先清空再写
        self.driver.fill(OVERSEA_CARD_YEAR, "").await?;
        self.driver.fill(OVERSEA_CARD_YEAR, card_year).await?;
        self.driver.fill(OVERSEA_CARD_CVV, card_cvv).await?;

        Ok(())
    }

    /// 信用卡提交后等待出票方式页面出现
    async fn wait_ticket_issuance(&self) -> Result<()> {
        for _ in 0..TICKET_WAIT_LIMIT {
            let heading = normalize(&self.driver.inner_text(SECTION_HEADING).await?);
            if heading == TICKET_ISSUANCE_HEADING {
                return Ok(());
            }
            self.timing.fixed(TICKET_WAIT_INTERVAL_MS).await;
        }

        self.timing.cooldown().await;
        Err(EngineError::lottery("信用卡提交未通过，未到达出票方式页面").into())
    }

    async fn finish(
        &self,
        ctx: &LotteryCtx,
        captcha: &mut Option<CaptchaOutcome>,
        acpt_selector: &str,
        summary_prefix: &str,
    ) -> Result<SubmissionOutcome> {
        let acpt_no = normalize(&self.driver.inner_text(acpt_selector).await?);
        let result = captcha.take().context("验证码阶段未执行")?;

        let summary = format!(
            "{}: {}\nCaptchaRun: {},{}\n{}",
            summary_prefix, acpt_no, result.solve_tries, result.submit_tries, result.summary
        );
        info!("{} 抽选已提交: {}", ctx, acpt_no);

        Ok(SubmissionOutcome {
            acpt_no,
            summary,
            solve_tries: result.solve_tries,
            submit_tries: result.submit_tries,
        })
    }
}
