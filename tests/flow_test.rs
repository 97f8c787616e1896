//! 端到端流程测试
//!
//! 用脚本化的假页面驱动 / 假识别服务 / 假通知器驱动完整流程，
//! 不需要真实浏览器。节奏控制器缩放为 0，停顿全部跳过。

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use lottery_submit::services::captcha::CaptchaResolver;
use lottery_submit::services::notifier::Notifier;
use lottery_submit::services::timing::TimingController;
use lottery_submit::workflow::stages::selectors::*;
use lottery_submit::workflow::stages::NO_HOUSE_NUMBER_PLACEHOLDER;
use lottery_submit::{
    CaptchaFlow, EngineError, LotteryApplication, LotteryCtx, LotteryFlow, LotteryResult,
    LotteryStatus, LotteryVariant, PageDriver,
};

const OVERSEA_ACPT: &str = "MM26-TEST-0001";
const INLAND_ACPT: &str = "26-123456";
const ADDRESS_LINE_1: &str = "東京都千代田区千代田1-1";
const CAPTCHA_KEY: &str = "https://lottery.example/captcha/one.jpg";
const INCORRECT_CAPTCHA_JA: &str = "画像認証を正しく入力してください。";

/// 脚本化假页面
///
/// 导航标签和标题按读取顺序从队列弹出，最后一个元素保持不变
/// （轮询场景会反复读取同一个值）。
struct MockDriver {
    nav_texts: Mutex<VecDeque<String>>,
    heading_texts: Mutex<VecDeque<String>>,
    /// 提交后错误元素的脚本：队列非空即"元素存在"
    error_texts: Mutex<VecDeque<String>>,
    /// 填写过的值，按选择器记录
    values: Mutex<HashMap<String, String>>,
    clicks: Mutex<Vec<String>>,
    /// 地址第一行出现之前还要空转多少次轮询
    address_polls_remaining: AtomicUsize,
    /// 邮编检索错误元素的文本，Some 即"元素存在"
    zip_error: Mutex<Option<String>>,
}

impl MockDriver {
    fn new(nav: &[&str], headings: &[&str]) -> Self {
        Self {
            nav_texts: Mutex::new(nav.iter().map(|s| s.to_string()).collect()),
            heading_texts: Mutex::new(headings.iter().map(|s| s.to_string()).collect()),
            error_texts: Mutex::new(VecDeque::new()),
            values: Mutex::new(HashMap::new()),
            clicks: Mutex::new(Vec::new()),
            address_polls_remaining: AtomicUsize::new(0),
            zip_error: Mutex::new(None),
        }
    }

    fn with_submit_errors(self, errors: &[&str]) -> Self {
        *self.error_texts.lock().unwrap() = errors.iter().map(|s| s.to_string()).collect();
        self
    }

    fn with_address_delay(self, polls: usize) -> Self {
        self.address_polls_remaining.store(polls, Ordering::Relaxed);
        self
    }

    fn with_zip_error(self, message: &str) -> Self {
        *self.zip_error.lock().unwrap() = Some(message.to_string());
        self
    }

    fn value_of(&self, selector: &str) -> Option<String> {
        self.values.lock().unwrap().get(selector).cloned()
    }

    fn click_count(&self, selector: &str) -> usize {
        self.clicks
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == selector)
            .count()
    }

    fn pop_stick(queue: &Mutex<VecDeque<String>>) -> String {
        let mut q = queue.lock().unwrap();
        if q.len() > 1 {
            q.pop_front().unwrap()
        } else {
            q.front().cloned().unwrap_or_default()
        }
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn goto(&self, url: &str) -> Result<()> {
        self.clicks.lock().unwrap().push(format!("goto:{}", url));
        Ok(())
    }

    async fn inner_text(&self, selector: &str) -> Result<String> {
        match selector {
            NAV_CURRENT => Ok(Self::pop_stick(&self.nav_texts)),
            SECTION_HEADING => Ok(Self::pop_stick(&self.heading_texts)),
            SUBMIT_ERROR => Ok(self
                .error_texts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default()),
            INLAND_ZIP_ERROR => Ok(self.zip_error.lock().unwrap().clone().unwrap_or_default()),
            OVERSEA_ACPT_NO => Ok(OVERSEA_ACPT.to_string()),
            INLAND_ACPT_NO => Ok(INLAND_ACPT.to_string()),
            _ => Ok(String::new()),
        }
    }

    async fn input_value(&self, selector: &str) -> Result<String> {
        if selector == INLAND_ADDRESS_1 {
            if self.address_polls_remaining.load(Ordering::Relaxed) > 0 {
                self.address_polls_remaining.fetch_sub(1, Ordering::Relaxed);
                return Ok(String::new());
            }
            return Ok(ADDRESS_LINE_1.to_string());
        }
        Ok(self.value_of(selector).unwrap_or_default())
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        if selector == SUBMIT_ERROR {
            return Ok(!self.error_texts.lock().unwrap().is_empty());
        }
        if selector == INLAND_ZIP_ERROR {
            return Ok(self.zip_error.lock().unwrap().is_some());
        }
        Ok(false)
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.clicks.lock().unwrap().push(selector.to_string());
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(selector.to_string(), value.to_string());
        Ok(())
    }

    async fn check(&self, selector: &str) -> Result<()> {
        self.clicks.lock().unwrap().push(selector.to_string());
        Ok(())
    }

    async fn select_value(&self, selector: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(selector.to_string(), value.to_string());
        Ok(())
    }

    async fn select_label(&self, selector: &str, label: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(selector.to_string(), label.to_string());
        Ok(())
    }

    async fn captcha_image_base64(&self) -> Result<String> {
        Ok("base64-image-data".to_string())
    }

    async fn captcha_image_src(&self) -> Result<String> {
        Ok(CAPTCHA_KEY.to_string())
    }

    async fn page_summary(&self) -> Result<String> {
        Ok("お名前: 初音ミク\n希望公演: 第1希望\n".to_string())
    }

    async fn select_show(&self, show_no_one_based: usize) -> Result<()> {
        self.clicks
            .lock()
            .unwrap()
            .push(format!("show:{}", show_no_one_based));
        Ok(())
    }

    async fn select_general_seat(&self) -> Result<()> {
        self.clicks.lock().unwrap().push("seat:0".to_string());
        Ok(())
    }
}

/// 假识别服务：缓存命中固定答案，未命中按队列返回识别结果
struct MockResolver {
    cached: Option<String>,
    solved: Mutex<VecDeque<String>>,
    solve_calls: AtomicUsize,
}

impl MockResolver {
    fn with_cache(answer: &str) -> Self {
        Self {
            cached: Some(answer.to_string()),
            solved: Mutex::new(VecDeque::new()),
            solve_calls: AtomicUsize::new(0),
        }
    }

    fn with_solver_answers(answers: &[&str]) -> Self {
        Self {
            cached: None,
            solved: Mutex::new(answers.iter().map(|s| s.to_string()).collect()),
            solve_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CaptchaResolver for MockResolver {
    async fn solve(&self, _image_base64: &str) -> Result<String> {
        self.solve_calls.fetch_add(1, Ordering::Relaxed);
        let mut q = self.solved.lock().unwrap();
        let answer = if q.len() > 1 {
            q.pop_front().unwrap()
        } else {
            q.front().cloned().unwrap_or_default()
        };
        Ok(answer)
    }

    async fn cache_lookup(&self, _image_key: &str) -> Option<String> {
        self.cached.clone()
    }
}

#[derive(Default)]
struct MockNotifier {
    messages: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

fn base_application(variant: LotteryVariant) -> LotteryApplication {
    LotteryApplication {
        bundle: "magicalmirai2026".to_string(),
        round: match variant {
            LotteryVariant::Oversea => "oversea-1".to_string(),
            LotteryVariant::Inland => "inland-1".to_string(),
        },
        variant,
        status: LotteryStatus::Created,
        result: LotteryResult::Pending,
        show_no: 1,
        acpt_no: None,
        password: "pw123456".to_string(),
        creation_date: None,
        complete_date: None,
        last_error_message: None,
        email: "miku@example.com".to_string(),
        phone: "08012345678".to_string(),
        male: false,
        birth: "2007-08-31".to_string(),
        first_name: "Miku".to_string(),
        last_name: "Hatsune".to_string(),
        first_name_katakana: Some("ミク".to_string()),
        last_name_katakana: Some("ハツネ".to_string()),
        peer_name: "Rin Kagamine".to_string(),
        peer_phone: "182110331391".to_string(),
        postal_code: Some("100-0001".to_string()),
        pia_account: Some("miku@example.com".to_string()),
        pia_password: Some("pia-pass".to_string()),
        nationality: Some("United States".to_string()),
        credit_card_no: Some("4111111111111111".to_string()),
        credit_card_month: Some("04".to_string()),
        credit_card_year: Some("2027".to_string()),
        credit_card_cvv: Some("123".to_string()),
        file_path: None,
    }
}

fn ctx_for(variant: LotteryVariant) -> LotteryCtx {
    LotteryCtx::new(
        "magicalmirai2026".to_string(),
        "round-1".to_string(),
        1,
        variant,
    )
}

fn oversea_driver() -> MockDriver {
    MockDriver::new(
        &["Application Input", "Completion of Application"],
        &[
            "Entry of your information input",
            "Priority 1",
            "Ticket Issuance select",
        ],
    )
}

fn inland_driver() -> MockDriver {
    MockDriver::new(
        &["申込入力", "内容確認", "申込完了"],
        &["お客様情報入力", "第1希望", "決済方法選択", "引取方法確認"],
    )
}

#[tokio::test]
async fn oversea_flow_completes_with_cached_captcha() {
    let driver = oversea_driver();
    let resolver = MockResolver::with_cache("123456");
    let notifier = MockNotifier::default();
    let timing = TimingController::new(0.0);

    let application = base_application(LotteryVariant::Oversea);
    let ctx = ctx_for(LotteryVariant::Oversea);
    let flow = LotteryFlow::new(&driver, &resolver, &notifier, &timing, 0.55);

    let outcome = flow
        .run(&application, &ctx, "https://lottery.example/oversea")
        .await
        .unwrap();

    assert_eq!(outcome.acpt_no, OVERSEA_ACPT);
    assert_eq!(outcome.solve_tries, 1);
    assert_eq!(outcome.submit_tries, 1);
    assert!(outcome.summary.contains("Oversea Accepted: MM26-TEST-0001"));
    assert!(outcome.summary.contains("CaptchaRun: 1,1"));

    // 缓存命中，识别服务一次都不该被调用
    assert_eq!(resolver.solve_calls.load(Ordering::Relaxed), 0);
    // 正常完成不应产生任何告警
    assert!(notifier.messages.lock().unwrap().is_empty());

    // 派生字段按规则落到了对应输入框
    assert_eq!(driver.value_of(CAPTCHA_INPUT).as_deref(), Some("123456"));
    assert_eq!(driver.value_of(OVERSEA_PHONE_FIRST).as_deref(), Some("080"));
    assert_eq!(driver.value_of(OVERSEA_PHONE_MIDDLE).as_deref(), Some("1234"));
    assert_eq!(driver.value_of(OVERSEA_PHONE_LAST).as_deref(), Some("5678"));
    assert_eq!(driver.value_of(OVERSEA_PEER_FIRST_NAME).as_deref(), Some("Rin"));
    assert_eq!(driver.value_of(OVERSEA_PEER_LAST_NAME).as_deref(), Some("Kagamine"));
    // 同行者电话只取末 11 位
    assert_eq!(driver.value_of(OVERSEA_PEER_PHONE).as_deref(), Some("82110331391"));
    assert_eq!(driver.value_of(OVERSEA_BIRTH_YEAR).as_deref(), Some("2007"));
    assert_eq!(driver.click_count("show:1"), 1);
}

#[tokio::test]
async fn rejected_cached_captcha_exhausts_and_raises_captcha_error() {
    // 服务端两轮都以"验证码错误"拒绝缓存答案
    let driver = oversea_driver().with_submit_errors(&[INCORRECT_CAPTCHA_JA, INCORRECT_CAPTCHA_JA]);
    let resolver = MockResolver::with_cache("123456");
    let notifier = MockNotifier::default();
    let timing = TimingController::new(0.0);

    let application = base_application(LotteryVariant::Oversea);
    let ctx = ctx_for(LotteryVariant::Oversea);
    let flow = LotteryFlow::new(&driver, &resolver, &notifier, &timing, 0.55);

    let err = flow
        .run(&application, &ctx, "https://lottery.example/oversea")
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::Captcha { .. })
    ));

    // 同一张缓存图片只应触发一次缓存不一致告警
    let messages = notifier.messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("URGENT"));
    assert!(messages[0].contains(CAPTCHA_KEY));
}

#[tokio::test]
async fn non_captcha_server_error_is_fatal_lottery_error() {
    let driver = oversea_driver().with_submit_errors(&["クレジットカード情報が不正です。"]);
    let resolver = MockResolver::with_cache("123456");
    let notifier = MockNotifier::default();
    let timing = TimingController::new(0.0);

    let application = base_application(LotteryVariant::Oversea);
    let ctx = ctx_for(LotteryVariant::Oversea);
    let flow = LotteryFlow::new(&driver, &resolver, &notifier, &timing, 0.55);

    let err = flow
        .run(&application, &ctx, "https://lottery.example/oversea")
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::Lottery { .. })
    ));
    // 其他服务端错误不属于缓存不一致，不告警（编排层才会发失败通知）
    assert!(notifier.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn inland_flow_fills_address_fallbacks() {
    // 地址第一行在第 3 次轮询后才出现
    let driver = inland_driver().with_address_delay(3);
    let resolver = MockResolver::with_cache("123456");
    let notifier = MockNotifier::default();
    let timing = TimingController::new(0.0);

    let application = base_application(LotteryVariant::Inland);
    let ctx = ctx_for(LotteryVariant::Inland);
    let flow = LotteryFlow::new(&driver, &resolver, &notifier, &timing, 0.55);

    let outcome = flow
        .run(&application, &ctx, "https://lottery.example/inland")
        .await
        .unwrap();

    assert_eq!(outcome.acpt_no, INLAND_ACPT);
    assert!(outcome.summary.contains("Inland Accepted: 26-123456"));

    // 第二行补第一行内容，第三行补占位字面量
    assert_eq!(driver.value_of(INLAND_ADDRESS_2).as_deref(), Some(ADDRESS_LINE_1));
    assert_eq!(
        driver.value_of(INLAND_ADDRESS_3).as_deref(),
        Some(NO_HOUSE_NUMBER_PLACEHOLDER)
    );
    // 邮编拆分
    assert_eq!(driver.value_of(INLAND_ZIP_FIRST).as_deref(), Some("100"));
    assert_eq!(driver.value_of(INLAND_ZIP_LAST).as_deref(), Some("0001"));
    // 国内版同行者姓名不拆分
    assert_eq!(driver.value_of(INLAND_PEER_NAME).as_deref(), Some("Rin Kagamine"));
    assert_eq!(driver.value_of(INLAND_PIA_ACCOUNT).as_deref(), Some("miku@example.com"));
}

#[tokio::test]
async fn zip_validation_error_is_fatal_lottery_error() {
    // 邮编检索错误元素带非空文本，地址轮询必须立即终止
    let driver = inland_driver()
        .with_address_delay(300)
        .with_zip_error("郵便番号に該当する住所が見つかりません。");
    let resolver = MockResolver::with_cache("123456");
    let notifier = MockNotifier::default();
    let timing = TimingController::new(0.0);

    let application = base_application(LotteryVariant::Inland);
    let ctx = ctx_for(LotteryVariant::Inland);
    let flow = LotteryFlow::new(&driver, &resolver, &notifier, &timing, 0.55);

    let err = flow
        .run(&application, &ctx, "https://lottery.example/inland")
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::Lottery { .. })
    ));
    assert!(err.to_string().contains("邮编检索被拒绝"));
    // 首次轮询就发现错误，不应再重触发检索
    assert_eq!(driver.click_count(INLAND_ZIP_SEARCH), 1);
}

#[tokio::test]
async fn address_lookup_timeout_is_lottery_error() {
    // 地址第一行始终为空，250 次轮询耗尽后按超时处理
    let driver = inland_driver().with_address_delay(300);
    let resolver = MockResolver::with_cache("123456");
    let notifier = MockNotifier::default();
    let timing = TimingController::new(0.0);

    let application = base_application(LotteryVariant::Inland);
    let ctx = ctx_for(LotteryVariant::Inland);
    let flow = LotteryFlow::new(&driver, &resolver, &notifier, &timing, 0.55);

    let err = flow
        .run(&application, &ctx, "https://lottery.example/inland")
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::Lottery { .. })
    ));
    assert!(err.to_string().contains("地址自动填充超时"));
    // 初次检索 1 次 + 每 25 次轮询重触发，共 9 次
    assert_eq!(driver.click_count(INLAND_ZIP_SEARCH), 10);
}

#[tokio::test]
async fn navigation_checkpoint_mismatch_is_lottery_error() {
    // 导航标签停在别的页面，第一个带检查点的阶段必须直接终止
    let driver = MockDriver::new(&["トップ"], &["お客様情報入力"]);
    let resolver = MockResolver::with_cache("123456");
    let notifier = MockNotifier::default();
    let timing = TimingController::new(0.0);

    let application = base_application(LotteryVariant::Oversea);
    let ctx = ctx_for(LotteryVariant::Oversea);
    let flow = LotteryFlow::new(&driver, &resolver, &notifier, &timing, 0.55);

    let err = flow
        .run(&application, &ctx, "https://lottery.example/oversea")
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::Lottery { .. })
    ));
    assert!(err.to_string().contains("未到达预期页面"));
}

#[tokio::test]
async fn ticket_issuance_wait_exhaustion_is_lottery_error() {
    // 信用卡提交后页面始终停在别的标题，等待轮询耗尽即失败
    let driver = MockDriver::new(
        &["Application Input"],
        &[
            "Entry of your information input",
            "Priority 1",
            "決済方法選択",
        ],
    );
    let resolver = MockResolver::with_cache("123456");
    let notifier = MockNotifier::default();
    let timing = TimingController::new(0.0);

    let application = base_application(LotteryVariant::Oversea);
    let ctx = ctx_for(LotteryVariant::Oversea);
    let flow = LotteryFlow::new(&driver, &resolver, &notifier, &timing, 0.55);

    let err = flow
        .run(&application, &ctx, "https://lottery.example/oversea")
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::Lottery { .. })
    ));
    assert!(err.to_string().contains("未到达出票方式页面"));
}

#[tokio::test]
async fn invalid_solver_answer_triggers_refresh_then_accepts() {
    let driver = oversea_driver();
    // 识别服务第一次返回 5 位，第二次返回合法答案
    let resolver = MockResolver::with_solver_answers(&["12345", "654321"]);
    let notifier = MockNotifier::default();
    let timing = TimingController::new(0.0);
    let ctx = ctx_for(LotteryVariant::Oversea);

    let flow = CaptchaFlow::new(&driver, &resolver, &notifier, &timing, 0.55);
    let outcome = flow.run(&ctx).await.unwrap();

    assert!(outcome.passed);
    assert_eq!(outcome.solve_tries, 2);
    assert_eq!(outcome.submit_tries, 1);
    assert_eq!(resolver.solve_calls.load(Ordering::Relaxed), 2);
    // 非法答案应触发一次验证码刷新
    assert_eq!(driver.click_count(CAPTCHA_REFRESH), 1);
    assert_eq!(driver.value_of(CAPTCHA_INPUT).as_deref(), Some("654321"));
}

#[tokio::test]
async fn seven_heuristic_rejects_deterministically_at_probability_one() {
    let driver = oversea_driver();
    let resolver = MockResolver::with_solver_answers(&["789012", "123456"]);
    let notifier = MockNotifier::default();
    let timing = TimingController::new(0.0);
    let ctx = ctx_for(LotteryVariant::Oversea);

    // 拒绝概率 1.0：含 7 的候选必然被丢弃
    let flow = CaptchaFlow::new(&driver, &resolver, &notifier, &timing, 1.0);
    let outcome = flow.run(&ctx).await.unwrap();

    assert!(outcome.passed);
    assert_eq!(outcome.solve_tries, 2);
    assert_eq!(outcome.submit_tries, 1);
    assert_eq!(driver.value_of(CAPTCHA_INPUT).as_deref(), Some("123456"));
}
