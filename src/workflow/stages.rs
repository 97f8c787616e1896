//! 阶段定义 - 流程层
//!
//! 两个表单变体各自是一张有序阶段表：检查点、填表动作、
//! 提交触发器、停顿节奏全部声明为数据，执行顺序不再隐含在代码里。
//! 选择器字面量全部取自目标站点的实际 DOM。

/// 阶段前置检查点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// 当前导航标签（#curr）必须等于该字面量
    Navigation(&'static str),
    /// 当前小节标题必须等于该字面量
    Heading(&'static str),
}

/// 停顿声明
#[derive(Debug, Clone, Copy)]
pub enum PauseSpec {
    None,
    /// 固定时长，不抖动
    Fixed(u64),
    /// 名义时长抖动
    Jitter(u64),
    /// 先从候选名义时长中取一个再抖动
    Choice(&'static [u64]),
}

/// 阶段填表动作，由序列器分发到具体处理函数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageAction {
    /// 海外版入口：落地页进入 + 注意事项确认
    OverseaEntry,
    /// 国内版入口
    InlandEntry,
    /// 海外版客户信息（姓名/性别/生日/电话/邮箱/国籍/密码/同行者）
    OverseaCustomerInfo,
    /// 国内版客户信息（含片假名、邮编地址自动填充）
    InlandCustomerInfo,
    /// 希望场次选择
    SelectShow,
    /// 席种选择
    SelectSeat,
    /// 张数选择
    SelectCount,
    /// 无填表动作，只推进
    NoOp,
    /// 海外版信用卡支付
    OverseaPayment,
    /// 国内版支付方式（便利店）
    InlandPaymentMethod,
    /// 国内版取票账号
    InlandPickupAccount,
    /// 海外版：等待出票方式页面出现
    WaitTicketIssuance,
    /// 验证码解析与最终提交
    SolveCaptcha,
    /// 读取受理编号，生成结果
    FinishOversea,
    FinishInland,
}

/// 一个有序提交阶段
#[derive(Debug, Clone, Copy)]
pub struct StageSpec {
    pub name: &'static str,
    /// 进入阶段前的停顿
    pub pause_before: PauseSpec,
    /// 进入阶段必须确认的检查点，确认失败即 LotteryError
    pub checkpoints: &'static [Checkpoint],
    pub action: StageAction,
    /// 点击提交前的停顿（反检测）
    pub pause_before_submit: PauseSpec,
    /// 阶段提交触发器
    pub submit: Option<&'static str>,
    /// 提交后的停顿
    pub pause_after_submit: PauseSpec,
    /// 提交后需要检查的服务端校验错误元素，非空文本即 LotteryError
    pub error_check: Option<&'static str>,
}

/// 页面选择器字面量
pub mod selectors {
    // 通用
    pub const NAV_CURRENT: &str = "#curr";
    pub const SECTION_HEADING: &str =
        "#wrap > form > section:nth-child(1) > div > div.contents_title.red_lightpink_back > h2";
    pub const NEXT_BUTTON: &str =
        "#wrap > form > section:nth-child(2) > div:nth-child(2) > input.next";
    pub const CONFIRM_NEXT_BUTTON: &str =
        "#wrap > form > section:nth-child(3) > div:nth-child(2) > input.next";
    pub const TERMS_CHECKBOX: &str = "#upppd";
    pub const FAST_REGIST_TOGGLE: &str = "#speed_regist_enabled";
    pub const CAPTCHA_INPUT: &str = "#captcha";
    pub const CAPTCHA_REFRESH: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl.vertical_table.white_back > dd > p > a";
    pub const SUBMIT_ERROR: &str =
        "#wrap > section:nth-child(6) > section > div > p > span > b";
    pub const TICKET_COUNT_SELECT: &str =
        "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl > dd:nth-child(3) > p > select";

    // 海外版
    pub const OVERSEA_ENTRY_BUTTON: &str = "#wrap > form > section > div > input";
    pub const OVERSEA_FIRST_NAME: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(2) > dd > p > input[type=text]:nth-child(1)";
    pub const OVERSEA_LAST_NAME: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(2) > dd > p > input[type=text]:nth-child(2)";
    pub const OVERSEA_GENDER_MALE: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(3) > dd > p > input[type=radio]:nth-child(2)";
    pub const OVERSEA_GENDER_FEMALE: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(3) > dd > p > input[type=radio]:nth-child(1)";
    pub const OVERSEA_BIRTH_YEAR: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(4) > dd > p > select:nth-child(1)";
    pub const OVERSEA_BIRTH_MONTH: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(4) > dd > p > select:nth-child(2)";
    pub const OVERSEA_BIRTH_DAY: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(4) > dd > p > select:nth-child(3)";
    pub const OVERSEA_PHONE_FIRST: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(5) > dd:nth-child(4) > p > input[type=text]:nth-child(1)";
    pub const OVERSEA_PHONE_MIDDLE: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(5) > dd:nth-child(4) > p > input[type=text]:nth-child(2)";
    pub const OVERSEA_PHONE_LAST: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(5) > dd:nth-child(4) > p > input[type=text]:nth-child(3)";
    pub const OVERSEA_EMAIL: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(6) > dd:nth-child(2) > p:nth-child(3) > input[type=text]";
    pub const OVERSEA_EMAIL_CONFIRM: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(6) > dd:nth-child(3) > p:nth-child(2) > input[type=text]";
    pub const OVERSEA_NATIONALITY: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(7) > dd > select";
    pub const OVERSEA_PASSWORD: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(8) > dd > p:nth-child(2) > input[type=text]";
    pub const OVERSEA_PEER_FIRST_NAME: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(9) > dd > p:nth-child(2) > input[type=text]:nth-child(1)";
    pub const OVERSEA_PEER_LAST_NAME: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(9) > dd > p:nth-child(2) > input[type=text]:nth-child(2)";
    pub const OVERSEA_PEER_PHONE: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(9) > dd > p:nth-child(4) > input[type=text]";
    pub const OVERSEA_CARD_NO: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl.vertical_table.white_back > dd:nth-child(3) > dl > dd:nth-child(4) > div > dl:nth-child(1) > dd > p:nth-child(1) > input[type=TEXT]";
    pub const OVERSEA_CARD_MONTH: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl.vertical_table.white_back > dd:nth-child(3) > dl > dd:nth-child(4) > div > dl:nth-child(2) > dd > p:nth-child(2) > select";
    pub const OVERSEA_CARD_YEAR: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl.vertical_table.white_back > dd:nth-child(3) > dl > dd:nth-child(4) > div > dl:nth-child(2) > dd > p:nth-child(2) > input[type=TEXT]";
    pub const OVERSEA_CARD_CVV: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl.vertical_table.white_back > dd:nth-child(3) > dl > dd:nth-child(4) > div > dl:nth-child(4) > dd > p:nth-child(2) > input[type=password]";
    pub const OVERSEA_ACPT_NO: &str = "#wrap > section:nth-child(5) > div > div.contents_body.lightpink_back > dl:nth-child(1) > dt > b > span:nth-child(2) > font";

    // 国内版
    pub const INLAND_LANDING_BUTTON: &str = "#wrap > section:nth-child(7) > div > div.contents_body.lightblue_back > dl:nth-child(2) > dd > p > input";
    pub const INLAND_ENTRY_BUTTON: &str = "#wrap > form > section > div > input";
    pub const INLAND_LAST_NAME: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(3) > dd:nth-child(2) > input[type=text]:nth-child(3)";
    pub const INLAND_FIRST_NAME: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(3) > dd:nth-child(2) > input[type=text]:nth-child(4)";
    pub const INLAND_LAST_NAME_KANA: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(3) > dd:nth-child(3) > input[type=text]:nth-child(3)";
    pub const INLAND_FIRST_NAME_KANA: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(3) > dd:nth-child(3) > input[type=text]:nth-child(4)";
    pub const INLAND_GENDER_MALE: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(4) > dd > p > input[type=radio]:nth-child(2)";
    pub const INLAND_GENDER_FEMALE: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(4) > dd > p > input[type=radio]:nth-child(1)";
    pub const INLAND_BIRTH_YEAR: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(5) > dd > p > select:nth-child(1)";
    pub const INLAND_BIRTH_MONTH: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(5) > dd > p > select:nth-child(2)";
    pub const INLAND_BIRTH_DAY: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(5) > dd > p > select:nth-child(3)";
    pub const INLAND_PHONE_FIRST: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(6) > dd > p:nth-child(3) > input[type=text]:nth-child(1)";
    pub const INLAND_PHONE_MIDDLE: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(6) > dd > p:nth-child(3) > input[type=text]:nth-child(2)";
    pub const INLAND_PHONE_LAST: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(6) > dd > p:nth-child(3) > input[type=text]:nth-child(3)";
    pub const INLAND_EMAIL: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(7) > dd:nth-child(2) > p:nth-child(3) > input[type=text]";
    pub const INLAND_EMAIL_CONFIRM: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(7) > dd:nth-child(3) > p:nth-child(2) > input[type=text]";
    pub const INLAND_ZIP_FIRST: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(8) > dd > p:nth-child(2) > input[type=text]:nth-child(1)";
    pub const INLAND_ZIP_LAST: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(8) > dd > p:nth-child(2) > input[type=text]:nth-child(2)";
    pub const INLAND_ZIP_SEARCH: &str = "#zip_search";
    pub const INLAND_ZIP_ERROR: &str = "#postNoErrorM";
    pub const INLAND_ADDRESS_1: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(9) > dd:nth-child(3) > p:nth-child(2) > input[type=text]";
    pub const INLAND_ADDRESS_2: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(9) > dd:nth-child(4) > p:nth-child(2) > input[type=text]";
    pub const INLAND_ADDRESS_3: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(9) > dd:nth-child(5) > p:nth-child(2) > input[type=text]";
    pub const INLAND_PASSWORD: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(11) > dd > p:nth-child(2) > input[type=text]";
    pub const INLAND_PEER_NAME: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(12) > dd:nth-child(3) > p:nth-child(1) > input[type=text]";
    pub const INLAND_PEER_PHONE: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(12) > dd:nth-child(3) > p:nth-child(2) > input[type=text]";
    pub const INLAND_PAGE1_ERROR: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl:nth-child(2) > p > span > b";
    pub const INLAND_PAYMENT_711_RADIO: &str = "#wrap > form > section:nth-child(1) > div > div.contents_body.lightpink_back > dl.vertical_table.white_back > dd:nth-child(3) > dl > dt > input[type=radio]";
    pub const INLAND_PIA_ACCOUNT: &str =
        "#pocket_auth > dl:nth-child(1) > dd > p > input[type=text]";
    pub const INLAND_PIA_PASSWORD: &str =
        "#pocket_auth > dl:nth-child(2) > dd > p > input[type=password]";
    pub const INLAND_ACCOUNT_ERROR: &str =
        "#pocket_auth > dl:nth-child(1) > dt:nth-child(1) > b > span";
    pub const INLAND_ACPT_NO: &str = "#wrap > section:nth-child(6) > div > dl:nth-child(2) > dt > b > span";
}

/// 张数固定选 2（本人 + 同行者）
pub const TICKET_COUNT_VALUE: &str = "2";

/// 国内版第三地址行为空时的占位字面量
pub const NO_HOUSE_NUMBER_PLACEHOLDER: &str = "番地なし";

use selectors::*;
use Checkpoint::*;
use PauseSpec::*;
use StageAction::*;

/// 海外版阶段表
pub const OVERSEA_STAGES: &[StageSpec] = &[
    StageSpec {
        name: "entry",
        pause_before: None,
        checkpoints: &[],
        action: OverseaEntry,
        pause_before_submit: None,
        submit: Option::None,
        pause_after_submit: None,
        error_check: Option::None,
    },
    StageSpec {
        name: "customer_info",
        pause_before: None,
        checkpoints: &[
            Navigation("Application Input"),
            Heading("Entry of your information input"),
        ],
        action: OverseaCustomerInfo,
        pause_before_submit: Choice(&[2000, 10000]),
        submit: Some(NEXT_BUTTON),
        pause_after_submit: Jitter(10000),
        error_check: Option::None,
    },
    StageSpec {
        name: "show_select",
        pause_before: None,
        checkpoints: &[Heading("Priority 1")],
        action: SelectShow,
        pause_before_submit: None,
        submit: Some(NEXT_BUTTON),
        pause_after_submit: Jitter(2000),
        error_check: Option::None,
    },
    StageSpec {
        name: "seat_select",
        pause_before: None,
        checkpoints: &[],
        action: SelectSeat,
        pause_before_submit: None,
        submit: Some(NEXT_BUTTON),
        pause_after_submit: Jitter(2000),
        error_check: Option::None,
    },
    StageSpec {
        name: "count_select",
        pause_before: None,
        checkpoints: &[],
        action: SelectCount,
        pause_before_submit: None,
        submit: Some(NEXT_BUTTON),
        pause_after_submit: Jitter(2000),
        error_check: Option::None,
    },
    StageSpec {
        name: "confirm",
        pause_before: None,
        checkpoints: &[],
        action: NoOp,
        pause_before_submit: None,
        submit: Some(CONFIRM_NEXT_BUTTON),
        pause_after_submit: Jitter(2000),
        error_check: Option::None,
    },
    StageSpec {
        name: "payment",
        pause_before: Choice(&[2000, 5000]),
        checkpoints: &[],
        action: OverseaPayment,
        pause_before_submit: Choice(&[2000, 8000]),
        submit: Some(NEXT_BUTTON),
        pause_after_submit: None,
        error_check: Option::None,
    },
    StageSpec {
        name: "ticket_issuance_wait",
        pause_before: None,
        checkpoints: &[],
        action: WaitTicketIssuance,
        pause_before_submit: None,
        submit: Some(NEXT_BUTTON),
        pause_after_submit: Choice(&[2000, 10000]),
        error_check: Option::None,
    },
    StageSpec {
        name: "captcha_submit",
        pause_before: None,
        checkpoints: &[],
        action: SolveCaptcha,
        pause_before_submit: None,
        submit: Option::None,
        pause_after_submit: Fixed(5000),
        error_check: Option::None,
    },
    StageSpec {
        name: "complete",
        pause_before: None,
        checkpoints: &[Navigation("Completion of Application")],
        action: FinishOversea,
        pause_before_submit: None,
        submit: Option::None,
        pause_after_submit: None,
        error_check: Option::None,
    },
];

/// 国内版阶段表
pub const INLAND_STAGES: &[StageSpec] = &[
    StageSpec {
        name: "entry",
        pause_before: None,
        checkpoints: &[],
        action: InlandEntry,
        pause_before_submit: None,
        submit: Option::None,
        pause_after_submit: None,
        error_check: Option::None,
    },
    StageSpec {
        name: "customer_info",
        pause_before: None,
        checkpoints: &[Navigation("申込入力"), Heading("お客様情報入力")],
        action: InlandCustomerInfo,
        pause_before_submit: Choice(&[2000, 10000]),
        submit: Some(NEXT_BUTTON),
        pause_after_submit: Jitter(2000),
        error_check: Some(INLAND_PAGE1_ERROR),
    },
    StageSpec {
        name: "show_select",
        pause_before: Jitter(2000),
        checkpoints: &[Heading("第1希望")],
        action: SelectShow,
        pause_before_submit: None,
        submit: Some(NEXT_BUTTON),
        pause_after_submit: Jitter(2000),
        error_check: Option::None,
    },
    StageSpec {
        name: "seat_select",
        pause_before: None,
        checkpoints: &[],
        action: SelectSeat,
        pause_before_submit: None,
        submit: Some(NEXT_BUTTON),
        pause_after_submit: Jitter(2000),
        error_check: Option::None,
    },
    StageSpec {
        name: "count_select",
        pause_before: None,
        checkpoints: &[],
        action: SelectCount,
        pause_before_submit: None,
        submit: Some(NEXT_BUTTON),
        pause_after_submit: Jitter(2000),
        error_check: Option::None,
    },
    StageSpec {
        name: "confirm",
        pause_before: None,
        checkpoints: &[],
        action: NoOp,
        pause_before_submit: None,
        submit: Some(CONFIRM_NEXT_BUTTON),
        pause_after_submit: Jitter(2000),
        error_check: Option::None,
    },
    StageSpec {
        name: "payment_method",
        pause_before: None,
        checkpoints: &[Heading("決済方法選択")],
        action: InlandPaymentMethod,
        pause_before_submit: None,
        submit: Some(NEXT_BUTTON),
        pause_after_submit: Jitter(2000),
        error_check: Option::None,
    },
    StageSpec {
        name: "pickup_account",
        pause_before: None,
        checkpoints: &[Heading("引取方法確認")],
        action: InlandPickupAccount,
        pause_before_submit: None,
        submit: Some(NEXT_BUTTON),
        pause_after_submit: Jitter(2000),
        error_check: Some(INLAND_ACCOUNT_ERROR),
    },
    StageSpec {
        name: "captcha_submit",
        pause_before: Jitter(2000),
        checkpoints: &[Navigation("内容確認")],
        action: SolveCaptcha,
        pause_before_submit: None,
        submit: Option::None,
        pause_after_submit: Jitter(2000),
        error_check: Option::None,
    },
    StageSpec {
        name: "complete",
        pause_before: None,
        checkpoints: &[Navigation("申込完了")],
        action: FinishInland,
        pause_before_submit: None,
        submit: Option::None,
        pause_after_submit: None,
        error_check: Option::None,
    },
];
