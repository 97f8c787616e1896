//! 流程层（Workflow Layer）
//!
//! ## 职责
//!
//! 定义"一条抽选记录"的完整提交流程：
//!
//! - `stages` - 两个变体的有序阶段表（检查点/动作/停顿声明为数据）
//! - `lottery_flow` - 阶段序列器，逐阶段推进并确认检查点
//! - `captcha_flow` - 验证码解析循环（外层 ≤2，内层 ≤10，重试 ≤5）
//! - `lottery_ctx` - 任务上下文（bundle/round/序号/变体）
//!
//! 流程层不持有任何资源，只依赖注入的协作方
//! （PageDriver / CaptchaResolver / Notifier / TimingController）。

pub mod captcha_flow;
pub mod lottery_ctx;
pub mod lottery_flow;
pub mod stages;

pub use captcha_flow::{CaptchaAttempt, CaptchaFlow, CaptchaOutcome};
pub use lottery_ctx::LotteryCtx;
pub use lottery_flow::{LotteryFlow, SubmissionOutcome};
pub use stages::{Checkpoint, PauseSpec, StageAction, StageSpec, INLAND_STAGES, OVERSEA_STAGES};
