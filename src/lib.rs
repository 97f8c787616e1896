//! # Lottery Submit
//!
//! 一个用于自动化抽选报名提交的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `PageDriver` - 页面交互缝合点，测试时可替换
//! - `ChromiumDriver` - 唯一的 page owner，原语全部走 JS 注入
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `TimingController` - 拟人化节奏控制（正态抖动 + 区间截断）
//! - `retry` - 有界重试
//! - `fields` - 表单字段派生纯函数
//! - `CaptchaResolver` / `Notifier` - 外部协作方缝合点
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一条记录"的完整提交流程
//! - `stages` - 两个变体的有序阶段表（检查点声明为数据）
//! - `LotteryFlow` - 阶段序列器
//! - `CaptchaFlow` - 验证码解析循环
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/runner` - 加载记录、顺序执行、状态写回、统计

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::connect_to_browser_and_page;
pub use config::Config;
pub use error::EngineError;
pub use infrastructure::{ChromiumDriver, PageDriver};
pub use models::{LotteryApplication, LotteryResult, LotteryStatus, LotteryVariant};
pub use orchestrator::App;
pub use services::{CaptchaResolver, Notifier, TimingController};
pub use workflow::{CaptchaFlow, CaptchaOutcome, LotteryCtx, LotteryFlow, SubmissionOutcome};
