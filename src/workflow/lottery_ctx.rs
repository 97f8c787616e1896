//! 抽选任务上下文
//!
//! 封装"我正在处理哪一条记录"这一信息，只用于日志和告警文本。

use std::fmt::Display;

use crate::models::LotteryVariant;

#[derive(Debug, Clone)]
pub struct LotteryCtx {
    /// 活动标识，例如 magicalmirai2026
    pub bundle: String,
    /// 抽选窗口标识，例如 inland-1
    pub round: String,
    /// 记录在本批中的序号（仅用于日志显示）
    pub record_index: usize,
    pub variant: LotteryVariant,
}

impl LotteryCtx {
    pub fn new(bundle: String, round: String, record_index: usize, variant: LotteryVariant) -> Self {
        Self {
            bundle,
            round,
            record_index,
            variant,
        }
    }
}

impl Display for LotteryCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}/{} #{} {}]",
            self.bundle, self.round, self.record_index, self.variant
        )
    }
}
