//! 抽选申请记录
//!
//! 记录归外部存储所有，引擎只读；状态流转由编排层（调用方角色）负责。

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 记录状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LotteryStatus {
    Created,
    Working,
    Completed,
    Error,
}

impl Default for LotteryStatus {
    fn default() -> Self {
        LotteryStatus::Created
    }
}

/// 抽选结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LotteryResult {
    Pending,
    Win,
    Lose,
    Unknown,
}

impl Default for LotteryResult {
    fn default() -> Self {
        LotteryResult::Pending
    }
}

/// 表单变体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LotteryVariant {
    Oversea,
    Inland,
}

impl fmt::Display for LotteryVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LotteryVariant::Oversea => write!(f, "oversea"),
            LotteryVariant::Inland => write!(f, "inland"),
        }
    }
}

/// 单条抽选申请记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotteryApplication {
    pub bundle: String,
    pub round: String,
    pub variant: LotteryVariant,
    #[serde(default)]
    pub status: LotteryStatus,
    #[serde(default)]
    pub result: LotteryResult,
    /// 希望场次，1 起始
    pub show_no: usize,
    #[serde(default)]
    pub acpt_no: Option<String>,
    pub password: String,

    #[serde(default)]
    pub creation_date: Option<String>,
    #[serde(default)]
    pub complete_date: Option<String>,
    #[serde(default)]
    pub last_error_message: Option<String>,

    pub email: String,
    /// 例如 08012345678 或 182110331391
    pub phone: String,
    pub male: bool,
    /// YYYY-MM-DD
    pub birth: String,

    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub first_name_katakana: Option<String>,
    #[serde(default)]
    pub last_name_katakana: Option<String>,

    pub peer_name: String,
    pub peer_phone: String,

    // 国内版
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub pia_account: Option<String>,
    #[serde(default)]
    pub pia_password: Option<String>,

    // 海外版
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub credit_card_no: Option<String>,
    #[serde(default)]
    pub credit_card_month: Option<String>,
    #[serde(default)]
    pub credit_card_year: Option<String>,
    #[serde(default)]
    pub credit_card_cvv: Option<String>,

    /// 来源文件路径，装载时填充，不写回
    #[serde(skip)]
    pub file_path: Option<String>,
}

/// 取变体必填的可选字段，缺失时给出字段名
pub fn required_field<'a>(field: &'a Option<String>, name: &str) -> Result<&'a str> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("记录缺少必填字段: {}", name))
}
