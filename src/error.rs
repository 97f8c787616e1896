use std::fmt;

/// 提交引擎的封闭错误分类
///
/// 调用方通过显式 match 区分两类失败，
/// 不依赖运行时类型信息。
#[derive(Debug)]
pub enum EngineError {
    /// 抽选流程错误（页面导航/校验/服务端拒绝）
    Lottery { message: String },
    /// 验证码错误（解析重试次数耗尽）
    Captcha { message: String },
}

impl EngineError {
    pub fn lottery(message: impl Into<String>) -> Self {
        EngineError::Lottery {
            message: message.into(),
        }
    }

    pub fn captcha(message: impl Into<String>) -> Self {
        EngineError::Captcha {
            message: message.into(),
        }
    }

    /// 错误携带的原始消息
    pub fn message(&self) -> &str {
        match self {
            EngineError::Lottery { message } | EngineError::Captcha { message } => message,
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Lottery { message } => write!(f, "抽选流程错误: {}", message),
            EngineError::Captcha { message } => write!(f, "验证码错误: {}", message),
        }
    }
}

impl std::error::Error for EngineError {}
