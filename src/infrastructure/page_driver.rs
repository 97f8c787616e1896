//! 页面驱动缝合点 - 基础设施层
//!
//! 流程层只依赖这个 trait，不认识具体浏览器引擎，
//! 测试时可以换成脚本化的假页面。

use anyhow::Result;
use async_trait::async_trait;

/// 页面交互原语
///
/// 职责：
/// - 暴露导航 / 读取 / 填写 / 点击 / 选择能力
/// - 两个按下标取元素的安全辅助（场次、席种）只按校验过的下标操作
/// - 不认识 LotteryApplication，不处理业务流程
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;

    async fn inner_text(&self, selector: &str) -> Result<String>;
    async fn input_value(&self, selector: &str) -> Result<String>;
    async fn exists(&self, selector: &str) -> Result<bool>;

    async fn click(&self, selector: &str) -> Result<()>;
    async fn fill(&self, selector: &str, value: &str) -> Result<()>;
    async fn check(&self, selector: &str) -> Result<()>;
    async fn select_value(&self, selector: &str, value: &str) -> Result<()>;
    async fn select_label(&self, selector: &str, label: &str) -> Result<()>;

    /// 验证码图片的 base64 数据
    async fn captcha_image_base64(&self) -> Result<String>;
    /// 验证码图片的来源 URL（缓存键）
    async fn captcha_image_src(&self) -> Result<String>;

    /// 当前页面关键信息的可读摘要（忽略装饰性行内标记）
    async fn page_summary(&self) -> Result<String>;

    /// 按 1 起始的下标选中场次单选框，下标越界即报错
    async fn select_show(&self, show_no_one_based: usize) -> Result<()>;
    /// 选中第一个席种单选框（站席/一般席）
    async fn select_general_seat(&self) -> Result<()>;
}
