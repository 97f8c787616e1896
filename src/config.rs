/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 海外版报名入口 URL
    pub oversea_entry_url: String,
    /// 国内版报名入口 URL
    pub inland_entry_url: String,
    /// 抽选记录 TOML 文件存放目录
    pub record_folder: String,
    /// 验证码识别 API 地址
    pub captcha_api_url: String,
    /// 验证码答案缓存文件（JSON，URL -> 答案）
    pub captcha_cache_file: String,
    /// Webhook 通知地址（为空则不发送）
    pub webhook_url: String,
    /// 答案含 7 时的拒绝概率（识别服务对 7 的误判率偏高）
    pub seven_reject_probability: f64,
    /// 延时缩放系数（1.0 为真实节奏，测试时可调小）
    pub timing_scale: f64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 2001,
            oversea_entry_url: "https://example.invalid/lottery/oversea/entry".to_string(),
            inland_entry_url: "https://example.invalid/lottery/inland/entry".to_string(),
            record_folder: "lottery_toml".to_string(),
            captcha_api_url: "http://127.0.0.1:8199/captcha/solve".to_string(),
            captcha_cache_file: "captcha_cache.json".to_string(),
            webhook_url: String::new(),
            seven_reject_probability: 0.55,
            timing_scale: 1.0,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.browser_debug_port),
            oversea_entry_url: std::env::var("OVERSEA_ENTRY_URL").unwrap_or(default.oversea_entry_url),
            inland_entry_url: std::env::var("INLAND_ENTRY_URL").unwrap_or(default.inland_entry_url),
            record_folder: std::env::var("RECORD_FOLDER").unwrap_or(default.record_folder),
            captcha_api_url: std::env::var("CAPTCHA_API_URL").unwrap_or(default.captcha_api_url),
            captcha_cache_file: std::env::var("CAPTCHA_CACHE_FILE").unwrap_or(default.captcha_cache_file),
            webhook_url: std::env::var("WEBHOOK_URL").unwrap_or(default.webhook_url),
            seven_reject_probability: std::env::var("SEVEN_REJECT_PROBABILITY").ok().and_then(|v| v.parse().ok()).unwrap_or(default.seven_reject_probability),
            timing_scale: std::env::var("TIMING_SCALE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.timing_scale),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }
}
