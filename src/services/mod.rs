pub mod captcha;
pub mod fields;
pub mod notifier;
pub mod retry;
pub mod timing;

pub use captcha::{is_valid_answer, CaptchaResolver, HttpCaptchaResolver};
pub use notifier::{Notifier, WebhookNotifier};
pub use retry::retry;
pub use timing::TimingController;
