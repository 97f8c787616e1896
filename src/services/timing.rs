//! 节奏控制 - 业务能力层
//!
//! 所有有语义的停顿都经过这里：正态抖动让操作节奏接近人类，
//! 截断到 [d/2, 2d] 保证延时不会偏离人类尺度太远。
//! 致命错误抛出前的冷却是固定时长，不做抖动。

use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

/// 致命错误抛出前的固定冷却（毫秒）
pub const FATAL_COOLDOWN_MS: u64 = 5000;

/// Box–Muller 标准构造：两个独立均匀样本变换为正态样本
fn normal_sample(mean: f64, std_dev: f64) -> f64 {
    let mut rng = rand::thread_rng();
    // [0,1) 转 (0,1)，避免 ln(0)
    let mut u1: f64 = 0.0;
    while u1 == 0.0 {
        u1 = rng.gen();
    }
    let mut u2: f64 = 0.0;
    while u2 == 0.0 {
        u2 = rng.gen();
    }

    let r = (-2.0 * u1.ln()).sqrt();
    let theta = 2.0 * std::f64::consts::PI * u2;
    r * theta.cos() * std_dev + mean
}

/// 对名义时长 d 采样一个落在 [d/2, 2d] 内的抖动值
///
/// mean = (d/2 + 2d) / 2，std = (2d - mean) / 3（3σ 覆盖区间），
/// 超出区间则重新采样。
pub fn sample_in_range(nominal: f64) -> f64 {
    let min = nominal / 2.0;
    let max = nominal * 2.0;
    let mean = (min + max) / 2.0;
    let std_dev = (max - mean) / 3.0;

    loop {
        let v = normal_sample(mean, std_dev);
        if (min..=max).contains(&v) {
            return v;
        }
    }
}

/// 从候选名义时长中等概率取一个
pub fn random_choice(items: &[u64]) -> u64 {
    let mut rng = rand::thread_rng();
    items[rng.gen_range(0..items.len())]
}

/// 节奏控制器
///
/// scale 只在测试中调小，生产环境保持 1.0。
#[derive(Clone, Debug)]
pub struct TimingController {
    scale: f64,
}

impl TimingController {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }

    /// 按名义时长（毫秒）抖动停顿
    pub async fn pause(&self, nominal_ms: u64) {
        let scaled = nominal_ms as f64 * self.scale;
        if scaled <= 0.0 {
            return;
        }
        let ms = sample_in_range(scaled);
        sleep(Duration::from_millis(ms as u64)).await;
    }

    /// 从候选名义时长中取一个再抖动停顿
    pub async fn pause_choice(&self, candidates: &[u64]) {
        self.pause(random_choice(candidates)).await;
    }

    /// 固定停顿，不做抖动
    pub async fn fixed(&self, ms: u64) {
        let scaled = (ms as f64 * self.scale) as u64;
        if scaled == 0 {
            return;
        }
        sleep(Duration::from_millis(scaled)).await;
    }

    /// 致命错误抛出前的固定冷却
    pub async fn cooldown(&self) {
        self.fixed(FATAL_COOLDOWN_MS).await;
    }
}

impl Default for TimingController {
    fn default() -> Self {
        Self::new(1.0)
    }
}
