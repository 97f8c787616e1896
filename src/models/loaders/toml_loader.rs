use crate::models::lottery::LotteryApplication;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载单条抽选记录
pub async fn load_application(toml_file_path: &Path) -> Result<LotteryApplication> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let mut application: LotteryApplication = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    // 记住来源文件，写回时使用
    application.file_path = Some(toml_file_path.to_string_lossy().to_string());

    Ok(application)
}

/// 从文件夹加载所有抽选记录
pub async fn load_all_applications(folder_path: &str) -> Result<Vec<LotteryApplication>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut applications = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            tracing::info!(
                "正在加载: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );

            match load_application(&path).await {
                Ok(application) => applications.push(application),
                Err(e) => {
                    tracing::warn!("加载文件失败 {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(applications)
}

/// 把记录写回它的来源文件
pub async fn save_application(application: &LotteryApplication) -> Result<()> {
    let path = application
        .file_path
        .as_deref()
        .context("记录没有来源文件路径，无法写回")?;

    let content =
        toml::to_string_pretty(application).context("记录序列化为 TOML 失败")?;

    fs::write(path, content)
        .await
        .with_context(|| format!("无法写入TOML文件: {}", path))?;

    Ok(())
}
