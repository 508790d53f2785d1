use std::fs::{self, OpenOptions};
use std::io::Write;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::AppResult;
use crate::orchestrator::RunSummary;

/// 日志工具模块
///
/// 初始化 tracing 订阅者，未设置 `RUST_LOG` 时按 verbose 选择级别。
/// 重复调用是安全的。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
pub fn init_log_file(log_file_path: &str) -> AppResult<()> {
    let log_header = format!(
        "{}\n交易录入日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 把最终统计追加到日志文件
pub fn append_summary(log_file_path: &str, summary: &RunSummary, aborted: bool) -> AppResult<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    writeln!(
        file,
        "[{}] 完成 {} | 已有状态跳过 {} | 无效跳过 {} | 总计 {}{}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        summary.completed,
        summary.skipped_status,
        summary.skipped_invalid,
        summary.total,
        if aborted { " | 运行中止" } else { "" }
    )?;
    for (row, outcome) in &summary.outcomes {
        writeln!(file, "  第 {} 行: {}", row + 1, outcome)?;
    }
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 逐条录入模式");
    info!("🏷️ 品牌: {}", config.brand);
    info!(
        "📝 模式: {}",
        if config.is_review() {
            "审核（只填写不提交）"
        } else {
            "自动提交"
        }
    );
    info!("📄 输入文件: {}", config.input_file);
    info!("{}", "=".repeat(60));
}

/// 记录加载信息
pub fn log_records_loaded(total: usize) {
    info!("✓ 读取到 {} 条记录", total);
    info!("💡 逐条处理，当前记录结束后才开始下一条\n");
}

/// 记录单行开始
pub fn log_row_start(ctx: &impl std::fmt::Display, position: usize, total: usize) {
    info!("\n{} {}", ctx, "─".repeat(30));
    info!("{} 处理第 {}/{} 条记录", ctx, position, total);
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &RunSummary, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 完成: {}/{}", summary.completed, summary.total);
    info!("⏭️ 已有状态跳过: {}", summary.skipped_status);
    info!("⚠️ 输入无效跳过: {}", summary.skipped_invalid);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 卡号脱敏，只保留末四位
pub fn mask_card(number: &str) -> String {
    let digits: Vec<char> = number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() <= 4 {
        return "*".repeat(digits.len());
    }
    let tail: String = digits[digits.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(digits.len() - 4), tail)
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
