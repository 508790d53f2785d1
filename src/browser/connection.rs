use anyhow::{Context, Result};
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, info};

/// 连接操作员已打开的浏览器（需以 `--remote-debugging-port` 启动）
///
/// 若 `reuse_prefix` 给出，优先复用 URL 以其开头的标签页，
/// 这样操作员已登录的会话可以直接沿用；否则新开空白页。
pub async fn connect_to_browser_and_page(
    port: u16,
    reuse_prefix: Option<&str>,
) -> Result<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url)
        .await
        .with_context(|| format!("无法连接到浏览器 (端口: {})", port))?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    if let Some(prefix) = reuse_prefix {
        let pages = browser.pages().await?;
        debug!("获取到 {} 个页面", pages.len());
        for page in pages {
            if let Ok(Some(url)) = page.url().await {
                if url.starts_with(prefix) {
                    info!("✓ 复用已打开的页面: {}", url);
                    return Ok((browser, page));
                }
            }
        }
        debug!("未找到可复用的页面，将创建新页面");
    }

    let page = browser
        .new_page("about:blank")
        .await
        .context("创建空白页面失败")?;
    Ok((browser, page))
}
