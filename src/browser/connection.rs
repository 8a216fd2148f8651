use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::{AppError, AppResult, BrowserError};

/// 连接到已开启调试端口的浏览器，并找到职位页面
///
/// 优先复用地址包含 `target_url` 的标签页，找不到时新建页面并导航过去
pub async fn connect_to_job_page(port: u16, target_url: Option<&str>) -> AppResult<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);
    debug!("目标 URL: {:?}", target_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        AppError::browser_connection_failed(port, e)
    })?;
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

    let pages = browser.pages().await?;
    debug!("获取到 {} 个页面", pages.len());

    let Some(url) = target_url else {
        // 没有指定地址时使用第一个标签页（通常就是用户正在看的页面）
        if let Some(page) = pages.into_iter().next() {
            return Ok((browser, page));
        }
        let page = browser.new_page("about:blank").await?;
        return Ok((browser, page));
    };

    for p in pages.iter() {
        if let Ok(Some(page_url)) = p.url().await {
            if same_page(&page_url, url) {
                info!("✓ 找到目标页面: {}", page_url);
                return Ok((browser, p.clone()));
            }
        }
    }

    debug!("未找到匹配的页面，创建新页面并导航到: {}", url);
    let page = browser.new_page("about:blank").await?;
    page.goto(url).await.map_err(|e| {
        error!("导航到 {} 失败: {}", url, e);
        AppError::Browser(BrowserError::NavigationFailed {
            url: url.to_string(),
            source: Box::new(e),
        })
    })?;
    info!("已导航到: {}", url);

    Ok((browser, page))
}

/// 忽略协议尾部斜杠和锚点比较两个地址
fn same_page(page_url: &str, target: &str) -> bool {
    let normalize = |u: &str| {
        u.split('#')
            .next()
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string()
    };
    normalize(page_url) == normalize(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_page_ignores_fragment_and_slash() {
        assert!(same_page(
            "https://www.linkedin.com/jobs/view/123/#main",
            "https://www.linkedin.com/jobs/view/123"
        ));
        assert!(!same_page(
            "https://www.linkedin.com/jobs/view/124",
            "https://www.linkedin.com/jobs/view/123"
        ));
    }

    #[tokio::test]
    #[ignore] // 需要本地浏览器以 --remote-debugging-port=9222 启动
    async fn test_browser_connection() {
        let result = connect_to_job_page(9222, None).await;
        assert!(result.is_ok(), "应该能够成功连接浏览器");
    }
}
