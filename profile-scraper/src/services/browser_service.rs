//! 浏览器服务 - Chromium 渲染面
//!
//! 职责:
//! - 按配置启动 Chromium 系浏览器 (无头/代理/用户数据目录)
//! - 实现 `RenderingSurface`: 导航、快照、滚动、等待、关闭
//! - 实现 `ItemHandle`: 按 `FieldSelector` 在帖子元素内查询字段

use crate::models::{BrowserKind, ScrapeConfig, SurfaceError};
use crate::services::surface::{
    FieldSelector, FieldValue, ItemHandle, ReadMode, RenderingSurface, ITEM_SELECTOR,
};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures_util::StreamExt;
use rand::seq::SliceRandom;
use rand::Rng;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// 桌面浏览器 UA,每个会话随机选择一个
const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0",
];

/// 固定启动参数
const HARDENING_ARGS: [&str; 7] = [
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--ignore-certificate-errors",
    "--disable-gpu",
    "--log-level=3",
    "--disable-notifications",
    "--disable-popup-blocking",
];

/// Edge 可执行文件候选名
const EDGE_BINARIES: [&str; 4] = ["microsoft-edge", "microsoft-edge-stable", "msedge", "msedge.exe"];

fn browser_err(context: &str, err: impl std::fmt::Display) -> SurfaceError {
    SurfaceError::BrowserError(format!("{}: {}", context, err))
}

/// 代理参数
///
/// Chromium 启动参数不支持代理凭据,凭据部分被丢弃
pub fn proxy_arg(proxy: &str) -> String {
    let host = match proxy.rsplit_once('@') {
        Some((_, host)) => {
            warn!(代理 = %host, "Chromium 不支持带凭据的代理参数,已忽略凭据");
            host
        }
        None => proxy,
    };
    format!("--proxy-server={}", host)
}

/// 构建启动参数
pub fn launch_args(config: &ScrapeConfig, user_agent: &str) -> Vec<String> {
    let mut args: Vec<String> = HARDENING_ARGS.iter().map(|s| s.to_string()).collect();
    args.push(format!("--user-agent={}", user_agent));
    if let Some(proxy) = &config.proxy {
        args.push(proxy_arg(proxy));
    }
    args
}

/// 解析浏览器可执行文件
///
/// - 显式路径优先
/// - Edge 通过 PATH 查找
/// - Chrome 交给 chromiumoxide 自动探测
/// - Firefox 无法通过 CDP 驱动
pub fn resolve_executable(config: &ScrapeConfig) -> Result<Option<PathBuf>, SurfaceError> {
    if let Some(path) = &config.browser_path {
        return Ok(Some(path.clone()));
    }

    match config.browser {
        BrowserKind::Chrome => Ok(None),
        BrowserKind::Edge => EDGE_BINARIES
            .iter()
            .find_map(|name| which::which(name).ok())
            .map(Some)
            .ok_or_else(|| SurfaceError::LaunchFailed("未找到 Microsoft Edge 可执行文件".to_string())),
        BrowserKind::Firefox => Err(SurfaceError::UnsupportedBrowser(
            "firefox (仅支持 Chromium 系浏览器)".to_string(),
        )),
    }
}

/// 在范围内随机取一个停顿时长
pub fn pick_pause(range_ms: &RangeInclusive<u64>) -> Duration {
    let (low, high) = (*range_ms.start(), *range_ms.end());
    if low >= high {
        return Duration::from_millis(low);
    }
    Duration::from_millis(rand::thread_rng().gen_range(low..=high))
}

/// Chromium 渲染面
pub struct BrowserSurface {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    /// 检查 readyState 前的停顿范围
    settle_pause_ms: RangeInclusive<u64>,
}

impl BrowserSurface {
    /// 启动浏览器并打开空白页
    pub async fn launch(config: &ScrapeConfig) -> Result<Self, SurfaceError> {
        let executable = resolve_executable(config)?;
        let user_agent = USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);

        let mut builder = BrowserConfig::builder()
            .args(launch_args(config, user_agent))
            .window_size(1366, 900);
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = executable {
            builder = builder.chrome_executable(path);
        }
        if let Some(profile) = &config.browser_profile {
            builder = builder.user_data_dir(profile);
        }

        let browser_config = builder
            .build()
            .map_err(|e| SurfaceError::LaunchFailed(format!("浏览器配置失败: {}", e)))?;

        info!(
            浏览器 = %config.browser,
            无头模式 = config.headless,
            用户数据目录 = config.browser_profile.is_some(),
            "启动浏览器"
        );

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| SurfaceError::LaunchFailed(e.to_string()))?;

        // 后台处理 CDP 事件; 单条消息出错不终止处理循环
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(错误 = %e, "浏览器事件处理出错");
                }
            }
            debug!("浏览器事件处理器已退出");
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(SurfaceError::LaunchFailed(format!("无法打开页面: {}", e)));
            }
        };

        info!("浏览器启动成功");

        Ok(Self {
            browser,
            page,
            handler,
            settle_pause_ms: config.settle_pause_ms.clone(),
        })
    }

    async fn ready_state(&self) -> Result<String, SurfaceError> {
        self.page
            .evaluate("document.readyState")
            .await
            .map_err(|e| browser_err("读取页面状态失败", e))?
            .into_value::<String>()
            .map_err(|e| browser_err("页面状态格式无效", e))
    }

    async fn poll_pause() {
        let delay_ms = rand::thread_rng().gen_range(500..=1500);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

impl RenderingSurface for BrowserSurface {
    type Item = BrowserItem;

    async fn navigate(&mut self, url: &str) -> Result<(), SurfaceError> {
        info!(地址 = %url, "打开页面");
        self.page
            .goto(url)
            .await
            .map_err(|e| browser_err("页面导航失败", e))?;
        Ok(())
    }

    async fn current_items(&mut self) -> Result<Vec<BrowserItem>, SurfaceError> {
        let elements = self
            .page
            .find_elements(ITEM_SELECTOR)
            .await
            .map_err(|e| browser_err("读取帖子列表失败", e))?;

        Ok(elements
            .into_iter()
            .map(|element| BrowserItem {
                key: element.backend_node_id.inner().to_string(),
                element,
            })
            .collect())
    }

    async fn scroll(&mut self, increments: u32) -> Result<(), SurfaceError> {
        for _ in 0..increments {
            self.page
                .evaluate("window.scrollBy(0, window.innerHeight)")
                .await
                .map_err(|e| browser_err("页面滚动失败", e))?;
            let pause_ms = rand::thread_rng().gen_range(200..=400);
            tokio::time::sleep(Duration::from_millis(pause_ms)).await;
        }
        debug!(步数 = increments, "页面已滚动");
        Ok(())
    }

    async fn wait_settled(&mut self, timeout: Duration) -> Result<bool, SurfaceError> {
        // 滚动后 readyState 已是 complete,先停顿等待懒加载的帖子渲染
        let pause = pick_pause(&self.settle_pause_ms);
        debug!(停顿毫秒 = pause.as_millis() as u64, "等待页面加载");
        tokio::time::sleep(pause).await;

        let deadline = Instant::now() + timeout;
        loop {
            if self.ready_state().await? == "complete" {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            Self::poll_pause().await;
        }
    }

    async fn wait_items_present(&mut self, timeout: Duration) -> Result<bool, SurfaceError> {
        let deadline = Instant::now() + timeout;
        loop {
            let found = self
                .page
                .find_elements(ITEM_SELECTOR)
                .await
                .map_err(|e| browser_err("读取帖子列表失败", e))?;
            if !found.is_empty() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            Self::poll_pause().await;
        }
    }

    async fn close(self) -> Result<(), SurfaceError> {
        let Self {
            mut browser,
            page,
            handler,
            ..
        } = self;

        info!("正在关闭浏览器");

        if let Err(e) = page.close().await {
            warn!(错误 = %e, "关闭页面失败");
        }

        let closed = browser
            .close()
            .await
            .map_err(|e| browser_err("关闭浏览器失败", e));
        if closed.is_ok() {
            if let Err(e) = browser.wait().await {
                warn!(错误 = %e, "等待浏览器进程退出失败");
            }
        }
        handler.abort();

        closed.map(|_| info!("浏览器已关闭"))
    }
}

/// 页面中的一个帖子元素
pub struct BrowserItem {
    element: Element,
    key: String,
}

impl BrowserItem {
    async fn read(element: &Element, read: ReadMode, css: &str) -> Result<Option<String>, SurfaceError> {
        let lookup_err = |e: chromiumoxide::error::CdpError| SurfaceError::LookupFailed {
            selector: css.to_string(),
            message: e.to_string(),
        };

        match read {
            ReadMode::Attribute(name) => element.attribute(name).await.map_err(lookup_err),
            ReadMode::Property(name) => Ok(element
                .property(name)
                .await
                .map_err(lookup_err)?
                .and_then(|value| value.as_str().map(str::to_string))),
            ReadMode::Text => element.inner_text().await.map_err(lookup_err),
        }
    }

    /// 定位目标元素: 有 nested 时取每个容器内的第一个 nested 元素
    async fn targets(&self, selector: FieldSelector) -> Result<Vec<Element>, SurfaceError> {
        let spec = selector.spec();
        let lookup_err = |css: &str, e: chromiumoxide::error::CdpError| SurfaceError::LookupFailed {
            selector: css.to_string(),
            message: e.to_string(),
        };

        let containers = self
            .element
            .find_elements(spec.css)
            .await
            .map_err(|e| lookup_err(spec.css, e))?;

        let Some(nested) = spec.nested else {
            return Ok(containers);
        };

        let mut targets = Vec::with_capacity(containers.len());
        for container in containers {
            let inner = container
                .find_elements(nested)
                .await
                .map_err(|e| lookup_err(nested, e))?;
            if let Some(first) = inner.into_iter().next() {
                targets.push(first);
            }
            if !spec.many && !targets.is_empty() {
                break;
            }
        }
        Ok(targets)
    }
}

impl ItemHandle for BrowserItem {
    fn handle_key(&self) -> String {
        self.key.clone()
    }

    async fn find_field(&self, selector: FieldSelector) -> Result<Option<FieldValue>, SurfaceError> {
        let spec = selector.spec();
        let targets = self.targets(selector).await?;

        if !spec.many {
            return match targets.first() {
                Some(element) => Ok(Self::read(element, spec.read, spec.css)
                    .await?
                    .map(FieldValue::Text)),
                None => Ok(None),
            };
        }

        if targets.is_empty() {
            return Ok(None);
        }

        let mut values = Vec::with_capacity(targets.len());
        for element in &targets {
            if let Some(value) = Self::read(element, spec.read, spec.css).await? {
                values.push(value);
            }
        }
        Ok(Some(FieldValue::List(values)))
    }
}
