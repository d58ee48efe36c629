use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// 默认站点地址
pub const DEFAULT_BASE_URL: &str = "https://twitter.com";

/// 默认采集帖子数
pub const DEFAULT_TWEETS_COUNT: usize = 30;

/// 默认重试预算: 连续无新增的轮次上限
pub const DEFAULT_RETRY_BUDGET: u32 = 20;

/// 默认加载停顿 (毫秒)
pub const DEFAULT_SETTLE_PAUSE_MS: RangeInclusive<u64> = 3000..=5000;

/// 浏览器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    Chrome,
    Edge,
    Firefox,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Edge => "edge",
            BrowserKind::Firefox => "firefox",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowserKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chrome" | "chromium" => Ok(BrowserKind::Chrome),
            "edge" | "msedge" => Ok(BrowserKind::Edge),
            "firefox" => Ok(BrowserKind::Firefox),
            other => Err(format!("未知的浏览器: {}", other)),
        }
    }
}

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("不支持的输出格式: {}", other)),
        }
    }
}

/// JSON合并策略
///
/// 目标文件中已存在相同 tweet_id 时的取舍
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// 本次采集覆盖旧记录
    #[default]
    Overwrite,
    /// 保留文件中的旧记录
    KeepExisting,
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "overwrite" => Ok(MergePolicy::Overwrite),
            "keep-existing" | "keep" => Ok(MergePolicy::KeepExisting),
            other => Err(format!("未知的合并策略: {}", other)),
        }
    }
}

/// 采集配置
///
/// 浏览器启动参数 + 采集循环参数 + 持久化策略。
/// 默认值对齐原有行为; 可由环境变量与命令行覆盖。
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub browser: BrowserKind,
    pub headless: bool,

    /// 代理 `host:port` 或 `user:pass@host:port`
    pub proxy: Option<String>,

    /// 浏览器用户数据目录,携带已登录的 cookies
    pub browser_profile: Option<PathBuf>,

    /// 显式指定浏览器可执行文件
    pub browser_path: Option<PathBuf>,

    pub base_url: String,

    /// 连续无新增轮次的容忍上限
    pub retry_budget: u32,

    /// 等待页面加载完成的上限
    pub settle_timeout: Duration,

    /// 等待帖子出现的上限
    pub items_timeout: Duration,

    /// 检查页面加载状态前的随机停顿 (毫秒)
    ///
    /// 滚动后 readyState 通常已是 complete,停顿给懒加载的帖子留出渲染时间
    pub settle_pause_ms: RangeInclusive<u64>,

    pub merge_policy: MergePolicy,

    /// 日志目录,None 时使用系统数据目录
    pub log_dir: Option<PathBuf>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            browser: BrowserKind::Chrome,
            headless: true,
            proxy: None,
            browser_profile: None,
            browser_path: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            retry_budget: DEFAULT_RETRY_BUDGET,
            settle_timeout: Duration::from_secs(30),
            items_timeout: Duration::from_secs(10),
            settle_pause_ms: DEFAULT_SETTLE_PAUSE_MS,
            merge_policy: MergePolicy::Overwrite,
            log_dir: None,
        }
    }
}

impl ScrapeConfig {
    pub fn with_browser(mut self, browser: BrowserKind) -> Self {
        self.browser = browser;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_browser_profile(mut self, profile: PathBuf) -> Self {
        self.browser_profile = Some(profile);
        self
    }

    pub fn with_retry_budget(mut self, retry_budget: u32) -> Self {
        self.retry_budget = retry_budget;
        self
    }

    pub fn with_settle_pause_ms(mut self, settle_pause_ms: RangeInclusive<u64>) -> Self {
        self.settle_pause_ms = settle_pause_ms;
        self
    }

    pub fn with_merge_policy(mut self, merge_policy: MergePolicy) -> Self {
        self.merge_policy = merge_policy;
        self
    }

    /// 日志摘要,代理凭据不记录明文
    pub fn summary_for_logging(&self) -> String {
        let proxy = match &self.proxy {
            Some(proxy) => match proxy.rsplit_once('@') {
                Some((_, host)) => format!("***@{}", host),
                None => proxy.clone(),
            },
            None => "无".to_string(),
        };

        format!(
            "browser={} headless={} proxy={} profile={} retry_budget={} merge={:?}",
            self.browser,
            self.headless,
            proxy,
            self.browser_profile
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "无".to_string()),
            self.retry_budget,
            self.merge_policy,
        )
    }
}
