use crate::models::{BrowserKind, ConfigError, MergePolicy, ScrapeConfig};
use std::collections::HashMap;
use std::env;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// 环境变量前缀
const PREFIX: &str = "SCRAPER_";

/// 配置服务
///
/// 职责单一: 从 .env 文件与进程环境变量构建 `ScrapeConfig`
/// - 进程环境变量优先于 .env 文件
/// - 缺失的配置项使用默认值
/// - 无法解析的值返回错误,不静默回退
pub struct ConfigService;

/// 配置加载结果
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ScrapeConfig,
    /// 实际读取的 .env 文件
    pub env_file: Option<PathBuf>,
    /// .env 中的 SCRAPER_* 配置项数
    pub file_vars: usize,
}

impl LoadedConfig {
    /// 记录配置来源与摘要,需在日志系统初始化之后调用
    pub fn log_summary(&self, config: &ScrapeConfig) {
        if let Some(path) = &self.env_file {
            tracing::debug!(path = %path.display(), 配置项数 = self.file_vars, "已读取 .env 文件");
        }
        tracing::info!(config = %config.summary_for_logging(), "已加载采集配置");
    }
}

impl ConfigService {
    /// 获取 .env 文件路径
    ///
    /// 查找顺序:
    /// 1. 给定目录的 .env
    /// 2. 上层目录(工作区根目录)的 .env
    fn env_file_path(dir: &Path) -> Option<PathBuf> {
        let env_path = dir.join(".env");
        if env_path.exists() {
            return Some(env_path);
        }

        // 适用于在 profile-scraper/ 内执行的情况
        dir.parent()
            .map(|parent| parent.join(".env"))
            .filter(|parent_env| parent_env.exists())
    }

    /// 读取 .env 文件中的 SCRAPER_* 配置项
    fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
        let iter = dotenvy::from_path_iter(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        let mut vars = HashMap::new();
        for item in iter {
            let (key, value) =
                item.map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
            if key.starts_with(PREFIX) {
                vars.insert(key, value);
            }
        }
        Ok(vars)
    }

    /// 加载采集配置
    ///
    /// 读取环境变量:
    /// - SCRAPER_BROWSER: chrome | edge | firefox (默认: chrome)
    /// - SCRAPER_HEADLESS: 是否无头 (默认: true)
    /// - SCRAPER_PROXY: 代理 host:port (可选)
    /// - SCRAPER_BROWSER_PROFILE: 浏览器用户数据目录 (可选)
    /// - SCRAPER_BROWSER_PATH: 浏览器可执行文件 (可选)
    /// - SCRAPER_BASE_URL: 站点地址 (默认: https://twitter.com)
    /// - SCRAPER_RETRY_BUDGET: 重试预算 (默认: 20)
    /// - SCRAPER_SETTLE_TIMEOUT_SECS / SCRAPER_ITEMS_TIMEOUT_SECS: 等待上限
    /// - SCRAPER_SETTLE_PAUSE_MS: 滚动后检查加载状态前的停顿,`min-max` 或单值 (默认: 3000-5000)
    /// - SCRAPER_MERGE_POLICY: overwrite | keep-existing
    /// - SCRAPER_LOG_DIR: 日志目录 (可选)
    ///
    /// 日志系统依赖这里的配置,加载过程不输出日志; 由调用方在日志初始化后记录
    pub fn load() -> Result<LoadedConfig, ConfigError> {
        let cwd = env::current_dir()
            .map_err(|e| ConfigError::IoError(format!("无法获取当前目录: {}", e)))?;
        Self::load_from(&cwd, env::vars())
    }

    /// 从指定目录的 .env 与给定的进程环境变量加载配置
    ///
    /// 进程环境变量覆盖 .env 中的同名项
    pub fn load_from(
        dir: &Path,
        process_vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<LoadedConfig, ConfigError> {
        let env_file = Self::env_file_path(dir);
        let mut vars = match &env_file {
            Some(path) => Self::read_env_file(path)?,
            None => HashMap::new(),
        };
        let file_vars = vars.len();

        vars.extend(
            process_vars
                .into_iter()
                .filter(|(key, _)| key.starts_with(PREFIX)),
        );

        Ok(LoadedConfig {
            config: Self::from_vars(&vars)?,
            env_file,
            file_vars,
        })
    }

    /// 由键值对构建配置 (键带 SCRAPER_ 前缀)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<ScrapeConfig, ConfigError> {
        let get = |name: &str| {
            vars.get(&format!("{}{}", PREFIX, name))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let mut config = ScrapeConfig::default();

        if let Some(value) = get("BROWSER") {
            config.browser = parse_value::<BrowserKind>("SCRAPER_BROWSER", value)?;
        }
        if let Some(value) = get("HEADLESS") {
            config.headless = parse_flag("SCRAPER_HEADLESS", value)?;
        }
        config.proxy = get("PROXY").map(str::to_string);
        config.browser_profile = get("BROWSER_PROFILE").map(PathBuf::from);
        config.browser_path = get("BROWSER_PATH").map(PathBuf::from);

        if let Some(value) = get("BASE_URL") {
            url::Url::parse(value).map_err(|_| invalid("SCRAPER_BASE_URL", value))?;
            config.base_url = value.trim_end_matches('/').to_string();
        }
        if let Some(value) = get("RETRY_BUDGET") {
            config.retry_budget = parse_value::<u32>("SCRAPER_RETRY_BUDGET", value)?;
        }
        if let Some(value) = get("SETTLE_TIMEOUT_SECS") {
            config.settle_timeout =
                Duration::from_secs(parse_value("SCRAPER_SETTLE_TIMEOUT_SECS", value)?);
        }
        if let Some(value) = get("ITEMS_TIMEOUT_SECS") {
            config.items_timeout =
                Duration::from_secs(parse_value("SCRAPER_ITEMS_TIMEOUT_SECS", value)?);
        }
        if let Some(value) = get("SETTLE_PAUSE_MS") {
            config.settle_pause_ms = parse_range("SCRAPER_SETTLE_PAUSE_MS", value)?;
        }
        if let Some(value) = get("MERGE_POLICY") {
            config.merge_policy = parse_value::<MergePolicy>("SCRAPER_MERGE_POLICY", value)?;
        }
        config.log_dir = get("LOG_DIR").map(PathBuf::from);

        Ok(config)
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| invalid(key, value))
}

/// 解析 `min-max` 或单值毫秒范围
fn parse_range(key: &str, value: &str) -> Result<RangeInclusive<u64>, ConfigError> {
    let (low, high) = match value.split_once('-') {
        Some((low, high)) => (low.trim(), high.trim()),
        None => (value, value),
    };
    let low: u64 = parse_value(key, low)?;
    let high: u64 = parse_value(key, high)?;
    if low > high {
        return Err(invalid(key, value));
    }
    Ok(low..=high)
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}
