use clap::Parser;
use profile_scraper::models::{
    BrowserKind, MergePolicy, OutputFormat, ScrapeConfig, ScrapeError,
    scrape_config::DEFAULT_TWEETS_COUNT,
};
use profile_scraper::services::{scrape_profile, ConfigService, ScrapeOutput, ScrapeRequest};
use profile_scraper::utils::logger;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "profile-scraper")]
#[command(about = "采集账号主页时间线帖子,输出为 JSON 或 CSV")]
#[command(version)]
struct Cli {
    /// 账号 handle (可带 @ 前缀)
    handle: String,

    /// 采集数量
    #[arg(short, long, default_value_t = DEFAULT_TWEETS_COUNT)]
    count: usize,

    /// 输出格式: json | csv
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    /// 输出文件名 (不含扩展名); JSON 未指定时打印到标准输出
    #[arg(long)]
    filename: Option<String>,

    /// 输出目录
    #[arg(long)]
    directory: Option<PathBuf>,

    /// 浏览器: chrome | edge
    #[arg(long)]
    browser: Option<BrowserKind>,

    /// 显示浏览器窗口
    #[arg(long)]
    headful: bool,

    /// 代理 host:port
    #[arg(long)]
    proxy: Option<String>,

    /// 浏览器用户数据目录 (携带登录状态)
    #[arg(long)]
    browser_profile: Option<PathBuf>,

    /// 重试预算
    #[arg(long)]
    retry_budget: Option<u32>,

    /// JSON 合并策略: overwrite | keep-existing
    #[arg(long)]
    merge_policy: Option<MergePolicy>,
}

impl Cli {
    /// 命令行参数覆盖配置
    fn apply(&self, mut config: ScrapeConfig) -> ScrapeConfig {
        if let Some(browser) = self.browser {
            config = config.with_browser(browser);
        }
        if self.headful {
            config = config.with_headless(false);
        }
        if let Some(proxy) = &self.proxy {
            config = config.with_proxy(proxy.clone());
        }
        if let Some(profile) = &self.browser_profile {
            config = config.with_browser_profile(profile.clone());
        }
        if let Some(retry_budget) = self.retry_budget {
            config = config.with_retry_budget(retry_budget);
        }
        if let Some(merge_policy) = self.merge_policy {
            config = config.with_merge_policy(merge_policy);
        }
        config
    }

    fn request(&self) -> ScrapeRequest {
        let mut request = ScrapeRequest::new(self.handle.clone(), self.count, self.format);
        if let Some(filename) = &self.filename {
            request = request.with_filename(filename.clone());
        }
        if let Some(directory) = &self.directory {
            request = request.with_directory(directory.clone());
        }
        request
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match ConfigService::load() {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("错误: {}", e);
            return ExitCode::from(2);
        }
    };
    let config = cli.apply(loaded.config.clone());

    // guard 需要存活到进程退出
    let log_dir = config.log_dir.clone().unwrap_or_else(logger::default_log_dir);
    let _guard = match logger::init(&log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("日志系统初始化失败: {}", e);
            None
        }
    };
    loaded.log_summary(&config);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("错误: 无法创建异步运行时: {}", e);
            return ExitCode::from(1);
        }
    };

    match runtime.block_on(run(&cli, &config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(错误 = %e, "采集失败");
            eprintln!("错误: {}", e);
            match e {
                ScrapeError::InvalidInput(_) | ScrapeError::Config(_) => ExitCode::from(2),
                _ => ExitCode::from(1),
            }
        }
    }
}

async fn run(cli: &Cli, config: &ScrapeConfig) -> Result<(), ScrapeError> {
    match scrape_profile(&cli.request(), config).await? {
        ScrapeOutput::Json(json) => println!("{}", json),
        ScrapeOutput::Written { path, count } => {
            eprintln!("本次写入 {} 条帖子: {}", count, path.display());
        }
    }
    Ok(())
}
