//! 采集入口
//!
//! 校验参数 → 启动渲染面 → 运行采集循环 → 按格式输出

use crate::models::{ConfigError, OutputFormat, ScrapeConfig, ScrapeError};
use crate::services::collector::{collect, CollectorSettings};
use crate::services::persistence::{destination_path, to_json_string, write_csv, write_json};
use crate::services::post_extractor::PostExtractor;
use crate::services::surface::RenderingSurface;
use std::path::PathBuf;
use url::Url;

/// 采集请求
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    /// 账号 handle,允许带 @ 前缀
    pub subject: String,
    pub target_count: usize,
    pub format: OutputFormat,
    /// 不带扩展名的文件名
    pub filename: Option<String>,
    pub directory: Option<PathBuf>,
}

impl ScrapeRequest {
    pub fn new(subject: impl Into<String>, target_count: usize, format: OutputFormat) -> Self {
        Self {
            subject: subject.into(),
            target_count,
            format,
            filename: None,
            directory: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// 校验参数,返回规范化后的 handle
    pub fn validate(&self) -> Result<String, ScrapeError> {
        let subject = normalize_subject(&self.subject)?;
        if self.target_count == 0 {
            return Err(ScrapeError::InvalidInput("采集数量必须大于 0".to_string()));
        }
        Ok(subject)
    }

    /// 输出文件路径; JSON 且未指定文件名与目录时为 None (直接返回结果)
    fn destination(&self, subject: &str) -> Option<PathBuf> {
        if self.format == OutputFormat::Json && self.filename.is_none() && self.directory.is_none()
        {
            return None;
        }

        let directory = self
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let filename = self.filename.as_deref().unwrap_or(subject);
        Some(destination_path(&directory, filename, self.format))
    }
}

/// 采集输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutput {
    /// 序列化后的JSON对象
    Json(String),
    /// 已写入文件; count 为本次写入的帖子数
    Written { path: PathBuf, count: usize },
}

/// 规范化 handle: 去除空白与 @ 前缀
pub fn normalize_subject(raw: &str) -> Result<String, ScrapeError> {
    let subject = raw.trim().trim_start_matches('@');
    if subject.is_empty() {
        return Err(ScrapeError::InvalidInput("账号不能为空".to_string()));
    }
    if subject.contains(|c: char| c.is_whitespace() || c == '/') {
        return Err(ScrapeError::InvalidInput(format!("账号格式无效: {}", raw)));
    }
    Ok(subject.to_string())
}

/// 主页地址: {base_url}/{handle 小写}
pub fn subject_url(base_url: &str, subject: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        subject.to_lowercase()
    )
}

fn parse_base_url(config: &ScrapeConfig) -> Result<Url, ScrapeError> {
    Url::parse(&config.base_url).map_err(|_| {
        ScrapeError::Config(ConfigError::InvalidValue {
            key: "base_url".to_string(),
            value: config.base_url.clone(),
        })
    })
}

/// 用真实浏览器采集一个账号
#[cfg(feature = "chromium")]
pub async fn scrape_profile(
    request: &ScrapeRequest,
    config: &ScrapeConfig,
) -> Result<ScrapeOutput, ScrapeError> {
    use crate::services::browser_service::BrowserSurface;

    request.validate()?;
    parse_base_url(config)?;

    let surface = BrowserSurface::launch(config).await?;
    scrape_with_surface(surface, request, config).await
}

/// 在给定渲染面上采集一个账号
///
/// 参数无效时渲染面同样会被关闭
pub async fn scrape_with_surface<S: RenderingSurface>(
    surface: S,
    request: &ScrapeRequest,
    config: &ScrapeConfig,
) -> Result<ScrapeOutput, ScrapeError> {
    let checked = request
        .validate()
        .and_then(|subject| parse_base_url(config).map(|base| (subject, base)));

    let (subject, base_url) = match checked {
        Ok(checked) => checked,
        Err(e) => {
            if let Err(close_err) = surface.close().await {
                tracing::warn!(错误 = %close_err, "关闭渲染面失败");
            }
            return Err(e);
        }
    };

    let url = subject_url(&config.base_url, &subject);
    let extractor = PostExtractor::new(subject.clone(), base_url);
    let settings = CollectorSettings::from_config(request.target_count, config);

    let result = collect(surface, &url, &extractor, &settings).await?;

    let output = match request.destination(&subject) {
        None => ScrapeOutput::Json(to_json_string(&result.posts)?),
        Some(path) => {
            let count = match request.format {
                OutputFormat::Json => write_json(&path, &result.posts, config.merge_policy)?,
                OutputFormat::Csv => write_csv(&path, &result.posts)?,
            };
            ScrapeOutput::Written { path, count }
        }
    };

    tracing::info!(
        运行ID = %result.report.run_id,
        采集对象 = %subject,
        输出格式 = ?request.format,
        帖子数 = result.posts.len(),
        "采集完成"
    );

    Ok(output)
}
