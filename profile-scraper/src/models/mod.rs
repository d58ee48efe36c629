//! 数据模型模块
//!
//! 包含所有核心数据结构:
//! - errors: 错误类型定义 (浏览器、存储、配置、采集顶层错误)
//! - profile_post: 时间线帖子与帖子身份
//! - field: 单字段提取结果
//! - collection: 采集状态机与运行统计
//! - scrape_config: 采集配置

pub mod collection;
pub mod errors;
pub mod field;
pub mod profile_post;
pub mod scrape_config;

// 重导出常用类型,简化外部引用
pub use collection::{CollectionReport, CollectionResult, CollectionState, StopReason};
pub use errors::{ConfigError, ScrapeError, StorageError, SurfaceError};
pub use field::FieldOutcome;
pub use profile_post::{PostIdentity, ProfilePost, OUTPUT_FIELDS};
pub use scrape_config::{BrowserKind, MergePolicy, OutputFormat, ScrapeConfig};
