//! 服务层模块
//!
//! - `surface`: 渲染面抽象 (`RenderingSurface` / `ItemHandle`)
//! - `browser_service`: 基于 chromiumoxide 的渲染面实现 (feature `chromium`)
//! - `post_extractor`: 单个帖子元素的逐字段提取
//! - `dedup_store`: 按帖子ID去重、保持发现顺序
//! - `collector`: 采集循环状态机与重试预算
//! - `persistence`: JSON/CSV 结果持久化
//! - `config_service`: 从 .env 与环境变量加载配置
//! - `scrape_service`: 采集入口
//!
//! # 服务架构
//!
//! ```text
//! ┌──────────────────┐
//! │  scrape_service  │
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────────────────────────┐
//! │  collector                           │
//! │  ┌───────────────┐ ┌──────────────┐  │
//! │  │ post_extractor│ │ dedup_store  │  │
//! │  └───────┬───────┘ └──────────────┘  │
//! └──────────┼───────────────────────────┘
//!            │                 │
//!            ▼                 ▼
//!   RenderingSurface      persistence
//! ```

#[cfg(feature = "chromium")]
pub mod browser_service;

pub mod collector;
pub mod config_service;
pub mod dedup_store;
pub mod persistence;
pub mod post_extractor;
pub mod scrape_service;
pub mod surface;

// 重导出常用类型,简化外部引用
#[cfg(feature = "chromium")]
pub use browser_service::BrowserSurface;
#[cfg(feature = "chromium")]
pub use scrape_service::scrape_profile;

pub use collector::{collect, CollectorSettings};
pub use config_service::{ConfigService, LoadedConfig};
pub use dedup_store::DedupStore;
pub use post_extractor::{ExtractedPost, ExtractionReport, PostExtractor};
pub use scrape_service::{scrape_with_surface, ScrapeOutput, ScrapeRequest};
pub use surface::{FieldSelector, FieldValue, ItemHandle, RenderingSurface};
