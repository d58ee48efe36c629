//! 渲染面抽象
//!
//! 采集循环只依赖这里的两个能力集:
//! - `RenderingSurface`: 一个活的页面会话 (导航/快照/滚动/等待/关闭)
//! - `ItemHandle`: 快照中的单个帖子元素 (按字段查询)
//!
//! 真实浏览器、无头测试夹具、内存测试替身都可以互换。

#![allow(async_fn_in_trait)]

use crate::models::SurfaceError;
use std::time::Duration;

/// 帖子元素选择器
pub const ITEM_SELECTOR: &str = r#"[data-testid="tweet"]"#;

/// 字段查询种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldSelector {
    /// 时间戳锚点 → 帖子链接
    StatusAnchor,
    /// 回复按钮 → aria-label
    ReplyCount,
    /// 转发按钮 → aria-label
    ShareCount,
    /// 点赞按钮 → aria-label
    LikeCount,
    /// time 元素 → datetime 属性
    Timestamp,
    /// 带语言标记的正文容器 → 文本
    Content,
    /// 转发者署名 → 文本
    ReshareByline,
    /// 所有锚点 → 文本列表
    Anchors,
    /// 图片容器 → img src 列表
    Images,
    /// 视频容器 → video src 列表
    Videos,
    /// 头像 → src
    ProfileImage,
    /// 链接预览卡片 → 链接
    LinkCard,
}

/// 读取方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// 原始属性
    Attribute(&'static str),
    /// DOM 属性 (href 取解析后的绝对地址)
    Property(&'static str),
    /// 可见文本
    Text,
}

/// 选择器定义
///
/// `nested` 存在时先匹配容器,再在每个容器内取第一个 `nested` 元素
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorSpec {
    pub css: &'static str,
    pub nested: Option<&'static str>,
    pub read: ReadMode,
    pub many: bool,
}

impl FieldSelector {
    pub const ALL: [FieldSelector; 12] = [
        FieldSelector::StatusAnchor,
        FieldSelector::ReplyCount,
        FieldSelector::ShareCount,
        FieldSelector::LikeCount,
        FieldSelector::Timestamp,
        FieldSelector::Content,
        FieldSelector::ReshareByline,
        FieldSelector::Anchors,
        FieldSelector::Images,
        FieldSelector::Videos,
        FieldSelector::ProfileImage,
        FieldSelector::LinkCard,
    ];

    pub fn spec(&self) -> SelectorSpec {
        let single = |css, read| SelectorSpec {
            css,
            nested: None,
            read,
            many: false,
        };

        match self {
            FieldSelector::StatusAnchor => single("a[aria-label][dir]", ReadMode::Property("href")),
            FieldSelector::ReplyCount => {
                single(r#"[data-testid="reply"]"#, ReadMode::Attribute("aria-label"))
            }
            FieldSelector::ShareCount => {
                single(r#"[data-testid="retweet"]"#, ReadMode::Attribute("aria-label"))
            }
            FieldSelector::LikeCount => {
                single(r#"[data-testid="like"]"#, ReadMode::Attribute("aria-label"))
            }
            FieldSelector::Timestamp => single("time", ReadMode::Attribute("datetime")),
            FieldSelector::Content => single("div[lang]", ReadMode::Text),
            FieldSelector::ReshareByline => {
                single(r#"[data-testid="User-Names"] > div a"#, ReadMode::Text)
            }
            FieldSelector::Anchors => SelectorSpec {
                css: "a",
                nested: None,
                read: ReadMode::Text,
                many: true,
            },
            FieldSelector::Images => SelectorSpec {
                css: r#"div[data-testid="tweetPhoto"]"#,
                nested: Some("img"),
                read: ReadMode::Attribute("src"),
                many: true,
            },
            FieldSelector::Videos => SelectorSpec {
                css: r#"div[data-testid="videoPlayer"]"#,
                nested: Some("video"),
                read: ReadMode::Attribute("src"),
                many: true,
            },
            FieldSelector::ProfileImage => {
                single(r#"img[alt][draggable="true"]"#, ReadMode::Attribute("src"))
            }
            FieldSelector::LinkCard => SelectorSpec {
                css: r#"[data-testid="card.wrapper"]"#,
                nested: Some("a"),
                read: ReadMode::Property("href"),
                many: false,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldSelector::StatusAnchor => "status_anchor",
            FieldSelector::ReplyCount => "replies",
            FieldSelector::ShareCount => "retweets",
            FieldSelector::LikeCount => "likes",
            FieldSelector::Timestamp => "posted_time",
            FieldSelector::Content => "content",
            FieldSelector::ReshareByline => "reshare_byline",
            FieldSelector::Anchors => "anchors",
            FieldSelector::Images => "images",
            FieldSelector::Videos => "videos",
            FieldSelector::ProfileImage => "profile_picture",
            FieldSelector::LinkCard => "link",
        }
    }
}

/// 字段查询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// 单值视图: 列表取第一个
    pub fn into_text(self) -> Option<String> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::List(items) => items.into_iter().next(),
        }
    }

    /// 列表视图: 单值视为一个元素
    pub fn into_list(self) -> Vec<String> {
        match self {
            FieldValue::Text(text) => vec![text],
            FieldValue::List(items) => items,
        }
    }
}

/// 快照中的单个帖子元素
pub trait ItemHandle {
    /// 元素在页面中的稳定标识 (同一 DOM 节点在多次快照中相同)
    fn handle_key(&self) -> String;

    /// 查询字段
    ///
    /// - `Ok(Some(_))`: 找到
    /// - `Ok(None)`: 元素不存在
    /// - `Err(_)`: 查询本身失败
    async fn find_field(&self, selector: FieldSelector) -> Result<Option<FieldValue>, SurfaceError>;
}

/// 活的渲染面会话
///
/// 由采集循环独占; 所有等待操作有上限,超时返回 `Ok(false)` 而不是错误。
pub trait RenderingSurface {
    type Item: ItemHandle;

    async fn navigate(&mut self, url: &str) -> Result<(), SurfaceError>;

    /// 当前时刻可见的帖子元素 (快照,按页面顺序)
    async fn current_items(&mut self) -> Result<Vec<Self::Item>, SurfaceError>;

    /// 向前滚动若干步
    async fn scroll(&mut self, increments: u32) -> Result<(), SurfaceError>;

    /// 等待页面加载完成
    async fn wait_settled(&mut self, timeout: Duration) -> Result<bool, SurfaceError>;

    /// 等待至少一个帖子出现
    async fn wait_items_present(&mut self, timeout: Duration) -> Result<bool, SurfaceError>;

    /// 释放会话
    async fn close(self) -> Result<(), SurfaceError>;
}
