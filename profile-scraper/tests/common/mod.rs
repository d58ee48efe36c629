//! 测试公共模块
//!
//! 内存实现的渲染面与帖子元素,采集循环与提取器的测试不依赖真实浏览器。

#![allow(dead_code)]

use profile_scraper::models::SurfaceError;
use profile_scraper::services::{FieldSelector, FieldValue, ItemHandle, RenderingSurface};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock帖子元素
///
/// 字段查询结果预先设定: 未设定的字段视为元素不存在
#[derive(Debug, Clone)]
pub struct MockItem {
    key: String,
    fields: HashMap<FieldSelector, Result<FieldValue, String>>,
}

impl MockItem {
    /// 空元素 (没有任何字段,提取时会被丢弃)
    pub fn bare(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fields: HashMap::new(),
        }
    }

    /// 一条完整的原创帖子
    pub fn post(id: &str, author: &str) -> Self {
        Self::bare(format!("node-{}", id))
            .text(
                FieldSelector::StatusAnchor,
                &format!("https://twitter.com/{}/status/{}", author, id),
            )
            .list(
                FieldSelector::Anchors,
                &["", format!("{} Name\n@{}", author, author).as_str()],
            )
            .text(FieldSelector::ReplyCount, "3 Replies. Reply")
            .text(FieldSelector::ShareCount, "1 reposts. Repost")
            .text(FieldSelector::LikeCount, "12 Likes. Like")
            .text(FieldSelector::Timestamp, "2024-01-02T03:04:05.000Z")
            .text(FieldSelector::Content, &format!("post {} #rust by @{}", id, author))
            .text(
                FieldSelector::ProfileImage,
                &format!("https://pbs.twimg.com/profile_images/{}.jpg", author),
            )
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn text(mut self, selector: FieldSelector, value: &str) -> Self {
        self.fields
            .insert(selector, Ok(FieldValue::Text(value.to_string())));
        self
    }

    pub fn list(mut self, selector: FieldSelector, values: &[&str]) -> Self {
        let values = values.iter().map(|v| v.to_string()).collect();
        self.fields.insert(selector, Ok(FieldValue::List(values)));
        self
    }

    pub fn without(mut self, selector: FieldSelector) -> Self {
        self.fields.remove(&selector);
        self
    }

    pub fn failing(mut self, selector: FieldSelector) -> Self {
        self.fields
            .insert(selector, Err("元素已从页面分离".to_string()));
        self
    }
}

impl ItemHandle for MockItem {
    fn handle_key(&self) -> String {
        self.key.clone()
    }

    async fn find_field(&self, selector: FieldSelector) -> Result<Option<FieldValue>, SurfaceError> {
        match self.fields.get(&selector) {
            None => Ok(None),
            Some(Ok(value)) => Ok(Some(value.clone())),
            Some(Err(message)) => Err(SurfaceError::LookupFailed {
                selector: selector.spec().css.to_string(),
                message: message.clone(),
            }),
        }
    }
}

/// Mock渲染面调用记录
///
/// 渲染面在 close 时被消费,测试通过共享记录检查调用情况
#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub navigated: Vec<String>,
    pub snapshots: usize,
    pub scrolls: Vec<u32>,
    /// 按调用顺序记录的方法名
    pub calls: Vec<&'static str>,
    pub closed: bool,
}

/// Mock渲染面
///
/// 按页返回快照: 每次滚动前进一页,超过最后一页后停留在最后一页
pub struct MockSurface {
    pages: Vec<Vec<MockItem>>,
    page: usize,
    log: Arc<Mutex<SurfaceLog>>,
    /// 第 n 次读取快照时模拟浏览器断开
    fail_on_snapshot: Option<usize>,
    settled: bool,
    items_present: bool,
    fail_on_close: bool,
}

impl MockSurface {
    pub fn new(pages: Vec<Vec<MockItem>>) -> Self {
        Self {
            pages,
            page: 0,
            log: Arc::new(Mutex::new(SurfaceLog::default())),
            fail_on_snapshot: None,
            settled: true,
            items_present: true,
            fail_on_close: false,
        }
    }

    /// 每次快照都相同的停滞时间线
    pub fn stalled(items: Vec<MockItem>) -> Self {
        Self::new(vec![items])
    }

    /// 每页 per_page 条新帖子,共 pages 页,ID 从 1 开始连续编号
    pub fn paged_feed(author: &str, pages: usize, per_page: usize) -> Self {
        let pages = (0..pages)
            .map(|page| {
                (0..per_page)
                    .map(|i| MockItem::post(&(page * per_page + i + 1).to_string(), author))
                    .collect()
            })
            .collect();
        Self::new(pages)
    }

    pub fn failing_on_snapshot(mut self, n: usize) -> Self {
        self.fail_on_snapshot = Some(n);
        self
    }

    pub fn failing_on_close(mut self) -> Self {
        self.fail_on_close = true;
        self
    }

    /// 所有等待都超时
    pub fn never_settles(mut self) -> Self {
        self.settled = false;
        self.items_present = false;
        self
    }

    pub fn log(&self) -> Arc<Mutex<SurfaceLog>> {
        Arc::clone(&self.log)
    }
}

impl RenderingSurface for MockSurface {
    type Item = MockItem;

    async fn navigate(&mut self, url: &str) -> Result<(), SurfaceError> {
        let mut log = self.log.lock().unwrap();
        log.calls.push("navigate");
        log.navigated.push(url.to_string());
        Ok(())
    }

    async fn current_items(&mut self) -> Result<Vec<MockItem>, SurfaceError> {
        let mut log = self.log.lock().unwrap();
        log.calls.push("current_items");
        log.snapshots += 1;
        if self.fail_on_snapshot == Some(log.snapshots) {
            return Err(SurfaceError::BrowserError("连接已断开".to_string()));
        }
        Ok(self.pages.get(self.page).cloned().unwrap_or_default())
    }

    async fn scroll(&mut self, increments: u32) -> Result<(), SurfaceError> {
        let mut log = self.log.lock().unwrap();
        log.calls.push("scroll");
        log.scrolls.push(increments);
        drop(log);
        if self.page + 1 < self.pages.len() {
            self.page += 1;
        }
        Ok(())
    }

    async fn wait_settled(&mut self, _timeout: Duration) -> Result<bool, SurfaceError> {
        self.log.lock().unwrap().calls.push("wait_settled");
        Ok(self.settled)
    }

    async fn wait_items_present(&mut self, _timeout: Duration) -> Result<bool, SurfaceError> {
        self.log.lock().unwrap().calls.push("wait_items_present");
        Ok(self.items_present)
    }

    async fn close(self) -> Result<(), SurfaceError> {
        let mut log = self.log.lock().unwrap();
        log.calls.push("close");
        log.closed = true;
        drop(log);
        if self.fail_on_close {
            return Err(SurfaceError::BrowserError("浏览器进程已退出".to_string()));
        }
        Ok(())
    }
}
