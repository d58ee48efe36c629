//! 帖子提取器
//!
//! 对单个渲染元素逐字段查询,每个字段的失败互不影响:
//! - 身份 (帖子链接) 缺失 → 整条丢弃
//! - 其余字段失败 → 记录日志,按字段规则降级 (null / 空串 / 空列表 / "NA")

use crate::models::{FieldOutcome, PostIdentity, ProfilePost};
use crate::services::surface::{FieldSelector, FieldValue, ItemHandle};
use crate::utils::text_utils::{extract_digits, extract_hashtags, extract_mentions, first_line};
use crate::utils::time_utils::normalize_timestamp;
use url::Url;

/// 锚点不足时的显示名
pub const NAME_SENTINEL: &str = "NA";

/// 单条提取的降级字段记录
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    pub degraded: Vec<&'static str>,
}

impl ExtractionReport {
    fn note<T>(&mut self, field: &'static str, outcome: &FieldOutcome<T>) {
        if let Some(reason) = outcome.failure() {
            tracing::warn!(字段 = field, 原因 = %reason, "字段提取失败,已降级");
            self.degraded.push(field);
        }
    }

    pub fn is_clean(&self) -> bool {
        self.degraded.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ExtractedPost {
    pub post: ProfilePost,
    pub report: ExtractionReport,
}

/// 帖子提取器
///
/// 绑定采集对象与站点地址; 对渲染面的实现一无所知
#[derive(Debug, Clone)]
pub struct PostExtractor {
    subject: String,
    base_url: Url,
}

impl PostExtractor {
    pub fn new(subject: impl Into<String>, base_url: Url) -> Self {
        Self {
            subject: subject.into(),
            base_url,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// 提取一条帖子
    ///
    /// 返回 None 表示元素不可用 (解析不到身份)
    pub async fn extract<I: ItemHandle>(&self, item: &I) -> Option<ExtractedPost> {
        let identity = match lookup(item, FieldSelector::StatusAnchor).await {
            FieldOutcome::Found(value) => value
                .into_text()
                .and_then(|href| PostIdentity::from_permalink(&href, &self.base_url)),
            FieldOutcome::Absent => None,
            FieldOutcome::Failed(reason) => {
                tracing::warn!(原因 = %reason, "帖子链接查询失败");
                None
            }
        };

        let Some(identity) = identity else {
            tracing::debug!(元素 = %item.handle_key(), "未解析到帖子身份,丢弃该元素");
            return None;
        };

        let mut report = ExtractionReport::default();
        let is_retweet = identity.is_reshare_for(&self.subject);

        let replies = self.count(item, FieldSelector::ReplyCount, &mut report).await;
        let retweets = self.count(item, FieldSelector::ShareCount, &mut report).await;
        let likes = self.count(item, FieldSelector::LikeCount, &mut report).await;

        let posted_time = lookup(item, FieldSelector::Timestamp)
            .await
            .and_then(|value| text_of(value).and_then(|raw| normalize_timestamp(&raw)));
        report.note("posted_time", &posted_time);

        // 纯媒体帖子没有正文
        let content = lookup(item, FieldSelector::Content).await.map(text_or_empty);
        report.note("content", &content);
        let content = content.absent_as(String::new());

        let body = content.as_deref().unwrap_or("");
        let hashtags = extract_hashtags(body);
        let mentions = extract_mentions(body);

        let name = self.name(item, is_retweet, &mut report).await;

        let profile_picture = lookup(item, FieldSelector::ProfileImage)
            .await
            .and_then(text_of);
        report.note("profile_picture", &profile_picture);

        let images = self.media(item, FieldSelector::Images, &mut report).await;
        let videos = self.media(item, FieldSelector::Videos, &mut report).await;

        let link = lookup(item, FieldSelector::LinkCard).await.map(text_or_empty);
        report.note("link", &link);

        let retweet_link = if is_retweet {
            identity.tweet_url.clone()
        } else {
            String::new()
        };

        let post = ProfilePost {
            tweet_id: identity.tweet_id,
            username: identity.username,
            name,
            profile_picture: profile_picture.found(),
            replies,
            retweets,
            likes,
            is_retweet,
            retweet_link,
            posted_time: posted_time.found(),
            content,
            hashtags,
            mentions,
            images,
            videos,
            tweet_url: identity.tweet_url,
            link: link.absent_as(String::new()),
        };

        Some(ExtractedPost { post, report })
    }

    /// 计数: 标签中没有数字时为 None
    async fn count<I: ItemHandle>(
        &self,
        item: &I,
        selector: FieldSelector,
        report: &mut ExtractionReport,
    ) -> Option<u64> {
        let outcome = lookup(item, selector).await;
        report.note(selector.name(), &outcome);
        outcome
            .found()
            .and_then(FieldValue::into_text)
            .and_then(|label| extract_digits(&label))
    }

    async fn name<I: ItemHandle>(
        &self,
        item: &I,
        is_retweet: bool,
        report: &mut ExtractionReport,
    ) -> Option<String> {
        let anchors = lookup(item, FieldSelector::Anchors)
            .await
            .map(FieldValue::into_list);
        report.note("name", &anchors);

        let anchors = anchors.absent_as(Vec::new())?;

        if anchors.len() < 2 {
            return Some(NAME_SENTINEL.to_string());
        }

        if is_retweet {
            let byline = lookup(item, FieldSelector::ReshareByline)
                .await
                .and_then(text_of);
            if matches!(byline, FieldOutcome::Absent) {
                tracing::warn!(字段 = "name", "转发帖子缺少转发者署名");
                report.degraded.push("name");
            }
            report.note("name", &byline);
            byline.found()
        } else {
            Some(first_line(&anchors[1]).to_string())
        }
    }

    async fn media<I: ItemHandle>(
        &self,
        item: &I,
        selector: FieldSelector,
        report: &mut ExtractionReport,
    ) -> Vec<String> {
        let outcome = lookup(item, selector).await.map(FieldValue::into_list);
        report.note(selector.name(), &outcome);
        outcome.or(Vec::new())
    }
}

async fn lookup<I: ItemHandle>(item: &I, selector: FieldSelector) -> FieldOutcome<FieldValue> {
    match item.find_field(selector).await {
        Ok(Some(value)) => FieldOutcome::Found(value),
        Ok(None) => FieldOutcome::Absent,
        Err(e) => FieldOutcome::Failed(e.to_string()),
    }
}

fn text_of(value: FieldValue) -> Result<String, String> {
    value
        .into_text()
        .ok_or_else(|| "查询结果为空列表".to_string())
}

fn text_or_empty(value: FieldValue) -> String {
    value.into_text().unwrap_or_default()
}
