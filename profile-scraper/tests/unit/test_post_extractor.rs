//! 帖子提取器测试
//!
//! 每个字段独立降级,只有身份缺失会丢弃整条帖子

#[path = "../common/mod.rs"]
mod common;

use common::MockItem;
use profile_scraper::services::post_extractor::NAME_SENTINEL;
use profile_scraper::services::{FieldSelector, PostExtractor};
use url::Url;

fn extractor(subject: &str) -> PostExtractor {
    PostExtractor::new(subject, Url::parse("https://twitter.com").unwrap())
}

#[tokio::test]
async fn test_extract_完整原创帖子() {
    let item = MockItem::post("20", "jack")
        .list(FieldSelector::Images, &["https://pbs.twimg.com/media/a.jpg", "https://pbs.twimg.com/media/b.jpg"])
        .text(FieldSelector::LinkCard, "https://t.co/abc");

    let extracted = extractor("jack").extract(&item).await.unwrap();
    let post = extracted.post;

    assert_eq!(post.tweet_id, "20");
    assert_eq!(post.username, "jack");
    assert_eq!(post.name.as_deref(), Some("jack Name"));
    assert_eq!(post.replies, Some(3));
    assert_eq!(post.retweets, Some(1));
    assert_eq!(post.likes, Some(12));
    assert!(!post.is_retweet);
    assert_eq!(post.retweet_link, "");
    assert_eq!(post.posted_time.as_deref(), Some("2024-01-02T03:04:05+00:00"));
    assert_eq!(post.content.as_deref(), Some("post 20 #rust by @jack"));
    assert_eq!(post.hashtags, vec!["rust"]);
    assert_eq!(post.mentions, vec!["jack"]);
    assert_eq!(post.images.len(), 2);
    assert!(post.videos.is_empty());
    assert_eq!(post.link.as_deref(), Some("https://t.co/abc"));
    assert!(extracted.report.is_clean());
}

#[tokio::test]
async fn test_extract_缺少时间戳只影响该字段() {
    let full = extractor("jack")
        .extract(&MockItem::post("20", "jack"))
        .await
        .unwrap()
        .post;
    let item = MockItem::post("20", "jack").without(FieldSelector::Timestamp);

    let post = extractor("jack").extract(&item).await.unwrap().post;

    assert_eq!(post.posted_time, None);
    let mut expected = full;
    expected.posted_time = None;
    assert_eq!(post, expected);
}

#[tokio::test]
async fn test_extract_时间戳格式无效时降级() {
    let item = MockItem::post("20", "jack").text(FieldSelector::Timestamp, "3h");

    let extracted = extractor("jack").extract(&item).await.unwrap();

    assert_eq!(extracted.post.posted_time, None);
    assert_eq!(extracted.report.degraded, vec!["posted_time"]);
}

#[tokio::test]
async fn test_extract_转发帖子() {
    let item = MockItem::post("99", "elonmusk").text(FieldSelector::ReshareByline, "Jack Reposted");

    let post = extractor("jack").extract(&item).await.unwrap().post;

    assert!(post.is_retweet);
    assert_eq!(post.username, "elonmusk");
    assert_eq!(post.retweet_link, "https://twitter.com/elonmusk/status/99");
    assert_eq!(post.name.as_deref(), Some("Jack Reposted"));
}

#[tokio::test]
async fn test_extract_采集对象大小写不敏感() {
    let post = extractor("JACK")
        .extract(&MockItem::post("1", "jack"))
        .await
        .unwrap()
        .post;

    assert!(!post.is_retweet);
}

#[tokio::test]
async fn test_extract_锚点不足时显示名为NA() {
    let item = MockItem::post("20", "jack").list(FieldSelector::Anchors, &["jack"]);

    let extracted = extractor("jack").extract(&item).await.unwrap();

    assert_eq!(extracted.post.name.as_deref(), Some(NAME_SENTINEL));
    assert!(extracted.report.is_clean());
}

#[tokio::test]
async fn test_extract_纯媒体帖子正文为空串() {
    let item = MockItem::post("20", "jack")
        .without(FieldSelector::Content)
        .list(FieldSelector::Videos, &["blob:https://twitter.com/v1"]);

    let post = extractor("jack").extract(&item).await.unwrap().post;

    assert_eq!(post.content.as_deref(), Some(""));
    assert!(post.hashtags.is_empty());
    assert!(post.mentions.is_empty());
    assert_eq!(post.videos, vec!["blob:https://twitter.com/v1"]);
}

#[tokio::test]
async fn test_extract_正文查询失败为null() {
    let item = MockItem::post("20", "jack").failing(FieldSelector::Content);

    let extracted = extractor("jack").extract(&item).await.unwrap();

    assert_eq!(extracted.post.content, None);
    assert!(extracted.post.hashtags.is_empty());
    assert_eq!(extracted.report.degraded, vec!["content"]);
}

#[tokio::test]
async fn test_extract_计数缺失为null而不是0() {
    let item = MockItem::post("20", "jack")
        .without(FieldSelector::ReplyCount)
        .text(FieldSelector::ShareCount, "Repost")
        .failing(FieldSelector::LikeCount);

    let extracted = extractor("jack").extract(&item).await.unwrap();

    assert_eq!(extracted.post.replies, None);
    assert_eq!(extracted.post.retweets, None);
    assert_eq!(extracted.post.likes, None);
    assert_eq!(extracted.report.degraded, vec!["likes"]);
}

#[tokio::test]
async fn test_extract_链接卡片缺失与失败区分() {
    let absent = MockItem::post("20", "jack");
    let failed = MockItem::post("21", "jack").failing(FieldSelector::LinkCard);

    let absent = extractor("jack").extract(&absent).await.unwrap().post;
    let failed = extractor("jack").extract(&failed).await.unwrap().post;

    assert_eq!(absent.link.as_deref(), Some(""));
    assert_eq!(failed.link, None);
}

#[tokio::test]
async fn test_extract_多个字段失败互不影响() {
    let item = MockItem::post("20", "jack")
        .failing(FieldSelector::ProfileImage)
        .failing(FieldSelector::Images)
        .failing(FieldSelector::Anchors);

    let extracted = extractor("jack").extract(&item).await.unwrap();

    assert_eq!(extracted.post.profile_picture, None);
    assert!(extracted.post.images.is_empty());
    assert_eq!(extracted.post.name, None);
    assert_eq!(extracted.post.likes, Some(12));
    assert_eq!(extracted.report.degraded.len(), 3);
}

#[tokio::test]
async fn test_extract_无身份时丢弃() {
    let missing = MockItem::post("20", "jack").without(FieldSelector::StatusAnchor);
    let failing = MockItem::post("20", "jack").failing(FieldSelector::StatusAnchor);
    let unparsable = MockItem::post("20", "jack").text(FieldSelector::StatusAnchor, "/jack");

    assert!(extractor("jack").extract(&missing).await.is_none());
    assert!(extractor("jack").extract(&failing).await.is_none());
    assert!(extractor("jack").extract(&unparsable).await.is_none());
}
