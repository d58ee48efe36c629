use profile_scraper::models::{PostIdentity, ProfilePost, OUTPUT_FIELDS};
use serde_json::Value;
use url::Url;

fn base() -> Url {
    Url::parse("https://twitter.com").unwrap()
}

fn sample() -> ProfilePost {
    ProfilePost {
        tweet_id: "1790000000000000000".to_string(),
        username: "jack".to_string(),
        name: Some("jack".to_string()),
        profile_picture: Some("https://pbs.twimg.com/profile_images/1/a.jpg".to_string()),
        replies: Some(0),
        retweets: None,
        likes: Some(1200),
        is_retweet: false,
        retweet_link: String::new(),
        posted_time: None,
        content: Some(String::new()),
        hashtags: vec![],
        mentions: vec!["bob".to_string()],
        images: vec![],
        videos: vec!["https://video.twimg.com/v.mp4".to_string()],
        tweet_url: "https://twitter.com/jack/status/1790000000000000000".to_string(),
        link: None,
    }
}

// ============================================================================
// ProfilePost 序列化
// ============================================================================

#[test]
fn test_profile_post_回读保留null与空列表() {
    let post = sample();

    let json = post.to_json().unwrap();
    let restored = ProfilePost::from_json(&json).unwrap();

    assert_eq!(restored, post);
    assert_eq!(restored.retweets, None);
    assert_eq!(restored.replies, Some(0));
    assert!(restored.images.is_empty());
}

#[test]
fn test_profile_post_字段顺序与输出格式一致() {
    let value: Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
    let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();

    assert_eq!(keys, OUTPUT_FIELDS.to_vec());
}

#[test]
fn test_profile_post_null与空值区分() {
    let value: Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();

    assert!(value["retweets"].is_null());
    assert!(value["posted_time"].is_null());
    assert!(value["link"].is_null());
    assert_eq!(value["content"], Value::String(String::new()));
    assert_eq!(value["images"], Value::Array(vec![]));
    assert_eq!(value["is_retweet"], Value::Bool(false));
}

// ============================================================================
// PostIdentity 解析
// ============================================================================

#[test]
fn test_identity_媒体子路径() {
    let identity =
        PostIdentity::from_permalink("https://twitter.com/jack/status/20/photo/1", &base()).unwrap();

    assert_eq!(identity.tweet_id, "20");
    assert_eq!(identity.username, "jack");
}

#[test]
fn test_identity_忽略查询参数() {
    let identity = PostIdentity::from_permalink("/jack/status/20?s=46", &base()).unwrap();

    assert_eq!(identity.tweet_id, "20");
    assert_eq!(identity.tweet_url, "https://twitter.com/jack/status/20?s=46");
}

#[test]
fn test_identity_其他站点的绝对链接() {
    let identity = PostIdentity::from_permalink("https://x.com/Bob/status/77", &base()).unwrap();

    assert_eq!(identity.username, "Bob");
    assert!(identity.is_reshare_for("jack"));
    assert!(!identity.is_reshare_for("BOB"));
}

#[test]
fn test_identity_无法解析时返回None() {
    for href in ["", "   ", "/jack", "https://twitter.com/"] {
        assert!(
            PostIdentity::from_permalink(href, &base()).is_none(),
            "应无法解析: {:?}",
            href
        );
    }
}
