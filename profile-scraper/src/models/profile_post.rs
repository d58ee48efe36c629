//! 时间线帖子模型

use serde::{Deserialize, Serialize};
use url::Url;

/// 输出字段顺序 (JSON对象字段 / CSV列)
pub const OUTPUT_FIELDS: [&str; 17] = [
    "tweet_id",
    "username",
    "name",
    "profile_picture",
    "replies",
    "retweets",
    "likes",
    "is_retweet",
    "retweet_link",
    "posted_time",
    "content",
    "hashtags",
    "mentions",
    "images",
    "videos",
    "tweet_url",
    "link",
];

/// 时间线帖子
///
/// 一次采集中按 tweet_id 唯一; 提取后不可变。
/// 字段声明顺序即输出顺序,与 OUTPUT_FIELDS 一致。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePost {
    pub tweet_id: String,
    pub username: String,
    /// 显示名; 锚点不足时为 "NA",提取失败为 None
    pub name: Option<String>,
    pub profile_picture: Option<String>,
    pub replies: Option<u64>,
    pub retweets: Option<u64>,
    pub likes: Option<u64>,
    pub is_retweet: bool,
    /// 仅转发帖子有值,否则为空串
    pub retweet_link: String,
    /// ISO-8601
    pub posted_time: Option<String>,
    /// 正文; 纯媒体帖子为空串,提取失败为 None
    pub content: Option<String>,
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
    pub images: Vec<String>,
    pub videos: Vec<String>,
    pub tweet_url: String,
    /// 链接卡片; 无卡片为空串,提取失败为 None
    pub link: Option<String>,
}

impl ProfilePost {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// 帖子身份
///
/// 由帖子时间戳锚点的 href 解析而来,是帖子唯一必需的部分:
/// 解析不到身份的帖子整条丢弃。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostIdentity {
    pub tweet_id: String,
    /// 链接路径中的作者段
    pub username: String,
    pub tweet_url: String,
}

impl PostIdentity {
    /// 从帖子链接解析身份
    ///
    /// 支持绝对链接与相对链接 (相对链接基于站点地址补全)。
    /// 路径形如 `/{author}/status/{id}`; 没有 status 段时取最后一段作为ID。
    pub fn from_permalink(href: &str, base_url: &Url) -> Option<Self> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }

        let (url, tweet_url) = match Url::parse(href) {
            Ok(url) => (url, href.to_string()),
            Err(_) => {
                let joined = base_url.join(href).ok()?;
                let text = joined.to_string();
                (joined, text)
            }
        };

        let segments: Vec<&str> = url
            .path_segments()?
            .filter(|segment| !segment.is_empty())
            .collect();

        let username = segments.first()?.to_string();
        let tweet_id = match segments.iter().position(|segment| *segment == "status") {
            Some(index) => segments.get(index + 1)?.to_string(),
            None if segments.len() > 1 => segments.last()?.to_string(),
            None => return None,
        };

        Some(Self {
            tweet_id,
            username,
            tweet_url,
        })
    }

    /// 作者与采集对象不同即为转发
    pub fn is_reshare_for(&self, subject: &str) -> bool {
        !self.username.eq_ignore_ascii_case(subject)
    }
}
