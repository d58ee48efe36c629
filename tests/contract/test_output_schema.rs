//! 契约测试: 输出格式
//!
//! 验证 JSON/CSV 输出的字段集合、顺序与取值约定:
//! - 17 个字段,顺序固定
//! - JSON 以 tweet_id 为键
//! - 缺失计数为 null,不是 0
//! - 列表字段为空时为 [],不是 null
//! - CSV 布尔值为 True/False,列表为方括号字面量

use profile_scraper::models::{ProfilePost, OUTPUT_FIELDS};
use profile_scraper::services::persistence::{post_to_cells, to_json_string};
use serde_json::Value;

const EXPECTED_FIELDS: [&str; 17] = [
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

fn reshare() -> ProfilePost {
    ProfilePost {
        tweet_id: "42".to_string(),
        username: "bob".to_string(),
        name: Some("Jack Reposted".to_string()),
        profile_picture: None,
        replies: None,
        retweets: Some(0),
        likes: Some(7),
        is_retweet: true,
        retweet_link: "https://twitter.com/bob/status/42".to_string(),
        posted_time: Some("2024-05-06T07:08:09+00:00".to_string()),
        content: Some("hi @jack #rustlang".to_string()),
        hashtags: vec!["rustlang".to_string()],
        mentions: vec!["jack".to_string()],
        images: vec![],
        videos: vec![],
        tweet_url: "https://twitter.com/bob/status/42".to_string(),
        link: Some(String::new()),
    }
}

#[test]
fn test_字段顺序固定() {
    assert_eq!(OUTPUT_FIELDS, EXPECTED_FIELDS);
}

#[test]
fn test_json_以帖子ID为键() {
    let json = to_json_string(&[reshare()]).unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();

    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 1);
    assert_eq!(object["42"]["tweet_id"], "42");
}

#[test]
fn test_json_记录字段与类型() {
    let json = to_json_string(&[reshare()]).unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();
    let record = value["42"].as_object().unwrap();

    let keys: Vec<&str> = record.keys().map(String::as_str).collect();
    assert_eq!(keys, EXPECTED_FIELDS.to_vec());

    assert!(record["replies"].is_null());
    assert_eq!(record["retweets"], 0);
    assert_eq!(record["likes"], 7);
    assert_eq!(record["is_retweet"], true);
    assert!(record["profile_picture"].is_null());
    assert_eq!(record["images"], Value::Array(vec![]));
    assert_eq!(record["hashtags"], serde_json::json!(["rustlang"]));
    assert_eq!(record["link"], "");
}

#[test]
fn test_json_空结果为空对象() {
    let json = to_json_string(&[]).unwrap();
    assert_eq!(serde_json::from_str::<Value>(&json).unwrap(), serde_json::json!({}));
}

#[test]
fn test_csv_单元格约定() {
    let cells = post_to_cells(&reshare());

    assert_eq!(cells.len(), EXPECTED_FIELDS.len());
    assert_eq!(cells[0], "42");
    assert_eq!(cells[3], "", "null 写为空单元格");
    assert_eq!(cells[4], "");
    assert_eq!(cells[5], "0");
    assert_eq!(cells[7], "True");
    assert_eq!(cells[11], "['rustlang']");
    assert_eq!(cells[13], "[]");
}
