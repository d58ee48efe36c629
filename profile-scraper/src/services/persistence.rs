//! 结果持久化
//!
//! - JSON: 以 tweet_id 为键的对象,与已有文件合并后整体重写
//! - CSV: 固定列顺序,已有文件只追加行,新文件先写表头

use crate::models::{MergePolicy, OutputFormat, ProfilePost, StorageError, OUTPUT_FIELDS};
use crate::utils::csv_utils::{
    format_bool, format_list, format_row, header_line, parse_bool, parse_list, parse_rows,
};
use serde_json::{Map, Value};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// 输出文件路径: 目录 + 文件名 + 扩展名
///
/// 文件名已带有对应扩展名时不重复追加
pub fn destination_path(directory: &Path, filename: &str, format: OutputFormat) -> PathBuf {
    let extension = format.extension();
    let suffix = format!(".{}", extension);
    if filename.to_lowercase().ends_with(&suffix) {
        directory.join(filename)
    } else {
        directory.join(format!("{}{}", filename, suffix))
    }
}

/// 帖子列表转为以 tweet_id 为键的对象,保持顺序
pub fn posts_to_map(posts: &[ProfilePost]) -> Result<Map<String, Value>, StorageError> {
    let mut map = Map::new();
    for post in posts {
        map.insert(post.tweet_id.clone(), serde_json::to_value(post)?);
    }
    Ok(map)
}

/// 序列化为JSON文本 (不落盘时直接返回给调用方)
pub fn to_json_string(posts: &[ProfilePost]) -> Result<String, StorageError> {
    Ok(serde_json::to_string_pretty(&Value::Object(posts_to_map(posts)?))?)
}

/// 读取已有JSON文件
///
/// 文件不存在返回空; 内容无法解析时记录警告并视为空
fn load_existing_json(path: &Path) -> Result<Map<String, Value>, StorageError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(e) => return Err(StorageError::io(path, e)),
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => {
            tracing::warn!(
                文件 = %path.display(),
                类型 = json_kind(&other),
                "已有JSON文件不是对象,按空文件处理"
            );
            Ok(Map::new())
        }
        Err(e) => {
            tracing::warn!(文件 = %path.display(), 错误 = %e, "已有JSON文件格式无效,按空文件处理");
            Ok(Map::new())
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// 合并写入JSON文件
///
/// 已有键保持文件中的顺序,新键按采集顺序追加在后。
/// 返回本次写入的帖子数 (与 `write_csv` 一致); 保留策略下跳过的帖子不计入。
pub fn write_json(
    path: &Path,
    posts: &[ProfilePost],
    policy: MergePolicy,
) -> Result<usize, StorageError> {
    let mut map = load_existing_json(path)?;
    let existing = map.len();
    let mut replaced = 0usize;
    let mut written = 0usize;

    for post in posts {
        let present = map.contains_key(&post.tweet_id);
        match (policy, present) {
            (MergePolicy::KeepExisting, true) => continue,
            (MergePolicy::Overwrite, true) => replaced += 1,
            _ => {}
        }
        map.insert(post.tweet_id.clone(), serde_json::to_value(post)?);
        written += 1;
    }

    let total = map.len();
    ensure_parent(path)?;
    let text = serde_json::to_string_pretty(&Value::Object(map))?;
    fs::write(path, text).map_err(|e| StorageError::io(path, e))?;

    tracing::info!(
        文件 = %path.display(),
        原有条数 = existing,
        写入条数 = written,
        覆盖条数 = replaced,
        总条数 = total,
        合并策略 = ?policy,
        "JSON结果已写入"
    );

    Ok(written)
}

/// 读取JSON结果文件,按文件顺序返回帖子
pub fn read_json(path: &Path) -> Result<Vec<ProfilePost>, StorageError> {
    let text = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
    let map: Map<String, Value> = serde_json::from_str(&text)?;
    map.into_iter()
        .map(|(_, value)| serde_json::from_value(value).map_err(StorageError::from))
        .collect()
}

fn opt_cell<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// 帖子转为CSV单元格,顺序与 OUTPUT_FIELDS 一致
pub fn post_to_cells(post: &ProfilePost) -> Vec<String> {
    vec![
        post.tweet_id.clone(),
        post.username.clone(),
        opt_cell(&post.name),
        opt_cell(&post.profile_picture),
        opt_cell(&post.replies),
        opt_cell(&post.retweets),
        opt_cell(&post.likes),
        format_bool(post.is_retweet).to_string(),
        post.retweet_link.clone(),
        opt_cell(&post.posted_time),
        opt_cell(&post.content),
        format_list(&post.hashtags),
        format_list(&post.mentions),
        format_list(&post.images),
        format_list(&post.videos),
        post.tweet_url.clone(),
        opt_cell(&post.link),
    ]
}

/// 追加写入CSV文件
///
/// 文件不存在或为空时先写表头。返回本次写入的行数。
pub fn write_csv(path: &Path, posts: &[ProfilePost]) -> Result<usize, StorageError> {
    ensure_parent(path)?;

    let needs_header = match fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => return Err(StorageError::io(path, e)),
    };

    let mut buffer = String::new();
    if needs_header {
        buffer.push_str(&header_line(&OUTPUT_FIELDS));
    }
    for post in posts {
        buffer.push_str(&format_row(&post_to_cells(post)));
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StorageError::io(path, e))?;
    file.write_all(buffer.as_bytes())
        .map_err(|e| StorageError::io(path, e))?;

    tracing::info!(
        文件 = %path.display(),
        写入行数 = posts.len(),
        新建文件 = needs_header,
        "CSV结果已写入"
    );

    Ok(posts.len())
}

/// 读取CSV结果文件
///
/// 空单元格: 可选字段读为 None; 正文与链接读为空串
pub fn read_csv(path: &Path) -> Result<Vec<ProfilePost>, StorageError> {
    let text = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
    let mut rows = parse_rows(&text).into_iter();

    match rows.next() {
        Some(header) if header.iter().map(String::as_str).eq(OUTPUT_FIELDS) => {}
        Some(_) => {
            return Err(StorageError::InvalidCsv {
                line: 1,
                message: "表头与输出字段不一致".to_string(),
            })
        }
        None => return Ok(Vec::new()),
    }

    rows.enumerate()
        .map(|(index, row)| {
            cells_to_post(&row).map_err(|message| StorageError::InvalidCsv {
                line: index + 2,
                message,
            })
        })
        .collect()
}

fn cells_to_post(cells: &[String]) -> Result<ProfilePost, String> {
    if cells.len() != OUTPUT_FIELDS.len() {
        return Err(format!(
            "列数应为 {},实际为 {}",
            OUTPUT_FIELDS.len(),
            cells.len()
        ));
    }

    let text = |i: usize| -> Option<String> {
        let cell = &cells[i];
        (!cell.is_empty()).then(|| cell.clone())
    };
    let count = |i: usize| -> Result<Option<u64>, String> {
        match text(i) {
            None => Ok(None),
            Some(cell) => cell
                .parse::<u64>()
                .map(Some)
                .map_err(|_| format!("{} 不是有效数字: {}", OUTPUT_FIELDS[i], cell)),
        }
    };
    let list = |i: usize| -> Result<Vec<String>, String> {
        parse_list(&cells[i]).map_err(|e| format!("{}: {}", OUTPUT_FIELDS[i], e))
    };

    Ok(ProfilePost {
        tweet_id: cells[0].clone(),
        username: cells[1].clone(),
        name: text(2),
        profile_picture: text(3),
        replies: count(4)?,
        retweets: count(5)?,
        likes: count(6)?,
        is_retweet: parse_bool(&cells[7])
            .ok_or_else(|| format!("is_retweet 不是有效布尔值: {}", cells[7]))?,
        retweet_link: cells[8].clone(),
        posted_time: text(9),
        content: Some(cells[10].clone()),
        hashtags: list(11)?,
        mentions: list(12)?,
        images: list(13)?,
        videos: list(14)?,
        tweet_url: cells[15].clone(),
        link: Some(cells[16].clone()),
    })
}
