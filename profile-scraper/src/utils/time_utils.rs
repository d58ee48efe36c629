use chrono::{DateTime, NaiveDateTime, SecondsFormat};

/// 归一化帖子时间戳为 ISO-8601
///
/// 输入来自 `<time datetime="...">` 属性:
/// - RFC 3339: "2025-10-07T12:34:56.000Z" → "2025-10-07T12:34:56+00:00"
/// - 带小数秒: "2025-10-07T12:34:56.250Z" → "2025-10-07T12:34:56.250+00:00"
/// - 无时区: "2025-10-07T12:34:56" → "2025-10-07T12:34:56"
///
/// 小数秒为零时省略
pub fn normalize_timestamp(raw: &str) -> Result<String, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("时间戳为空".to_string());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(format_naive(naive));
        }
    }

    Err(format!("无法解析的时间戳: {}", raw))
}

fn format_naive(naive: NaiveDateTime) -> String {
    if naive.and_utc().timestamp_subsec_nanos() == 0 {
        naive.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        naive.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
    }
}
