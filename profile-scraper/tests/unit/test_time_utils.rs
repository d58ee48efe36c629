use profile_scraper::utils::time_utils::normalize_timestamp;

// ============================================================================
// RFC 3339 输入
// ============================================================================

#[test]
fn test_normalize_零小数秒省略() {
    assert_eq!(
        normalize_timestamp("2024-01-02T03:04:05.000Z").unwrap(),
        "2024-01-02T03:04:05+00:00"
    );
}

#[test]
fn test_normalize_保留非零小数秒() {
    assert_eq!(
        normalize_timestamp("2024-01-02T03:04:05.250Z").unwrap(),
        "2024-01-02T03:04:05.250+00:00"
    );
}

#[test]
fn test_normalize_保留原时区偏移() {
    assert_eq!(
        normalize_timestamp("2024-01-02T11:04:05+08:00").unwrap(),
        "2024-01-02T11:04:05+08:00"
    );
}

#[test]
fn test_normalize_忽略首尾空白() {
    assert_eq!(
        normalize_timestamp("  2024-01-02T03:04:05Z\n").unwrap(),
        "2024-01-02T03:04:05+00:00"
    );
}

// ============================================================================
// 无时区输入
// ============================================================================

#[test]
fn test_normalize_无时区_T分隔() {
    assert_eq!(
        normalize_timestamp("2024-01-02T03:04:05").unwrap(),
        "2024-01-02T03:04:05"
    );
}

#[test]
fn test_normalize_无时区_空格分隔() {
    assert_eq!(
        normalize_timestamp("2024-01-02 03:04:05.5").unwrap(),
        "2024-01-02T03:04:05.500"
    );
}

// ============================================================================
// 无效输入
// ============================================================================

#[test]
fn test_normalize_无效输入返回错误() {
    for raw in ["", "2h", "Jan 2, 2024", "2024-13-40T00:00:00Z"] {
        assert!(normalize_timestamp(raw).is_err(), "应拒绝: {:?}", raw);
    }
}
