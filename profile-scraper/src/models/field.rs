//! 单字段提取结果
//!
//! 每个字段的提取相互隔离: 一个字段失败不影响其他字段,也不影响整条帖子。
//! 降级在类型中可见,而不是被异常吞掉。

/// 单字段提取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutcome<T> {
    /// 成功提取
    Found(T),
    /// 元素不存在 (例如纯图片帖子没有正文)
    Absent,
    /// 提取失败,附带原因
    Failed(String),
}

impl<T> FieldOutcome<T> {
    /// 对成功值做转换,缺失与失败原样保留
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldOutcome<U> {
        match self {
            FieldOutcome::Found(value) => FieldOutcome::Found(f(value)),
            FieldOutcome::Absent => FieldOutcome::Absent,
            FieldOutcome::Failed(reason) => FieldOutcome::Failed(reason),
        }
    }

    /// 成功值的二次解析,解析失败视为字段失败
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Result<U, String>) -> FieldOutcome<U> {
        match self {
            FieldOutcome::Found(value) => match f(value) {
                Ok(parsed) => FieldOutcome::Found(parsed),
                Err(reason) => FieldOutcome::Failed(reason),
            },
            FieldOutcome::Absent => FieldOutcome::Absent,
            FieldOutcome::Failed(reason) => FieldOutcome::Failed(reason),
        }
    }

    /// 缺失和失败统一降级为 None
    pub fn found(self) -> Option<T> {
        match self {
            FieldOutcome::Found(value) => Some(value),
            _ => None,
        }
    }

    /// 缺失降级为给定值,失败降级为 None
    ///
    /// 用于"缺失 ≠ 失败"的字段: 正文缺失为空串,查询失败为 null
    pub fn absent_as(self, fallback: T) -> Option<T> {
        match self {
            FieldOutcome::Found(value) => Some(value),
            FieldOutcome::Absent => Some(fallback),
            FieldOutcome::Failed(_) => None,
        }
    }

    /// 缺失与失败都降级为给定值
    pub fn or(self, fallback: T) -> T {
        match self {
            FieldOutcome::Found(value) => value,
            _ => fallback,
        }
    }

    /// 失败原因 (仅 Failed)
    pub fn failure(&self) -> Option<&str> {
        match self {
            FieldOutcome::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}
