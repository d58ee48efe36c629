//! 采集运行模型
//!
//! 状态机: Init → Collecting → (TargetReached | Exhausted) → Done

use crate::models::ProfilePost;
use serde::{Deserialize, Serialize};

/// 采集循环状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionState {
    /// 打开主页并等待首批帖子
    Init,
    /// 读取快照 → 提取 → 去重 → 滚动
    Collecting,
    /// 已达到目标数量
    TargetReached,
    /// 重试预算耗尽,时间线不再产出新帖子
    Exhausted,
    /// 会话已关闭
    Done,
}

impl CollectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionState::Init => "init",
            CollectionState::Collecting => "collecting",
            CollectionState::TargetReached => "target_reached",
            CollectionState::Exhausted => "exhausted",
            CollectionState::Done => "done",
        }
    }
}

/// 停止原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    TargetReached,
    Exhausted,
}

impl From<StopReason> for CollectionState {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::TargetReached => CollectionState::TargetReached,
            StopReason::Exhausted => CollectionState::Exhausted,
        }
    }
}

/// 采集运行统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionReport {
    pub run_id: String,
    pub subject: String,
    pub target_count: usize,
    pub stop_reason: StopReason,
    /// 采集轮次
    pub iterations: u32,
    /// 滚动推进次数
    pub advancements: u32,
    /// 处理过的渲染元素数
    pub items_seen: usize,
    /// 因身份缺失被丢弃的元素数
    pub unusable_items: usize,
    /// 降级字段总数
    pub degraded_fields: usize,
    /// 去重后的帖子数 (截断前)
    pub collected: usize,
    pub retry_budget_left: u32,
}

/// 采集结果
///
/// posts 为前 target_count 条,按首次发现顺序
#[derive(Debug, Clone)]
pub struct CollectionResult {
    pub posts: Vec<ProfilePost>,
    pub report: CollectionReport,
}
