//! 采集循环
//!
//! 状态机: Init → Collecting → (TargetReached | Exhausted) → Done
//!
//! - 每轮读取快照,只处理未见过的元素,新帖子写入去重存储
//! - 一轮没有写入任何新帖子即为"无效轮次",消耗一次重试预算
//! - 达到目标数量或预算耗尽时停止; 达到目标后不再滚动
//! - 渲染面在任何退出路径上都会被关闭

use crate::models::{
    CollectionReport, CollectionResult, CollectionState, ScrapeConfig, ScrapeError, StopReason,
};
use crate::services::dedup_store::DedupStore;
use crate::services::post_extractor::PostExtractor;
use crate::services::surface::{ItemHandle, RenderingSurface};
use rand::Rng;
use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::time::Duration;

/// 采集循环参数
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub target_count: usize,
    pub retry_budget: u32,
    pub settle_timeout: Duration,
    pub items_timeout: Duration,
    /// 每次推进滚动的步数范围 (随机取值)
    pub scroll_increments: RangeInclusive<u32>,
}

impl CollectorSettings {
    pub fn from_config(target_count: usize, config: &ScrapeConfig) -> Self {
        Self {
            target_count,
            retry_budget: config.retry_budget,
            settle_timeout: config.settle_timeout,
            items_timeout: config.items_timeout,
            scroll_increments: 1..=3,
        }
    }

    fn next_increments(&self) -> u32 {
        let (low, high) = (*self.scroll_increments.start(), *self.scroll_increments.end());
        if low >= high {
            return low.max(1);
        }
        rand::thread_rng().gen_range(low..=high)
    }
}

/// 单次采集会话
///
/// 独占渲染面; 已处理元素集合与去重存储只在本次运行内有效
struct CollectionSession<S: RenderingSurface> {
    surface: S,
    processed: HashSet<String>,
    store: DedupStore,
    state: CollectionState,
    run_id: String,
}

/// 运行计数
#[derive(Debug, Default)]
struct Tally {
    iterations: u32,
    advancements: u32,
    items_seen: usize,
    unusable_items: usize,
    degraded_fields: usize,
}

impl<S: RenderingSurface> CollectionSession<S> {
    fn transition(&mut self, next: CollectionState) {
        tracing::debug!(
            运行ID = %self.run_id,
            从 = self.state.as_str(),
            到 = next.as_str(),
            "采集状态转换"
        );
        self.state = next;
    }

    async fn open(&mut self, url: &str, settings: &CollectorSettings) -> Result<(), ScrapeError> {
        self.surface.navigate(url).await?;
        self.settle(settings).await
    }

    /// 等待加载完成与帖子出现; 超时只记录,不中断
    async fn settle(&mut self, settings: &CollectorSettings) -> Result<(), ScrapeError> {
        if !self.surface.wait_settled(settings.settle_timeout).await? {
            tracing::warn!(
                运行ID = %self.run_id,
                超时秒数 = settings.settle_timeout.as_secs(),
                "等待页面加载超时,继续采集"
            );
        }

        if !self.surface.wait_items_present(settings.items_timeout).await? {
            tracing::warn!(
                运行ID = %self.run_id,
                超时秒数 = settings.items_timeout.as_secs(),
                "等待帖子出现超时,继续采集"
            );
        }

        Ok(())
    }

    async fn drive(
        &mut self,
        url: &str,
        extractor: &PostExtractor,
        settings: &CollectorSettings,
        tally: &mut Tally,
    ) -> Result<(StopReason, u32), ScrapeError> {
        self.open(url, settings).await?;
        self.transition(CollectionState::Collecting);

        let mut retry_budget = settings.retry_budget;

        loop {
            tally.iterations += 1;

            let snapshot = self.surface.current_items().await?;
            let mut inserted = 0usize;

            for item in &snapshot {
                if !self.processed.insert(item.handle_key()) {
                    continue;
                }
                tally.items_seen += 1;

                match extractor.extract(item).await {
                    Some(extracted) => {
                        tally.degraded_fields += extracted.report.degraded.len();
                        if self.store.insert_if_absent(extracted.post) {
                            inserted += 1;
                        }
                    }
                    None => tally.unusable_items += 1,
                }
            }

            if inserted == 0 {
                retry_budget = retry_budget.saturating_sub(1);
            }

            tracing::info!(
                运行ID = %self.run_id,
                轮次 = tally.iterations,
                快照元素数 = snapshot.len(),
                新增帖子数 = inserted,
                已采集 = self.store.len(),
                目标数量 = settings.target_count,
                剩余重试 = retry_budget,
                "采集轮次完成"
            );

            if self.store.len() >= settings.target_count {
                return Ok((StopReason::TargetReached, retry_budget));
            }
            if retry_budget == 0 {
                return Ok((StopReason::Exhausted, retry_budget));
            }

            let increments = settings.next_increments();
            self.surface.scroll(increments).await?;
            tally.advancements += 1;
            self.settle(settings).await?;
        }
    }
}

/// 执行一次完整采集
///
/// 返回去重存储中按发现顺序的前 target_count 条帖子。
/// 渲染面出错时先关闭会话再返回原始错误; 关闭失败只记录日志。
pub async fn collect<S: RenderingSurface>(
    surface: S,
    url: &str,
    extractor: &PostExtractor,
    settings: &CollectorSettings,
) -> Result<CollectionResult, ScrapeError> {
    let run_id = uuid::Uuid::new_v4().to_string();

    tracing::info!(
        运行ID = %run_id,
        采集对象 = %extractor.subject(),
        地址 = %url,
        目标数量 = settings.target_count,
        重试预算 = settings.retry_budget,
        "开始采集"
    );

    let mut session = CollectionSession {
        surface,
        processed: HashSet::new(),
        store: DedupStore::new(),
        state: CollectionState::Init,
        run_id,
    };
    let mut tally = Tally::default();

    let outcome = session.drive(url, extractor, settings, &mut tally).await;

    if let Ok((reason, _)) = &outcome {
        session.transition((*reason).into());
    }
    session.transition(CollectionState::Done);

    let CollectionSession {
        surface,
        store,
        run_id,
        ..
    } = session;

    if let Err(e) = surface.close().await {
        tracing::warn!(运行ID = %run_id, 错误 = %e, "关闭渲染面失败");
    }

    let (stop_reason, retry_budget_left) = match outcome {
        Ok(stopped) => stopped,
        Err(e) => {
            tracing::error!(运行ID = %run_id, 错误 = %e, "采集中断");
            return Err(e);
        }
    };

    let report = CollectionReport {
        run_id,
        subject: extractor.subject().to_string(),
        target_count: settings.target_count,
        stop_reason,
        iterations: tally.iterations,
        advancements: tally.advancements,
        items_seen: tally.items_seen,
        unusable_items: tally.unusable_items,
        degraded_fields: tally.degraded_fields,
        collected: store.len(),
        retry_budget_left,
    };

    tracing::info!(
        运行ID = %report.run_id,
        停止原因 = ?report.stop_reason,
        轮次 = report.iterations,
        滚动次数 = report.advancements,
        已采集 = report.collected,
        丢弃元素 = report.unusable_items,
        降级字段 = report.degraded_fields,
        "采集结束"
    );

    Ok(CollectionResult {
        posts: store.take(settings.target_count),
        report,
    })
}
