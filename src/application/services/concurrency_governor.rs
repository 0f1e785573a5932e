//! Concurrency Governor - 流水线并发控制
//!
//! 合成（GPU）与对齐（CPU）共享同一设备的内存预算，因此整条流水线
//! 只用一个计数信号量：一个请求从合成到合成结果返回全程持有一个许可。
//!
//! tokio 的 Semaphore 是公平的（FIFO），超过上限的请求排队等待；
//! 配置了排队超时时，超时返回 ServiceBusy。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::application::error::GatewayError;

/// 流水线许可，drop 时归还并唤醒下一个等待者
///
/// 阻塞线程池上的任务通过 [`PermitLease`] 共同持有许可，
/// 请求被取消后许可要等这些任务结束才归还
#[derive(Debug)]
pub struct PipelinePermit {
    permit: Arc<OwnedSemaphorePermit>,
    waited: Duration,
}

impl PipelinePermit {
    /// 排队等待时长
    pub fn waited(&self) -> Duration {
        self.waited
    }

    pub fn lease(&self) -> PermitLease {
        PermitLease {
            _permit: self.permit.clone(),
        }
    }
}

/// 许可的共享引用，移入 `spawn_blocking` 闭包
#[derive(Debug, Clone)]
pub struct PermitLease {
    _permit: Arc<OwnedSemaphorePermit>,
}

/// 并发状态快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GovernorStats {
    pub max_concurrent: usize,
    pub in_flight: usize,
    pub waiting: usize,
}

pub struct ConcurrencyGovernor {
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
    queue_timeout: Option<Duration>,
    waiting: AtomicUsize,
}

/// 等待计数守卫，等待被取消时同样会递减
struct WaitingGuard<'a>(&'a AtomicUsize);

impl<'a> WaitingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ConcurrencyGovernor {
    /// `max_concurrent` 最小为 1；`queue_timeout` 为 None 时无限等待
    pub fn new(max_concurrent: usize, queue_timeout: Option<Duration>) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            queue_timeout,
            waiting: AtomicUsize::new(0),
        }
    }

    /// 获取流水线许可
    pub async fn acquire(&self) -> Result<PipelinePermit, GatewayError> {
        let started = Instant::now();
        let _waiting = WaitingGuard::enter(&self.waiting);

        let acquire = self.semaphore.clone().acquire_owned();
        let permit = match self.queue_timeout {
            Some(limit) => match tokio::time::timeout(limit, acquire).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        queue_timeout_ms = limit.as_millis() as u64,
                        max_concurrent = self.max_concurrent,
                        "Pipeline queue timeout"
                    );
                    return Err(GatewayError::ServiceBusy(limit));
                }
            },
            None => acquire.await,
        }
        .map_err(|_| GatewayError::internal("pipeline semaphore closed"))?;

        let waited = started.elapsed();
        tracing::debug!(
            waited_ms = waited.as_millis() as u64,
            available = self.semaphore.available_permits(),
            "Pipeline permit acquired"
        );

        Ok(PipelinePermit {
            permit: Arc::new(permit),
            waited,
        })
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn queue_timeout(&self) -> Option<Duration> {
        self.queue_timeout
    }

    /// 空闲许可数
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// 正在执行的请求数
    pub fn in_flight(&self) -> usize {
        self.max_concurrent - self.available()
    }

    pub fn stats(&self) -> GovernorStats {
        GovernorStats {
            max_concurrent: self.max_concurrent,
            in_flight: self.in_flight(),
            waiting: self.waiting.load(Ordering::SeqCst),
        }
    }
}
