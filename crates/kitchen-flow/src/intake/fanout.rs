//! Post-acknowledgement fan-out of an admitted order.
//!
//! Every destination runs on its own task with its own time budget; nothing here can
//! fail the order. Every failure is logged with the order id.

use crate::clock::Clock;
use crate::model::{Order, OrderStatus};
use crate::publish::{
    retry_with_backoff, AuditEntry, EventLog, KitchenEvent, LiveFeed, OrderRecord, PublishError,
    RetryPolicy,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, Instrument};

#[derive(Clone)]
pub struct FanOut {
    order_log: Arc<dyn EventLog>,
    audit_log: Arc<dyn EventLog>,
    kitchen_queue: mpsc::Sender<Order>,
    live: LiveFeed,
    retry: RetryPolicy,
    timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl FanOut {
    pub fn new(
        order_log: Arc<dyn EventLog>,
        audit_log: Arc<dyn EventLog>,
        kitchen_queue: mpsc::Sender<Order>,
        live: LiveFeed,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            order_log,
            audit_log,
            kitchen_queue,
            live,
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(5),
            clock,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Spawns the fan-out for `order`: one task per destination, each with its own
    /// time budget, so a stalled log cannot hold back the kitchen queue. Orders that
    /// are not visible yet skip the queue; the visibility sweep routes them later.
    ///
    /// The handles are only useful to tests; dropping them does not cancel anything.
    pub fn dispatch(&self, order: Order) -> Vec<JoinHandle<()>> {
        let order = Arc::new(order);
        self.live.publish(KitchenEvent::NewOrder {
            order_id: order.id,
            display_id: order.display_id.0.clone(),
            branch: order.branch.clone(),
            slot_start: order.slot_start,
            visible_at: order.visible_at,
            unit_count: order.unit_count(),
        });

        let mut steps = Vec::with_capacity(3);
        if order.status == OrderStatus::Active {
            steps.push(self.step("kitchen queue", &order, |this, order| async move {
                this.enqueue(&order).await
            }));
        }
        steps.push(self.step("order log", &order, |this, order| async move {
            this.append_record(&order).await
        }));
        steps.push(self.step("audit log", &order, |this, order| async move {
            this.append_audit(&order).await
        }));
        steps
    }

    fn step<F, Fut>(
        &self,
        destination: &'static str,
        order: &Arc<Order>,
        run: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(FanOut, Arc<Order>) -> Fut,
        Fut: Future<Output = Result<(), PublishError>> + Send + 'static,
    {
        let budget = self.timeout;
        let span = tracing::info_span!("fanout", order_id = %order.id, destination);
        let work = run(self.clone(), order.clone());
        tokio::spawn(
            async move {
                match tokio::time::timeout(budget, work).await {
                    Ok(Ok(())) => debug!("Fan-out step finished"),
                    Ok(Err(e)) => error!(error = %e, "Fan-out step failed"),
                    Err(_) => error!(timeout = ?budget, "Fan-out step timed out"),
                }
            }
            .instrument(span),
        )
    }

    async fn append_record(&self, order: &Order) -> Result<(), PublishError> {
        let bytes = OrderRecord::from_order(order)?.encode()?;
        retry_with_backoff(&self.retry, "order log", || self.order_log.append(bytes.clone())).await
    }

    async fn enqueue(&self, order: &Order) -> Result<(), PublishError> {
        retry_with_backoff(&self.retry, "kitchen queue", || async move {
            self.kitchen_queue
                .try_send(order.clone())
                .map_err(|e| PublishError::Unavailable(e.to_string()))
        })
        .await
    }

    async fn append_audit(&self, order: &Order) -> Result<(), PublishError> {
        let bytes = AuditEntry::for_order(order, self.clock.now())?.encode()?;
        retry_with_backoff(&self.retry, "audit log", || self.audit_log.append(bytes.clone())).await
    }
}
