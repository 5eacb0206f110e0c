use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use tokio::sync::broadcast;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

use bakeops_allocation::{ApprovalEngine, AvailabilityCalculator};
use bakeops_core::StoreId;
use bakeops_infra::{
    InMemoryIngredientCatalog, InMemoryRequestStore, InMemoryStockLedger, InMemoryStoreDirectory,
};

/// Realtime message broadcasted via SSE (request decisions per store).
#[derive(Debug, Clone, serde::Serialize)]
pub struct RealtimeMessage {
    pub store_id: StoreId,
    pub topic: String,
    pub payload: serde_json::Value,
}

/// Shared application services: the in-memory stores plus the allocation
/// core wired on top of them.
pub struct AppServices {
    pub ledger: Arc<InMemoryStockLedger>,
    pub requests: Arc<InMemoryRequestStore>,
    pub ingredients: Arc<InMemoryIngredientCatalog>,
    pub stores: Arc<InMemoryStoreDirectory>,
    pub availability: AvailabilityCalculator<Arc<InMemoryStockLedger>, Arc<InMemoryRequestStore>>,
    pub approvals: ApprovalEngine<Arc<InMemoryStockLedger>, Arc<InMemoryRequestStore>>,
    realtime_tx: broadcast::Sender<RealtimeMessage>,
}

pub fn build_services() -> AppServices {
    let ledger = Arc::new(InMemoryStockLedger::new());
    let requests = Arc::new(InMemoryRequestStore::new());
    let ingredients = Arc::new(InMemoryIngredientCatalog::new());
    let stores = Arc::new(InMemoryStoreDirectory::new());

    let availability = AvailabilityCalculator::new(ledger.clone(), requests.clone());
    let approvals = ApprovalEngine::new(ledger.clone(), requests.clone());

    // Realtime channel (SSE): lossy broadcast, store-filtered in handlers.
    let (realtime_tx, _realtime_rx) = broadcast::channel::<RealtimeMessage>(256);

    AppServices {
        ledger,
        requests,
        ingredients,
        stores,
        availability,
        approvals,
        realtime_tx,
    }
}

impl AppServices {
    pub fn realtime_tx(&self) -> &broadcast::Sender<RealtimeMessage> {
        &self.realtime_tx
    }

    /// Broadcast a store-scoped notification (lossy; no backpressure on the
    /// request path).
    pub fn notify(&self, store_id: StoreId, topic: impl Into<String>, payload: serde_json::Value) {
        let _ = self.realtime_tx.send(RealtimeMessage {
            store_id,
            topic: topic.into(),
            payload,
        });
    }
}

/// Build an SSE stream of decision notifications for one store (used by
/// `/stream`).
pub fn store_sse_stream(
    services: Arc<AppServices>,
    store_id: StoreId,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.realtime_tx().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |msg| match msg {
        Ok(m) if m.store_id == store_id => {
            let data = serde_json::to_string(&m.payload).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(m.topic).data(data)))
        }
        _ => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
