use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, OrderRoutedEvent, PurchaseAbortedEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub order_routed_producer: Vec<EventProducer<OrderRoutedEvent>>,
    pub purchase_aborted_producer: Vec<EventProducer<PurchaseAbortedEvent>>,
}

pub struct EventHandlers {
    pub on_order_routed: Option<EventHandler<OrderRoutedEvent>>,
    pub on_purchase_aborted: Option<EventHandler<PurchaseAbortedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_order_routed = hooks.on_order_routed.map(|f| EventHandler::new(buffer_size, f));
        let on_purchase_aborted = hooks.on_purchase_aborted.map(|f| EventHandler::new(buffer_size, f));
        Self { on_order_routed, on_purchase_aborted }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_order_routed {
            result.order_routed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_purchase_aborted {
            result.purchase_aborted_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_order_routed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_purchase_aborted {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_order_routed: Option<Handler<OrderRoutedEvent>>,
    pub on_purchase_aborted: Option<Handler<PurchaseAbortedEvent>>,
}

impl EventHooks {
    pub fn on_order_routed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderRoutedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_order_routed = Some(Arc::new(f));
        self
    }

    pub fn on_purchase_aborted<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(PurchaseAbortedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_purchase_aborted = Some(Arc::new(f));
        self
    }
}
