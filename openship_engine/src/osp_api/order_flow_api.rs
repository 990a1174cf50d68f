use std::fmt::Debug;

use log::*;
use platform_tools::{
    data_objects::{
        CartItemStatus,
        Order,
        OrderCancellation,
        OrderStatus,
        PurchaseCancellation,
        PurchaseRequest,
        TrackingInfo,
        WebhookRequest,
    },
    AdapterError,
    ChannelAdapter,
    ShopAdapter,
};

use crate::{
    db::traits::{InsertOrderResult, RoutingDatabase, StoreError},
    db_types::{Channel, OrderRecord, Shop},
    events::{EventProducers, OrderRoutedEvent, PurchaseAbortedEvent},
    helpers::cart_items_for_channel,
    osp_api::{adapters::AdapterFactory, errors::OrderFlowError, routing_api::RoutingApi},
};

/// `OrderFlowApi` carries an order from the shop webhook that announces it, through routing, to the purchase on each
/// channel and the tracking or cancellation notices that follow.
pub struct OrderFlowApi<B, F> {
    db: B,
    adapters: F,
    producers: EventProducers,
}

impl<B, F> Debug for OrderFlowApi<B, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B, F> OrderFlowApi<B, F> {
    pub fn new(db: B, adapters: F, producers: EventProducers) -> Self {
        Self { db, adapters, producers }
    }
}

impl<B, F> OrderFlowApi<B, F>
where
    B: RoutingDatabase,
    F: AdapterFactory,
{
    async fn shop(&self, id: i64) -> Result<Shop, StoreError> {
        self.db.fetch_shop(id).await?.ok_or_else(|| StoreError::shop(id))
    }

    async fn channel(&self, id: i64) -> Result<Channel, StoreError> {
        self.db.fetch_channel(id).await?.ok_or_else(|| StoreError::channel(id))
    }

    //----------------------------------------------  Shop side  -----------------------------------------------------

    /// Handles an `ORDER_CREATED` delivery from a shop.
    pub async fn process_order_webhook(
        &self,
        shop_id: i64,
        request: &WebhookRequest,
    ) -> Result<OrderRecord, OrderFlowError> {
        let shop = self.shop(shop_id).await?;
        let order = self.adapters.shop_adapter(&shop)?.normalize_order_created(request).await?;
        self.ingest_order(shop_id, order).await
    }

    /// Stores a new order from `shop_id`, routes it, and attaches the cart items of every channel it was routed to.
    ///
    /// Shops redeliver webhooks, so an order that is already stored is returned unchanged.
    pub async fn ingest_order(&self, shop_id: i64, order: Order) -> Result<OrderRecord, OrderFlowError> {
        let mut record = match self.db.insert_order(shop_id, order).await? {
            InsertOrderResult::Inserted(record) => record,
            InsertOrderResult::AlreadyExists(record) => {
                let order_id = &record.order.order_id;
                info!("🔄️ Order {order_id} from shop #{shop_id} was already received as #{}", record.id);
                return Ok(record);
            },
        };
        let routing = RoutingApi::new(self.db.clone());
        let decisions = routing.route_order(shop_id, &record.order).await?;
        let matches = self.db.fetch_matches().await?;
        let mut channels = decisions.iter().map(|d| d.channel_id).collect::<Vec<_>>();
        channels.dedup();
        for channel_id in channels {
            let items = cart_items_for_channel(&record.order, shop_id, channel_id, &matches);
            if items.is_empty() {
                let name = &record.order.order_name;
                warn!("🛒️ Order {name} is routed to channel #{channel_id}, but no match covers it");
            }
            record.order.cart_items.extend(items);
        }
        record.order.status =
            if record.order.cart_items.is_empty() { OrderStatus::Pending } else { OrderStatus::InProcess };
        record.routes = decisions;
        let record = self.db.update_order(&record).await?;
        info!(
            "🔄️ Order {} stored as #{} with status {} and {} cart items",
            record.order.order_name,
            record.id,
            record.order.status,
            record.order.cart_items.len()
        );
        self.call_order_routed_hook(&record).await;
        Ok(record)
    }

    async fn call_order_routed_hook(&self, record: &OrderRecord) {
        for emitter in &self.producers.order_routed_producer {
            debug!("🔄️📬️ Notifying order routed hook subscribers");
            for decision in &record.routes {
                let event = OrderRoutedEvent::new(record.clone(), decision.clone());
                emitter.publish_event(event).await;
            }
        }
    }

    /// Handles an `ORDER_CANCELLED` delivery from a shop. Deliveries that do not cancel anything return `None`.
    pub async fn cancel_order_webhook(
        &self,
        shop_id: i64,
        request: &WebhookRequest,
    ) -> Result<Option<OrderRecord>, OrderFlowError> {
        let shop = self.shop(shop_id).await?;
        match self.adapters.shop_adapter(&shop)?.normalize_order_cancelled(request).await? {
            Some(cancellation) => Ok(Some(self.cancel_order(shop_id, cancellation).await?)),
            None => {
                debug!("🔄️ Delivery from shop #{shop_id} is not a cancellation. Ignoring it.");
                Ok(None)
            },
        }
    }

    /// Marks the order cancelled. Cart items that were not yet purchased are cancelled with it; purchases already
    /// placed on a channel are left for the channel to cancel.
    pub async fn cancel_order(
        &self,
        shop_id: i64,
        cancellation: OrderCancellation,
    ) -> Result<OrderRecord, OrderFlowError> {
        let mut record = self
            .db
            .fetch_order_by_platform_id(shop_id, &cancellation.order_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Order {} of shop #{shop_id}", cancellation.order_id)))?;
        record.order.status = OrderStatus::Cancelled;
        let mut placed = 0;
        for item in record.order.cart_items.iter_mut() {
            match item.status {
                CartItemStatus::Pending => item.status = CartItemStatus::Cancelled,
                CartItemStatus::Placed => placed += 1,
                _ => {},
            }
        }
        if placed > 0 {
            warn!("🔄️ Order #{} was cancelled with {placed} items already purchased", record.id);
        }
        let reason = cancellation.reason.unwrap_or_else(|| "no reason given".into());
        info!("🔄️ Order #{} ({}) cancelled by shop #{shop_id}: {reason}", record.id, record.order.order_name);
        Ok(self.db.update_order(&record).await?)
    }

    //---------------------------------------------- Channel side -----------------------------------------------------

    async fn order_for_purchase(&self, channel_id: i64, purchase_id: &str) -> Result<OrderRecord, StoreError> {
        self.db
            .fetch_order_by_purchase_id(channel_id, purchase_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Purchase {purchase_id} on channel #{channel_id}")))
    }

    /// Handles a `TRACKING_CREATED` delivery from a channel.
    pub async fn tracking_webhook(
        &self,
        channel_id: i64,
        request: &WebhookRequest,
    ) -> Result<OrderRecord, OrderFlowError> {
        let channel = self.channel(channel_id).await?;
        let tracking = self.adapters.channel_adapter(&channel)?.normalize_tracking_created(request).await?;
        self.record_tracking(channel_id, tracking).await
    }

    /// Marks the items of a purchase fulfilled. The order is complete once every item that was not cancelled is.
    pub async fn record_tracking(
        &self,
        channel_id: i64,
        tracking: TrackingInfo,
    ) -> Result<OrderRecord, OrderFlowError> {
        let mut record = self.order_for_purchase(channel_id, &tracking.purchase_id).await?;
        for item in record.order.cart_items.iter_mut() {
            if item.channel_id == channel_id && item.purchase_id.as_deref() == Some(tracking.purchase_id.as_str()) {
                item.status = CartItemStatus::Fulfilled;
                item.tracking = Some(tracking.clone());
            }
        }
        let all_fulfilled = record
            .order
            .cart_items
            .iter()
            .filter(|i| i.status != CartItemStatus::Cancelled)
            .all(|i| i.status == CartItemStatus::Fulfilled);
        if all_fulfilled {
            record.order.status = OrderStatus::Complete;
        }
        info!(
            "🔄️ Tracking {} recorded for purchase {} of order #{}. Order is {}",
            tracking.tracking_number, tracking.purchase_id, record.id, record.order.status
        );
        Ok(self.db.update_order(&record).await?)
    }

    /// Handles an `ORDER_CANCELLED` delivery from a channel. Deliveries that do not cancel anything return `None`.
    pub async fn purchase_cancelled_webhook(
        &self,
        channel_id: i64,
        request: &WebhookRequest,
    ) -> Result<Option<OrderRecord>, OrderFlowError> {
        let channel = self.channel(channel_id).await?;
        match self.adapters.channel_adapter(&channel)?.normalize_purchase_cancelled(request).await? {
            Some(cancellation) => Ok(Some(self.record_purchase_cancellation(channel_id, cancellation).await?)),
            None => {
                debug!("🔄️ Delivery from channel #{channel_id} is not a cancellation. Ignoring it.");
                Ok(None)
            },
        }
    }

    /// Cancels the items of a purchase. If nothing else of the order is still placed or fulfilled, the order goes back
    /// to pending so it can be purchased elsewhere.
    pub async fn record_purchase_cancellation(
        &self,
        channel_id: i64,
        cancellation: PurchaseCancellation,
    ) -> Result<OrderRecord, OrderFlowError> {
        let mut record = self.order_for_purchase(channel_id, &cancellation.purchase_id).await?;
        for item in record.order.cart_items.iter_mut() {
            if item.channel_id == channel_id && item.purchase_id.as_deref() == Some(cancellation.purchase_id.as_str()) {
                item.status = CartItemStatus::Cancelled;
            }
        }
        let in_flight = record
            .order
            .cart_items
            .iter()
            .any(|i| matches!(i.status, CartItemStatus::Placed | CartItemStatus::Fulfilled));
        if !in_flight && record.order.status != OrderStatus::Cancelled {
            record.order.status = OrderStatus::Pending;
        }
        let reason = cancellation.reason.unwrap_or_else(|| "no reason given".into());
        warn!(
            "🔄️ Channel #{channel_id} cancelled purchase {} of order #{}: {reason}",
            cancellation.purchase_id, record.id
        );
        Ok(self.db.update_order(&record).await?)
    }

    //----------------------------------------------  Purchases  -----------------------------------------------------

    /// Places the pending cart items of an order on a channel.
    ///
    /// A purchase that fails part-way is rolled back by the adapter. A purchase that succeeds upstream but cannot be
    /// recorded here is cancelled on the channel. Either way subscribers receive a [`PurchaseAbortedEvent`].
    pub async fn place_purchase(&self, order_id: i64, channel_id: i64) -> Result<OrderRecord, OrderFlowError> {
        let mut record = self.db.fetch_order(order_id).await?.ok_or_else(|| StoreError::order(order_id))?;
        let channel = self.channel(channel_id).await?;
        let cart_items = record
            .order
            .cart_items
            .iter()
            .filter(|i| i.channel_id == channel_id && i.status == CartItemStatus::Pending)
            .cloned()
            .collect::<Vec<_>>();
        if cart_items.is_empty() {
            return Err(OrderFlowError::NothingToPurchase { order_id, channel_id });
        }
        let request = PurchaseRequest {
            cart_items,
            shipping: Some(record.order.shipping_address()),
            notes: record.order.note.clone(),
        };
        let adapter = self.adapters.channel_adapter(&channel)?;
        info!("🛒️ Placing {} items of order #{order_id} on channel #{channel_id}", request.cart_items.len());
        let purchase = match adapter.create_purchase(&request).await {
            Ok(purchase) => purchase,
            Err(e) => {
                if let AdapterError::PurchaseAborted { draft_id, compensated, reason } = &e {
                    error!("🛒️ Purchase for order #{order_id} on channel #{channel_id} aborted. {reason}");
                    let event = PurchaseAbortedEvent {
                        order_id,
                        channel_id,
                        purchase_id: Some(draft_id.clone()),
                        compensated: *compensated,
                        reason: reason.clone(),
                    };
                    self.call_purchase_aborted_hook(event).await;
                }
                return Err(e.into());
            },
        };
        for item in record.order.cart_items.iter_mut() {
            if item.channel_id == channel_id && item.status == CartItemStatus::Pending {
                item.status = CartItemStatus::Placed;
                item.purchase_id = Some(purchase.purchase_id.clone());
            }
        }
        let waiting_on_others = record.order.cart_items.iter().any(|i| i.status == CartItemStatus::Pending);
        record.order.status = if waiting_on_others { OrderStatus::InProcess } else { OrderStatus::Awaiting };
        match self.db.update_order(&record).await {
            Ok(record) => {
                info!(
                    "🛒️ Order #{order_id} purchased on channel #{channel_id} as {} ({})",
                    purchase.order_number, purchase.purchase_id
                );
                Ok(record)
            },
            Err(e) => {
                let reason = e.to_string();
                error!("🛒️ Purchase {} could not be recorded: {reason}. Cancelling it.", purchase.purchase_id);
                let compensated = match adapter.cancel_purchase(&purchase.purchase_id).await {
                    Ok(()) => true,
                    Err(e) => {
                        error!("🛒️ Purchase {} could not be cancelled either: {e}", purchase.purchase_id);
                        false
                    },
                };
                let event = PurchaseAbortedEvent {
                    order_id,
                    channel_id,
                    purchase_id: Some(purchase.purchase_id.clone()),
                    compensated,
                    reason: reason.clone(),
                };
                self.call_purchase_aborted_hook(event).await;
                Err(OrderFlowError::PurchaseNotRecorded { purchase_id: purchase.purchase_id, compensated, reason })
            },
        }
    }

    async fn call_purchase_aborted_hook(&self, event: PurchaseAbortedEvent) {
        for emitter in &self.producers.purchase_aborted_producer {
            debug!("🔄️📬️ Notifying purchase aborted hook subscribers");
            emitter.publish_event(event.clone()).await;
        }
    }
}
