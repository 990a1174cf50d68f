use std::fmt::Debug;

use log::*;
use platform_tools::{data_objects::UpdateProductRequest, PlatformAdapter, ShopAdapter};
use tokio::sync::watch;

use crate::{
    db::traits::{RoutingDatabase, StoreError},
    db_types::{ExternalDetails, Match},
    osp_api::{
        adapters::AdapterFactory,
        errors::CatalogError,
        sync_objects::{InventorySyncReport, SyncFailure, SyncProgress},
    },
};

enum SyncOutcome {
    Synced,
    Skipped,
}

/// `InventorySyncApi` brings the inventory of shop products in line with the channel products they are matched to.
pub struct InventorySyncApi<B, F> {
    db: B,
    adapters: F,
}

impl<B, F> Debug for InventorySyncApi<B, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InventorySyncApi")
    }
}

impl<B, F> InventorySyncApi<B, F> {
    pub fn new(db: B, adapters: F) -> Self {
        Self { db, adapters }
    }
}

impl<B, F> InventorySyncApi<B, F>
where
    B: RoutingDatabase,
    F: AdapterFactory,
{
    /// Syncs the given matches one after another, in the order given.
    ///
    /// A match that fails is logged and reported, and the batch carries on with the next one. Nothing is retried.
    /// If `progress` is given, a snapshot is sent every time a match starts or finishes syncing.
    pub async fn sync_matches(
        &self,
        match_ids: &[i64],
        progress: Option<watch::Sender<SyncProgress>>,
    ) -> InventorySyncReport {
        let mut report = InventorySyncReport::default();
        let mut state = SyncProgress::default();
        for &id in match_ids {
            state.syncing.push(id);
            trace!("📦️ Match #{id} is {:?}", state.state_of(id));
            publish(&progress, &state);
            let outcome = self.sync_match(id).await;
            state.syncing.retain(|s| *s != id);
            match outcome {
                Ok(SyncOutcome::Synced) => {
                    state.synced.push(id);
                    report.synced.push(id);
                },
                Ok(SyncOutcome::Skipped) => {
                    debug!("📦️ Match #{id} is not one-to-one. Skipping it.");
                    report.skipped.push(id);
                },
                Err(e) => {
                    warn!("📦️ Could not sync inventory for match #{id}. {e}");
                    report.failures.push(SyncFailure { match_id: id, reason: e.to_string() });
                },
            }
            report.states.insert(id, state.state_of(id));
            publish(&progress, &state);
        }
        info!(
            "📦️ Inventory sync finished. {} synced, {} skipped, {} failed",
            report.synced.len(),
            report.skipped.len(),
            report.failures.len()
        );
        report
    }

    async fn sync_match(&self, id: i64) -> Result<SyncOutcome, CatalogError> {
        let mut m = self.db.fetch_match(id).await?.ok_or_else(|| StoreError::matching(id))?;
        let (input, output) = match (m.input.as_slice(), m.output.as_slice()) {
            ([input], [output]) => (input.clone(), output.clone()),
            _ => return Ok(SyncOutcome::Skipped),
        };
        let shop = self.db.fetch_shop(input.platform_id).await?.ok_or_else(|| StoreError::shop(input.platform_id))?;
        let channel =
            self.db.fetch_channel(output.platform_id).await?.ok_or_else(|| StoreError::channel(output.platform_id))?;
        let shop_adapter = self.adapters.shop_adapter(&shop)?;
        let channel_adapter = self.adapters.channel_adapter(&channel)?;

        let shop_product = shop_adapter.get_product(&input.product_id, &input.variant_id).await?;
        let channel_product = channel_adapter.get_product(&output.product_id, &output.variant_id).await?;
        refresh_details(&mut m, ExternalDetails::from(&shop_product), ExternalDetails::from(&channel_product));
        self.db.update_match(&m).await?;

        let (shop_qty, channel_qty) = match (shop_product.inventory, channel_product.inventory) {
            (Some(s), Some(c)) if shop_product.inventory_tracked => (s, c),
            _ => {
                debug!("📦️ Inventory of match #{id} is not tracked. Nothing to sync.");
                return Ok(SyncOutcome::Synced);
            },
        };
        let delta = channel_qty - shop_qty;
        if delta == 0 {
            trace!("📦️ Match #{id} is already in sync at {shop_qty}");
            return Ok(SyncOutcome::Synced);
        }
        let request = UpdateProductRequest {
            product_id: input.product_id.clone(),
            variant_id: input.variant_id.clone(),
            inventory: Some(delta),
            price: None,
        };
        shop_adapter.update_product(&request).await?;
        info!("📦️ Match #{id}: {} inventory adjusted by {delta:+} to {channel_qty}", shop_adapter.platform());
        Ok(SyncOutcome::Synced)
    }
}

fn refresh_details(m: &mut Match, input: ExternalDetails, output: ExternalDetails) {
    if let Some(item) = m.input.first_mut() {
        item.external_details = Some(input);
    }
    if let Some(item) = m.output.first_mut() {
        item.external_details = Some(output);
    }
}

fn publish(progress: &Option<watch::Sender<SyncProgress>>, state: &SyncProgress) {
    if let Some(tx) = progress {
        // Nobody watching is not an error
        let _ = tx.send(state.clone());
    }
}
