use std::fmt::Debug;

use log::*;
use platform_tools::{
    data_objects::{OrderPage, Product, ProductPage, UpdateProductRequest, UpdateProductResult},
    PlatformAdapter,
    ShopAdapter,
};

use crate::{
    db::traits::{RoutingDatabase, StoreError},
    osp_api::{
        adapters::{AdapterFactory, EitherAdapter, PlatformRef},
        errors::CatalogError,
    },
};

/// `CatalogApi` passes product and order queries through to the platform behind a shop or channel.
pub struct CatalogApi<B, F> {
    db: B,
    adapters: F,
}

impl<B, F> Debug for CatalogApi<B, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B, F> CatalogApi<B, F> {
    pub fn new(db: B, adapters: F) -> Self {
        Self { db, adapters }
    }
}

impl<B, F> CatalogApi<B, F>
where
    B: RoutingDatabase,
    F: AdapterFactory,
{
    async fn shop_adapter(&self, shop_id: i64) -> Result<F::Shop, CatalogError> {
        let shop = self.db.fetch_shop(shop_id).await?.ok_or_else(|| StoreError::shop(shop_id))?;
        Ok(self.adapters.shop_adapter(&shop)?)
    }

    async fn adapter(&self, target: PlatformRef) -> Result<EitherAdapter<F::Shop, F::Channel>, CatalogError> {
        match target {
            PlatformRef::Shop(id) => Ok(EitherAdapter::Shop(self.shop_adapter(id).await?)),
            PlatformRef::Channel(id) => {
                let channel = self.db.fetch_channel(id).await?.ok_or_else(|| StoreError::channel(id))?;
                Ok(EitherAdapter::Channel(self.adapters.channel_adapter(&channel)?))
            },
        }
    }

    pub async fn search_products(
        &self,
        target: PlatformRef,
        search_entry: &str,
        after: Option<String>,
    ) -> Result<ProductPage, CatalogError> {
        let page = self.adapter(target).await?.search_products(search_entry, after).await?;
        debug!("🛍️ Product search '{search_entry}' on {target} returned {} products", page.products.len());
        Ok(page)
    }

    pub async fn get_product(
        &self,
        target: PlatformRef,
        product_id: &str,
        variant_id: &str,
    ) -> Result<Product, CatalogError> {
        Ok(self.adapter(target).await?.get_product(product_id, variant_id).await?)
    }

    pub async fn search_orders(
        &self,
        shop_id: i64,
        search_entry: &str,
        after: Option<String>,
    ) -> Result<OrderPage, CatalogError> {
        let page = self.shop_adapter(shop_id).await?.search_orders(search_entry, after).await?;
        debug!("🛍️ Order search '{search_entry}' on shop #{shop_id} returned {} orders", page.orders.len());
        Ok(page)
    }

    /// Pushes an inventory delta and/or a new price to a shop product.
    pub async fn update_product(
        &self,
        shop_id: i64,
        request: &UpdateProductRequest,
    ) -> Result<UpdateProductResult, CatalogError> {
        let result = self.shop_adapter(shop_id).await?.update_product(request).await?;
        info!(
            "🛍️ Product {}/{} on shop #{shop_id} updated (inventory {:?}, price {:?})",
            request.product_id, request.variant_id, request.inventory, request.price
        );
        Ok(result)
    }
}
