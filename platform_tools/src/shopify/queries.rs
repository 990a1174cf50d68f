pub const PAGE_SIZE: usize = 15;

const VARIANT_DEF: &str = "id title price availableForSale inventoryQuantity sku image { url } inventoryItem { id \
                           tracked } product { id handle title featuredImage { url } }";

pub fn search_products() -> String {
    format!(
        "query SearchProducts($query: String, $after: String) {{ productVariants(first: {PAGE_SIZE}, query: $query, \
         after: $after) {{ pageInfo {{ hasNextPage endCursor }} nodes {{ {VARIANT_DEF} }} }} }}"
    )
}

pub fn get_variant() -> String {
    format!("query GetVariant($id: ID!) {{ productVariant(id: $id) {{ {VARIANT_DEF} }} }}")
}

pub const INVENTORY_LOCATION: &str = r#"
query InventoryLocation($id: ID!) {
  productVariant(id: $id) {
    id
    product { id }
    inventoryItem { id inventoryLevels(first: 1) { nodes { location { id } } } }
  }
}"#;

pub const ADJUST_INVENTORY: &str = r#"
mutation AdjustInventory($input: InventoryAdjustQuantitiesInput!) {
  inventoryAdjustQuantities(input: $input) {
    inventoryAdjustmentGroup { reason }
    userErrors { field message }
  }
}"#;

pub const UPDATE_PRICE: &str = r#"
mutation UpdatePrice($productId: ID!, $variants: [ProductVariantsBulkInput!]!) {
  productVariantsBulkUpdate(productId: $productId, variants: $variants) {
    productVariants { id price }
    userErrors { field message }
  }
}"#;

const ORDER_DEF: &str = "id name email note createdAt currencyCode displayFinancialStatus totalPriceSet { shopMoney { \
                         amount currencyCode } } shippingAddress { firstName lastName address1 address2 city \
                         provinceCode zip countryCode phone } lineItems(first: 50) { nodes { name quantity sku image \
                         { url } originalUnitPriceSet { shopMoney { amount } } variant { id product { id } } } }";

pub fn search_orders() -> String {
    format!(
        "query SearchOrders($query: String, $after: String) {{ orders(first: {PAGE_SIZE}, query: $query, after: \
         $after, reverse: true) {{ pageInfo {{ hasNextPage endCursor }} nodes {{ {ORDER_DEF} }} }} }}"
    )
}

pub const CREATE_WEBHOOK: &str = r#"
mutation CreateWebhook($topic: WebhookSubscriptionTopic!, $webhookSubscription: WebhookSubscriptionInput!) {
  webhookSubscriptionCreate(topic: $topic, webhookSubscription: $webhookSubscription) {
    webhookSubscription { id topic endpoint { __typename ... on WebhookHttpEndpoint { callbackUrl } } }
    userErrors { field message }
  }
}"#;

pub const DELETE_WEBHOOK: &str = r#"
mutation DeleteWebhook($id: ID!) {
  webhookSubscriptionDelete(id: $id) {
    deletedWebhookSubscriptionId
    userErrors { field message }
  }
}"#;

pub const GET_WEBHOOKS: &str = r#"
query GetWebhooks {
  webhookSubscriptions(first: 100) {
    nodes { id topic endpoint { __typename ... on WebhookHttpEndpoint { callbackUrl } } }
  }
}"#;

pub const DRAFT_ORDER_CREATE: &str = r#"
mutation DraftOrderCreate($input: DraftOrderInput!) {
  draftOrderCreate(input: $input) {
    draftOrder { id }
    userErrors { field message }
  }
}"#;

pub const DRAFT_ORDER_COMPLETE: &str = r#"
mutation DraftOrderComplete($id: ID!) {
  draftOrderComplete(id: $id) {
    draftOrder {
      id
      order {
        id
        name
        totalPriceSet { shopMoney { amount } }
        lineItems(first: 50) {
          nodes { name quantity sku image { url } originalUnitPriceSet { shopMoney { amount } } variant { id product { id } } }
        }
      }
    }
    userErrors { field message }
  }
}"#;

pub const DRAFT_ORDER_DELETE: &str = r#"
mutation DraftOrderDelete($input: DraftOrderDeleteInput!) {
  draftOrderDelete(input: $input) {
    deletedId
    userErrors { field message }
  }
}"#;

pub const ORDER_CANCEL: &str = r#"
mutation OrderCancel($orderId: ID!) {
  orderCancel(orderId: $orderId, reason: OTHER, refund: true, restock: true, notifyCustomer: false) {
    job { id }
    orderCancelUserErrors { field message }
  }
}"#;

#[cfg(test)]
mod test {
    use graphql_parser::parse_query;

    use super::*;

    #[test]
    fn documents_parse() {
        let docs = [
            search_products(),
            get_variant(),
            search_orders(),
            INVENTORY_LOCATION.to_string(),
            ADJUST_INVENTORY.to_string(),
            UPDATE_PRICE.to_string(),
            CREATE_WEBHOOK.to_string(),
            DELETE_WEBHOOK.to_string(),
            GET_WEBHOOKS.to_string(),
            DRAFT_ORDER_CREATE.to_string(),
            DRAFT_ORDER_COMPLETE.to_string(),
            DRAFT_ORDER_DELETE.to_string(),
            ORDER_CANCEL.to_string(),
        ];
        for doc in docs {
            assert!(parse_query::<String>(&doc).is_ok(), "{doc}");
        }
    }
}
