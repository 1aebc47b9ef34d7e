//! Catalog browsing.

use tokio_util::sync::CancellationToken;
use tracing::info;

use campus_market_storefront::Marketplace;
use campus_market_storefront::models::Product;
use campus_market_storefront::services::catalog::{DEFAULT_PAGE_SIZE, paginate};

use super::CommandResult;

/// List one page of products, optionally narrowed by category or search.
///
/// # Errors
///
/// Returns an error if the simulated request is cancelled.
pub async fn list(
    market: &Marketplace,
    category: Option<String>,
    search: Option<String>,
    page: usize,
) -> CommandResult {
    let cancel = CancellationToken::new();
    let api = market.api();

    let products: Vec<Product> = match (category, search) {
        (_, Some(query)) => api.search_products(&query, &cancel).await?,
        (Some(category), None) => api.get_products_by_category(&category, &cancel).await?,
        (None, None) => api.get_products(&cancel).await?,
    };

    let page = paginate(&products, page, DEFAULT_PAGE_SIZE);
    info!(
        "Page {} of {} ({} products)",
        page.page, page.total_pages, page.total_items
    );
    for product in &page.items {
        let stock = if product.in_stock {
            format!("{} in stock", product.stock)
        } else {
            "sold out".to_string()
        };
        info!(
            "[{}] {} - {} ({}, {})",
            product.id, product.name, product.price, product.category, stock
        );
    }
    Ok(())
}
