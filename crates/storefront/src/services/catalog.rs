//! Read-only product catalog.
//!
//! Products are reference data: the catalog is built once from the seed
//! fixture and never mutated by the stores.

use campus_market_core::{Naira, ProductId, ShopId};

use crate::models::Product;

/// Products shown per catalog page.
pub const DEFAULT_PAGE_SIZE: usize = 12;
/// Products shown in a "you may also like" strip.
pub const RECOMMENDATION_LIMIT: usize = 6;
/// Category name that matches every product.
pub const ALL_CATEGORIES: &str = "all";

/// Narrowing options for a catalog listing. Empty fields don't filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub min_price: Option<Naira>,
    pub max_price: Option<Naira>,
    pub only_new: bool,
    pub only_discounted: bool,
}

impl ProductFilter {
    /// Whether `product` passes every set criterion.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .is_none_or(|c| c == ALL_CATEGORIES || product.category.eq_ignore_ascii_case(c));
        let min_ok = self.min_price.is_none_or(|min| product.price >= min);
        let max_ok = self.max_price.is_none_or(|max| product.price <= max);

        category_ok
            && min_ok
            && max_ok
            && (!self.only_new || product.is_new)
            && (!self.only_discounted || product.is_discounted())
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually returned.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Split `items` into pages of `per_page` and return page `page` (1-based).
///
/// Out-of-range pages are clamped to the last page; `per_page == 0` is
/// treated as [`DEFAULT_PAGE_SIZE`].
#[must_use]
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = if per_page == 0 { DEFAULT_PAGE_SIZE } else { per_page };
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    Page {
        items: items
            .iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .cloned()
            .collect(),
        page,
        total_pages,
        total_items,
    }
}

/// The product catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog from a product list.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Every product, in catalog order.
    #[must_use]
    pub fn list(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Products in `category`; `"all"` returns everything.
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<Product> {
        self.filter(&ProductFilter {
            category: Some(category.to_owned()),
            ..ProductFilter::default()
        })
    }

    /// Case-insensitive match on name or category.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<Product> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.products.clone();
        }
        self.products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&query) || p.category.to_lowercase().contains(&query)
            })
            .cloned()
            .collect()
    }

    /// Up to six other products, preferring the same category as `current`.
    #[must_use]
    pub fn recommendations(&self, current: Option<&ProductId>) -> Vec<Product> {
        let category = current
            .and_then(|id| self.get(id))
            .map(|p| p.category.clone());
        let mut picks: Vec<Product> = self
            .products
            .iter()
            .filter(|p| Some(&p.id) != current)
            .cloned()
            .collect();
        if let Some(category) = category {
            // stable: keeps catalog order within each group
            picks.sort_by_key(|p| p.category != category);
        }
        picks.truncate(RECOMMENDATION_LIMIT);
        picks
    }

    /// Discounted or new products.
    #[must_use]
    pub fn deals(&self) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| p.is_discounted() || p.is_new)
            .cloned()
            .collect()
    }

    /// Products passing `filter`.
    #[must_use]
    pub fn filter(&self, filter: &ProductFilter) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect()
    }

    /// Products sold by `shop`.
    #[must_use]
    pub fn by_shop(&self, shop: &ShopId) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| &p.shop_id == shop)
            .cloned()
            .collect()
    }

    /// Distinct categories, in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for product in &self.products {
            if !seen.contains(&product.category.as_str()) {
                seen.push(&product.category);
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::fixtures::product;

    fn catalog() -> Catalog {
        let mut headphones = product("1", "s001", 35_000, 15);
        headphones.name = "Wireless Headphones Pro".to_string();
        headphones.discount = Some(30);
        headphones.is_new = true;

        let mut lamp = product("2", "s001", 12_000, 25);
        lamp.name = "Study Lamp LED".to_string();

        let mut textbook = product("4", "s002", 18_000, 30);
        textbook.name = "Calculus Textbook".to_string();
        textbook.category = "books".to_string();

        let mut mat = product("6", "s004", 11_000, 20);
        mat.name = "Yoga Mat".to_string();
        mat.category = "sports".to_string();
        mat.is_new = true;

        Catalog::new(vec![headphones, lamp, textbook, mat])
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_get() {
        let catalog = catalog();
        assert_eq!(
            catalog.get(&ProductId::new("4")).map(|p| p.name.as_str()),
            Some("Calculus Textbook")
        );
        assert!(catalog.get(&ProductId::new("99")).is_none());
    }

    #[test]
    fn test_by_category_all() {
        let catalog = catalog();
        assert_eq!(catalog.by_category("all").len(), 4);
        assert_eq!(ids(&catalog.by_category("books")), vec!["4"]);
        assert_eq!(ids(&catalog.by_category("Electronics")), vec!["1", "2"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let catalog = catalog();
        assert_eq!(ids(&catalog.search("LAMP")), vec!["2"]);
        assert_eq!(ids(&catalog.search("sport")), vec!["6"]);
        assert!(catalog.search("bicycle").is_empty());
        assert_eq!(catalog.search("  ").len(), 4);
    }

    #[test]
    fn test_recommendations_exclude_current_and_prefer_category() {
        let catalog = catalog();
        let picks = catalog.recommendations(Some(&ProductId::new("2")));
        assert_eq!(ids(&picks), vec!["1", "4", "6"]);
        assert_eq!(catalog.recommendations(None).len(), 4);
    }

    #[test]
    fn test_deals() {
        assert_eq!(ids(&catalog().deals()), vec!["1", "6"]);
    }

    #[test]
    fn test_filter_price_range() {
        let filter = ProductFilter {
            min_price: Some(Naira::new(12_000)),
            max_price: Some(Naira::new(20_000)),
            ..ProductFilter::default()
        };
        assert_eq!(ids(&catalog().filter(&filter)), vec!["2", "4"]);

        let filter = ProductFilter {
            only_new: true,
            only_discounted: true,
            ..ProductFilter::default()
        };
        assert_eq!(ids(&catalog().filter(&filter)), vec!["1"]);
    }

    #[test]
    fn test_by_shop_and_categories() {
        let catalog = catalog();
        assert_eq!(ids(&catalog.by_shop(&ShopId::new("s001"))), vec!["1", "2"]);
        assert_eq!(catalog.categories(), vec!["electronics", "books", "sports"]);
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=25).collect();
        let page = paginate(&items, 3, 12);
        assert_eq!(page.items, vec![25]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 25);

        let clamped = paginate(&items, 99, 12);
        assert_eq!(clamped.page, 3);

        let empty: Page<u32> = paginate(&[], 1, 12);
        assert_eq!(empty.total_pages, 1);
        assert!(empty.items.is_empty());

        assert_eq!(paginate(&items, 0, 0).items.len(), DEFAULT_PAGE_SIZE);
    }
}
