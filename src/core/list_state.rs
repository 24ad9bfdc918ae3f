use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// 列表頁的篩選與分頁狀態
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub filters: BTreeMap<String, String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            search: None,
            sort_by: None,
            sort_order: None,
            filters: BTreeMap::new(),
        }
    }
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// 變更搜尋字串會回到第一頁
    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = if term.trim().is_empty() {
            None
        } else {
            Some(term.trim().to_string())
        };
        self.reset_page();
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = Some(order);
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.filters.insert(key.into(), value.to_string());
        self.reset_page();
        self
    }

    pub fn remove_filter(&mut self, key: &str) {
        if self.filters.remove(key).is_some() {
            self.reset_page();
        }
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.search = None;
        self.reset_page();
    }

    pub fn next_page(&mut self) {
        self.page += 1;
    }

    pub fn previous_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    pub fn reset_page(&mut self) {
        self.page = DEFAULT_PAGE;
    }

    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];

        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sortBy".to_string(), sort_by.clone()));
        }
        if let Some(order) = &self.sort_order {
            pairs.push(("sortOrder".to_string(), order.as_str().to_string()));
        }
        for (key, value) in &self.filters {
            pairs.push((key.clone(), value.clone()));
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let query = ListQuery::new();
        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("page".to_string(), "1".to_string()),
                ("limit".to_string(), "10".to_string())
            ]
        );
    }

    #[test]
    fn test_filters_reset_page() {
        let mut query = ListQuery::new().page(4).filter("city", "Lisbon");
        assert_eq!(query.page, 1);

        query.next_page();
        query.next_page();
        assert_eq!(query.page, 3);

        query.remove_filter("city");
        assert_eq!(query.page, 1);

        // 移除不存在的篩選不影響頁碼
        query.next_page();
        query.remove_filter("bedrooms");
        assert_eq!(query.page, 2);
    }

    #[test]
    fn test_previous_page_never_below_one() {
        let mut query = ListQuery::new();
        query.previous_page();
        assert_eq!(query.page, 1);
    }

    #[test]
    fn test_query_pairs_include_everything() {
        let query = ListQuery::new()
            .limit(25)
            .search("  garden  ")
            .sort("price", SortOrder::Desc)
            .filter("minPrice", 500)
            .filter("city", "Porto");

        let pairs = query.to_query_pairs();
        assert!(pairs.contains(&("limit".to_string(), "25".to_string())));
        assert!(pairs.contains(&("search".to_string(), "garden".to_string())));
        assert!(pairs.contains(&("sortBy".to_string(), "price".to_string())));
        assert!(pairs.contains(&("sortOrder".to_string(), "desc".to_string())));
        assert!(pairs.contains(&("minPrice".to_string(), "500".to_string())));
        assert!(pairs.contains(&("city".to_string(), "Porto".to_string())));
    }

    #[test]
    fn test_blank_search_is_dropped() {
        let query = ListQuery::new().search("   ");
        assert!(query.search.is_none());
    }
}
