use std::collections::BTreeMap;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity of one list query. Any change to it means a different fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    pub resource: &'static str,
    pub page: u32,
    pub limit: u32,
    /// The debounced search text, never the raw input.
    pub search: String,
    pub filters: BTreeMap<String, String>,
}

impl QueryKey {
    pub fn new(resource: &'static str, page: u32, limit: u32) -> Self {
        Self {
            resource,
            page,
            limit,
            search: String::new(),
            filters: BTreeMap::new(),
        }
    }

    /// Query-string pairs: `page`, `limit`, `search` when present, then filters.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        let search = self.search.trim();
        if !search.is_empty() {
            pairs.push(("search".to_string(), search.to_string()));
        }
        pairs.extend(
            self.filters
                .iter()
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        pairs
    }

    fn offset(&self) -> usize {
        (self.page.max(1) as usize - 1) * self.limit as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl PageInfo {
    pub fn new(total: u64, page: u32, limit: u32) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit)) as u32
        };
        Self {
            total,
            page,
            limit,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Cuts one page out of a fully materialised collection.
    pub fn paginate(all: Vec<T>, key: &QueryKey) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(key.offset())
            .take(key.limit as usize)
            .collect();
        Self {
            items,
            info: PageInfo::new(total, key.page, key.limit),
        }
    }
}

const ITEM_KEYS: &[&str] = &["items", "docs", "results", "rows", "records"];
const TOTAL_KEYS: &[&str] = &["total", "totalItems", "totalDocs", "totalCount", "count"];

impl<T: DeserializeOwned> Page<T> {
    /// Reads a list response in any of the shapes the backend uses:
    /// a bare array, `{ data: [...], pagination }`, or
    /// `{ data: { <items|docs|resource>: [...], total, totalPages } }`.
    pub fn from_response(body: Value, key: &QueryKey) -> Result<Self, serde_json::Error> {
        let (items, meta) = match body {
            Value::Array(items) => (items, Map::new()),
            Value::Object(mut outer) => match outer.remove("data") {
                Some(Value::Array(items)) => (items, pagination_meta(outer)),
                Some(Value::Object(inner)) => split_object(inner, key.resource),
                Some(_) | None => split_object(outer, key.resource),
            },
            _ => (Vec::new(), Map::new()),
        };

        let total = TOTAL_KEYS
            .iter()
            .find_map(|k| meta.get(*k).and_then(Value::as_u64))
            .unwrap_or(items.len() as u64);
        let page = read_u32(&meta, &["page", "currentPage"]).unwrap_or(key.page);
        let limit = read_u32(&meta, &["limit", "pageSize", "perPage"]).unwrap_or(key.limit);

        let mut info = PageInfo::new(total, page, limit);
        if let Some(total_pages) = read_u32(&meta, &["totalPages", "pages"]) {
            info.total_pages = total_pages;
        }

        let items = items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()?;

        Ok(Self { items, info })
    }
}

fn split_object(mut obj: Map<String, Value>, resource: &str) -> (Vec<Value>, Map<String, Value>) {
    let items = ITEM_KEYS
        .iter()
        .copied()
        .chain(std::iter::once(resource))
        .find_map(|k| match obj.remove(k) {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        })
        .unwrap_or_default();
    (items, pagination_meta(obj))
}

/// Flattens a nested `pagination`/`meta` object over the top-level fields.
fn pagination_meta(mut obj: Map<String, Value>) -> Map<String, Value> {
    for nested in ["pagination", "meta"] {
        if let Some(Value::Object(inner)) = obj.remove(nested) {
            obj.extend(inner);
        }
    }
    obj
}

fn read_u32(meta: &Map<String, Value>, keys: &[&str]) -> Option<u32> {
    keys.iter()
        .find_map(|k| meta.get(*k).and_then(Value::as_u64))
        .map(|n| n.min(u64::from(u32::MAX)) as u32)
}
