//! Filter, sort and paginate a record set.
//!
//! Everything here is pure: the same records and [`ViewQuery`] always
//! produce the same [`PageView`]. Sorting is stable, so ties keep their
//! original relative order and re-sorting sorted data is a no-op.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::{Filters, News, Record, SortField, SortOrder, SortSpec, Stock};

/// Value a record exposes for a sortable column.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    /// `None` is unknown; it orders as zero
    Number(Option<f64>),
}

impl FieldValue<'_> {
    fn number(&self) -> f64 {
        match self {
            FieldValue::Number(n) => n.unwrap_or(0.0),
            FieldValue::Text(_) => 0.0,
        }
    }
}

/// A record the pipeline can key, filter and order.
pub trait Sortable {
    fn key(&self) -> &str;

    fn field_value(&self, field: SortField) -> FieldValue<'_>;
}

impl<T: Sortable + ?Sized> Sortable for &T {
    fn key(&self) -> &str {
        (**self).key()
    }

    fn field_value(&self, field: SortField) -> FieldValue<'_> {
        (**self).field_value(field)
    }
}

impl Sortable for Stock {
    fn key(&self) -> &str {
        &self.code
    }

    fn field_value(&self, field: SortField) -> FieldValue<'_> {
        let n = match field {
            SortField::Name => return FieldValue::Text(&self.name),
            SortField::CurrentPrice => self.current_price.map(|v| v as f64),
            SortField::ChangeRate => self.change_rate_percent(),
            SortField::Volume => self.volume.map(|v| v as f64),
            SortField::TradeAmount => Some(self.trade_amount() as f64),
            SortField::MarketCap => self.market_cap.map(|v| v as f64),
            SortField::ForeignRatio => self.foreign_ratio,
            SortField::Per => self.per,
            SortField::Roe => self.roe,
            SortField::PubDate | SortField::Score => None,
        };
        FieldValue::Number(n)
    }
}

impl Sortable for News {
    fn key(&self) -> &str {
        News::key(self)
    }

    fn field_value(&self, field: SortField) -> FieldValue<'_> {
        let n = match field {
            SortField::Name => return FieldValue::Text(&self.title),
            SortField::PubDate => self.published_at().map(|d| d.timestamp_millis() as f64),
            SortField::Score => self.score,
            _ => None,
        };
        FieldValue::Number(n)
    }
}

impl Sortable for Record {
    fn key(&self) -> &str {
        Record::key(self)
    }

    fn field_value(&self, field: SortField) -> FieldValue<'_> {
        match self {
            Record::Stock(s) => s.field_value(field),
            Record::News(n) => n.field_value(field),
        }
    }
}

/// Parameters of one pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct ViewQuery<'a> {
    pub filters: Filters,
    /// Keep only these keys when set
    pub favorites_only: Option<&'a HashSet<String>>,
    pub sort: Option<SortSpec>,
    pub page: usize,
    pub page_size: usize,
}

/// Visible slice of a filtered, sorted record set.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<R> {
    pub visible: Vec<R>,
    pub page: usize,
    pub total_pages: usize,
    /// Records left after filtering
    pub total_count: usize,
}

impl<R> Default for PageView<R> {
    fn default() -> Self {
        Self {
            visible: Vec::new(),
            page: 0,
            total_pages: 0,
            total_count: 0,
        }
    }
}

/// Favorites predicate first, then volume and market-cap minimums.
pub fn filter_records<R: Sortable + Clone>(
    records: &[R],
    filters: &Filters,
    favorites_only: Option<&HashSet<String>>,
) -> Vec<R> {
    records
        .iter()
        .filter(|r| favorites_only.is_none_or(|favs| favs.contains(r.key())))
        .filter(|r| meets_min(*r, SortField::Volume, filters.volume_min))
        .filter(|r| meets_min(*r, SortField::MarketCap, filters.market_cap_min))
        .cloned()
        .collect()
}

fn meets_min<R: Sortable>(record: &R, field: SortField, min: Option<i64>) -> bool {
    match min {
        Some(min) => record.field_value(field).number() >= min as f64,
        None => true,
    }
}

/// Compare two records on one field, ascending.
pub fn compare_field<R: Sortable>(a: &R, b: &R, field: SortField) -> Ordering {
    match (a.field_value(field), b.field_value(field)) {
        (FieldValue::Text(x), FieldValue::Text(y)) => compare_text(x, y),
        (x, y) => x.number().total_cmp(&y.number()),
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Stable in-place sort.
pub fn sort_records<R: Sortable>(records: &mut [R], spec: SortSpec) {
    records.sort_by(|a, b| {
        let ord = compare_field(a, b, spec.field);
        match spec.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

/// `ceil(count / page_size)`; zero records means zero pages.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// Whether `page` lies in `[0, total_pages)`.
pub fn page_in_range(page: usize, total_pages: usize) -> bool {
    page < total_pages
}

/// Slice out one page. An out-of-range page yields nothing.
pub fn paginate<R: Clone>(records: &[R], page: usize, page_size: usize) -> Vec<R> {
    if page_size == 0 {
        return Vec::new();
    }
    records
        .iter()
        .skip(page.saturating_mul(page_size))
        .take(page_size)
        .cloned()
        .collect()
}

/// records → filtered → sorted → paginated.
pub fn apply<R: Sortable + Clone>(records: &[R], query: &ViewQuery<'_>) -> PageView<R> {
    let mut filtered = filter_records(records, &query.filters, query.favorites_only);
    if let Some(spec) = query.sort {
        sort_records(&mut filtered, spec);
    }

    let total_count = filtered.len();
    let total_pages = total_pages(total_count, query.page_size);
    PageView {
        visible: paginate(&filtered, query.page, query.page_size),
        page: query.page,
        total_pages,
        total_count,
    }
}
