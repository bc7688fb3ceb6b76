//! Pure record pipeline: filter, sort, paginate.

pub mod sort_filter;

pub use sort_filter::{
    FieldValue, PageView, Sortable, ViewQuery, apply, filter_records, page_in_range, paginate,
    sort_records, total_pages,
};
