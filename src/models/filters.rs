use serde::Serialize;

use crate::validator::{permitted_value, Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection{
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Pagination and ordering for a list query.
#[derive(Debug, Clone)]
pub struct Filters{
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
    pub sort_safelist: &'static [&'static str],
}

impl Filters {
    /// Column to order by, without the descending marker.
    ///
    /// Panics when the sort key is not in the safelist. `validate_filters`
    /// rejects such keys, so reaching this with one is a bug in the caller.
    pub fn sort_column(&self) -> &str {
        if !permitted_value(&self.sort.as_str(), self.sort_safelist) {
            panic!("unsafe sort parameter: {}", self.sort);
        }

        self.sort.trim_start_matches('-')
    }

    pub fn sort_direction(&self) -> SortDirection {
        if self.sort.starts_with('-') {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

pub fn validate_filters(v: &mut Validator, filters: &Filters) {
    v.check(filters.page > 0, "page", "must be greater than zero");
    v.check(filters.page <= 10_000_000, "page", "must be a maximum of 10 million");
    v.check(filters.page_size > 0, "page_size", "must be greater than zero");
    v.check(filters.page_size <= 100, "page_size", "must be a maximum of 100");

    v.check(permitted_value(&filters.sort.as_str(), filters.sort_safelist), "sort", "invalid sort value");
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata{
    #[serde(skip_serializing_if = "is_zero")]
    pub current_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub page_size: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub first_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub last_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub total_records: i64,
}

pub fn calculate_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records == 0 || page_size < 1 {
        return Metadata::default();
    }

    Metadata{
        current_page: page,
        page_size,
        first_page: 1,
        last_page: (total_records + page_size - 1) / page_size,
        total_records,
    }
}
