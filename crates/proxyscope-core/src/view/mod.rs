//! Derived view engine: country block, status filter, response-time sort and
//! filter counts over an immutable proxy snapshot.
//!
//! # Design
//! - Every step is a pure function over borrowed records; the snapshot is
//!   never mutated and rows are cloned only once at the end.
//! - Counts come from the post-block, pre-filter list.
//! - [`ViewCache`] re-derives only when one of its inputs changed.

pub mod display;

use std::cmp::Ordering;

use crate::model::ProxyRecord;
use crate::settings::BlockList;

/// Status filter selected in the table header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProxyFilter {
    /// Keep every record.
    #[default]
    All,
    /// Keep records that passed validation.
    Valid,
    /// Keep records that failed validation.
    Invalid,
}

impl ProxyFilter {
    /// Every filter in button order.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::All, Self::Valid, Self::Invalid]
    }

    /// Whether `record` passes this filter.
    #[must_use]
    pub const fn matches(self, record: &ProxyRecord) -> bool {
        match self {
            Self::All => true,
            Self::Valid => record.is_valid,
            Self::Invalid => !record.is_valid,
        }
    }

    /// Button caption without the count.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Valid => "Valid",
            Self::Invalid => "Invalid",
        }
    }
}

/// Response-time ordering selected in the table header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Snapshot order.
    #[default]
    None,
    /// Fastest first.
    ResponseTimeAsc,
    /// Slowest first.
    ResponseTimeDesc,
}

impl SortOrder {
    /// Next state of the sort toggle: none, ascending, descending, none.
    #[must_use]
    pub const fn cycle(self) -> Self {
        match self {
            Self::None => Self::ResponseTimeAsc,
            Self::ResponseTimeAsc => Self::ResponseTimeDesc,
            Self::ResponseTimeDesc => Self::None,
        }
    }

    /// Caption of the sort toggle.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "Sort by Speed",
            Self::ResponseTimeAsc => "Speed (Fastest)",
            Self::ResponseTimeDesc => "Speed (Slowest)",
        }
    }
}

/// Transient table controls. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FilterSortState {
    /// Status filter.
    pub filter: ProxyFilter,
    /// Response-time ordering.
    pub sort: SortOrder,
}

/// Button counts computed after the country block, before the status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterCounts {
    /// Records surviving the country block.
    pub all: usize,
    /// Of those, valid records.
    pub valid: usize,
    /// Of those, invalid records.
    pub invalid: usize,
}

impl FilterCounts {
    /// Count for a given filter button.
    #[must_use]
    pub const fn for_filter(&self, filter: ProxyFilter) -> usize {
        match filter {
            ProxyFilter::All => self.all,
            ProxyFilter::Valid => self.valid,
            ProxyFilter::Invalid => self.invalid,
        }
    }
}

/// Output of one derivation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DerivedView {
    /// Filtered and sorted records.
    pub rows: Vec<ProxyRecord>,
    /// Filter button counts.
    pub counts: FilterCounts,
}

/// Drop records whose country is blocked. Records without a country pass.
#[must_use]
pub fn country_block<'a>(
    proxies: &'a [ProxyRecord],
    blocklist: &BlockList,
) -> Vec<&'a ProxyRecord> {
    if blocklist.is_empty() {
        return proxies.iter().collect();
    }
    proxies
        .iter()
        .filter(|record| {
            record
                .country_key()
                .is_none_or(|country| !blocklist.contains(&country))
        })
        .collect()
}

/// Keep records matching `filter`.
#[must_use]
pub fn apply_filter<'a>(records: &[&'a ProxyRecord], filter: ProxyFilter) -> Vec<&'a ProxyRecord> {
    records
        .iter()
        .copied()
        .filter(|record| filter.matches(record))
        .collect()
}

/// Stable sort by response time. Unmeasured records sink to the end in both
/// directions; equal times keep their relative order.
pub fn sort_by_response_time(records: &mut [&ProxyRecord], order: SortOrder) {
    if order == SortOrder::None {
        return;
    }
    records.sort_by(|a, b| compare_response_time(a.response_time_ms, b.response_time_ms, order));
}

fn compare_response_time(a: Option<f64>, b: Option<f64>, order: SortOrder) -> Ordering {
    let a = a.filter(|value| value.is_finite());
    let b = b.filter(|value| value.is_finite());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(left), Some(right)) => {
            let ordering = left.total_cmp(&right);
            if order == SortOrder::ResponseTimeDesc {
                ordering.reverse()
            } else {
                ordering
            }
        }
    }
}

/// Count valid and invalid records.
#[must_use]
pub fn count_filters(records: &[&ProxyRecord]) -> FilterCounts {
    let valid = records.iter().filter(|record| record.is_valid).count();
    FilterCounts {
        all: records.len(),
        valid,
        invalid: records.len() - valid,
    }
}

/// Run the whole pipeline.
#[must_use]
pub fn derive_view(
    proxies: &[ProxyRecord],
    blocklist: &BlockList,
    state: FilterSortState,
) -> DerivedView {
    let unblocked = country_block(proxies, blocklist);
    let counts = count_filters(&unblocked);
    let mut rows = apply_filter(&unblocked, state.filter);
    sort_by_response_time(&mut rows, state.sort);
    DerivedView {
        rows: rows.into_iter().cloned().collect(),
        counts,
    }
}

#[derive(Debug, Clone, PartialEq)]
struct CacheKey {
    revision: u64,
    blocklist: BlockList,
    state: FilterSortState,
}

/// Memoised [`derive_view`] keyed on snapshot revision, blocklist and
/// filter/sort state.
#[derive(Debug, Default)]
pub struct ViewCache {
    key: Option<CacheKey>,
    view: DerivedView,
    derivations: u64,
}

impl ViewCache {
    /// Cached view for the inputs, deriving it first when any input changed.
    pub fn get_or_derive(
        &mut self,
        revision: u64,
        proxies: &[ProxyRecord],
        blocklist: &BlockList,
        state: FilterSortState,
    ) -> &DerivedView {
        let fresh = self.key.as_ref().is_some_and(|key| {
            key.revision == revision && key.state == state && key.blocklist == *blocklist
        });
        if !fresh {
            self.view = derive_view(proxies, blocklist, state);
            self.key = Some(CacheKey {
                revision,
                blocklist: blocklist.clone(),
                state,
            });
            self.derivations += 1;
        }
        &self.view
    }

    /// Number of times the pipeline actually ran.
    #[must_use]
    pub const fn derivations(&self) -> u64 {
        self.derivations
    }
}
