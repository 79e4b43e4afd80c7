//! Digg-style page-window pagination.
//!
//! Given a total item count and a page size, [`Paginator`] produces the item
//! slice for a requested page together with a bounded set of page numbers for
//! a pagination control: a run of pages around the current page, optional
//! leading/trailing runs, and gap markers for skipped ranges. The computation
//! is pure and O(window size), independent of the collection size.

use serde::Serialize;

/// Counts controlling how many page numbers stay visible in the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    /// Pages always shown at the start of the range.
    pub leading: usize,
    /// Pages always shown at the end of the range.
    pub trailing: usize,
    /// Pages shown adjacent to the current page (the current page itself is
    /// always shown, so the body run spans `body + 1` entries).
    pub body: usize,
    /// Minimum skipped-run length below which the runs merge instead of
    /// displaying a gap marker.
    pub margin: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            leading: 0,
            trailing: 0,
            body: 8,
            margin: 2,
        }
    }
}

/// One bounded slice of a larger ordered collection, plus navigation metadata.
///
/// `start..end` are offsets into the source collection. Pages are built per
/// request and immutable once returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub number: usize,
    pub start: usize,
    pub end: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl Page {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A single slot in the pagination control: a concrete page number or a gap
/// standing in for at least one skipped page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PageEntry {
    Number(usize),
    Gap,
}

/// Ordered page-number entries and gap markers for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PageRange(Vec<PageEntry>);

impl PageRange {
    pub fn entries(&self) -> &[PageEntry] {
        &self.0
    }

    pub fn numbers(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().filter_map(|entry| match entry {
            PageEntry::Number(number) => Some(*number),
            PageEntry::Gap => None,
        })
    }
}

impl<'a> IntoIterator for &'a PageRange {
    type Item = &'a PageEntry;
    type IntoIter = std::slice::Iter<'a, PageEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Backing-store seam: the paginator only needs a count and a slice.
pub trait Source {
    type Item;

    fn count(&self) -> usize;
    fn slice(&self, start: usize, end: usize) -> Vec<Self::Item>;
}

impl<T: Clone> Source for [T] {
    type Item = T;

    fn count(&self) -> usize {
        self.len()
    }

    fn slice(&self, start: usize, end: usize) -> Vec<T> {
        let end = end.min(self.len());
        let start = start.min(end);
        self[start..end].to_vec()
    }
}

impl<T: Clone> Source for Vec<T> {
    type Item = T;

    fn count(&self) -> usize {
        self.len()
    }

    fn slice(&self, start: usize, end: usize) -> Vec<T> {
        self.as_slice().slice(start, end)
    }
}

/// Construction-time configuration failure. Window counts are unsigned, so a
/// zero page size is the only invalid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PaginatorConfigError {
    #[error("page size must be at least 1")]
    ZeroPageSize,
}

/// Recoverable out-of-range request; callers map it to a not-found response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("page {requested} is out of range 1..={page_count}")]
pub struct PageOutOfRange {
    pub requested: usize,
    pub page_count: usize,
}

/// Windowed paginator over a counted collection.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    total_count: usize,
    page_size: usize,
    window: WindowConfig,
}

impl Paginator {
    pub fn new(
        total_count: usize,
        page_size: usize,
        window: WindowConfig,
    ) -> Result<Self, PaginatorConfigError> {
        if page_size == 0 {
            return Err(PaginatorConfigError::ZeroPageSize);
        }

        Ok(Self {
            total_count,
            page_size,
            window,
        })
    }

    pub fn for_source<S: Source + ?Sized>(
        source: &S,
        page_size: usize,
        window: WindowConfig,
    ) -> Result<Self, PaginatorConfigError> {
        Self::new(source.count(), page_size, window)
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages, never less than 1: an empty collection still has a
    /// single empty page.
    pub fn page_count(&self) -> usize {
        if self.total_count == 0 {
            1
        } else {
            (self.total_count + self.page_size - 1) / self.page_size
        }
    }

    pub fn page(&self, number: usize) -> Result<Page, PageOutOfRange> {
        let page_count = self.check_range(number)?;
        let start = (number - 1) * self.page_size;
        let end = (start + self.page_size).min(self.total_count);

        Ok(Page {
            number,
            start,
            end,
            has_previous: number > 1,
            has_next: number < page_count,
        })
    }

    /// Build the display window for `number`: anchor runs at page 1 and the
    /// last page, the configured leading/trailing runs, and a body run
    /// centered on the current page. Runs closer together than `margin`
    /// merge; every remaining boundary emits exactly one gap marker.
    pub fn window(&self, number: usize) -> Result<PageRange, PageOutOfRange> {
        let page_count = self.check_range(number)?;
        let config = &self.window;

        let mut runs: Vec<(usize, usize)> = vec![(1, 1), (page_count, page_count)];
        if config.leading > 0 {
            runs.push((1, config.leading.min(page_count)));
        }
        if config.trailing > 0 {
            let start = page_count.saturating_sub(config.trailing - 1).max(1);
            runs.push((start, page_count));
        }

        let body_len = (config.body + 1).min(page_count);
        let mut body_start = number.saturating_sub(config.body / 2).max(1);
        if body_start + body_len - 1 > page_count {
            body_start = page_count - body_len + 1;
        }
        runs.push((body_start, body_start + body_len - 1));

        runs.sort_unstable();

        let mut merged: Vec<(usize, usize)> = Vec::new();
        for (start, end) in runs {
            match merged.last_mut() {
                Some(last) if start <= last.1 + 1 || start - last.1 - 1 < config.margin => {
                    last.1 = last.1.max(end);
                }
                _ => merged.push((start, end)),
            }
        }

        let mut entries = Vec::new();
        for (index, (start, end)) in merged.iter().enumerate() {
            if index > 0 {
                entries.push(PageEntry::Gap);
            }
            entries.extend((*start..=*end).map(PageEntry::Number));
        }

        Ok(PageRange(entries))
    }

    /// The full pagination contract: the requested page and its display
    /// window, or an out-of-range failure with no page produced.
    pub fn paginate(&self, number: usize) -> Result<(Page, PageRange), PageOutOfRange> {
        let page = self.page(number)?;
        let range = self.window(number)?;
        Ok((page, range))
    }

    /// Materialize the items backing `page` from a source.
    pub fn items<S: Source + ?Sized>(&self, source: &S, page: &Page) -> Vec<S::Item> {
        source.slice(page.start, page.end)
    }

    fn check_range(&self, number: usize) -> Result<usize, PageOutOfRange> {
        let page_count = self.page_count();
        if number == 0 || number > page_count {
            return Err(PageOutOfRange {
                requested: number,
                page_count,
            });
        }
        Ok(page_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_config(leading: usize, trailing: usize, body: usize, margin: usize) -> WindowConfig {
        WindowConfig {
            leading,
            trailing,
            body,
            margin,
        }
    }

    fn numbers(range: &PageRange) -> Vec<usize> {
        range.numbers().collect()
    }

    #[test]
    fn page_count_rounds_up_and_never_drops_below_one() {
        let cases = [
            (0usize, 20usize, 1usize),
            (1, 20, 1),
            (20, 20, 1),
            (21, 20, 2),
            (1000, 20, 50),
            (15, 20, 1),
        ];
        for (total, size, expected) in cases {
            let paginator = Paginator::new(total, size, WindowConfig::default())
                .expect("valid page size");
            assert_eq!(paginator.page_count(), expected, "total={total} size={size}");
        }
    }

    #[test]
    fn zero_page_size_is_a_configuration_error() {
        let err = Paginator::new(100, 0, WindowConfig::default()).unwrap_err();
        assert_eq!(err, PaginatorConfigError::ZeroPageSize);
    }

    #[test]
    fn first_page_of_large_collection_matches_expected_window() {
        // 1000 items, 20 per page: 50 pages; body of 8 around page 1 plus the
        // trailing anchor.
        let paginator = Paginator::new(1000, 20, window_config(0, 0, 8, 1)).expect("valid");
        let (page, range) = paginator.paginate(1).expect("page 1 in range");

        assert_eq!(page.start, 0);
        assert_eq!(page.end, 20);
        assert!(!page.has_previous);
        assert!(page.has_next);

        let mut expected: Vec<PageEntry> = (1..=9).map(PageEntry::Number).collect();
        expected.push(PageEntry::Gap);
        expected.push(PageEntry::Number(50));
        assert_eq!(range.entries(), expected.as_slice());
    }

    #[test]
    fn empty_collection_yields_single_empty_page() {
        let paginator = Paginator::new(0, 20, WindowConfig::default()).expect("valid");
        let (page, range) = paginator.paginate(1).expect("page 1 always exists");

        assert_eq!(paginator.page_count(), 1);
        assert_eq!((page.start, page.end), (0, 0));
        assert!(page.is_empty());
        assert!(!page.has_next);
        assert!(!page.has_previous);
        assert_eq!(range.entries(), &[PageEntry::Number(1)]);
    }

    #[test]
    fn page_beyond_range_is_out_of_range_not_clamped() {
        let paginator = Paginator::new(15, 20, WindowConfig::default()).expect("valid");
        let err = paginator.paginate(2).unwrap_err();
        assert_eq!(err.requested, 2);
        assert_eq!(err.page_count, 1);

        let err = paginator.paginate(0).unwrap_err();
        assert_eq!(err.requested, 0);
    }

    #[test]
    fn last_page_holds_the_remainder() {
        let paginator = Paginator::new(45, 20, WindowConfig::default()).expect("valid");
        let last = paginator.page(3).expect("page 3 in range");
        assert_eq!((last.start, last.end), (40, 45));
        assert_eq!(last.len(), 5);
        assert!(!last.has_next);
        assert!(last.has_previous);
    }

    #[test]
    fn single_page_collection_shows_full_window_without_gaps() {
        let paginator = Paginator::new(12, 20, WindowConfig::default()).expect("valid");
        let range = paginator.window(1).expect("in range");
        assert_eq!(range.entries(), &[PageEntry::Number(1)]);
    }

    #[test]
    fn body_run_recenters_near_the_end() {
        let paginator = Paginator::new(1000, 20, window_config(0, 0, 8, 1)).expect("valid");
        let range = paginator.window(50).expect("in range");

        let mut expected = vec![PageEntry::Number(1), PageEntry::Gap];
        expected.extend((42..=50).map(PageEntry::Number));
        assert_eq!(range.entries(), expected.as_slice());
    }

    #[test]
    fn mid_collection_window_keeps_both_anchors() {
        let paginator = Paginator::new(1000, 20, window_config(2, 2, 4, 2)).expect("valid");
        let range = paginator.window(25).expect("in range");

        let mut expected: Vec<PageEntry> = vec![PageEntry::Number(1), PageEntry::Number(2)];
        expected.push(PageEntry::Gap);
        expected.extend((23..=27).map(PageEntry::Number));
        expected.push(PageEntry::Gap);
        expected.push(PageEntry::Number(49));
        expected.push(PageEntry::Number(50));
        assert_eq!(range.entries(), expected.as_slice());
    }

    #[test]
    fn narrow_gaps_merge_into_contiguous_runs() {
        // Body run 3..7 sits one page from the leading anchor and two from the
        // trailing one; with a margin of 3 both skipped runs are listed
        // instead of elided, leaving a single contiguous run.
        let paginator = Paginator::new(200, 20, window_config(0, 0, 4, 3)).expect("valid");
        let range = paginator.window(5).expect("in range");

        let expected: Vec<PageEntry> = (1..=10).map(PageEntry::Number).collect();
        assert_eq!(range.entries(), expected.as_slice());
    }

    #[test]
    fn window_never_repeats_numbers_or_stacks_gaps() {
        for total in [0usize, 5, 95, 200, 1000, 2011] {
            for page_size in [1usize, 7, 20, 25] {
                let paginator =
                    Paginator::new(total, page_size, window_config(2, 2, 6, 2)).expect("valid");
                for number in 1..=paginator.page_count() {
                    let range = paginator.window(number).expect("in range");
                    let concrete = numbers(&range);

                    let mut sorted = concrete.clone();
                    sorted.sort_unstable();
                    sorted.dedup();
                    assert_eq!(concrete, sorted, "strictly increasing, no duplicates");

                    assert_eq!(concrete.first(), Some(&1));
                    assert_eq!(concrete.last(), Some(&paginator.page_count()));
                    assert!(concrete.contains(&number));

                    let entries = range.entries();
                    for pair in entries.windows(2) {
                        assert!(
                            !(pair[0] == PageEntry::Gap && pair[1] == PageEntry::Gap),
                            "no adjacent gap markers"
                        );
                    }
                    assert_ne!(entries.first(), Some(&PageEntry::Gap));
                    assert_ne!(entries.last(), Some(&PageEntry::Gap));

                    // Every gap must hide at least one page.
                    for window in entries.windows(3) {
                        if let [PageEntry::Number(before), PageEntry::Gap, PageEntry::Number(after)] =
                            window
                        {
                            assert!(after - before > 1, "gap hides at least one page");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn slice_lengths_follow_page_size_except_the_last_page() {
        let total = 1013;
        let page_size = 25;
        let paginator = Paginator::new(total, page_size, WindowConfig::default()).expect("valid");
        let page_count = paginator.page_count();

        for number in 1..=page_count {
            let page = paginator.page(number).expect("in range");
            if number < page_count {
                assert_eq!(page.len(), page_size);
            } else {
                assert_eq!(page.len(), total - (page_count - 1) * page_size);
            }
        }
    }

    #[test]
    fn source_seam_materializes_page_items() {
        let items: Vec<u32> = (0..95).collect();
        let paginator =
            Paginator::for_source(&items, 20, WindowConfig::default()).expect("valid");
        let page = paginator.page(5).expect("in range");
        assert_eq!(paginator.items(&items, &page), (80..95).collect::<Vec<u32>>());
    }

    #[test]
    fn page_entries_serialize_as_numbers_and_nulls() {
        let paginator = Paginator::new(1000, 20, window_config(0, 0, 8, 1)).expect("valid");
        let range = paginator.window(1).expect("in range");
        let encoded = serde_json::to_value(&range).expect("serializes");
        assert_eq!(
            encoded,
            serde_json::json!([1, 2, 3, 4, 5, 6, 7, 8, 9, null, 50])
        );
    }
}
