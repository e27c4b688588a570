use crate::options::Positioning;

/// Position of a page within the full result set.
///
/// Query pages and array pages both build this record with
/// [`PageMeta::compute`], so the two produce the same shape. Output names are
/// only chosen when the page is serialized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub total_docs: u64,
    /// Present in offset mode and when no position was requested.
    pub offset: Option<u64>,
    pub limit: u64,
    pub total_pages: Option<u64>,
    pub page: Option<u64>,
    /// 1-based ordinal of the first document on the page.
    pub paging_counter: Option<u64>,
    pub prev_page: Option<u64>,
    pub next_page: Option<u64>,
    pub has_prev_page: bool,
    pub has_next_page: bool,
}

impl PageMeta {
    pub fn compute(total_docs: u64, limit: u64, positioning: Positioning, pagination: bool) -> Self {
        let offset = positioning.offset();

        if limit == 0 {
            return Self {
                total_docs,
                offset,
                ..Self::default()
            };
        }

        let page = positioning.page(limit);
        let paging_counter = page.saturating_sub(1).saturating_mul(limit).saturating_add(1);

        let mut meta = Self {
            total_docs,
            offset,
            limit: total_docs,
            total_pages: Some(1),
            page: Some(page),
            paging_counter: Some(paging_counter),
            ..Self::default()
        };

        if !pagination {
            return meta;
        }

        let total_pages = total_docs.div_ceil(limit).max(1);

        meta.limit = limit;
        meta.total_pages = Some(total_pages);

        if page > 1 {
            meta.has_prev_page = true;
            meta.prev_page = Some(page - 1);
        } else if offset.is_some_and(|offset| offset > 0) {
            // Offset inside the first page: there are records before it.
            meta.has_prev_page = true;
            meta.prev_page = Some(1);
        }

        if page < total_pages {
            meta.has_next_page = true;
            meta.next_page = Some(page + 1);
        }

        meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_page() {
        let meta = PageMeta::compute(110, 10, Positioning::Page(5), true);

        assert_eq!(meta.total_docs, 110);
        assert_eq!(meta.offset, None);
        assert_eq!(meta.limit, 10);
        assert_eq!(meta.total_pages, Some(11));
        assert_eq!(meta.page, Some(5));
        assert_eq!(meta.paging_counter, Some(41));
        assert_eq!(meta.prev_page, Some(4));
        assert_eq!(meta.next_page, Some(6));
        assert!(meta.has_prev_page);
        assert!(meta.has_next_page);
    }

    #[test]
    fn first_page() {
        let meta = PageMeta::compute(110, 10, Positioning::Page(1), true);

        assert_eq!(meta.paging_counter, Some(1));
        assert_eq!(meta.prev_page, None);
        assert!(!meta.has_prev_page);
        assert_eq!(meta.next_page, Some(2));
    }

    #[test]
    fn last_page() {
        let meta = PageMeta::compute(110, 10, Positioning::Page(11), true);

        assert_eq!(meta.prev_page, Some(10));
        assert_eq!(meta.next_page, None);
        assert!(!meta.has_next_page);
    }

    #[test]
    fn page_past_the_end() {
        let meta = PageMeta::compute(5, 10, Positioning::Page(3), true);

        assert_eq!(meta.total_pages, Some(1));
        assert_eq!(meta.prev_page, Some(2));
        assert!(!meta.has_next_page);
    }

    #[test]
    fn total_pages_rounds_up_and_is_at_least_one() {
        for (total, limit, pages) in [(0, 10, 1), (1, 10, 1), (10, 10, 1), (11, 10, 2), (26, 10, 3)] {
            let meta = PageMeta::compute(total, limit, Positioning::Default, true);
            assert_eq!(meta.total_pages, Some(pages), "{total} docs by {limit}");
        }
    }

    #[test]
    fn offset_mode_computes_equivalent_page() {
        let meta = PageMeta::compute(110, 10, Positioning::Offset(40), true);

        assert_eq!(meta.offset, Some(40));
        assert_eq!(meta.page, Some(5));
        assert_eq!(meta.paging_counter, Some(41));
        assert_eq!(meta.prev_page, Some(4));
        assert_eq!(meta.next_page, Some(6));
    }

    #[test]
    fn offset_inside_first_page_has_previous() {
        let meta = PageMeta::compute(110, 10, Positioning::Offset(5), true);

        assert_eq!(meta.page, Some(1));
        assert!(meta.has_prev_page);
        assert_eq!(meta.prev_page, Some(1));
        assert_eq!(meta.next_page, Some(2));
    }

    #[test]
    fn default_positioning_reports_zero_offset() {
        let meta = PageMeta::compute(3, 10, Positioning::Default, true);

        assert_eq!(meta.offset, Some(0));
        assert_eq!(meta.page, Some(1));
        assert!(!meta.has_prev_page);
        assert!(!meta.has_next_page);
    }

    #[test]
    fn zero_limit_reports_totals_only() {
        let meta = PageMeta::compute(14, 0, Positioning::Page(3), true);

        assert_eq!(
            meta,
            PageMeta {
                total_docs: 14,
                ..PageMeta::default()
            }
        );
    }

    #[test]
    fn disabled_pagination_reports_everything_as_one_page() {
        let meta = PageMeta::compute(110, 10, Positioning::Default, false);

        assert_eq!(meta.limit, 110);
        assert_eq!(meta.total_pages, Some(1));
        assert_eq!(meta.page, Some(1));
        assert_eq!(meta.paging_counter, Some(1));
        assert_eq!(meta.prev_page, None);
        assert_eq!(meta.next_page, None);
        assert!(!meta.has_prev_page);
        assert!(!meta.has_next_page);
    }
}
