use serde::Serialize;

use crate::criteria::{matches, Criteria};
use crate::error::CoreError;
use crate::record::Record;
use crate::sort::{sort_refs, SortSpec};

/// Recompute `sort(filter(source, criteria), sort)` from scratch.
///
/// Pure and idempotent: identical inputs always yield the same sequence, and
/// nothing is cached between calls.
#[must_use]
pub fn derive_view<'a, R: Record>(
    source: &'a [R],
    criteria: &Criteria,
    sort: Option<&SortSpec>,
) -> Vec<&'a R> {
    let mut visible = source.iter().filter(|record| matches(*record, criteria)).collect::<Vec<_>>();
    if let Some(spec) = sort {
        sort_refs(&mut visible, spec);
    }
    visible
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page<T> {
    /// 1-based index of the returned page.
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items: Vec<T>,
}

/// Slice one page out of an already-derived view.
///
/// Page indexes are 1-based; `0` is treated as the first page and anything past
/// the end clamps to the last page. An empty view yields one empty page.
///
/// # Errors
/// Returns [`CoreError::InvalidPage`] when `page_size` is zero.
pub fn paginate<T: Clone>(visible: &[T], page: usize, page_size: usize) -> Result<Page<T>, CoreError> {
    if page_size == 0 {
        return Err(CoreError::InvalidPage);
    }

    let total_items = visible.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_items);

    Ok(Page {
        page,
        page_size,
        total_pages,
        total_items,
        items: visible.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::criteria::FieldFilter;
    use crate::record::{FieldValue, RecordId};

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: RecordId,
        name: String,
        status: &'static str,
        score: f64,
    }

    impl Record for Row {
        fn id(&self) -> RecordId {
            self.id
        }

        fn set_id(&mut self, id: RecordId) {
            self.id = id;
        }

        fn field(&self, name: &str) -> Option<FieldValue<'_>> {
            match name {
                "name" => Some(FieldValue::Text(&self.name)),
                "status" => Some(FieldValue::Text(self.status)),
                "score" => Some(FieldValue::Number(self.score)),
                _ => None,
            }
        }
    }

    fn fixture() -> Vec<Row> {
        vec![
            Row { id: 1, name: "Welcome Series".to_string(), status: "Active", score: 72.0 },
            Row { id: 2, name: "Cart Recovery".to_string(), status: "Paused", score: 15.0 },
            Row { id: 3, name: "Win-back".to_string(), status: "Active", score: 88.0 },
            Row { id: 4, name: "Onboarding".to_string(), status: "Draft", score: 72.0 },
        ]
    }

    fn ids(rows: &[&Row]) -> Vec<RecordId> {
        rows.iter().map(|row| row.id).collect()
    }

    #[test]
    fn derive_view_filters_then_sorts() {
        let source = fixture();
        let criteria = Criteria::default().with_filter(FieldFilter::exact("status", "Active"));
        let visible = derive_view(&source, &criteria, Some(&SortSpec::descending("score")));
        assert_eq!(ids(&visible), vec![3, 1]);
    }

    #[test]
    fn derive_view_without_sort_keeps_source_order() {
        let source = fixture();
        let visible = derive_view(&source, &Criteria::search("o", ["name"]), None);
        assert_eq!(ids(&visible), vec![1, 2, 4]);
    }

    #[test]
    fn derive_view_reflects_source_mutation() {
        let mut source = fixture();
        let criteria = Criteria::default().with_filter(FieldFilter::exact("status", "Paused"));
        assert_eq!(ids(&derive_view(&source, &criteria, None)), vec![2]);

        source[0].status = "Paused";
        assert_eq!(ids(&derive_view(&source, &criteria, None)), vec![1, 2]);
    }

    #[test]
    fn paginate_clamps_and_counts() -> Result<(), CoreError> {
        let values = (1..=7).collect::<Vec<u32>>();

        let first = paginate(&values, 1, 3)?;
        assert_eq!(first.items, vec![1, 2, 3]);
        assert_eq!(first.total_pages, 3);

        let last = paginate(&values, 99, 3)?;
        assert_eq!(last.page, 3);
        assert_eq!(last.items, vec![7]);

        let zero = paginate(&values, 0, 3)?;
        assert_eq!(zero.page, 1);

        let empty = paginate::<u32>(&[], 1, 3)?;
        assert_eq!(empty.total_pages, 1);
        assert!(empty.items.is_empty());
        Ok(())
    }

    #[test]
    fn paginate_rejects_zero_page_size() {
        assert_eq!(paginate(&[1_u8], 1, 0), Err(CoreError::InvalidPage));
    }

    fn arb_rows() -> impl Strategy<Value = Vec<Row>> {
        proptest::collection::vec(
            ("[a-dA-D]{0,4}", prop_oneof![Just("Active"), Just("Paused"), Just("Draft")], 0_u8..=100),
            0..30,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(index, (name, status, score))| Row {
                    id: index as RecordId + 1,
                    name,
                    status,
                    score: f64::from(score),
                })
                .collect()
        })
    }

    // filter(filter(C, F), F) == filter(C, F), and recomputation is repeatable.
    proptest! {
        #[test]
        fn property_filter_is_idempotent(rows in arb_rows(), term in "[a-d]{0,2}", min in 0_u8..=100, span in 0_u8..=100) {
            let criteria = Criteria::search(term, ["name"])
                .with_filter(FieldFilter::range("score", f64::from(min), f64::from(min) + f64::from(span)));

            let once = derive_view(&rows, &criteria, None).into_iter().cloned().collect::<Vec<_>>();
            let twice = derive_view(&once, &criteria, None).into_iter().cloned().collect::<Vec<_>>();
            prop_assert_eq!(&once, &twice);

            let spec = SortSpec::descending("score");
            let sorted_a = ids(&derive_view(&rows, &criteria, Some(&spec)));
            let sorted_b = ids(&derive_view(&rows, &criteria, Some(&spec)));
            prop_assert_eq!(sorted_a, sorted_b);
        }
    }
}
