use nextedit_protocol::{BudgetTruncation, ContextItem};

/// Size and count limits applied to the merged item list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    pub max_item_chars: usize,
    pub max_items: usize,
    pub max_total_chars: usize,
}

/// Apply the budget in a fixed order:
///
/// 1. drop every item longer than `max_item_chars`
/// 2. keep the first `max_items`
/// 3. keep items while the running total stays within `max_total_chars`;
///    the first item that would exceed it is dropped with everything after it
///
/// Lengths are counted in characters. Returns the kept items and the steps
/// that removed something.
pub fn truncate_items(
    items: Vec<ContextItem>,
    budget: &Budget,
) -> (Vec<ContextItem>, Vec<BudgetTruncation>) {
    let mut applied = Vec::new();

    let before = items.len();
    let mut items: Vec<(ContextItem, usize)> = items
        .into_iter()
        .map(|item| {
            let chars = item.content_chars();
            (item, chars)
        })
        .filter(|(_, chars)| *chars <= budget.max_item_chars)
        .collect();
    if items.len() < before {
        applied.push(BudgetTruncation::MaxItemChars);
    }

    if items.len() > budget.max_items {
        items.truncate(budget.max_items);
        applied.push(BudgetTruncation::MaxItems);
    }

    let mut total = 0usize;
    let mut kept = Vec::with_capacity(items.len());
    let count = items.len();
    for (item, chars) in items {
        if total + chars > budget.max_total_chars {
            break;
        }
        total += chars;
        kept.push(item);
    }
    if kept.len() < count {
        applied.push(BudgetTruncation::MaxTotalChars);
    }

    (kept, applied)
}
