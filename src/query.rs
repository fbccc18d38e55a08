use crate::filters::{FilterRegistry, FilterState};
use crate::tweet::Tweet;

/// Derive the visible subset of `items` under the current filter state.
///
/// An item is kept iff every slot in the registry passes it against that
/// slot's value; slots with no value pass everything. The result preserves
/// the input order (this is a stable filter, not a sort). Recomputed from
/// scratch on every call; both inputs are immutable values so there is no
/// cache to invalidate.
pub fn visible<'a>(
    items: &'a [Tweet],
    state: &FilterState,
    registry: &FilterRegistry,
) -> Vec<&'a Tweet> {
    items
        .iter()
        .filter(|tweet| {
            (0..registry.len()).all(|i| {
                registry
                    .get(i)
                    .is_none_or(|def| def.apply(tweet, state.get(i)))
            })
        })
        .collect()
}
