use std::collections::HashMap;

use chrono::NaiveDate;

use crate::tweet::Tweet;

/// User-supplied value for one filter slot. Which variant a slot expects is
/// part of that slot's definition; an empty value imposes no constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    IntRange {
        min: Option<u32>,
        max: Option<u32>,
    },
    DateRange {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl FilterValue {
    /// An empty value is the same as the slot having no value at all.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(s) => s.trim().is_empty(),
            FilterValue::IntRange { min, max } => min.is_none() && max.is_none(),
            FilterValue::DateRange { from, to } => from.is_none() && to.is_none(),
        }
    }
}

/// One filter slot: display metadata plus a pure predicate over
/// (tweet, current value).
#[derive(Debug, Clone)]
pub struct FilterDefinition {
    pub label: &'static str,
    pub prompt: &'static str,
    apply: fn(&Tweet, &FilterValue) -> bool,
}

impl FilterDefinition {
    pub fn new(
        label: &'static str,
        prompt: &'static str,
        apply: fn(&Tweet, &FilterValue) -> bool,
    ) -> Self {
        Self { label, prompt, apply }
    }

    /// Returns true when the tweet passes. A missing or empty value always
    /// passes: a filter with no user input imposes no constraint.
    pub fn apply(&self, tweet: &Tweet, value: Option<&FilterValue>) -> bool {
        match value {
            None => true,
            Some(v) if v.is_empty() => true,
            Some(v) => (self.apply)(tweet, v),
        }
    }
}

/// Fixed, ordered catalog of filter slots. The position of a definition is
/// the stable integer key used by [`FilterState`]; changing the set means
/// building a new registry.
#[derive(Debug, Clone)]
pub struct FilterRegistry {
    definitions: Vec<FilterDefinition>,
}

impl FilterRegistry {
    pub fn new(definitions: Vec<FilterDefinition>) -> Self {
        Self { definitions }
    }

    /// The standard timeline filter set, in display order.
    pub fn standard() -> Self {
        Self::new(vec![
            FilterDefinition::new("Date", "posted between", date_filter),
            FilterDefinition::new("Full text", "text contains", full_text_filter),
            FilterDefinition::new("Tweet length", "length between", length_filter),
            FilterDefinition::new("Mentions", "number of mentions between", mention_count_filter),
            FilterDefinition::new("Hashtags", "number of hashtags between", hashtag_count_filter),
            FilterDefinition::new("Favourites", "favourites between", favourites_filter),
            FilterDefinition::new("Hashtag", "contains hashtag", hashtag_filter),
            FilterDefinition::new("Mention", "mentions user", mention_filter),
        ])
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FilterDefinition> {
        self.definitions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterDefinition> {
        self.definitions.iter()
    }
}

/// Current value per filter slot, keyed by the slot's registry position.
/// Copy-on-write: every edit produces a new state, so a snapshot handed to
/// the query engine can never change underneath it. Absent keys mean "no
/// constraint". The presentation layer is the sole producer; the core only
/// reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    values: HashMap<usize, FilterValue>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: usize) -> Option<&FilterValue> {
        self.values.get(&index)
    }

    /// A new state with the slot at `index` replaced (`None` clears it).
    pub fn with_value(&self, index: usize, value: Option<FilterValue>) -> Self {
        let mut values = self.values.clone();
        match value {
            Some(v) => {
                values.insert(index, v);
            }
            None => {
                values.remove(&index);
            }
        }
        Self { values }
    }
}

fn date_filter(tweet: &Tweet, value: &FilterValue) -> bool {
    let FilterValue::DateRange { from, to } = value else {
        return true;
    };
    // A bounded date filter excludes tweets whose timestamp never parsed.
    let Some(created) = tweet.created_at else {
        return false;
    };
    let date = created.date_naive();
    from.is_none_or(|f| date >= f) && to.is_none_or(|t| date <= t)
}

fn full_text_filter(tweet: &Tweet, value: &FilterValue) -> bool {
    let FilterValue::Text(needle) = value else {
        return true;
    };
    tweet
        .text
        .to_lowercase()
        .contains(&needle.trim().to_lowercase())
}

fn in_range(n: u32, min: &Option<u32>, max: &Option<u32>) -> bool {
    min.is_none_or(|lo| n >= lo) && max.is_none_or(|hi| n <= hi)
}

fn length_filter(tweet: &Tweet, value: &FilterValue) -> bool {
    let FilterValue::IntRange { min, max } = value else {
        return true;
    };
    in_range(tweet.length.min(u32::MAX as usize) as u32, min, max)
}

fn mention_count_filter(tweet: &Tweet, value: &FilterValue) -> bool {
    let FilterValue::IntRange { min, max } = value else {
        return true;
    };
    in_range(tweet.mentions.len() as u32, min, max)
}

fn hashtag_count_filter(tweet: &Tweet, value: &FilterValue) -> bool {
    let FilterValue::IntRange { min, max } = value else {
        return true;
    };
    in_range(tweet.hashtags.len() as u32, min, max)
}

fn favourites_filter(tweet: &Tweet, value: &FilterValue) -> bool {
    let FilterValue::IntRange { min, max } = value else {
        return true;
    };
    in_range(tweet.favourite_count, min, max)
}

fn hashtag_filter(tweet: &Tweet, value: &FilterValue) -> bool {
    let FilterValue::Text(tag) = value else {
        return true;
    };
    let tag = tag.trim().trim_start_matches('#').to_lowercase();
    tweet.hashtags.contains(&tag)
}

fn mention_filter(tweet: &Tweet, value: &FilterValue) -> bool {
    let FilterValue::Text(handle) = value else {
        return true;
    };
    let handle = handle.trim().trim_start_matches('@').to_lowercase();
    tweet.mentions.contains(&handle)
}
