use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::tweet::Tweet;

const TOP_TOKEN_COUNT: usize = 5;

/// Summary statistics over a fetched timeline. Computed on demand from the
/// full (unfiltered) tweet collection; narrowing the visible set does not
/// change the statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineStats {
    pub tweet_count: usize,
    pub total_length: usize,
    pub mean_length: f64,
    pub longest: usize,
    pub shortest: usize,
    pub total_favourites: u64,
    pub total_retweets: u64,
    /// Most frequent hashtags as (tag, occurrences), descending count, ties
    /// broken lexicographically, at most five entries.
    pub top_hashtags: Vec<(String, usize)>,
    pub top_mentions: Vec<(String, usize)>,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
}

impl TimelineStats {
    pub fn from_tweets(tweets: &[Tweet]) -> Self {
        let tweet_count = tweets.len();
        let total_length: usize = tweets.iter().map(|t| t.length).sum();
        let mean_length = if tweet_count == 0 {
            0.0
        } else {
            total_length as f64 / tweet_count as f64
        };

        let mut hashtags: HashMap<&str, usize> = HashMap::new();
        let mut mentions: HashMap<&str, usize> = HashMap::new();
        for tweet in tweets {
            for tag in &tweet.hashtags {
                *hashtags.entry(tag).or_default() += 1;
            }
            for handle in &tweet.mentions {
                *mentions.entry(handle).or_default() += 1;
            }
        }

        Self {
            tweet_count,
            total_length,
            mean_length,
            longest: tweets.iter().map(|t| t.length).max().unwrap_or(0),
            shortest: tweets.iter().map(|t| t.length).min().unwrap_or(0),
            total_favourites: tweets.iter().map(|t| u64::from(t.favourite_count)).sum(),
            total_retweets: tweets.iter().map(|t| u64::from(t.retweet_count)).sum(),
            top_hashtags: top_tokens(hashtags),
            top_mentions: top_tokens(mentions),
            earliest: tweets.iter().filter_map(|t| t.created_at).min(),
            latest: tweets.iter().filter_map(|t| t.created_at).max(),
        }
    }
}

fn top_tokens(counts: HashMap<&str, usize>) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(token, count)| (token.to_string(), count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(TOP_TOKEN_COUNT);
    entries
}
