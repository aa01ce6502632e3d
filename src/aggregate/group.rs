//! Grouping reducers: counts, sums, and top-N

use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// Number of members in one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount<K> {
    pub key: K,
    pub count: usize,
}

/// Summed value of one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSum<K> {
    pub key: K,
    pub total: f64,
}

/// Default length of ranked lists
pub const TOP_N: usize = 10;

/// Counts items per key, in order of each key's first occurrence
pub fn group_by_count<I, K, F>(items: I, key: F) -> Vec<GroupCount<K>>
where
    I: IntoIterator,
    K: Eq + Hash + Clone,
    F: Fn(&I::Item) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<GroupCount<K>> = Vec::new();

    for item in items {
        let k = key(&item);
        match index.get(&k) {
            Some(&i) => groups[i].count += 1,
            None => {
                index.insert(k.clone(), groups.len());
                groups.push(GroupCount { key: k, count: 1 });
            }
        }
    }

    groups
}

/// Sums `value` per key, in order of each key's first occurrence
pub fn group_by_sum<I, K, F, V>(items: I, key: F, value: V) -> Vec<GroupSum<K>>
where
    I: IntoIterator,
    K: Eq + Hash + Clone,
    F: Fn(&I::Item) -> K,
    V: Fn(&I::Item) -> f64,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<GroupSum<K>> = Vec::new();

    for item in items {
        let k = key(&item);
        let v = value(&item);
        match index.get(&k) {
            Some(&i) => groups[i].total += v,
            None => {
                index.insert(k.clone(), groups.len());
                groups.push(GroupSum { key: k, total: v });
            }
        }
    }

    groups
}

/// Largest `n` groups by count; ties keep first-occurrence order
pub fn top_n<K>(mut groups: Vec<GroupCount<K>>, n: usize) -> Vec<GroupCount<K>> {
    // sort_by is stable
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups.truncate(n);
    groups
}

/// The group with the highest count; the earliest one wins a tie
pub fn most_common<K: Clone>(groups: &[GroupCount<K>]) -> Option<GroupCount<K>> {
    groups
        .iter()
        .fold(None, |best: Option<&GroupCount<K>>, g| match best {
            Some(b) if b.count >= g.count => Some(b),
            _ => Some(g),
        })
        .cloned()
}
