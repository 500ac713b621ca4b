//! Reusable join stages over decoded records.
//!
//! Joins keep the driving side's order, and for each driving row the matches keep the joined
//! side's order, so every view is deterministic for a given store state.

use std::{collections::HashMap, hash::Hash};

/// Groups records by key, each group in input order.
pub(crate) fn group_by<'a, T, K, F>(items: &'a [T], key: F) -> HashMap<K, Vec<&'a T>>
where
	K: Eq + Hash,
	F: Fn(&T) -> K,
{
	let mut groups: HashMap<K, Vec<&'a T>> = HashMap::new();

	for item in items {
		groups.entry(key(item)).or_default().push(item);
	}

	groups
}

pub(crate) fn count_by<T, K, F>(items: &[T], key: F) -> HashMap<K, usize>
where
	K: Eq + Hash,
	F: Fn(&T) -> K,
{
	let mut counts = HashMap::new();

	for item in items {
		*counts.entry(key(item)).or_insert(0) += 1;
	}

	counts
}

/// One output pair per (left, right) match; unmatched left rows are dropped.
pub(crate) fn inner_join<'a, L, R, K, FL, FR>(
	left: &'a [L],
	right: &'a [R],
	left_key: FL,
	right_key: FR,
) -> Vec<(&'a L, &'a R)>
where
	K: Eq + Hash,
	FL: Fn(&L) -> K,
	FR: Fn(&R) -> K,
{
	let index = group_by(right, right_key);

	left.iter()
		.flat_map(|row| {
			index
				.get(&left_key(row))
				.into_iter()
				.flatten()
				.map(move |matched| (row, *matched))
		})
		.collect()
}
