use std::cmp::Ordering;

/// Highest count first, ties broken by product id ascending
fn by_rank(a: &(&str, u64), b: &(&str, u64)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0))
}

/// Selects the `k` best-scored ids in rank order
///
/// Ids are expected to be unique, which makes the ordering total and the
/// output reproducible regardless of the input's iteration order.
pub fn top_k<'a>(scores: impl IntoIterator<Item = (&'a str, u64)>, k: usize) -> Vec<(String, u64)> {
    if k == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<(&str, u64)> = scores.into_iter().collect();
    if ranked.len() > k {
        ranked.select_nth_unstable_by(k - 1, by_rank);
        ranked.truncate(k);
    }
    ranked.sort_unstable_by(by_rank);

    ranked
        .into_iter()
        .map(|(id, count)| (id.to_string(), count))
        .collect()
}
