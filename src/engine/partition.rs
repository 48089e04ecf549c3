//! Splitting a batch into worker groups

/// Tasks assigned to one worker group, in submission order.
pub type Partition<T> = Vec<T>;

/// Sizes of the groups `partition` would produce for `len` items.
///
/// `min(max_groups, len)` contiguous blocks whose sizes differ by at most
/// one; the leading blocks take the remainder. Empty input gives no groups.
#[must_use]
pub fn partition_sizes(len: usize, max_groups: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }

    let groups = max_groups.clamp(1, len);
    let base = len / groups;
    let extra = len % groups;

    (0..groups)
        .map(|group| base + usize::from(group < extra))
        .collect()
}

/// Split `items` into at most `max_groups` contiguous partitions.
///
/// Deterministic for a given length and group bound. Concatenating the
/// partitions in group order gives back `items` unchanged.
#[must_use]
pub fn partition<T>(items: Vec<T>, max_groups: usize) -> Vec<Partition<T>> {
    let mut items = items.into_iter();

    partition_sizes(items.len(), max_groups)
        .into_iter()
        .map(|size| items.by_ref().take(size).collect())
        .collect()
}
