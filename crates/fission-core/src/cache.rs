/// A derived adjacency view that is either out of date or holds a computed
/// value. Mutators mark it [`Stale`](AdjacencyCache::Stale); readers recompute
/// on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AdjacencyCache<T> {
    #[default]
    Stale,
    Fresh(T),
}

impl<T> AdjacencyCache<T> {
    pub fn is_fresh(&self) -> bool {
        matches!(self, AdjacencyCache::Fresh(_))
    }

    /// The cached value, if fresh.
    pub fn get(&self) -> Option<&T> {
        match self {
            AdjacencyCache::Fresh(value) => Some(value),
            AdjacencyCache::Stale => None,
        }
    }

    pub fn store(&mut self, value: T) {
        *self = AdjacencyCache::Fresh(value);
    }

    pub fn invalidate(&mut self) {
        *self = AdjacencyCache::Stale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_stale() {
        let cache: AdjacencyCache<Vec<u32>> = AdjacencyCache::default();
        assert!(!cache.is_fresh());
        assert!(cache.get().is_none());
    }

    #[test]
    fn store_then_invalidate() {
        let mut cache = AdjacencyCache::Stale;
        cache.store(vec![1, 2]);
        assert!(cache.is_fresh());
        assert_eq!(cache.get(), Some(&vec![1, 2]));
        cache.invalidate();
        assert_eq!(cache, AdjacencyCache::Stale);
    }
}
