use tokio::sync::{Mutex, MutexGuard};

/// Default stripe count for [`StripedLocks`].
pub const DEFAULT_STRIPES: usize = 64;

/// A fixed pool of async mutexes addressed by key.
///
/// Keys map onto stripes by modulo, so two keys may share a stripe; that only costs
/// throughput. Multi-key acquisition always takes stripes in ascending index order,
/// which rules out deadlock between callers that hold several stripes at once.
#[derive(Debug)]
pub struct StripedLocks {
    stripes: Vec<Mutex<()>>,
}

impl Default for StripedLocks {
    fn default() -> Self {
        Self::new(DEFAULT_STRIPES)
    }
}

impl StripedLocks {
    pub fn new(stripes: usize) -> Self {
        Self {
            stripes: (0..stripes.max(1)).map(|_| Mutex::new(())).collect(),
        }
    }

    fn stripe_of(&self, key: u32) -> usize {
        key as usize % self.stripes.len()
    }

    /// Locks the stripe guarding `key`.
    pub async fn lock(&self, key: u32) -> MutexGuard<'_, ()> {
        self.stripes[self.stripe_of(key)].lock().await
    }

    /// Locks every stripe touched by `keys`, each exactly once, in ascending order.
    pub async fn lock_many(&self, keys: &[u32]) -> Vec<MutexGuard<'_, ()>> {
        let mut indices: Vec<usize> = keys.iter().map(|k| self.stripe_of(*k)).collect();
        indices.sort_unstable();
        indices.dedup();

        let mut guards = Vec::with_capacity(indices.len());
        for index in indices {
            guards.push(self.stripes[index].lock().await);
        }
        guards
    }
}
