//! GC statistics, exposed for `pico-cli --gc-stats` and for tests that
//! assert "collection happened" without depending on timing.

/// Cumulative statistics for one `GarbageCollector` instance.
#[derive(Debug, Default, Clone, Copy)]
pub struct GcStats {
    /// Number of completed collection cycles (heap-growth collections
    /// included).
    pub collections: u64,
    /// Number of heap-doubling events.
    pub growths: u64,
    /// Bytes occupied by survivors after the most recent collection.
    pub bytes_copied_last_cycle: usize,
    /// Largest `bytes_copied_last_cycle` ever observed.
    pub high_water_mark: usize,
}

impl GcStats {
    pub(crate) fn record_collection(&mut self, bytes_copied: usize) {
        self.collections += 1;
        self.bytes_copied_last_cycle = bytes_copied;
        self.high_water_mark = self.high_water_mark.max(bytes_copied);
    }

    pub(crate) fn record_growth(&mut self) {
        self.growths += 1;
    }
}
