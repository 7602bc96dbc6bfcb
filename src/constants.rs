pub const DEFAULT_MIN_SPLIT_SIZE: usize = 1;
/// Tree levels holding fewer records than this are grown on the current
/// thread even when parallel growth is enabled.
pub const PARALLEL_MIN_PARTITION: usize = 256;
