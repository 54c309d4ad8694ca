pub mod builder;
pub mod progress;

pub use builder::{DEFAULT_BATCH_SIZE, IndexBuilder, build_index};
pub use progress::BuildStats;
