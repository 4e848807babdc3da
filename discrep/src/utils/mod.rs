//! Helpers shared across the crate.
//!
//! - The global rayon [`THREAD_POOL`] used by the parallel walker, sized by
//!   the `DISCREP_NUM_THREADS` environment variable.
//! - Macros for builder-style `with_*` setters and plain getters.
//! - Small sequence helpers used by residue-level rules.

use once_cell::sync::Lazy;
use rayon::{
    ThreadPool,
    ThreadPoolBuilder,
};

pub static THREAD_POOL: Lazy<ThreadPool> = Lazy::new(|| {
    let num_threads: Option<usize> = std::env::var("DISCREP_NUM_THREADS")
        .ok()
        .and_then(|str| str.parse::<usize>().ok());
    ThreadPoolBuilder::new()
        .num_threads(num_threads.unwrap_or(0))
        .build()
        .expect("Failed to create thread pool")
});

pub fn n_threads() -> usize {
    THREAD_POOL.current_num_threads()
}

#[macro_export]
macro_rules! getter_fn {
    ($field_name: ident, $field_type: ty) => {
        #[cfg_attr(coverage_nightly, coverage(off))]
        pub fn $field_name(&self) -> &$field_type {
            &self.$field_name
        }
    };
}
pub use getter_fn;

#[macro_export]
macro_rules! with_field_fn {
    ($field_name: ident, $field_type: ty) => {
        paste::paste! {
            #[cfg_attr(coverage_nightly, coverage(off))]
            pub fn [<with_$field_name>](mut self, value: $field_type) -> Self {
            self.$field_name = value;
            self
            }
        }
    };
}
pub use with_field_fn;

/// Returns half-open `(start, end)` ranges of `N`/`n` runs that are at
/// least `min_len` residues long.
pub fn n_runs(
    sequence: &str,
    min_len: usize,
) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut run_start: Option<usize> = None;

    for (idx, base) in sequence.bytes().enumerate() {
        match (base == b'N' || base == b'n', run_start) {
            (true, None) => run_start = Some(idx),
            (false, Some(start)) => {
                if idx - start >= min_len {
                    runs.push((start, idx));
                }
                run_start = None;
            },
            _ => {},
        }
    }
    if let Some(start) = run_start {
        if sequence.len() - start >= min_len {
            runs.push((start, sequence.len()));
        }
    }
    runs
}
