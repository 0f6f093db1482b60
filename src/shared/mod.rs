pub mod time;

pub use time::*;

use rayon::prelude::*;

pub trait Identifiable {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn normalized_name(&self) -> &str;
}

/// Autocomplete over normalised names: case-insensitive prefix match,
/// shortest (most exact) names first, built for multithreaded matching.
pub fn search<'a, T>(needle: &'a str, haystack: &'a [T]) -> Vec<&'a T>
where
    T: Send + Sync + Identifiable,
{
    let normalized_needle = needle.to_lowercase();
    let mut results: Vec<&T> = haystack
        .par_iter()
        .filter(|hay| hay.normalized_name().starts_with(&normalized_needle))
        .collect();

    results.par_sort_unstable_by(|a, b| {
        a.name()
            .len()
            .cmp(&b.name().len())
            .then_with(|| a.name().cmp(b.name()))
    });
    results
}
