use criterion::{Bencher, Criterion};

mod compound;
mod scroll;

fn main() {
    // I find the Criterion macros to be unwieldy and opaque.
    // So I just write them out instead.
    let mut c = Criterion::default()
        .configure_from_args()
        .sample_size(100)
        // default is 3s
        .warm_up_time(std::time::Duration::from_secs(1))
        // default is 5s
        .measurement_time(std::time::Duration::from_secs(3))
        .nresamples(100_000)
        .noise_threshold(0.01)
        .confidence_level(0.95)
        .significance_level(0.05)
        .plotting_backend(criterion::PlottingBackend::None);
    compound::define(&mut c);
    scroll::define(&mut c);
    c.final_summary();
}

/// Defines a Criterion benchmark for the given function.
///
/// We centralize our interaction with Criterion here so that we can tweak
/// some settings that apply to all benchmarks.
fn benchmark(
    c: &mut Criterion,
    id: impl Into<String>,
    f: impl FnMut(&mut Bencher<'_>),
) {
    c.bench_function(&id.into(), f);
}

/// Returns a wrapper for the given calendar kind, with caching enabled or
/// disabled.
fn calendar(
    kind: calunit::CalendarKind,
    cached: bool,
) -> calunit::CalendarWrapper {
    let config = calunit::CacheConfig::new().enabled(cached);
    calunit::CalendarRegistry::with_config(config)
        .intern(calunit::Calendar::new(kind))
}

/// Returns a label for a cache configuration.
fn cache_label(cached: bool) -> &'static str {
    if cached {
        "cached"
    } else {
        "uncached"
    }
}
