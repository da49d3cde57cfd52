pub mod game;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Log every 100th simulation tick, only with the `perf_stats` feature.
///
/// `$tick` is anything with a `.0` tick counter, usually `Res<SimTick>`.
/// Without `perf_stats` the macro expands to nothing and its arguments are
/// never evaluated.
///
/// ```ignore
/// profile_log!(tick, "[SIM STATUS] Ships: {}", sim.world.ships().len());
/// ```
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {
        if $tick.0 % 100 == 0 {
            bevy::prelude::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {};
}
