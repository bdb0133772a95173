//! Environment overrides for `AtmosConfig::load`
//!
//! Lives in its own test binary: it sets process-wide `ATMOS_*` variables
//! that would leak into the file-based config tests.

use atmos_grid::config::{AtmosConfig, DEFAULT_CHUNK_SIZE};

#[test]
fn test_load_reads_atmos_env_vars() {
    std::env::set_var("ATMOS_SPREAD_FACTOR", "0.2");
    std::env::set_var("ATMOS_EVICT_AFTER_IDLE_TICKS", "12");

    let config = AtmosConfig::load().expect("Failed to load config");

    assert_eq!(config.spread_factor, 0.2);
    assert_eq!(config.evict_after_idle_ticks, Some(12));
    // Untouched keys keep their defaults
    assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);

    // Invalid overrides are rejected like invalid files
    std::env::set_var("ATMOS_SPREAD_FACTOR", "1.0");
    assert!(AtmosConfig::load().is_err());

    std::env::remove_var("ATMOS_SPREAD_FACTOR");
    std::env::remove_var("ATMOS_EVICT_AFTER_IDLE_TICKS");
}
