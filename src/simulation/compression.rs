//! Point injection of gas into a tile, including the canister-discharge case
//!
//! A compressed injection models gas released into twice the tile volume and
//! then squeezed back to nominal volume adiabatically: `p1·V1^γ = p2·V2^γ`.
//! The resulting temperature is read back from the ideal gas law at the
//! nominal volume.

use super::gas::{GasRecord, GAS_CONSTANT};
use super::transfer::absorb;

/// Heat capacity ratio (γ) used for the adiabatic compression step
pub const HEAT_CAPACITY_RATIO: f64 = 1.6652;

/// Volume multiplier the gas expands into before being compressed
const RELEASE_VOLUME_SCALE: f64 = 2.0;

/// Absorb `injected` into `tile` at full strength.
///
/// With `compress` set, the absorb happens at double volume and the tile's
/// temperature is replaced by the post-compression temperature.
pub fn inject(tile: &mut GasRecord, injected: &GasRecord, volume: f64, compress: bool) {
    if injected.is_vacuum() {
        return;
    }

    let original = *tile;

    if !compress {
        absorb(tile, &original, injected, volume, 1.0);
        return;
    }

    let released_volume = volume * RELEASE_VOLUME_SCALE;
    absorb(tile, &original, injected, released_volume, 1.0);

    let moles = tile.moles();
    if moles == 0 {
        return;
    }

    let released_pressure = tile.pressure(released_volume);
    let compressed_pressure =
        released_pressure * (released_volume / volume).powf(HEAT_CAPACITY_RATIO);
    tile.temperature = compressed_pressure * volume / (moles as f64 * GAS_CONSTANT);
}
