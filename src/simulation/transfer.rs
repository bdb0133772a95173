//! Transfer kernel - pairwise Spread/Absorb exchange between two gas records
//!
//! One directional exchange between a tile and a neighbor is a Spread (gas
//! leaves the tile when its snapshot pressure exceeds the neighbor's) followed
//! by an Absorb (gas enters when the neighbor's pressure is higher). Both
//! halves compare against `original`, the tile's snapshot from before the
//! tick, so every tile's update is a pure function of the previous state.
//!
//! Mole amounts are whole numbers. The per-species split of a transfer is
//! truncated and the leftover is handed to a species in [`Species::ALL`]
//! order, which keeps the split summing exactly to the computed total.

use super::gas::{GasMix, GasRecord};

/// Move gas out of `source` toward `target`.
///
/// The amount is driven by the pressure excess of `original` (the source's
/// pre-tick snapshot) over `target`, scaled by `factor`, and leaves in the
/// source's current composition.
pub fn spread(
    source: &mut GasRecord,
    original: &GasRecord,
    target: &GasRecord,
    volume: f64,
    factor: f64,
) {
    let difference = original.pressure(volume) - target.pressure(volume);
    if difference <= 0.0 {
        return;
    }

    let moles = source
        .moles_for_pressure(difference * factor, volume)
        .min(source.moles());
    if moles == 0 {
        return;
    }

    let transfer = apportion(&source.mix, moles);
    source.mix.remove(&transfer);
}

/// Pull gas from `target` into `source`.
///
/// Mirror image of [`spread`]: driven by the target's pressure excess over
/// `original`, apportioned by the target's composition. The source temperature
/// moves toward the target's by the fraction of incoming moles in the result.
pub fn absorb(
    source: &mut GasRecord,
    original: &GasRecord,
    target: &GasRecord,
    volume: f64,
    factor: f64,
) {
    let target_moles = target.moles();
    if target_moles == 0 {
        return;
    }

    let difference = target.pressure(volume) - original.pressure(volume);
    if difference <= 0.0 {
        return;
    }

    let moles = target
        .moles_for_pressure(difference * factor, volume)
        .min(target_moles);
    if moles == 0 {
        return;
    }

    let moles_after = source.moles() + moles;
    let scale = moles as f64 / moles_after as f64;
    source.temperature += (target.temperature - source.temperature) * scale;

    let transfer = apportion(&target.mix, moles);
    source.mix.add(&transfer);
}

/// Split `moles` across the species of `donor` in proportion to its current
/// composition. `moles` must not exceed the donor's total.
///
/// Each share is truncated; the residual goes to the first species (in
/// [`Species::ALL`] order) that can take all of it without exceeding the
/// donor's count. If no single species can, the residual spills over species
/// in the same order, each taking what it has room for.
pub fn apportion(donor: &GasMix, moles: u64) -> GasMix {
    let total = donor.moles();
    debug_assert!(moles <= total, "transfer of {} exceeds donor total {}", moles, total);
    if moles == 0 || total == 0 {
        return GasMix::EMPTY;
    }

    let counts = donor.to_array();
    let mut shares = counts.map(|count| ((moles as u128 * count as u128) / total as u128) as u64);

    let assigned: u64 = shares.iter().sum();
    let mut residual = moles.saturating_sub(assigned);

    if residual > 0 {
        let single = (0..shares.len()).find(|&i| shares[i] + residual <= counts[i] as u64);
        match single {
            Some(i) => shares[i] += residual,
            None => {
                for i in 0..shares.len() {
                    let room = counts[i] as u64 - shares[i];
                    let take = room.min(residual);
                    shares[i] += take;
                    residual -= take;
                    if residual == 0 {
                        break;
                    }
                }
            }
        }
    }

    debug_assert_eq!(
        shares.iter().sum::<u64>(),
        moles,
        "per-species transfer does not add up to the mole transfer"
    );

    GasMix::from_array(shares.map(|share| share as u32))
}

/// Evaluate one directional exchange: Spread then Absorb against `neighbor`.
#[inline]
pub fn exchange(
    current: &mut GasRecord,
    original: &GasRecord,
    neighbor: &GasRecord,
    volume: f64,
    factor: f64,
) {
    spread(current, original, neighbor, volume, factor);
    absorb(current, original, neighbor, volume, factor);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::gas::{Species, DEFAULT_TILE_VOLUME, ROOM_TEMPERATURE};

    const FACTOR: f64 = 0.175;

    fn oxygen(n: u32) -> GasRecord {
        GasRecord::new(GasMix::pure(Species::Oxygen, n), ROOM_TEMPERATURE)
    }

    #[test]
    fn test_spread_toward_vacuum() {
        let original = oxygen(100_000);
        let mut source = original;
        spread(&mut source, &original, &GasRecord::VACUUM, DEFAULT_TILE_VOLUME, FACTOR);
        assert_eq!(source.mix.oxygen, 100_000 - 17_500);
    }

    #[test]
    fn test_absorb_from_full_neighbor_matches_spread() {
        let full = oxygen(100_000);
        let mut empty = GasRecord::VACUUM;
        absorb(&mut empty, &GasRecord::VACUUM, &full, DEFAULT_TILE_VOLUME, FACTOR);
        assert_eq!(empty.mix.oxygen, 17_500);
        assert!((empty.temperature - ROOM_TEMPERATURE).abs() < 1e-9);
    }

    #[test]
    fn test_spread_noop_when_target_has_higher_pressure() {
        let original = oxygen(10);
        let mut source = original;
        spread(&mut source, &original, &oxygen(1000), DEFAULT_TILE_VOLUME, FACTOR);
        assert_eq!(source, original);
    }

    #[test]
    fn test_absorb_noop_from_vacuum() {
        let original = oxygen(500);
        let mut source = original;
        absorb(&mut source, &original, &GasRecord::VACUUM, DEFAULT_TILE_VOLUME, FACTOR);
        assert_eq!(source, original);
    }

    #[test]
    fn test_spread_noop_when_amount_rounds_to_zero() {
        let original = oxygen(3);
        let mut source = original;
        spread(&mut source, &original, &GasRecord::VACUUM, DEFAULT_TILE_VOLUME, FACTOR);
        assert_eq!(source.mix.oxygen, 3, "0.525 moles truncates to nothing");
    }

    #[test]
    fn test_spread_uses_current_composition() {
        let original = oxygen(10_000);
        // Tile already picked up nitrogen from another neighbor this tick
        let mut source = GasRecord::new(
            GasMix {
                oxygen: 10_000,
                nitrogen: 10_000,
                ..GasMix::EMPTY
            },
            ROOM_TEMPERATURE,
        );
        spread(&mut source, &original, &GasRecord::VACUUM, DEFAULT_TILE_VOLUME, FACTOR);
        // 1750 moles leave, half of each species
        assert_eq!(source.mix.oxygen, 10_000 - 875);
        assert_eq!(source.mix.nitrogen, 10_000 - 875);
    }

    #[test]
    fn test_absorb_blends_temperature() {
        let hot = GasRecord::new(GasMix::pure(Species::Plasma, 10_000), 600.0);
        let original = GasRecord::new(GasMix::pure(Species::Oxygen, 1000), 300.0);
        let mut source = original;
        absorb(&mut source, &original, &hot, DEFAULT_TILE_VOLUME, 0.5);

        assert!(source.mix.plasma > 0);
        assert_eq!(source.mix.oxygen, 1000);
        assert!(source.temperature > 300.0 && source.temperature < 600.0);

        let expected = 300.0 + 300.0 * source.mix.plasma as f64 / source.moles() as f64;
        assert!((source.temperature - expected).abs() < 1e-9);
    }

    #[test]
    fn test_apportion_residual_goes_to_oxygen_first() {
        let donor = GasMix {
            oxygen: 1,
            nitrogen: 1,
            carbon_dioxide: 1,
            ..GasMix::EMPTY
        };
        // Each share truncates to 0, residual of 2 cannot fit in any single
        // species, so it spills: oxygen then nitrogen.
        let split = apportion(&donor, 2);
        assert_eq!(split.to_array(), [1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_apportion_single_species_takes_whole_residual() {
        let donor = GasMix {
            oxygen: 10,
            nitrogen: 10,
            carbon_dioxide: 10,
            ..GasMix::EMPTY
        };
        // 10 * 10/30 = 3.33 -> 3 each, residual 1 -> oxygen
        let split = apportion(&donor, 10);
        assert_eq!(split.to_array(), [4, 3, 3, 0, 0]);
    }

    #[test]
    fn test_apportion_skips_species_without_room() {
        let donor = GasMix {
            oxygen: 1,
            nitrogen: 4,
            plasma: 4,
            ..GasMix::EMPTY
        };
        // shares: 0.55 -> 0, 2.2 -> 2, 2.2 -> 2; residual 1 fits oxygen
        let split = apportion(&donor, 5);
        assert_eq!(split.to_array(), [1, 2, 0, 0, 2]);

        // shares: 0, 3, 3 (7 * 4/9 = 3.1); residual 1: oxygen 0 + 1 <= 1
        let split = apportion(&donor, 7);
        assert_eq!(split.to_array(), [1, 3, 0, 0, 3]);
    }

    #[test]
    fn test_apportion_whole_donor() {
        let donor = GasMix::from_array([3, 5, 7, 11, 13]);
        assert_eq!(apportion(&donor, donor.moles()), donor);
    }

    #[test]
    fn test_apportion_always_sums_exactly() {
        let donors = [
            GasMix::from_array([1, 1, 1, 1, 1]),
            GasMix::from_array([97, 3, 0, 0, 1]),
            GasMix::from_array([0, 0, 0, 0, 9]),
            GasMix::from_array([1000, 333, 77, 5, 2]),
        ];
        for donor in donors {
            for moles in 0..=donor.moles() {
                let split = apportion(&donor, moles);
                assert_eq!(split.moles(), moles);
                for species in Species::ALL {
                    assert!(split.get(species) <= donor.get(species));
                }
            }
        }
    }

    #[test]
    fn test_exchange_between_equal_tiles_is_noop() {
        let a = oxygen(5000);
        let mut current = a;
        exchange(&mut current, &a, &a, DEFAULT_TILE_VOLUME, FACTOR);
        assert_eq!(current, a);
    }
}
