//! Sealed-room scenario used by the headless runner and the integration tests

use glam::IVec2;

use crate::simulation::{GasMix, Species, ROOM_TEMPERATURE, STANDARD_MOLES_PER_TILE};
use crate::world::{Atmosphere, TileKind};

/// Oxygen released into the room by default: a thousand tiles' worth at 0°C
pub fn default_injection() -> u32 {
    (STANDARD_MOLES_PER_TILE * 1000.0) as u32
}

/// An axis-aligned room: `size × size` floor tiles ringed by wall tiles
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Room {
    /// Bottom-left floor tile
    pub origin: IVec2,
    pub size: i32,
}

impl Room {
    pub fn new(origin: IVec2, size: i32) -> Self {
        Self { origin, size }
    }

    pub fn center(&self) -> IVec2 {
        self.origin + IVec2::splat(self.size / 2)
    }

    pub fn contains(&self, tile: IVec2) -> bool {
        let rel = tile - self.origin;
        rel.x >= 0 && rel.y >= 0 && rel.x < self.size && rel.y < self.size
    }

    /// Floor tiles, bottom row first
    pub fn floor(&self) -> impl Iterator<Item = IVec2> + '_ {
        (0..self.size).flat_map(move |dy| {
            (0..self.size).map(move |dx| self.origin + IVec2::new(dx, dy))
        })
    }

    /// Wall ring around the floor
    pub fn walls(&self) -> impl Iterator<Item = IVec2> + '_ {
        let min = self.origin - IVec2::ONE;
        let max = self.origin + IVec2::splat(self.size);
        (min.y..=max.y).flat_map(move |y| {
            (min.x..=max.x)
                .filter(move |&x| x == min.x || x == max.x || y == min.y || y == max.y)
                .map(move |x| IVec2::new(x, y))
        })
    }

    /// Lay the walls and floor of the room into the atmosphere
    pub fn build(&self, atmos: &mut Atmosphere) {
        for tile in self.walls() {
            atmos.change_tile(TileKind::Wall.wall_mask(), tile.x, tile.y);
        }
        for tile in self.floor() {
            atmos.change_tile(TileKind::Floor.wall_mask(), tile.x, tile.y);
        }
        log::info!(
            "Built {}x{} room at ({}, {}) across {} chunks",
            self.size,
            self.size,
            self.origin.x,
            self.origin.y,
            atmos.chunk_count()
        );
    }

    /// Release oxygen at room temperature in the center tile
    pub fn inject_center(&self, atmos: &mut Atmosphere, moles: u32) {
        let center = self.center();
        atmos.add_gas(
            GasMix::pure(Species::Oxygen, moles),
            ROOM_TEMPERATURE,
            center.x,
            center.y,
            false,
        );
        log::info!("Injected {} moles of oxygen at ({}, {})", moles, center.x, center.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_geometry() {
        let room = Room::new(IVec2::new(-2, -2), 4);
        assert_eq!(room.floor().count(), 16);
        // Ring around a 4x4 floor is 6x6 minus the floor
        assert_eq!(room.walls().count(), 20);
        assert!(room.walls().all(|tile| !room.contains(tile)));
        assert!(room.contains(room.center()));
    }

    #[test]
    fn test_default_injection_is_a_thousand_tiles() {
        let moles = default_injection();
        assert!(moles > 1_000_000);
        assert!(moles < 1_200_000);
    }
}
