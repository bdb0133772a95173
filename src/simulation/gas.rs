//! Gas record model - per-tile composition, temperature and pressure arithmetic
//!
//! A tile holds a [`GasRecord`]: five whole-number species counts ("moles" in
//! fixed-point units) plus a temperature in Kelvin. Pressure is derived on
//! demand from the ideal gas law with the tile volume supplied by the caller.

use serde::{Deserialize, Serialize};

/// Scaled ideal gas constant used by every pressure/mole conversion
pub const GAS_CONSTANT: f64 = 831.0;

/// One standard atmosphere, in the same scaled units as [`GAS_CONSTANT`]
pub const STANDARD_PRESSURE: f64 = 101_325.0;

/// Nominal volume of a single tile
pub const DEFAULT_TILE_VOLUME: f64 = 2500.0;

/// Room temperature used for the standard-mole reference (Kelvin)
pub const ROOM_TEMPERATURE: f64 = 293.15;

/// Moles needed to fill one tile at standard pressure and room temperature
pub const STANDARD_MOLES_PER_TILE: f64 =
    (STANDARD_PRESSURE * DEFAULT_TILE_VOLUME) / (ROOM_TEMPERATURE * GAS_CONSTANT);

/// Slack applied before truncating a fractional mole amount.
/// A whole-record transfer computed through pressure comes back as
/// `n - 1e-12`; without the slack it would truncate to `n - 1`.
const MOLE_ROUNDING_SLACK: f64 = 1e-6;

/// Gas species tracked per tile, in residual-priority order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Oxygen,
    Nitrogen,
    CarbonDioxide,
    NitrousOxide,
    Plasma,
}

impl Species {
    /// All species, ordered by priority for absorbing rounding residuals
    pub const ALL: [Species; 5] = [
        Species::Oxygen,
        Species::Nitrogen,
        Species::CarbonDioxide,
        Species::NitrousOxide,
        Species::Plasma,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Species::Oxygen => "oxygen",
            Species::Nitrogen => "nitrogen",
            Species::CarbonDioxide => "carbon dioxide",
            Species::NitrousOxide => "nitrous oxide",
            Species::Plasma => "plasma",
        }
    }
}

/// Species composition of a tile
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasMix {
    pub oxygen: u32,
    pub nitrogen: u32,
    pub carbon_dioxide: u32,
    pub nitrous_oxide: u32,
    pub plasma: u32,
}

impl GasMix {
    pub const EMPTY: GasMix = GasMix {
        oxygen: 0,
        nitrogen: 0,
        carbon_dioxide: 0,
        nitrous_oxide: 0,
        plasma: 0,
    };

    /// Mix containing only one species
    pub fn pure(species: Species, amount: u32) -> Self {
        let mut mix = Self::EMPTY;
        mix.set(species, amount);
        mix
    }

    /// Total moles across all species
    #[inline]
    pub fn moles(&self) -> u64 {
        self.oxygen as u64
            + self.nitrogen as u64
            + self.carbon_dioxide as u64
            + self.nitrous_oxide as u64
            + self.plasma as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moles() == 0
    }

    #[inline]
    pub fn get(&self, species: Species) -> u32 {
        match species {
            Species::Oxygen => self.oxygen,
            Species::Nitrogen => self.nitrogen,
            Species::CarbonDioxide => self.carbon_dioxide,
            Species::NitrousOxide => self.nitrous_oxide,
            Species::Plasma => self.plasma,
        }
    }

    #[inline]
    pub fn set(&mut self, species: Species, amount: u32) {
        match species {
            Species::Oxygen => self.oxygen = amount,
            Species::Nitrogen => self.nitrogen = amount,
            Species::CarbonDioxide => self.carbon_dioxide = amount,
            Species::NitrousOxide => self.nitrous_oxide = amount,
            Species::Plasma => self.plasma = amount,
        }
    }

    /// Counts as an array in [`Species::ALL`] order
    pub fn to_array(&self) -> [u32; 5] {
        Species::ALL.map(|s| self.get(s))
    }

    pub fn from_array(counts: [u32; 5]) -> Self {
        let mut mix = Self::EMPTY;
        for (species, count) in Species::ALL.into_iter().zip(counts) {
            mix.set(species, count);
        }
        mix
    }

    /// Remove `other` species-by-species. Callers guarantee `other` fits.
    pub fn remove(&mut self, other: &GasMix) {
        for species in Species::ALL {
            let have = self.get(species);
            let take = other.get(species);
            debug_assert!(take <= have, "removing more {} than present", species.name());
            self.set(species, have.saturating_sub(take));
        }
    }

    pub fn add(&mut self, other: &GasMix) {
        for species in Species::ALL {
            self.set(species, self.get(species).saturating_add(other.get(species)));
        }
    }
}

/// Composition plus thermal state of the gas in one tile
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GasRecord {
    pub mix: GasMix,
    /// Temperature in Kelvin
    pub temperature: f64,
}

impl GasRecord {
    /// The zero-valued record used for absent and off-grid tiles
    pub const VACUUM: GasRecord = GasRecord {
        mix: GasMix::EMPTY,
        temperature: 0.0,
    };

    pub fn new(mix: GasMix, temperature: f64) -> Self {
        Self { mix, temperature }
    }

    #[inline]
    pub fn moles(&self) -> u64 {
        self.mix.moles()
    }

    #[inline]
    pub fn is_vacuum(&self) -> bool {
        self.mix.is_empty()
    }

    /// Pressure of this record when confined to `volume`
    #[inline]
    pub fn pressure(&self, volume: f64) -> f64 {
        (self.moles() as f64 * self.temperature * GAS_CONSTANT) / volume
    }

    /// Whole moles of this record's gas that exert `pressure` in `volume`
    /// at this record's temperature. A non-positive temperature yields zero.
    pub fn moles_for_pressure(&self, pressure: f64, volume: f64) -> u64 {
        let divisor = self.temperature * GAS_CONSTANT;
        if divisor <= 0.0 || !pressure.is_finite() || pressure <= 0.0 {
            return 0;
        }
        let moles = volume * pressure / divisor;
        if !moles.is_finite() {
            return 0;
        }
        (moles + MOLE_ROUNDING_SLACK).floor().max(0.0) as u64
    }

    /// Fold `other` into this record undivided. Temperature becomes the
    /// mole-weighted mean of both records.
    pub fn merge(&mut self, other: &GasRecord) {
        let incoming = other.moles();
        if incoming == 0 {
            return;
        }
        let total = self.moles() + incoming;
        let scale = incoming as f64 / total as f64;
        self.temperature += (other.temperature - self.temperature) * scale;
        self.mix.add(&other.mix);
    }
}
