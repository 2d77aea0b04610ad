//! Pickup kinds, loot values and the player's inventory.

use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Every kind of pickup that can lie on the ground.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupKind {
    /// Restores health when eaten from the inventory.
    Meat,
    /// Restores mana when drunk from the inventory.
    Mead,
    /// Currency added straight to the purse.
    Gold,
    /// Experience granted on collection.
    Experience,
    /// Fruit eaten by foragers and by the player.
    Apple,
    /// Seed used for planting.
    Seed,
    /// Building material.
    Wood,
}

impl PickupKind {
    /// All pickup kinds in a stable order.
    pub const ALL: [PickupKind; 7] = [
        PickupKind::Meat,
        PickupKind::Mead,
        PickupKind::Gold,
        PickupKind::Experience,
        PickupKind::Apple,
        PickupKind::Seed,
        PickupKind::Wood,
    ];

    /// Value rolled when a pickup of this kind spawns without an explicit value.
    #[must_use]
    pub const fn default_value(self) -> DropValue {
        match self {
            Self::Meat => DropValue::Range(15, 25),
            Self::Mead => DropValue::Range(12, 22),
            Self::Gold => DropValue::Range(1, 4),
            Self::Experience => DropValue::Range(12, 22),
            Self::Apple | Self::Seed | Self::Wood => DropValue::Fixed(1),
        }
    }

    /// Stable lowercase label used by snapshots and notifications.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Meat => "meat",
            Self::Mead => "mead",
            Self::Gold => "gold",
            Self::Experience => "experience",
            Self::Apple => "apple",
            Self::Seed => "seed",
            Self::Wood => "wood",
        }
    }
}

impl fmt::Display for PickupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a pickup label does not name a known kind.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown pickup kind '{0}'")]
pub struct UnknownPickupKind(pub String);

impl FromStr for PickupKind {
    type Err = UnknownPickupKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "meat" => Ok(Self::Meat),
            "mead" => Ok(Self::Mead),
            "gold" => Ok(Self::Gold),
            // Older saves used the short label.
            "experience" | "xp" => Ok(Self::Experience),
            "apple" => Ok(Self::Apple),
            "seed" => Ok(Self::Seed),
            "wood" => Ok(Self::Wood),
            other => Err(UnknownPickupKind(other.to_owned())),
        }
    }
}

/// Value attached to a drop, either fixed or rolled uniformly from a range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropValue {
    /// Always yields the same value.
    Fixed(u32),
    /// Yields a value in the inclusive range.
    Range(u32, u32),
}

impl DropValue {
    /// Inclusive bounds of the value, normalised so that `min <= max`.
    #[must_use]
    pub fn bounds(self) -> (u32, u32) {
        match self {
            Self::Fixed(value) => (value, value),
            Self::Range(a, b) => (a.min(b), a.max(b)),
        }
    }

    /// Draws a value uniformly within [`DropValue::bounds`].
    pub fn roll<R: Rng + ?Sized>(self, rng: &mut R) -> u32 {
        let (min, max) = self.bounds();
        rng.gen_range(min..=max)
    }
}

/// Items the player can consume from the inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Consumable {
    /// Heals a single point and may yield a seed.
    Apple,
    /// Heals a rolled amount.
    Meat,
    /// Restores a rolled amount of mana.
    Mead,
}

impl Consumable {
    /// Inclusive range of the restored amount.
    #[must_use]
    pub const fn restore_range(self) -> (u32, u32) {
        match self {
            Self::Apple => (1, 1),
            Self::Meat => (15, 25),
            Self::Mead => (12, 22),
        }
    }
}

/// Stackable goods carried by the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inventory {
    /// Apples carried.
    pub apples: u32,
    /// Meat portions carried.
    pub meat: u32,
    /// Seeds carried.
    pub seeds: u32,
    /// Mead flasks carried.
    pub mead: u32,
    /// Wood pieces carried.
    pub wood: u32,
}

impl Inventory {
    /// Mutable counter backing the provided consumable.
    pub fn slot_mut(&mut self, item: Consumable) -> &mut u32 {
        match item {
            Consumable::Apple => &mut self.apples,
            Consumable::Meat => &mut self.meat,
            Consumable::Mead => &mut self.mead,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn rolled_values_stay_within_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        for _ in 0..200 {
            let value = DropValue::Range(22, 12).roll(&mut rng);
            assert!((12..=22).contains(&value));
        }
        assert_eq!(DropValue::Fixed(1).roll(&mut rng), 1);
    }

    #[test]
    fn labels_parse_back_to_kinds() {
        for kind in PickupKind::ALL {
            assert_eq!(kind.label().parse::<PickupKind>(), Ok(kind));
        }
        assert_eq!("xp".parse::<PickupKind>(), Ok(PickupKind::Experience));
    }

    #[test]
    fn unknown_label_is_reported() {
        let error = "diamond".parse::<PickupKind>().unwrap_err();
        assert_eq!(error, UnknownPickupKind("diamond".to_owned()));
    }

    #[test]
    fn inverted_ranges_are_normalised() {
        assert_eq!(DropValue::Range(9, 3).bounds(), (3, 9));
        assert_eq!(DropValue::Fixed(4).bounds(), (4, 4));
    }
}
