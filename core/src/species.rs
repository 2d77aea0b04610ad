//! Static species table describing every hostile creature.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::items::{DropValue, PickupKind};

/// Aggro range shared by every free-roaming species.
pub const DEFAULT_AGGRO_RANGE: f32 = 380.0;

/// Identifier of an entry in the static species table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpeciesId(u8);

impl SpeciesId {
    /// Wolf, the fast skirmisher.
    pub const WOLF: SpeciesId = SpeciesId(0);
    /// Boar, the apple-foraging bruiser.
    pub const BOAR: SpeciesId = SpeciesId(1);
    /// Viper, the poisonous stalker.
    pub const VIPER: SpeciesId = SpeciesId(2);
    /// Corpse, the slow colossus.
    pub const CORPSE: SpeciesId = SpeciesId(3);

    /// Every species in table order.
    pub const ALL: [SpeciesId; 4] = [Self::WOLF, Self::BOAR, Self::VIPER, Self::CORPSE];

    /// Creates a species identifier from its table index.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Static definition for the species, or `None` when the index is unknown.
    #[must_use]
    pub fn definition(&self) -> Option<&'static SpeciesDefinition> {
        SPECIES.get(usize::from(self.0))
    }

    /// Resolves a species from its stable snapshot label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        SPECIES
            .iter()
            .find(|definition| definition.label == label)
            .map(|definition| definition.id)
    }
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.definition() {
            Some(definition) => f.write_str(definition.label),
            None => write!(f, "species#{}", self.0),
        }
    }
}

/// Behaviour family a species' megabeast follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MegabeastKind {
    /// Fast lunges and spread volleys.
    Skirmisher,
    /// Telegraphed charges and minion calls.
    Bruiser,
    /// Poison bites and teleport ambushes.
    Stalker,
    /// Ground slams, projectile rings and minion hordes.
    Colossus,
}

/// One entry of a species' weighted drop table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropRule {
    /// Pickup kind produced by the rule.
    pub kind: PickupKind,
    /// Probability in `[0, 1]` that the rule fires on a kill.
    pub chance: f32,
    /// Value attached to the dropped pickup.
    pub value: DropValue,
}

impl DropRule {
    const fn new(kind: PickupKind, chance: f32, value: DropValue) -> Self {
        Self {
            kind,
            chance,
            value,
        }
    }
}

/// Immutable stats shared by every member of a species.
#[derive(Debug)]
pub struct SpeciesDefinition {
    /// Identifier of the species.
    pub id: SpeciesId,
    /// Display name used in notifications.
    pub name: &'static str,
    /// Stable lowercase label used by snapshots.
    pub label: &'static str,
    /// Base hit points of a regular member.
    pub hp: u32,
    /// Damage dealt by a contact attack.
    pub attack: u32,
    /// Movement speed in world units per frame.
    pub speed: f32,
    /// Attack reach, also the forager's apple search radius.
    pub reach: f32,
    /// Distance below which free-roamers chase the player.
    pub aggro_range: f32,
    /// Inclusive range of items dropped on death.
    pub drop_count: (u32, u32),
    /// Weighted drop table; experience is always present.
    pub drops: &'static [DropRule],
    /// Megabeast family spawned when the species' nest falls.
    pub megabeast: MegabeastKind,
    /// Pickup the species walks to and eats instead of engaging.
    pub forages: Option<PickupKind>,
}

impl SpeciesDefinition {
    /// Drop rules excluding the guaranteed experience entry.
    pub fn secondary_drops(&self) -> impl Iterator<Item = &'static DropRule> {
        self.drops
            .iter()
            .filter(|rule| rule.kind != PickupKind::Experience)
    }
}

/// Returns the full species table in identifier order.
#[must_use]
pub fn table() -> &'static [SpeciesDefinition] {
    &SPECIES
}

static SPECIES: [SpeciesDefinition; 4] = [
    SpeciesDefinition {
        id: SpeciesId::WOLF,
        name: "Wolf",
        label: "wolf",
        hp: 30,
        attack: 8,
        speed: 1.6,
        reach: 20.0,
        aggro_range: DEFAULT_AGGRO_RANGE,
        drop_count: (1, 2),
        drops: &[
            DropRule::new(PickupKind::Experience, 1.0, DropValue::Range(10, 20)),
            DropRule::new(PickupKind::Meat, 0.6, DropValue::Fixed(1)),
            DropRule::new(PickupKind::Apple, 0.3, DropValue::Fixed(1)),
            DropRule::new(PickupKind::Mead, 0.2, DropValue::Fixed(1)),
            DropRule::new(PickupKind::Seed, 0.1, DropValue::Fixed(1)),
        ],
        megabeast: MegabeastKind::Skirmisher,
        forages: None,
    },
    SpeciesDefinition {
        id: SpeciesId::BOAR,
        name: "Boar",
        label: "boar",
        hp: 40,
        attack: 10,
        speed: 1.4,
        reach: 16.0,
        aggro_range: DEFAULT_AGGRO_RANGE,
        drop_count: (2, 3),
        drops: &[
            DropRule::new(PickupKind::Experience, 1.0, DropValue::Range(15, 25)),
            DropRule::new(PickupKind::Meat, 0.7, DropValue::Fixed(1)),
            DropRule::new(PickupKind::Apple, 0.4, DropValue::Fixed(1)),
            DropRule::new(PickupKind::Mead, 0.3, DropValue::Fixed(1)),
            DropRule::new(PickupKind::Seed, 0.15, DropValue::Fixed(1)),
        ],
        megabeast: MegabeastKind::Bruiser,
        forages: Some(PickupKind::Apple),
    },
    SpeciesDefinition {
        id: SpeciesId::VIPER,
        name: "Viper",
        label: "viper",
        hp: 20,
        attack: 6,
        speed: 1.8,
        reach: 14.0,
        aggro_range: DEFAULT_AGGRO_RANGE,
        drop_count: (1, 2),
        drops: &[
            DropRule::new(PickupKind::Experience, 1.0, DropValue::Range(8, 15)),
            DropRule::new(PickupKind::Meat, 0.5, DropValue::Fixed(1)),
            DropRule::new(PickupKind::Apple, 0.25, DropValue::Fixed(1)),
            DropRule::new(PickupKind::Mead, 0.15, DropValue::Fixed(1)),
            DropRule::new(PickupKind::Seed, 0.08, DropValue::Fixed(1)),
        ],
        megabeast: MegabeastKind::Stalker,
        forages: None,
    },
    SpeciesDefinition {
        id: SpeciesId::CORPSE,
        name: "Corpse",
        label: "corpse",
        hp: 50,
        attack: 12,
        speed: 1.2,
        reach: 18.0,
        aggro_range: DEFAULT_AGGRO_RANGE,
        drop_count: (3, 5),
        drops: &[
            DropRule::new(PickupKind::Experience, 1.0, DropValue::Range(20, 35)),
            DropRule::new(PickupKind::Meat, 0.8, DropValue::Fixed(1)),
            DropRule::new(PickupKind::Apple, 0.5, DropValue::Fixed(1)),
            DropRule::new(PickupKind::Mead, 0.4, DropValue::Fixed(1)),
            DropRule::new(PickupKind::Seed, 0.2, DropValue::Fixed(1)),
        ],
        megabeast: MegabeastKind::Colossus,
        forages: None,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_identifier() {
        for (index, definition) in table().iter().enumerate() {
            assert_eq!(usize::from(definition.id.get()), index);
        }
    }

    #[test]
    fn every_species_guarantees_experience() {
        for definition in table() {
            let experience = definition
                .drops
                .iter()
                .find(|rule| rule.kind == PickupKind::Experience)
                .expect("experience rule");
            assert!((experience.chance - 1.0).abs() < f32::EPSILON);
            assert!(definition.drop_count.0 >= 1);
            assert!(definition.drop_count.0 <= definition.drop_count.1);
        }
    }

    #[test]
    fn only_the_boar_forages() {
        let foragers: Vec<_> = table()
            .iter()
            .filter(|definition| definition.forages.is_some())
            .map(|definition| definition.id)
            .collect();
        assert_eq!(foragers, vec![SpeciesId::BOAR]);
    }

    #[test]
    fn labels_resolve_and_unknown_indices_do_not() {
        assert_eq!(SpeciesId::from_label("viper"), Some(SpeciesId::VIPER));
        assert_eq!(SpeciesId::from_label("dragon"), None);
        assert!(SpeciesId::new(9).definition().is_none());
    }
}
