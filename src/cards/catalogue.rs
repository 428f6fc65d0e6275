use super::*;
use std::collections::HashMap;

/// Registry of every card the server knows how to play.
/// Constructed by the process entry point and shared by reference.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    cards: HashMap<String, Definition>,
}

impl Catalogue {
    pub fn new<I>(definitions: I) -> Self
    where
        I: IntoIterator<Item = Definition>,
    {
        Self {
            cards: definitions
                .into_iter()
                .map(|d| (d.name.clone(), d))
                .collect(),
        }
    }
    /// The built-in card set.
    pub fn standard() -> Self {
        use Element::*;
        use Stage::*;
        Self::new([
            Definition::creature("Ember Fox", Basic, Fire, 60),
            Definition::creature("Blaze Wolf", Stage1, Fire, 90),
            Definition::creature("Cinder Drake", Stage2, Fire, 140),
            Definition::creature("Tide Otter", Basic, Water, 70),
            Definition::creature("Reef Serpent", Stage1, Water, 100),
            Definition::creature("Moss Toad", Basic, Grass, 60),
            Definition::creature("Spark Mouse", Basic, Lightning, 50),
            Definition::creature("Stone Ram", Basic, Fighting, 80),
            Definition::creature("Mist Wisp", Basic, Psychic, 50),
            Definition::trainer("Field Research"),
            Definition::trainer("Quick Ball"),
            Definition::trainer("Switch"),
            Definition::trainer("Potion"),
            Definition::energy("Fire Energy", Fire, true),
            Definition::energy("Water Energy", Water, true),
            Definition::energy("Grass Energy", Grass, true),
            Definition::energy("Lightning Energy", Lightning, true),
            Definition::energy("Psychic Energy", Psychic, true),
            Definition::energy("Fighting Energy", Fighting, true),
            Definition::energy("Double Colorless Energy", Colorless, false),
        ])
    }
    /// A legal two-element deck built from the standard set.
    pub fn starter_deck() -> Vec<String> {
        [
            ("Ember Fox", 4),
            ("Blaze Wolf", 4),
            ("Tide Otter", 4),
            ("Field Research", 4),
            ("Quick Ball", 4),
            ("Switch", 4),
            ("Fire Energy", 18),
            ("Water Energy", 18),
        ]
        .into_iter()
        .flat_map(|(name, n)| std::iter::repeat_n(name.to_string(), n))
        .collect()
    }
    pub fn is_card_defined(&self, name: &str) -> bool {
        self.cards.contains_key(name)
    }
    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.cards.get(name)
    }
    pub fn len(&self) -> usize {
        self.cards.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
    pub fn analyse(&self, cards: &[String]) -> Analysis {
        Analysis::new(self, cards)
    }
}
