use super::*;
use crate::DECK_SIZE;
use crate::MAX_COPIES;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Deck-legality verdict plus the elements the deck plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    valid: bool,
    types: BTreeSet<Element>,
}

impl Analysis {
    pub fn new(catalogue: &Catalogue, cards: &[String]) -> Self {
        let types = cards
            .iter()
            .filter_map(|c| catalogue.get(c))
            .filter(|d| d.is_creature())
            .filter_map(Definition::element)
            .collect();
        Self {
            valid: Self::check(catalogue, cards),
            types,
        }
    }
    pub fn is_valid(&self) -> bool {
        self.valid
    }
    /// Elements of the creatures in the deck, in stable order.
    pub fn deck_type(&self) -> Vec<Element> {
        self.types.iter().copied().collect()
    }
    fn check(catalogue: &Catalogue, cards: &[String]) -> bool {
        if cards.len() != DECK_SIZE {
            return false;
        }
        let mut counts = BTreeMap::<&str, usize>::new();
        for card in cards {
            *counts.entry(card.as_str()).or_default() += 1;
        }
        let mut basics = 0;
        for (name, n) in counts {
            match catalogue.get(name) {
                None => return false,
                Some(def) if def.is_basic_energy() => {}
                Some(_) if n > MAX_COPIES => return false,
                Some(def) if def.is_basic_creature() => basics += n,
                Some(_) => {}
            }
        }
        basics > 0
    }
}
