use super::*;
use crate::FIELD_LIMIT;
use crate::HAND_SIZE;
use crate::PRIZES;
use crate::cards::Catalogue;
use crate::prompt::PromptKind;
use crate::prompt::Purpose;
use crate::state::Pile;
use crate::state::Reason;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use std::sync::Arc;

pub const CHOOSE_CARD_TO_DISCARD: &str = "CHOOSE_CARD_TO_DISCARD";

/// Minimal reference rules: creatures and energy go into play,
/// trainers make the opponent discard, attacks take prize cards.
pub struct BasicRules {
    catalogue: Arc<Catalogue>,
}

impl BasicRules {
    pub fn new(catalogue: Arc<Catalogue>) -> Self {
        Self { catalogue }
    }
}

impl Rules for BasicRules {
    fn setup(&self, decks: &[Vec<String>], seed: u64) -> Board {
        let ref mut rng = SmallRng::seed_from_u64(seed);
        let piles = decks
            .iter()
            .map(|deck| {
                let mut deck = deck.clone();
                deck.shuffle(rng);
                let hand = deck.split_off(deck.len().saturating_sub(HAND_SIZE));
                let prizes = deck.split_off(deck.len().saturating_sub(PRIZES));
                Pile {
                    deck,
                    hand,
                    prizes,
                    ..Pile::default()
                }
            })
            .collect();
        Board::new(piles)
    }

    fn apply(&self, board: &Board, seat: Position, action: &Action) -> Result<Effect, GameError> {
        if board.is_over() {
            return Err(GameError::GameFinished);
        }
        if seat >= board.seats() {
            return Err(GameError::NotJoined);
        }
        match action {
            Action::Concede => {
                let mut next = board.clone();
                next.forfeit(seat, Reason::Concession);
                Ok(next.into())
            }
            _ if seat != board.active => Err(GameError::NotYourTurn),
            Action::Play { card } => self.play(board, seat, *card),
            Action::Attack => self.attack(board, seat),
            Action::Pass => Ok(Self::end_turn(board.clone()).into()),
        }
    }

    fn resolve(&self, board: &Board, request: &Request, answer: &Answer) -> Result<Effect, GameError> {
        request.kind.validate(answer)?;
        match (request.purpose, answer) {
            (Purpose::Notice, _) => Ok(board.clone().into()),
            (Purpose::Discard { seat }, Answer::Cards(picks)) => {
                let mut next = board.clone();
                let pile = next
                    .piles
                    .get_mut(seat)
                    .ok_or_else(|| GameError::IllegalAction(String::from("no such seat")))?;
                if picks.iter().any(|i| *i >= pile.hand.len()) {
                    return Err(GameError::IllegalAction(String::from("card no longer in hand")));
                }
                let mut picks = picks.clone();
                picks.sort_unstable_by(|a, b| b.cmp(a));
                for i in picks {
                    let card = pile.hand.remove(i);
                    pile.discard.push(card);
                }
                Ok(next.into())
            }
            (Purpose::Discard { .. }, _) => Err(GameError::IllegalAction(String::from(
                "discard needs a card choice",
            ))),
        }
    }
}

impl BasicRules {
    fn play(&self, board: &Board, seat: Position, index: usize) -> Result<Effect, GameError> {
        let mut next = board.clone();
        let opponent = next.next(seat);
        let pile = &mut next.piles[seat];
        let name = pile
            .hand
            .get(index)
            .cloned()
            .ok_or_else(|| GameError::IllegalAction(format!("no card at {}", index)))?;
        let def = self
            .catalogue
            .get(&name)
            .ok_or_else(|| GameError::IllegalAction(format!("unknown card {}", name)))?;
        if def.is_trainer() {
            pile.discard.push(pile.hand.remove(index));
            let hand = &next.piles[opponent].hand;
            let requests = match hand.is_empty() {
                true => vec![],
                false => vec![Request {
                    seat: opponent,
                    kind: PromptKind::ChooseCards {
                        cards: hand.clone(),
                        min: 1,
                        max: 1,
                    },
                    message: String::from(CHOOSE_CARD_TO_DISCARD),
                    purpose: Purpose::Discard { seat: opponent },
                }],
            };
            Ok(Effect {
                board: next,
                requests,
            })
        } else if pile.field.len() >= FIELD_LIMIT {
            Err(GameError::IllegalAction(String::from("field is full")))
        } else {
            pile.field.push(pile.hand.remove(index));
            Ok(next.into())
        }
    }

    fn attack(&self, board: &Board, seat: Position) -> Result<Effect, GameError> {
        if board.attacked {
            return Err(GameError::IllegalAction(String::from("already attacked")));
        }
        let pile = &board.piles[seat];
        if !pile
            .field
            .iter()
            .filter_map(|c| self.catalogue.get(c))
            .any(|d| d.is_creature())
        {
            return Err(GameError::IllegalAction(String::from("no creature in play")));
        }
        let mut next = board.clone();
        next.attacked = true;
        let pile = &mut next.piles[seat];
        if let Some(prize) = pile.prizes.pop() {
            pile.hand.push(prize);
        }
        if pile.prizes.is_empty() {
            next.forfeit(next.next(seat), Reason::Prizes);
            return Ok(next.into());
        }
        Ok(Self::end_turn(next).into())
    }

    /// Passes play to the next seat, which draws; an empty deck loses.
    fn end_turn(mut board: Board) -> Board {
        let next = board.next(board.active);
        board.active = next;
        board.turn += 1;
        board.attacked = false;
        match board.piles[next].deck.pop() {
            Some(card) => board.piles[next].hand.push(card),
            None => board.forfeit(next, Reason::DeckOut),
        }
        board
    }
}
