//! Content selection - decides which catalog index is shown next.
//!
//! The engine owns the shuffled [`Deck`], the navigation [`History`] and the
//! index currently on screen. A request resolves to a [`PendingSelection`];
//! the caller waits out the work delay and then calls
//! [`SelectionEngine::commit`].
//!
//! | Action | Resolves to | History on commit |
//! |--------|-------------|-------------------|
//! | Random | fresh deck draw | appended |
//! | Next   | entry after the cursor, else a fresh draw | appended only if fresh |
//! | Prev   | entry before the cursor, else no work | untouched |

pub mod deck;
pub mod history;


pub use deck::Deck;
pub use history::{History, RawHistory};

use crate::time::Millis;
use rand_core::RngCore;

/// User-requested selection action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    Random,
    Next,
    Prev,
}

/// Work accepted but not yet committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingSelection {
    pub action: Action,
    /// Catalog index the request resolved to.
    pub index: u16,
    /// Fresh deck draw rather than history navigation.
    pub is_new: bool,
    pub requested_at: Millis,
    /// Cursor position before the request moved it.
    prior_cursor: usize,
}

/// Result of a commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Committed {
    pub action: Action,
    pub index: u16,
}

/// Durable subset of the engine state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot<const N: usize> {
    /// Index on screen, `None` before anything was shown.
    pub current: Option<u16>,
    pub history: RawHistory<N>,
}

pub struct SelectionEngine<const N: usize, R> {
    rng: R,
    deck: Deck<N>,
    history: History<N>,
    current: Option<u16>,
    pending: Option<PendingSelection>,
}

impl<const N: usize, R: RngCore> SelectionEngine<N, R> {
    /// Fresh engine: shuffled deck, empty history.
    pub fn new(mut rng: R) -> Self {
        let deck = Deck::shuffled(&mut rng);
        Self {
            rng,
            deck,
            history: History::new(),
            current: None,
            pending: None,
        }
    }

    /// Reshuffle the deck and forget all history.
    pub fn reset(&mut self) {
        self.deck.reshuffle(&mut self.rng);
        self.history.clear();
        self.current = None;
        self.pending = None;
    }

    /// Resolve `action` into pending work. Returns `false` when there is
    /// nothing to do, in which case no state changes.
    pub fn request(&mut self, action: Action, now: Millis) -> bool {
        if self.pending.is_some() {
            debug!("Selection: busy, {:?} dropped", action);
            return false;
        }
        if N == 0 {
            info!("Selection: catalog is empty");
            return false;
        }

        let prior_cursor = self.history.cursor();
        let (index, is_new) = match action {
            Action::Random => (self.deck.draw(&mut self.rng), true),
            Action::Prev => match self.history.step_back() {
                Some(index) => (index, false),
                None => {
                    info!("Selection: already at oldest entry");
                    return false;
                }
            },
            Action::Next => match self.history.step_forward() {
                Some(index) => (index, false),
                None => (self.deck.draw(&mut self.rng), true),
            },
        };

        debug!("Selection: {:?} -> {} (new={})", action, index, is_new);
        self.pending = Some(PendingSelection {
            action,
            index,
            is_new,
            requested_at: now,
            prior_cursor,
        });
        true
    }

    pub fn pending(&self) -> Option<&PendingSelection> {
        self.pending.as_ref()
    }

    /// Finalise pending work: it becomes current, and fresh draws are
    /// appended to history. Navigation already moved the cursor on request.
    pub fn commit(&mut self) -> Option<Committed> {
        let pending = self.pending.take()?;
        self.current = Some(pending.index);
        if pending.is_new {
            self.history.push(pending.index);
        }
        Some(Committed {
            action: pending.action,
            index: pending.index,
        })
    }

    /// Drop pending work without committing, undoing its cursor move.
    pub fn abandon_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.history.set_cursor(pending.prior_cursor);
        }
    }

    /// Draw, record and make current a fresh pick outside the request
    /// cycle (boot). `None` for an empty catalog.
    pub fn draw_fresh(&mut self) -> Option<u16> {
        if N == 0 {
            return None;
        }
        let index = self.deck.draw(&mut self.rng);
        self.history.push(index);
        self.current = Some(index);
        Some(index)
    }

    pub fn current(&self) -> Option<u16> {
        self.current
    }

    pub fn history(&self) -> &History<N> {
        &self.history
    }

    pub fn snapshot(&self) -> Snapshot<N> {
        Snapshot {
            current: self.current,
            history: self.history.to_raw(),
        }
    }

    /// Adopt a persisted snapshot. Returns `false` and leaves the engine
    /// untouched when any field is out of bounds for this catalog.
    ///
    /// The deck is not part of the snapshot and is reshuffled.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot<N>) -> bool {
        let Some(history) = History::from_raw(snapshot.history) else {
            return false;
        };
        let current_ok = match snapshot.current {
            Some(index) => (index as usize) < N,
            None => history.is_empty(),
        };
        if !current_ok {
            return false;
        }

        self.deck.reshuffle(&mut self.rng);
        self.history = history;
        self.current = snapshot.current;
        self.pending = None;
        true
    }
}
