//! Shuffled draw order over catalog indices.
//!
//! Every generation of the deck is a permutation of `0..N`; drawing walks it
//! in order and the deck reshuffles itself once exhausted. Any `N`
//! consecutive draws from a fresh deck therefore cover the whole catalog
//! exactly once. The last pick of one generation may equal the first of the
//! next.

use rand_core::RngCore;

pub struct Deck<const N: usize> {
    order: [u16; N],
    cursor: usize,
}

impl<const N: usize> Deck<N> {
    pub fn shuffled(rng: &mut impl RngCore) -> Self {
        let mut deck = Self {
            order: [0; N],
            cursor: 0,
        };
        deck.reshuffle(rng);
        deck
    }

    /// Refill with `0..N` and Fisher-Yates shuffle, last index down to 1.
    pub fn reshuffle(&mut self, rng: &mut impl RngCore) {
        for (i, slot) in self.order.iter_mut().enumerate() {
            *slot = i as u16;
        }
        for i in (1..N).rev() {
            let j = uniform_below(rng, i as u32 + 1) as usize;
            self.order.swap(i, j);
        }
        self.cursor = 0;
    }

    /// Next index in the current generation, reshuffling first when spent.
    ///
    /// An empty catalog always yields 0, which callers must not render.
    pub fn draw(&mut self, rng: &mut impl RngCore) -> u16 {
        if N == 0 {
            return 0;
        }
        if self.cursor >= N {
            self.reshuffle(rng);
        }
        let index = self.order[self.cursor];
        self.cursor += 1;
        index
    }

    /// Draws left before the next reshuffle.
    pub fn remaining(&self) -> usize {
        N - self.cursor.min(N)
    }
}

/// Uniform value in `0..bound` by rejection sampling. `bound` must be non-zero.
fn uniform_below(rng: &mut impl RngCore, bound: u32) -> u32 {
    let zone = u32::MAX - u32::MAX % bound;
    loop {
        let value = rng.next_u32();
        if value < zone {
            return value % bound;
        }
    }
}
