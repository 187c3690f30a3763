//! Ring buffer of committed picks with a browsing cursor.
//!
//! Logical position 0 is the oldest retained entry and `len - 1` the newest.
//! Once full, a push overwrites the oldest entry. The cursor always lands on
//! the newest entry after a push.

/// Raw ring state, as persisted across deep sleep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawHistory<const N: usize> {
    pub slots: [u16; N],
    /// Physical index of the next write.
    pub head: usize,
    pub len: usize,
    /// Logical browsing position.
    pub cursor: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct History<const N: usize> {
    slots: [u16; N],
    head: usize,
    len: usize,
    cursor: usize,
}

impl<const N: usize> History<N> {
    pub const fn new() -> Self {
        Self {
            slots: [0; N],
            head: 0,
            len: 0,
            cursor: 0,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn at_oldest(&self) -> bool {
        self.cursor == 0
    }

    pub fn at_newest(&self) -> bool {
        self.len == 0 || self.cursor + 1 >= self.len
    }

    /// Append a pick, evicting the oldest once full.
    pub fn push(&mut self, index: u16) {
        if N == 0 {
            return;
        }
        self.slots[self.head] = index;
        self.head = (self.head + 1) % N;
        if self.len < N {
            self.len += 1;
        }
        self.cursor = self.len - 1;
    }

    /// Entry at logical position `pos`.
    pub fn get(&self, pos: usize) -> Option<u16> {
        if pos >= self.len {
            return None;
        }
        Some(self.slots[(self.oldest_slot() + pos) % N])
    }

    /// Entry under the cursor.
    pub fn at_cursor(&self) -> Option<u16> {
        self.get(self.cursor)
    }

    /// Move the cursor one entry older and return that entry.
    /// `None` (cursor untouched) when empty or already at the oldest.
    pub fn step_back(&mut self) -> Option<u16> {
        if self.is_empty() || self.at_oldest() {
            return None;
        }
        self.cursor -= 1;
        self.get(self.cursor)
    }

    /// Move the cursor one entry newer and return that entry.
    /// `None` (cursor untouched) when empty or already at the newest.
    pub fn step_forward(&mut self) -> Option<u16> {
        if self.at_newest() {
            return None;
        }
        self.cursor += 1;
        self.get(self.cursor)
    }

    /// Put the cursor back where a dropped request found it.
    pub(crate) fn set_cursor(&mut self, cursor: usize) {
        if cursor < self.len {
            self.cursor = cursor;
        }
    }

    /// Entries oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        (0..self.len).filter_map(move |pos| self.get(pos))
    }

    pub fn to_raw(&self) -> RawHistory<N> {
        RawHistory {
            slots: self.slots,
            head: self.head,
            len: self.len,
            cursor: self.cursor,
        }
    }

    /// Rebuild from persisted parts. `None` unless every field is in bounds
    /// and every retained entry is a valid index into an `N`-item catalog.
    pub fn from_raw(raw: RawHistory<N>) -> Option<Self> {
        if raw.len > N {
            return None;
        }
        if N > 0 && raw.head >= N {
            return None;
        }
        if N == 0 && raw.head != 0 {
            return None;
        }
        let cursor_ok = if raw.len == 0 {
            raw.cursor == 0
        } else {
            raw.cursor < raw.len
        };
        if !cursor_ok {
            return None;
        }

        let history = Self {
            slots: raw.slots,
            head: raw.head,
            len: raw.len,
            cursor: raw.cursor,
        };
        if history.iter().any(|index| index as usize >= N) {
            return None;
        }
        Some(history)
    }

    fn oldest_slot(&self) -> usize {
        if N == 0 {
            return 0;
        }
        (self.head + N - self.len) % N
    }
}

impl<const N: usize> Default for History<N> {
    fn default() -> Self {
        Self::new()
    }
}
