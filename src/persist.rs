//! Suspend/resume protocol - carries selection state across deep sleep.
//!
//! Before suspending, the engine's durable subset is written to the
//! [`DurableStore`] together with a format marker, followed by the
//! "was-suspended" flag. On boot the flag decides cold boot vs. wake; on wake
//! the snapshot is read back and accepted only if the marker matches, every
//! value is in bounds for the compiled catalog, and the history blob has the
//! exact expected length. Anything else counts as "no history".
//!
//! Store layout (all under one namespace):
//!
//! | Key      | Kind   | Content |
//! |----------|--------|---------|
//! | `slept`  | scalar | 1 while a wake is pending classification |
//! | `fmt`    | scalar | format marker, see [`format_marker`] |
//! | `cur`    | scalar | current index, `0xFFFF` = none |
//! | `h_head` | scalar | ring write index |
//! | `h_len`  | scalar | retained entries |
//! | `h_pos`  | scalar | browsing cursor |
//! | `hist`   | bytes  | raw ring slots, `u16` little-endian each |

use crate::error::Error;
use crate::selection::{RawHistory, SelectionEngine, Snapshot};
use rand_core::RngCore;

/// Raw key-value persistence shared by every writer under one namespace.
///
/// Reads never fail: a missing or unreadable key yields the default (or a
/// length of zero).
pub trait DurableStore {
    fn get_scalar(&mut self, key: &'static str, default: u32) -> u32;
    fn put_scalar(&mut self, key: &'static str, value: u32) -> Result<(), Error>;
    /// Copy the blob stored under `key` into `buf` and return its stored
    /// length. Bytes beyond `buf.len()` are not copied.
    fn get_bytes(&mut self, key: &'static str, buf: &mut [u8]) -> usize;
    fn put_bytes(&mut self, key: &'static str, bytes: &[u8]) -> Result<(), Error>;
}

pub mod keys {
    pub const SLEPT: &str = "slept";
    pub const FORMAT: &str = "fmt";
    pub const CURRENT: &str = "cur";
    pub const HISTORY_HEAD: &str = "h_head";
    pub const HISTORY_LEN: &str = "h_len";
    pub const HISTORY_CURSOR: &str = "h_pos";
    pub const HISTORY: &str = "hist";
}

/// Bump when the layout above changes.
pub const FORMAT_VERSION: u32 = 1;

/// Largest history blob we stage on the stack (256 entries).
pub const MAX_HISTORY_BYTES: usize = 512;

const NO_CURRENT: u32 = 0xFFFF;

/// Marker for an `n`-item catalog. A catalog-size change yields a different
/// marker, which invalidates stale snapshots.
pub const fn format_marker(n: usize) -> u32 {
    0xBA00_0000 | (FORMAT_VERSION << 16) | (n as u32 & 0xFFFF)
}

/// How this run started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootKind {
    Cold,
    Wake,
}

/// Why a stored snapshot was not used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rejection {
    /// Nothing was ever written.
    Absent,
    /// Written by another format or catalog size.
    Marker,
    /// A value is out of range for this catalog.
    Bounds,
    /// The history blob has the wrong length.
    Length,
}

/// Outcome of [`resume_or_start`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resumption {
    /// The snapshot was accepted.
    Restored,
    /// Started from a reset engine; `drawn` is the boot pick, if any.
    Fresh { drawn: Option<u16> },
}

/// Persist the engine's durable state. Call strictly before suspending.
///
/// The marker is cleared first and written last, so a partial write reads
/// back as [`Rejection::Marker`] rather than as mixed state.
pub fn prepare_for_suspend<const N: usize, R: RngCore, S: DurableStore>(
    engine: &SelectionEngine<N, R>,
    store: &mut S,
) -> Result<(), Error> {
    let snapshot = engine.snapshot();
    let blob_len = N * 2;
    if blob_len > MAX_HISTORY_BYTES {
        return Err(Error::BufferOverflow);
    }

    let mut blob = [0u8; MAX_HISTORY_BYTES];
    for (chunk, slot) in blob[..blob_len]
        .chunks_exact_mut(2)
        .zip(snapshot.history.slots.iter())
    {
        chunk.copy_from_slice(&slot.to_le_bytes());
    }

    store.put_scalar(keys::FORMAT, 0)?;
    store.put_scalar(keys::CURRENT, snapshot.current.map_or(NO_CURRENT, u32::from))?;
    store.put_scalar(keys::HISTORY_HEAD, snapshot.history.head as u32)?;
    store.put_scalar(keys::HISTORY_LEN, snapshot.history.len as u32)?;
    store.put_scalar(keys::HISTORY_CURSOR, snapshot.history.cursor as u32)?;
    store.put_bytes(keys::HISTORY, &blob[..blob_len])?;
    store.put_scalar(keys::FORMAT, format_marker(N))?;

    store.put_scalar(keys::SLEPT, 1)?;
    info!(
        "Persist: snapshot saved ({} entries, cursor {})",
        snapshot.history.len,
        snapshot.history.cursor
    );
    Ok(())
}

/// Read the was-suspended flag. The flag is not cleared here.
pub fn classify_boot<S: DurableStore>(store: &mut S) -> BootKind {
    if store.get_scalar(keys::SLEPT, 0) == 1 {
        BootKind::Wake
    } else {
        BootKind::Cold
    }
}

/// Clear the was-suspended flag once the device has run past its grace
/// window, so an early reset after wake is still classified as a wake.
pub fn clear_suspend_marker<S: DurableStore>(store: &mut S) -> Result<(), Error> {
    store.put_scalar(keys::SLEPT, 0)
}

/// Load the stored snapshot into `engine`. On rejection the engine is left
/// untouched.
pub fn restore<const N: usize, R: RngCore, S: DurableStore>(
    engine: &mut SelectionEngine<N, R>,
    store: &mut S,
) -> Result<(), Rejection> {
    match store.get_scalar(keys::FORMAT, 0) {
        0 => return Err(Rejection::Absent),
        marker if marker != format_marker(N) => return Err(Rejection::Marker),
        _ => {}
    }

    let blob_len = N * 2;
    if blob_len > MAX_HISTORY_BYTES {
        return Err(Rejection::Length);
    }
    let mut blob = [0u8; MAX_HISTORY_BYTES];
    if store.get_bytes(keys::HISTORY, &mut blob[..blob_len]) != blob_len {
        return Err(Rejection::Length);
    }

    let current = match store.get_scalar(keys::CURRENT, NO_CURRENT) {
        NO_CURRENT => None,
        index => Some(u16::try_from(index).map_err(|_| Rejection::Bounds)?),
    };

    let mut slots = [0u16; N];
    for (slot, chunk) in slots.iter_mut().zip(blob[..blob_len].chunks_exact(2)) {
        *slot = u16::from_le_bytes([chunk[0], chunk[1]]);
    }
    let history = RawHistory {
        slots,
        head: store.get_scalar(keys::HISTORY_HEAD, u32::MAX) as usize,
        len: store.get_scalar(keys::HISTORY_LEN, u32::MAX) as usize,
        cursor: store.get_scalar(keys::HISTORY_CURSOR, u32::MAX) as usize,
    };

    if engine.apply_snapshot(Snapshot { current, history }) {
        Ok(())
    } else {
        Err(Rejection::Bounds)
    }
}

/// Bring the engine up for this boot.
///
/// A wake restores the snapshot when it is valid. Otherwise the engine is
/// reset; after a rejected snapshot one fresh item is always drawn, after a
/// cold boot only when `draw_on_cold_boot` is set.
pub fn resume_or_start<const N: usize, R: RngCore, S: DurableStore>(
    engine: &mut SelectionEngine<N, R>,
    store: &mut S,
    boot: BootKind,
    draw_on_cold_boot: bool,
) -> Resumption {
    let draw = match boot {
        BootKind::Wake => match restore(engine, store) {
            Ok(()) => {
                info!("Persist: snapshot restored");
                return Resumption::Restored;
            }
            Err(rejection) => {
                warn!("Persist: snapshot rejected ({:?}), starting fresh", rejection);
                true
            }
        },
        BootKind::Cold => draw_on_cold_boot,
    };

    engine.reset();
    let drawn = if draw { engine.draw_fresh() } else { None };
    Resumption::Fresh { drawn }
}
