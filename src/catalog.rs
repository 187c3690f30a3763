//! The insult table.
//!
//! Fixed at compile time; history capacity and the snapshot format marker
//! both derive from its length.

use crate::persist::MAX_HISTORY_BYTES;

/// Number of items in [`CATALOG`].
pub const CATALOG_LEN: usize = 8;

// The whole history ring must fit the snapshot blob.
const _: () = assert!(CATALOG_LEN * 2 <= MAX_HISTORY_BYTES);

pub static CATALOG: [&str; CATALOG_LEN] = [
    "You fight like a dairy farmer.",
    "You have the manners of a troll.",
    "I've spoken with sewer rats more polite than you.",
    "Oh look, both your weapons are tiny!",
    "Soon you'll be wearing my sword like a shish kebab!",
    "My handkerchief will wipe up your blood!",
    "Nobody's ever drawn blood from me and nobody ever will.",
    "I once owned a dog that was smarter than you.",
];

