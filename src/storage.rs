//! Durable key-value store in the nRF52840's internal flash.
//!
//! Backed by `sequential-storage`'s map over a small reserved page range,
//! which handles wear levelling and garbage collection. Keys are
//! `namespace/key` strings hashed to a `u32` (FNV-1a), so every writer in the
//! namespace shares one flash region.
//!
//! The application loop is synchronous; each call drives the async flash
//! API to completion with `block_on`. The NVMC is blocking underneath, so
//! nothing is gained by yielding.

use bards_assistant::config::{STORE_FLASH_PAGE_COUNT, STORE_FLASH_PAGE_START};
use bards_assistant::persist::{DurableStore, MAX_HISTORY_BYTES};
use bards_assistant::Error;
use core::ops::Range;
use defmt::{debug, error, warn};
use embassy_futures::block_on;
use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::map::{fetch_item, store_item};

/// Flash page size for nRF52840 (4 KB).
const FLASH_PAGE_SIZE: u32 = 4096;

const STORE_RANGE: Range<u32> = (STORE_FLASH_PAGE_START * FLASH_PAGE_SIZE)
    ..((STORE_FLASH_PAGE_START + STORE_FLASH_PAGE_COUNT) * FLASH_PAGE_SIZE);

/// Largest serialized item: key + history blob + item header, word aligned.
const ITEM_BUF_SIZE: usize = MAX_HISTORY_BYTES + 32;

pub struct FlashStore<F> {
    flash: F,
    namespace: &'static str,
    buf: [u8; ITEM_BUF_SIZE],
}

impl<F: NorFlash> FlashStore<F> {
    pub fn new(flash: F, namespace: &'static str) -> Self {
        Self {
            flash,
            namespace,
            buf: [0; ITEM_BUF_SIZE],
        }
    }

    fn key(&self, name: &str) -> u32 {
        fnv1a(&[self.namespace.as_bytes(), b"/", name.as_bytes()])
    }

    /// Store one item, wiping the region once if it reads back corrupted.
    fn store<'v, V>(&mut self, name: &'static str, value: &V) -> Result<(), Error>
    where
        V: sequential_storage::map::Value<'v>,
    {
        let key = self.key(name);
        for attempt in 0..2 {
            let result = block_on(store_item(
                &mut self.flash,
                STORE_RANGE,
                &mut NoCache::new(),
                &mut self.buf,
                &key,
                value,
            ));
            match result {
                Ok(()) => {
                    debug!("Store: wrote {}", name);
                    return Ok(());
                }
                Err(sequential_storage::Error::FullStorage { .. }) => {
                    error!("Store: full while writing {}", name);
                    return Err(Error::StoreFull);
                }
                Err(sequential_storage::Error::Corrupted { .. }) if attempt == 0 => {
                    warn!("Store: region corrupted, erasing");
                    if let Err(e) = block_on(sequential_storage::erase_all(
                        &mut self.flash,
                        STORE_RANGE,
                    )) {
                        error!("Store: erase failed: {:?}", defmt::Debug2Format(&e));
                        return Err(Error::Storage);
                    }
                }
                Err(e) => {
                    error!("Store: write {} failed: {:?}", name, defmt::Debug2Format(&e));
                    return Err(Error::Storage);
                }
            }
        }
        Err(Error::Storage)
    }
}

impl<F: NorFlash> DurableStore for FlashStore<F> {
    fn get_scalar(&mut self, key: &'static str, default: u32) -> u32 {
        let hashed = self.key(key);
        match block_on(fetch_item::<u32, u32, _>(
            &mut self.flash,
            STORE_RANGE,
            &mut NoCache::new(),
            &mut self.buf,
            &hashed,
        )) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                error!("Store: read {} failed: {:?}", key, defmt::Debug2Format(&e));
                default
            }
        }
    }

    fn put_scalar(&mut self, key: &'static str, value: u32) -> Result<(), Error> {
        self.store(key, &value)
    }

    fn get_bytes(&mut self, key: &'static str, buf: &mut [u8]) -> usize {
        let hashed = self.key(key);
        match block_on(fetch_item::<u32, &[u8], _>(
            &mut self.flash,
            STORE_RANGE,
            &mut NoCache::new(),
            &mut self.buf,
            &hashed,
        )) {
            Ok(Some(data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                data.len()
            }
            Ok(None) => 0,
            Err(e) => {
                error!("Store: read {} failed: {:?}", key, defmt::Debug2Format(&e));
                0
            }
        }
    }

    fn put_bytes(&mut self, key: &'static str, bytes: &[u8]) -> Result<(), Error> {
        self.store(key, &bytes)
    }
}

/// 32-bit FNV-1a over the concatenation of `parts`.
fn fnv1a(parts: &[&[u8]]) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in parts.iter().flat_map(|p| p.iter()) {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}
