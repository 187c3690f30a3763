//! End-to-end tests: the application loop driven through simulated switches
//! against a recording board.

use bards_assistant::board::{Indicator, Notice, PowerControl, Render, RenderReason, Screen};
use bards_assistant::catalog::{CATALOG, CATALOG_LEN};
use bards_assistant::config::{BOOT_SPLASH_MS, HOLD_THRESHOLD_MS, WORK_DELAY_MS};
use bards_assistant::input::{ButtonEvent, ButtonId, Controls};
use bards_assistant::persist::{format_marker, keys, DurableStore};
use bards_assistant::selection::Action;
use bards_assistant::{App, Error, Mode};
use core::cell::Cell;
use core::convert::Infallible;
use embedded_hal::digital::{ErrorType, InputPin};
use rand_core::RngCore;
use std::collections::HashMap;
use std::rc::Rc;

// ═══════════════════════════════════════════════════════════════════════════
// Fixtures
// ═══════════════════════════════════════════════════════════════════════════

static TRIO: [&str; 3] = ["Alpha", "Bravo", "Charlie"];
static EMPTY: [&str; 0] = [];

struct XorShift(u64);

impl RngCore for XorShift {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        rand_core::impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Active-low switch; `true` in the cell means held down.
#[derive(Clone, Default)]
struct FakePin(Rc<Cell<bool>>);

impl ErrorType for FakePin {
    type Error = Infallible;
}

impl InputPin for FakePin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Led {
    Boot,
    Idle,
    Working,
    Armed,
    Off,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Call {
    Led(Led),
    Title,
    Item(String, Render),
    Notice(Notice),
    WakeOn(ButtonId, bool),
    Suspend,
}

#[derive(Default)]
struct MockBoard {
    calls: Vec<Call>,
    scalars: HashMap<&'static str, u32>,
    blobs: HashMap<&'static str, Vec<u8>>,
    scalar_writes: Vec<(&'static str, u32)>,
    fail_wake: bool,
    fail_writes: bool,
}

impl MockBoard {
    fn items(&self) -> Vec<(String, Render)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Item(text, render) => Some((text.clone(), *render)),
                _ => None,
            })
            .collect()
    }

    fn last_led(&self) -> Option<Led> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Led(led) => Some(*led),
            _ => None,
        })
    }

    fn suspended(&self) -> bool {
        self.calls.contains(&Call::Suspend)
    }
}

impl Indicator for MockBoard {
    fn show_boot(&mut self) {
        self.calls.push(Call::Led(Led::Boot));
    }

    fn show_idle(&mut self) {
        self.calls.push(Call::Led(Led::Idle));
    }

    fn show_working(&mut self) {
        self.calls.push(Call::Led(Led::Working));
    }

    fn show_sleep_armed(&mut self) {
        self.calls.push(Call::Led(Led::Armed));
    }

    fn off(&mut self) {
        self.calls.push(Call::Led(Led::Off));
    }
}

impl Screen for MockBoard {
    fn show_title(&mut self) {
        self.calls.push(Call::Title);
    }

    fn show_item(&mut self, text: &str, render: Render) {
        self.calls.push(Call::Item(text.to_string(), render));
    }

    fn show_notice(&mut self, notice: Notice) {
        self.calls.push(Call::Notice(notice));
    }
}

impl PowerControl for MockBoard {
    fn enable_wake_on(&mut self, control: ButtonId, active_low: bool) -> Result<(), Error> {
        if self.fail_wake {
            return Err(Error::WakeConfig);
        }
        self.calls.push(Call::WakeOn(control, active_low));
        Ok(())
    }

    fn suspend(&mut self) {
        self.calls.push(Call::Suspend);
    }
}

impl DurableStore for MockBoard {
    fn get_scalar(&mut self, key: &'static str, default: u32) -> u32 {
        self.scalars.get(key).copied().unwrap_or(default)
    }

    fn put_scalar(&mut self, key: &'static str, value: u32) -> Result<(), Error> {
        if self.fail_writes {
            return Err(Error::Storage);
        }
        self.scalar_writes.push((key, value));
        self.scalars.insert(key, value);
        Ok(())
    }

    fn get_bytes(&mut self, key: &'static str, buf: &mut [u8]) -> usize {
        let Some(blob) = self.blobs.get(key) else {
            return 0;
        };
        let n = blob.len().min(buf.len());
        buf[..n].copy_from_slice(&blob[..n]);
        blob.len()
    }

    fn put_bytes(&mut self, key: &'static str, bytes: &[u8]) -> Result<(), Error> {
        if self.fail_writes {
            return Err(Error::Storage);
        }
        self.blobs.insert(key, bytes.to_vec());
        Ok(())
    }
}

/// A booted device with a millisecond clock.
struct Rig<const N: usize> {
    app: App<N, XorShift>,
    controls: Controls<FakePin>,
    pins: [FakePin; 4],
    board: MockBoard,
    now: u64,
}

impl<const N: usize> Rig<N> {
    fn boot(catalog: &'static [&'static str; N], mut board: MockBoard, seed: u64) -> Self {
        let pins: [FakePin; 4] = Default::default();
        let controls = Controls::new(pins.clone(), 0);
        let app = App::boot(catalog, XorShift(seed), &mut board, 0);
        Self {
            app,
            controls,
            pins,
            board,
            now: 0,
        }
    }

    fn pin(&self, id: ButtonId) -> &FakePin {
        let slot = ButtonId::ALL
            .iter()
            .position(|&b| b == id)
            .expect("known control");
        &self.pins[slot]
    }

    fn run_for(&mut self, ms: u64) {
        for _ in 0..ms {
            self.now += 1;
            self.app.step(&mut self.controls, &mut self.board, self.now);
        }
    }

    fn press_for(&mut self, id: ButtonId, ms: u64) {
        self.pin(id).0.set(true);
        self.run_for(ms);
        self.pin(id).0.set(false);
        self.run_for(50);
    }

    fn tap(&mut self, id: ButtonId) {
        self.press_for(id, 100);
    }

    /// Tap and let the work delay run out.
    fn tap_and_settle(&mut self, id: ButtonId) {
        self.tap(id);
        self.run_for(WORK_DELAY_MS + 10);
    }

    fn to_idle(&mut self) {
        self.run_for(BOOT_SPLASH_MS + 10);
        assert_eq!(self.app.mode(), Mode::Idle);
    }

    fn history(&self) -> Vec<u16> {
        self.app.engine().history().iter().collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Boot Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn cold_boot_shows_splash_then_goes_idle() {
    let mut rig = Rig::boot(&CATALOG, MockBoard::default(), 1);
    assert_eq!(rig.app.mode(), Mode::Boot);
    assert_eq!(rig.board.calls[0], Call::Led(Led::Boot));
    assert_eq!(rig.board.calls[1], Call::Title);

    let items = rig.board.items();
    assert_eq!(items.len(), 1);
    let (text, render) = &items[0];
    assert_eq!(render.reason, RenderReason::Boot);
    assert_eq!(render.action, Some(Action::Random));
    assert_eq!(text, CATALOG[render.index as usize]);
    assert_eq!(rig.history(), [render.index]);

    rig.run_for(BOOT_SPLASH_MS - 10);
    assert_eq!(rig.app.mode(), Mode::Boot);
    rig.run_for(20);
    assert_eq!(rig.app.mode(), Mode::Idle);
    assert_eq!(rig.board.last_led(), Some(Led::Idle));
}

#[test]
fn events_inside_guard_window_are_discarded() {
    let mut rig = Rig::boot(&CATALOG, MockBoard::default(), 2);
    rig.app
        .handle_event(ButtonId::Sleep, ButtonEvent::HoldStart, &mut rig.board, 50);
    assert!(!rig.app.sleep_armed());

    rig.app
        .handle_event(ButtonId::Sleep, ButtonEvent::HoldStart, &mut rig.board, 250);
    assert!(rig.app.sleep_armed());
}

#[test]
fn boot_near_clock_wrap_keeps_guard_and_splash() {
    let start = u64::MAX - 50;
    let mut board = MockBoard::default();
    let mut app = App::boot(&CATALOG, XorShift(21), &mut board, start);

    app.handle_event(
        ButtonId::Sleep,
        ButtonEvent::HoldStart,
        &mut board,
        start.wrapping_add(100),
    );
    assert!(!app.sleep_armed());

    app.handle_event(
        ButtonId::Sleep,
        ButtonEvent::HoldStart,
        &mut board,
        start.wrapping_add(250),
    );
    assert!(app.sleep_armed());

    app.tick(&mut board, start.wrapping_add(BOOT_SPLASH_MS - 10));
    assert_eq!(app.mode(), Mode::Boot);
    app.tick(&mut board, start.wrapping_add(BOOT_SPLASH_MS));
    assert_eq!(app.mode(), Mode::Idle);
}

#[test]
fn content_taps_are_ignored_during_boot() {
    let mut rig = Rig::boot(&CATALOG, MockBoard::default(), 3);
    rig.run_for(300);
    rig.tap(ButtonId::Random);
    assert_eq!(rig.app.mode(), Mode::Boot);
    assert!(rig.app.engine().pending().is_none());
    assert_eq!(rig.board.items().len(), 1);
}

#[test]
fn empty_catalog_shows_notice_and_never_works() {
    let mut rig = Rig::boot(&EMPTY, MockBoard::default(), 4);
    assert!(rig.board.calls.contains(&Call::Notice(Notice::EmptyCatalog)));
    rig.to_idle();

    rig.tap(ButtonId::Random);
    rig.tap(ButtonId::Next);
    assert_eq!(rig.app.mode(), Mode::Idle);
    assert!(rig.board.items().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// Selection Flow Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn random_tap_works_then_commits_after_delay() {
    let mut rig = Rig::boot(&CATALOG, MockBoard::default(), 5);
    rig.to_idle();

    rig.tap(ButtonId::Random);
    assert_eq!(rig.app.mode(), Mode::Working);
    assert_eq!(rig.board.last_led(), Some(Led::Working));
    assert_eq!(rig.board.items().len(), 1);

    rig.run_for(WORK_DELAY_MS + 10);
    assert_eq!(rig.app.mode(), Mode::Idle);
    assert_eq!(rig.board.last_led(), Some(Led::Idle));

    let items = rig.board.items();
    assert_eq!(items.len(), 2);
    let (_, render) = items[1];
    assert_eq!(render.reason, RenderReason::Complete);
    assert_eq!(render.action, Some(Action::Random));
    assert_eq!(rig.app.engine().current(), Some(render.index));
    assert_eq!(rig.history().len(), 2);
}

#[test]
fn taps_while_working_are_ignored() {
    let mut rig = Rig::boot(&CATALOG, MockBoard::default(), 6);
    rig.to_idle();

    rig.tap(ButtonId::Random);
    let pending = *rig.app.engine().pending().expect("working");
    rig.tap(ButtonId::Prev);
    assert_eq!(rig.app.engine().pending(), Some(&pending));

    rig.run_for(WORK_DELAY_MS);
    assert_eq!(rig.app.mode(), Mode::Idle);
    assert_eq!(rig.app.engine().current(), Some(pending.index));
}

#[test]
fn three_item_catalog_walkthrough() {
    let mut rig = Rig::boot(&TRIO, MockBoard::default(), 7);
    rig.to_idle();
    let boot_pick = rig.app.engine().current().expect("boot pick");

    rig.tap_and_settle(ButtonId::Random);
    let a = rig.app.engine().current().expect("random pick");
    rig.tap_and_settle(ButtonId::Next);
    let b = rig.app.engine().current().expect("next pick");

    let mut seen = vec![boot_pick, a, b];
    seen.sort_unstable();
    assert_eq!(seen, [0, 1, 2]);
    assert_eq!(rig.history(), [boot_pick, a, b]);

    rig.tap_and_settle(ButtonId::Prev);
    assert_eq!(rig.app.engine().current(), Some(a));
    rig.tap_and_settle(ButtonId::Prev);
    assert_eq!(rig.app.engine().current(), Some(boot_pick));

    let renders = rig.board.items().len();
    rig.tap(ButtonId::Prev);
    assert_eq!(rig.app.mode(), Mode::Idle);
    rig.run_for(WORK_DELAY_MS + 10);
    assert_eq!(rig.board.items().len(), renders);
    assert_eq!(rig.history(), [boot_pick, a, b]);

    rig.tap_and_settle(ButtonId::Next);
    assert_eq!(rig.app.engine().current(), Some(a));
    assert_eq!(rig.history().len(), 3);
}

// ═══════════════════════════════════════════════════════════════════════════
// Sleep / Wake Tests
// ═══════════════════════════════════════════════════════════════════════════

fn hold_sleep(rig: &mut Rig<CATALOG_LEN>) {
    rig.press_for(ButtonId::Sleep, HOLD_THRESHOLD_MS + 200);
}

#[test]
fn sleep_hold_then_release_persists_and_suspends() {
    let mut rig = Rig::boot(&CATALOG, MockBoard::default(), 8);
    rig.to_idle();
    rig.tap_and_settle(ButtonId::Random);

    rig.pin(ButtonId::Sleep).0.set(true);
    rig.run_for(HOLD_THRESHOLD_MS + 200);
    assert!(rig.app.sleep_armed());
    assert_eq!(rig.board.last_led(), Some(Led::Armed));
    assert!(!rig.board.suspended());

    rig.pin(ButtonId::Sleep).0.set(false);
    rig.run_for(50);
    assert_eq!(rig.app.mode(), Mode::Sleep);

    let tail: Vec<&Call> = rig.board.calls.iter().rev().take(3).collect();
    assert_eq!(
        tail,
        [
            &Call::Suspend,
            &Call::Led(Led::Off),
            &Call::WakeOn(ButtonId::Sleep, true)
        ]
    );

    let writes = &rig.board.scalar_writes;
    assert_eq!(writes.first(), Some(&(keys::FORMAT, 0)));
    assert_eq!(
        &writes[writes.len() - 2..],
        [(keys::FORMAT, format_marker(CATALOG_LEN)), (keys::SLEPT, 1)]
    );
}

#[test]
fn nothing_runs_after_suspend() {
    let mut rig = Rig::boot(&CATALOG, MockBoard::default(), 9);
    rig.to_idle();
    hold_sleep(&mut rig);
    assert_eq!(rig.app.mode(), Mode::Sleep);

    let calls = rig.board.calls.len();
    rig.tap(ButtonId::Random);
    rig.run_for(WORK_DELAY_MS + 10);
    assert_eq!(rig.board.calls.len(), calls);
}

#[test]
fn sleep_tap_while_armed_disarms() {
    let mut rig = Rig::boot(&CATALOG, MockBoard::default(), 10);
    rig.to_idle();
    let now = rig.now;
    rig.app
        .handle_event(ButtonId::Sleep, ButtonEvent::HoldStart, &mut rig.board, now);
    assert!(rig.app.sleep_armed());

    rig.app
        .handle_event(ButtonId::Sleep, ButtonEvent::Tap, &mut rig.board, now);
    assert!(!rig.app.sleep_armed());
    assert_eq!(rig.board.last_led(), Some(Led::Idle));
    assert!(!rig.board.suspended());
}

#[test]
fn sleep_release_without_arming_does_not_suspend() {
    let mut rig = Rig::boot(&CATALOG, MockBoard::default(), 22);
    rig.app
        .handle_event(ButtonId::Sleep, ButtonEvent::HoldStart, &mut rig.board, 50);
    assert!(!rig.app.sleep_armed());

    rig.app
        .handle_event(ButtonId::Sleep, ButtonEvent::HoldEnd, &mut rig.board, 300);
    assert_eq!(rig.app.mode(), Mode::Boot);
    assert!(!rig.board.suspended());
    assert!(!rig.board.calls.iter().any(|c| matches!(c, Call::WakeOn(..))));
    assert!(rig.board.scalar_writes.iter().all(|&(key, _)| key != keys::SLEPT));
}

#[test]
fn sleep_tap_without_arming_does_nothing() {
    let mut rig = Rig::boot(&CATALOG, MockBoard::default(), 11);
    rig.to_idle();
    rig.tap(ButtonId::Sleep);
    assert_eq!(rig.app.mode(), Mode::Idle);
    assert!(!rig.board.suspended());
}

#[test]
fn wake_source_failure_keeps_running() {
    let board = MockBoard {
        fail_wake: true,
        ..Default::default()
    };
    let mut rig = Rig::boot(&CATALOG, board, 12);
    rig.to_idle();
    hold_sleep(&mut rig);

    assert_eq!(rig.app.mode(), Mode::Idle);
    assert!(!rig.app.sleep_armed());
    assert!(!rig.board.suspended());
    assert_eq!(rig.board.last_led(), Some(Led::Idle));
    assert_eq!(rig.board.scalars.get(keys::SLEPT), None);
}

#[test]
fn snapshot_write_failure_still_suspends() {
    let mut rig = Rig::boot(&CATALOG, MockBoard::default(), 13);
    rig.to_idle();
    rig.board.fail_writes = true;
    hold_sleep(&mut rig);
    assert_eq!(rig.app.mode(), Mode::Sleep);
    assert!(rig.board.suspended());
}

#[test]
fn suspend_while_working_abandons_the_request() {
    let mut rig = Rig::boot(&CATALOG, MockBoard::default(), 14);
    rig.to_idle();
    let before = rig.history();

    rig.tap(ButtonId::Random);
    assert_eq!(rig.app.mode(), Mode::Working);
    rig.app
        .handle_event(ButtonId::Sleep, ButtonEvent::HoldStart, &mut rig.board, rig.now);
    rig.app
        .handle_event(ButtonId::Sleep, ButtonEvent::HoldEnd, &mut rig.board, rig.now);

    assert_eq!(rig.app.mode(), Mode::Sleep);
    assert!(rig.app.engine().pending().is_none());
    assert_eq!(rig.history(), before);
}

#[test]
fn wake_restores_history_and_clears_marker_on_idle() {
    let mut rig = Rig::boot(&CATALOG, MockBoard::default(), 15);
    rig.to_idle();
    rig.tap_and_settle(ButtonId::Random);
    rig.tap_and_settle(ButtonId::Random);
    rig.tap_and_settle(ButtonId::Prev);
    let history = rig.history();
    let current = rig.app.engine().current();
    let cursor = rig.app.engine().history().cursor();
    hold_sleep(&mut rig);

    let mut board = rig.board;
    board.calls.clear();
    let mut woke = Rig::boot(&CATALOG, board, 99);

    let items = woke.board.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].1.reason, RenderReason::Resume);
    assert_eq!(Some(items[0].1.index), current);
    assert_eq!(woke.history(), history);
    assert_eq!(woke.app.engine().history().cursor(), cursor);
    assert_eq!(woke.board.scalars.get(keys::SLEPT), Some(&1));

    woke.to_idle();
    assert_eq!(woke.board.scalars.get(keys::SLEPT), Some(&0));

    woke.tap_and_settle(ButtonId::Next);
    assert_eq!(woke.app.engine().current(), history.last().copied());
}

#[test]
fn reset_before_idle_still_counts_as_wake() {
    let mut rig = Rig::boot(&CATALOG, MockBoard::default(), 16);
    rig.to_idle();
    hold_sleep(&mut rig);
    let current = rig.app.engine().current();

    let mut first = Rig::boot(&CATALOG, rig.board, 17);
    first.run_for(BOOT_SPLASH_MS / 2);
    first.board.calls.clear();

    let second = Rig::boot(&CATALOG, first.board, 18);
    let items = second.board.items();
    assert_eq!(items[0].1.reason, RenderReason::Resume);
    assert_eq!(Some(items[0].1.index), current);
}

#[test]
fn snapshot_from_other_catalog_is_rejected() {
    let mut rig = Rig::boot(&CATALOG, MockBoard::default(), 19);
    rig.to_idle();
    rig.tap_and_settle(ButtonId::Random);
    hold_sleep(&mut rig);

    let mut board = rig.board;
    board.calls.clear();
    let woke = Rig::boot(&TRIO, board, 20);

    let items = woke.board.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].1.reason, RenderReason::Boot);
    assert!(items[0].1.index < 3);
    assert_eq!(woke.history().len(), 1);
}
