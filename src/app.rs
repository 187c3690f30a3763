//! Application state machine.
//!
//! ```text
//!   Boot ──splash elapsed──▶ Idle ──tap with work──▶ Working
//!                             ▲                        │
//!                             └──────work delay────────┘
//!
//!   any mode ──sleep hold, then release──▶ Sleep (terminal)
//! ```
//!
//! Content controls only act from `Idle`; a request with no work (Prev at
//! the oldest entry, empty catalog) leaves the mode unchanged. The sleep
//! control works from any mode: `HoldStart` arms, `HoldEnd` while armed
//! suspends, `Tap` disarms. For a short window after boot every event is
//! discarded and any arming is cleared.

use crate::board::{Board, Notice, Render, RenderReason};
use crate::config::{
    BOOT_SPLASH_MS, INPUT_GUARD_MS, SHOW_ITEM_ON_BOOT, SLEEP_CONTROL, WAKE_ACTIVE_LOW,
    WORK_DELAY_MS,
};
use crate::input::{ButtonEvent, ButtonId, Controls};
use crate::persist::{self, BootKind, Resumption};
use crate::selection::{Action, SelectionEngine};
use crate::time::{has_elapsed, reached, Millis};
use embedded_hal::digital::InputPin;
use rand_core::RngCore;

/// High-level mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Boot,
    Idle,
    Working,
    /// Suspend was requested; nothing runs until the next boot.
    Sleep,
}

pub struct App<const N: usize, R> {
    catalog: &'static [&'static str; N],
    engine: SelectionEngine<N, R>,
    mode: Mode,
    entered_at: Millis,
    ignore_input_until: Millis,
    sleep_armed: bool,
    /// Woke from sleep; clear the marker once we reach Idle.
    clear_marker_on_idle: bool,
}

impl<const N: usize, R: RngCore> App<N, R> {
    /// Classify the boot, restore or initialise selection state, and enter
    /// `Boot` with the splash up.
    pub fn boot<B: Board>(
        catalog: &'static [&'static str; N],
        rng: R,
        board: &mut B,
        now: Millis,
    ) -> Self {
        let boot = persist::classify_boot(board);
        info!("Boot: {:?}", boot);

        let mut engine = SelectionEngine::new(rng);
        board.show_boot();
        board.show_title();
        let resumption = persist::resume_or_start(&mut engine, board, boot, SHOW_ITEM_ON_BOOT);

        let app = Self {
            catalog,
            engine,
            mode: Mode::Boot,
            entered_at: now,
            ignore_input_until: now.wrapping_add(INPUT_GUARD_MS),
            sleep_armed: false,
            clear_marker_on_idle: boot == BootKind::Wake,
        };

        match resumption {
            Resumption::Restored => {
                if let Some(index) = app.engine.current() {
                    app.render(board, index, None, RenderReason::Resume);
                }
            }
            Resumption::Fresh { drawn: Some(index) } => {
                app.render(board, index, Some(Action::Random), RenderReason::Boot);
            }
            Resumption::Fresh { drawn: None } if N == 0 => {
                board.show_notice(Notice::EmptyCatalog);
            }
            Resumption::Fresh { drawn: None } => {}
        }
        app
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn sleep_armed(&self) -> bool {
        self.sleep_armed
    }

    pub fn engine(&self) -> &SelectionEngine<N, R> {
        &self.engine
    }

    /// One loop iteration: poll every control, route its event, then advance
    /// the mode.
    pub fn step<P: InputPin, B: Board>(
        &mut self,
        controls: &mut Controls<P>,
        board: &mut B,
        now: Millis,
    ) {
        for (id, event) in controls.poll(now) {
            self.handle_event(id, event, board, now);
        }
        self.tick(board, now);
    }

    /// Apply one debounced intent event.
    pub fn handle_event<B: Board>(
        &mut self,
        id: ButtonId,
        event: ButtonEvent,
        board: &mut B,
        now: Millis,
    ) {
        if event == ButtonEvent::None || self.mode == Mode::Sleep {
            return;
        }

        if !reached(now, self.ignore_input_until) {
            debug!("Input: {:?} {:?} ignored during guard window", id, event);
            self.sleep_armed = false;
            return;
        }

        if id == SLEEP_CONTROL {
            self.handle_sleep_gesture(event, board);
            return;
        }

        if self.mode != Mode::Idle || event != ButtonEvent::Tap {
            return;
        }
        let Some(action) = action_for(id) else {
            return;
        };

        info!("[{:?}] Tap", action);
        if self.engine.request(action, now) {
            self.enter(Mode::Working, board, now);
        }
    }

    /// Advance time-driven transitions.
    pub fn tick<B: Board>(&mut self, board: &mut B, now: Millis) {
        match self.mode {
            Mode::Boot => {
                if has_elapsed(now, self.entered_at, BOOT_SPLASH_MS) {
                    self.enter(Mode::Idle, board, now);
                }
            }
            Mode::Working => {
                let done = self
                    .engine
                    .pending()
                    .map_or(true, |p| has_elapsed(now, p.requested_at, WORK_DELAY_MS));
                if !done {
                    return;
                }
                if let Some(committed) = self.engine.commit() {
                    info!("Selection: committed {}", committed.index);
                    self.render(
                        board,
                        committed.index,
                        Some(committed.action),
                        RenderReason::Complete,
                    );
                }
                self.enter(Mode::Idle, board, now);
            }
            Mode::Idle | Mode::Sleep => {}
        }
    }

    fn handle_sleep_gesture<B: Board>(&mut self, event: ButtonEvent, board: &mut B) {
        match event {
            ButtonEvent::HoldStart => {
                info!("[Sleep] HoldStart (armed). Release to sleep.");
                self.sleep_armed = true;
                board.show_sleep_armed();
            }
            ButtonEvent::HoldEnd if self.sleep_armed => {
                info!("[Sleep] HoldEnd (released). Going to sleep.");
                self.sleep_armed = false;
                self.suspend(board);
            }
            ButtonEvent::Tap if self.sleep_armed => {
                info!("[Sleep] Tap, disarmed");
                self.sleep_armed = false;
                self.show_indicator(board);
            }
            _ => {}
        }
    }

    fn suspend<B: Board>(&mut self, board: &mut B) {
        if let Err(e) = board.enable_wake_on(SLEEP_CONTROL, WAKE_ACTIVE_LOW) {
            error!("Sleep: wake source setup failed: {:?}", e);
            self.show_indicator(board);
            return;
        }

        self.engine.abandon_pending();
        if let Err(e) = persist::prepare_for_suspend(&self.engine, board) {
            warn!("Sleep: snapshot not saved: {:?}", e);
        }

        board.off();
        self.mode = Mode::Sleep;
        board.suspend();
    }

    fn enter<B: Board>(&mut self, mode: Mode, board: &mut B, now: Millis) {
        debug!("App: {:?} -> {:?}", self.mode, mode);
        if mode == Mode::Idle && self.clear_marker_on_idle {
            if let Err(e) = persist::clear_suspend_marker(board) {
                warn!("Boot: failed to clear sleep marker: {:?}", e);
            }
            self.clear_marker_on_idle = false;
        }
        self.mode = mode;
        self.entered_at = now;
        self.show_indicator(board);
    }

    /// Indicator for the current mode, unless sleep is armed.
    fn show_indicator<B: Board>(&self, board: &mut B) {
        if self.sleep_armed {
            board.show_sleep_armed();
            return;
        }
        match self.mode {
            Mode::Boot => board.show_boot(),
            Mode::Idle => board.show_idle(),
            Mode::Working => board.show_working(),
            Mode::Sleep => board.off(),
        }
    }

    fn render<B: Board>(
        &self,
        board: &mut B,
        index: u16,
        action: Option<Action>,
        reason: RenderReason,
    ) {
        let render = Render {
            index,
            action,
            reason,
        };
        match self.catalog.get(index as usize) {
            Some(text) => board.show_item(text, render),
            None if N == 0 => board.show_notice(Notice::EmptyCatalog),
            None => board.show_notice(Notice::InvalidIndex(index)),
        }
    }
}

/// Content action bound to a control.
fn action_for(id: ButtonId) -> Option<Action> {
    match id {
        ButtonId::Random => Some(Action::Random),
        ButtonId::Next => Some(Action::Next),
        ButtonId::Prev => Some(Action::Prev),
        ButtonId::Sleep => None,
    }
}
