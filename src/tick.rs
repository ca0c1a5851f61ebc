//! Tick Source: the one-shot notification shared with the timer interrupt.
//!
//! The interrupt handler only ever sets the flag; the pulse engine is the
//! sole consumer and clears it with an atomic test-and-clear. A tick that
//! arrives while a previous one is still pending is merged into it, so the
//! consumer is level-sensitive rather than counting.
//!
//! ```text
//! TIM21 update IRQ ──raise()──▶ TickFlag ──wait()/take()──▶ PulseEngine
//! ```

use core::future::poll_fn;
use core::task::Poll;

use embassy_sync::waitqueue::AtomicWaker;
use portable_atomic::{AtomicBool, Ordering};

/// Single-slot tick notification.
pub struct TickFlag {
    pending: AtomicBool,
    waker: AtomicWaker,
}

impl TickFlag {
    /// Creates a flag with no tick pending.
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
            waker: AtomicWaker::new(),
        }
    }

    /// Marks one period as elapsed. Safe to call from interrupt context.
    pub fn raise(&self) {
        self.pending.store(true, Ordering::Release);
        self.waker.wake();
    }

    /// Consumes the pending tick, returning whether there was one.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    /// Drops a pending tick without consuming it as work.
    pub fn clear(&self) {
        self.pending.store(false, Ordering::Release);
    }

    /// Returns `true` if a tick is waiting to be taken.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Waits for the next tick and consumes it.
    ///
    /// Never completes if the timer has stopped raising the flag.
    pub async fn wait(&self) {
        poll_fn(|cx| {
            self.waker.register(cx.waker());
            if self.take() {
                Poll::Ready(())
            } else {
                Poll::Pending
            }
        })
        .await;
    }
}

impl Default for TickFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Flag raised by the tick timer interrupt.
pub static TICK: TickFlag = TickFlag::new();

/// Periodic time base consumed by the pulse engine.
///
/// A pulse must only be started while the source is running with its
/// interrupt enabled; otherwise [`TickSource::next_tick`] never returns.
#[allow(async_fn_in_trait)]
pub trait TickSource {
    /// Restarts the countdown at a full period and discards any stale tick.
    fn reload(&mut self);

    /// Stops producing ticks until the next [`TickSource::reload`].
    fn halt(&mut self);

    /// Completes once one full period has elapsed.
    async fn next_tick(&mut self);
}
