//! Synchronization and Concurrency Support
//!
//! The FEC is touched from two contexts: its interrupt handler and any number
//! of tasks. This module provides:
//!
//! - **Primitives** (`primitives`): [`CriticalSectionCell`], ISR-safe
//!   interior mutability
//! - **Signals** (`signal`): the [`WakeSignal`] trait a scheduler implements,
//!   plus the polling [`BinarySignal`] for bare-metal use
//! - **Shared Wrapper** (`shared`): [`SharedFec`], a critical-section
//!   protected device with the gated transmit path
//!
//! # Example
//!
//! ```ignore
//! use ph_mcf_fec::sync::{BinarySignal, SharedFec, WakeSignal};
//!
//! static FEC: SharedFecDefault<MmioRegisters> =
//!     SharedFec::new(unsafe { MmioRegisters::reference() });
//! static RX: BinarySignal<SysDelay> = BinarySignal::new(SysDelay);
//! static TX: BinarySignal<SysDelay> = BinarySignal::new_given(SysDelay);
//!
//! fn fec_handler() {
//!     FEC.on_interrupt(&RX, &TX);
//! }
//!
//! fn echo_task() -> ! {
//!     loop {
//!         if let Some(frame) = FEC.wait_for_frame(&RX) {
//!             if frame.errors() != 0 {
//!                 FEC.release(frame);
//!                 continue;
//!             }
//!             let len = frame.length();
//!             FEC.send_frame(frame, len, &TX).ok();
//!         }
//!     }
//! }
//! ```

mod primitives;
mod shared;
mod signal;

pub use primitives::CriticalSectionCell;
pub use shared::{SharedFec, SharedFecDefault, SharedFecSmall};
pub use signal::{BinarySignal, WakeSignal};
