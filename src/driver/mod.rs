//! Core driver components for the FEC peripheral.
//!
//! - [`config`] - Configuration types and builder patterns
//! - [`error`] - Error types and result aliases
//! - [`fec`] - The device context: bring-up, receive, transmit, reset
//! - [`interrupt`] - Event decoding and the interrupt dispatcher
//! - [`filtering`] - Station address and hash filtering
//!
//! # Example
//!
//! ```ignore
//! use ph_mcf_fec::driver::{FecConfig, PollLimit};
//!
//! let config = FecConfig::new()
//!     .with_mac_address([0x02, 0x00, 0x00, 0x00, 0x00, 0x01])
//!     .with_autoneg_limit(PollLimit::Attempts(20));
//! ```

// Submodules
pub mod config;
pub mod error;
pub mod fec;
pub mod filtering;
pub mod interrupt;

// Re-exports for convenience
pub use config::{Duplex, FecConfig, MiiTiming, PollLimit, Speed, State};
pub use error::{ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result};
pub use fec::{ExecContext, Fec, FecDefault, FecSmall, RxFrame, TxDisposition};
pub use filtering::{HashTables, compute_hash};
pub use interrupt::{InterruptEvents, IsrOutcome};
