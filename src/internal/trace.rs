//! Logging shims.
//!
//! Each macro forwards to `defmt` and/or `log` depending on the enabled
//! features and compiles to nothing otherwise. Arguments use the `{}`
//! placeholder syntax shared by both crates.

macro_rules! fec_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::info!($($arg)*);
        #[cfg(feature = "log")]
        log::info!($($arg)*);
    }};
}

macro_rules! fec_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::debug!($($arg)*);
        #[cfg(feature = "log")]
        log::debug!($($arg)*);
    }};
}

macro_rules! fec_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::warn!($($arg)*);
        #[cfg(feature = "log")]
        log::warn!($($arg)*);
    }};
}

pub(crate) use fec_debug;
pub(crate) use fec_info;
pub(crate) use fec_warn;
