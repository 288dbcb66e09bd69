//! DMA Engine
//!
//! Statically sized buffer pool and descriptor rings for the FEC.
//!
//! - [`DmaEngine`]: pool, receive ring, single-slot transmit ring and the
//!   zero-copy lending of a receive buffer to the transmitter
//! - [`DescriptorRing`]: aligned descriptor array with a cursor
//! - [`BufferDescriptor`]: the 8-byte hardware descriptor

pub(crate) mod descriptor;
mod engine;
mod ring;

pub use descriptor::BufferDescriptor;
pub use engine::DmaEngine;
pub use ring::DescriptorRing;
