//! Station address and hash filtering for the FEC.
//!
//! This module extends [`Fec`] with address filtering:
//!
//! - **Station address** - the unicast address in `PALR`/`PAUR`
//! - **Individual hash** - 64-bit table for extra unicast addresses
//! - **Group hash** - 64-bit table for multicast groups
//! - **Promiscuous mode** - accept every frame
//!
//! # Hash Filtering
//!
//! Both tables are indexed by the top six bits of the Ethernet CRC of the
//! destination address. Collisions are possible: several addresses may map to
//! the same bit, so software must still filter what it receives.
//!
//! The tables are mirrored in the device context so a device reset, which
//! clears the hardware copies, can restore them.

use super::fec::Fec;
use crate::internal::register::{FecReg, FecRegisters, rcr};

// =============================================================================
// Hash Computation
// =============================================================================

/// Hash table index (0-63) of a MAC address.
///
/// Bit-serial CRC-32 over the six address bytes, least significant bit first,
/// polynomial `0xEDB88320`, seed `0xFFFF_FFFF`. The index is bits 31..26 of
/// the final CRC.
pub const fn compute_hash(addr: &[u8; 6]) -> u8 {
    const CRC32_POLY: u32 = 0xEDB8_8320;
    let mut crc: u32 = 0xFFFF_FFFF;

    let mut i = 0;
    while i < addr.len() {
        let mut data = addr[i];
        let mut bit = 0;
        while bit < 8 {
            if ((crc ^ data as u32) & 1) != 0 {
                crc = (crc >> 1) ^ CRC32_POLY;
            } else {
                crc >>= 1;
            }
            data >>= 1;
            bit += 1;
        }
        i += 1;
    }
    (crc >> 26) as u8
}

/// Hash table bit of a MAC address
#[inline]
const fn hash_bit(addr: &[u8; 6]) -> u64 {
    1u64 << compute_hash(addr)
}

// =============================================================================
// Register Helpers
// =============================================================================

/// Program `PALR`/`PAUR` with a station address.
///
/// Bytes 0..4 go to `PALR`, bytes 4..6 to the upper half-word of `PAUR`.
pub(crate) fn write_station_address<R: FecRegisters + ?Sized>(regs: &R, addr: &[u8; 6]) {
    let low = u32::from_be_bytes([addr[0], addr[1], addr[2], addr[3]]);
    let high = (u32::from(addr[4]) << 24) | (u32::from(addr[5]) << 16);
    regs.write(FecReg::Palr, low);
    regs.write(FecReg::Paur, high);
}

/// Split a 64-bit table across its upper and lower registers.
fn write_hash_table<R: FecRegisters + ?Sized>(regs: &R, upper: FecReg, lower: FecReg, table: u64) {
    regs.write(upper, (table >> 32) as u32);
    regs.write(lower, table as u32);
}

/// Software copy of both address hash tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HashTables {
    /// Individual (unicast) address table, `IAUR:IALR`
    pub individual: u64,
    /// Group (multicast) address table, `GAUR:GALR`
    pub group: u64,
}

impl HashTables {
    /// Both tables empty
    pub const fn new() -> Self {
        Self {
            individual: 0,
            group: 0,
        }
    }

    /// Program all four hash registers
    pub(crate) fn write_to<R: FecRegisters + ?Sized>(&self, regs: &R) {
        write_hash_table(regs, FecReg::Iaur, FecReg::Ialr, self.individual);
        write_hash_table(regs, FecReg::Gaur, FecReg::Galr, self.group);
    }
}

// =============================================================================
// Address Filtering
// =============================================================================

impl<R: FecRegisters, const RX_BUFS: usize, const BUF_SIZE: usize> Fec<R, RX_BUFS, BUF_SIZE> {
    /// Install the station address.
    ///
    /// Programs `PALR`/`PAUR` and sets the address's bit in the individual
    /// hash table. Bits of earlier addresses are kept; call
    /// [`clear_hash_tables`](Self::clear_hash_tables) first to drop them.
    ///
    /// # Returns
    /// The hash index (0-63) set in the individual table
    pub fn install_station_address(&mut self, addr: [u8; 6]) -> u8 {
        self.config.mac_address = addr;
        write_station_address(&self.regs, &addr);

        let index = compute_hash(&addr);
        self.hash.individual |= 1u64 << index;
        write_hash_table(&self.regs, FecReg::Iaur, FecReg::Ialr, self.hash.individual);
        index
    }

    /// Clear the individual and group hash tables
    pub fn clear_hash_tables(&mut self) {
        self.hash = HashTables::new();
        self.hash.write_to(&self.regs);
    }

    /// Accept frames for a multicast group.
    ///
    /// # Returns
    /// The hash index (0-63) set in the group table
    ///
    /// # Example
    /// ```ignore
    /// // All-hosts group 224.0.0.1
    /// fec.add_group_address(&[0x01, 0x00, 0x5E, 0x00, 0x00, 0x01]);
    /// ```
    pub fn add_group_address(&mut self, addr: &[u8; 6]) -> u8 {
        self.hash.group |= hash_bit(addr);
        write_hash_table(&self.regs, FecReg::Gaur, FecReg::Galr, self.hash.group);
        compute_hash(addr)
    }

    /// Stop accepting frames for a multicast group.
    ///
    /// **Warning:** the bit is shared by every address with the same hash;
    /// clearing it drops all of them.
    ///
    /// # Returns
    /// The hash index (0-63) cleared in the group table
    pub fn remove_group_address(&mut self, addr: &[u8; 6]) -> u8 {
        self.hash.group &= !hash_bit(addr);
        write_hash_table(&self.regs, FecReg::Gaur, FecReg::Galr, self.hash.group);
        compute_hash(addr)
    }

    /// Whether a multicast address passes the group hash filter
    pub fn accepts_group(&self, addr: &[u8; 6]) -> bool {
        self.hash.group & hash_bit(addr) != 0
    }

    /// Current group hash table
    pub fn group_hash_table(&self) -> u64 {
        self.hash.group
    }

    /// Current individual hash table
    pub fn individual_hash_table(&self) -> u64 {
        self.hash.individual
    }

    /// Enable or disable promiscuous reception (`RCR.PROM`).
    ///
    /// The setting is kept across device resets.
    pub fn set_promiscuous(&mut self, enable: bool) {
        self.config.promiscuous = enable;
        if enable {
            self.regs.set_bits(FecReg::Rcr, rcr::PROM);
        } else {
            self.regs.clear_bits(FecReg::Rcr, rcr::PROM);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
