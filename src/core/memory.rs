//! Memory access capability for the tracked host process.
//!
//! The tracker never owns raw access primitives itself: everything goes
//! through [`MemoryReader`], implemented by the host integration (a kernel
//! driver binding, ptrace, a dump file, or an in-process mock for tests).
//! Addresses are virtual addresses in the target process.

use anyhow::{Result, anyhow};
use bytemuck::{Pod, Zeroable};

/// Raw read capability over the target process.
///
/// Reads are fallible: an unmapped or stale address returns `Err`, never
/// garbage. Implementations must be callable from any thread.
pub trait MemoryReader: Send + Sync {
    /// Fill `buf` from target virtual address `addr`.
    fn read_bytes(&self, addr: u64, buf: &mut [u8]) -> Result<()>;

    /// Whether the host application's capture/overlay mode is active.
    /// The actor table lives at a different address in that state.
    fn is_capture_mode_active(&self) -> bool;
}

/// Type-safe read from the target process.
pub fn read_value<T, M>(reader: &M, addr: u64) -> Result<T>
where
    T: Pod,
    M: MemoryReader + ?Sized,
{
    let mut value = T::zeroed();
    reader.read_bytes(addr, bytemuck::bytes_of_mut(&mut value))?;
    Ok(value)
}

/// Read a pointer-sized table slot. A zero value is a null pointer, not an
/// error; only the read itself can fail.
pub fn read_pointer<M>(reader: &M, addr: u64) -> Result<u64>
where
    M: MemoryReader + ?Sized,
{
    read_value::<u64, M>(reader, addr)
}

/// Read a fixed-capacity NUL-terminated string field.
pub fn read_cstring<M>(reader: &M, addr: u64, max_len: usize) -> Result<String>
where
    M: MemoryReader + ?Sized,
{
    if max_len == 0 {
        return Err(anyhow!("Zero-length string field at 0x{:X}", addr));
    }

    let mut buf = vec![0u8; max_len];
    reader.read_bytes(addr, &mut buf)?;

    let end = memchr::memchr(0, &buf).unwrap_or(buf.len());
    Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
}
