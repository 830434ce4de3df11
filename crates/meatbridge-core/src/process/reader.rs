#![cfg_attr(not(target_os = "windows"), allow(dead_code, unused_variables))]

use crate::error::{Error, Result};
use crate::process::ProcessHandle;
use crate::process::provider::ProcessInfo;

#[cfg(target_os = "windows")]
use windows::Win32::System::Diagnostics::Debug::{ReadProcessMemory, WriteProcessMemory};

/// Trait for reading memory from a process or buffer
///
/// This trait enables mocking for tests and abstracts over different memory sources.
pub trait ReadMemory {
    /// Read raw bytes from memory at the given address
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>>;

    /// Get the base address of the main module
    fn base_address(&self) -> u64;

    fn read_u8(&self, address: u64) -> Result<u8> {
        let bytes = self.read_bytes(address, 1)?;
        Ok(bytes[0])
    }

    /// Read a signed 32-bit integer from memory
    fn read_i32(&self, address: u64) -> Result<i32> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read an unsigned 32-bit integer from memory
    fn read_u32(&self, address: u64) -> Result<u32> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a little-endian IEEE 754 single from memory
    fn read_f32(&self, address: u64) -> Result<f32> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

/// Trait for writing memory into a process or buffer.
///
/// Writes take `&self`: the target is foreign memory, not state owned by the writer.
pub trait WriteMemory {
    fn write_bytes(&self, address: u64, bytes: &[u8]) -> Result<()>;

    fn write_u8(&self, address: u64, value: u8) -> Result<()> {
        self.write_bytes(address, &[value])
    }

    fn write_u32(&self, address: u64, value: u32) -> Result<()> {
        self.write_bytes(address, &value.to_le_bytes())
    }

    fn write_f32(&self, address: u64, value: f32) -> Result<()> {
        self.write_bytes(address, &value.to_le_bytes())
    }
}

/// Read/write access to the attached game process.
pub struct ProcessMemory<'a> {
    process: &'a ProcessHandle,
}

impl<'a> ProcessMemory<'a> {
    pub fn new(process: &'a ProcessHandle) -> Self {
        Self { process }
    }

    #[cfg(target_os = "windows")]
    fn read_bytes_impl(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; size];
        let mut bytes_read = 0;

        // SAFETY: ReadProcessMemory is called with:
        // - A valid process handle from ProcessHandle (obtained via OpenProcess with PROCESS_VM_READ)
        // - A properly allocated buffer of the requested size
        // - A pointer to receive the actual bytes read
        // An invalid address fails the call, which is mapped to Err.
        unsafe {
            ReadProcessMemory(
                self.process.handle(),
                address as *const _,
                buffer.as_mut_ptr() as *mut _,
                size,
                Some(&mut bytes_read),
            )
            .map_err(|e| Error::MemoryReadFailed {
                address,
                message: e.to_string(),
            })?;
        }

        // Partial reads are errors: a torn slot record is worse than no record.
        if bytes_read != size {
            return Err(Error::MemoryReadFailed {
                address,
                message: format!("Expected {} bytes, read {}", size, bytes_read),
            });
        }

        Ok(buffer)
    }

    #[cfg(not(target_os = "windows"))]
    fn read_bytes_impl(&self, address: u64, _size: usize) -> Result<Vec<u8>> {
        Err(Error::MemoryReadFailed {
            address,
            message: "Windows only: memory reading not supported on this platform".to_string(),
        })
    }

    #[cfg(target_os = "windows")]
    fn write_bytes_impl(&self, address: u64, bytes: &[u8]) -> Result<()> {
        let mut bytes_written = 0;

        // SAFETY: WriteProcessMemory is called with a handle opened with PROCESS_VM_WRITE |
        // PROCESS_VM_OPERATION and a source buffer that outlives the call. Failure to write
        // (protected or unmapped page) is reported through the return value.
        unsafe {
            WriteProcessMemory(
                self.process.handle(),
                address as *const _,
                bytes.as_ptr() as *const _,
                bytes.len(),
                Some(&mut bytes_written),
            )
            .map_err(|e| Error::MemoryWriteFailed {
                address,
                message: e.to_string(),
            })?;
        }

        if bytes_written != bytes.len() {
            return Err(Error::MemoryWriteFailed {
                address,
                message: format!("Expected {} bytes, wrote {}", bytes.len(), bytes_written),
            });
        }

        Ok(())
    }

    #[cfg(not(target_os = "windows"))]
    fn write_bytes_impl(&self, address: u64, _bytes: &[u8]) -> Result<()> {
        Err(Error::MemoryWriteFailed {
            address,
            message: "Windows only: memory writing not supported on this platform".to_string(),
        })
    }
}

impl ReadMemory for ProcessMemory<'_> {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        self.read_bytes_impl(address, size)
    }

    fn base_address(&self) -> u64 {
        self.process.base_address
    }
}

impl WriteMemory for ProcessMemory<'_> {
    fn write_bytes(&self, address: u64, bytes: &[u8]) -> Result<()> {
        self.write_bytes_impl(address, bytes)
    }
}

impl ProcessInfo for ProcessMemory<'_> {
    fn pid(&self) -> u32 {
        self.process.pid
    }

    fn module_base(&self) -> u64 {
        self.process.base_address
    }

    fn module_size(&self) -> u32 {
        self.process.module_size
    }

    fn is_alive(&self) -> bool {
        self.process.is_alive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::mock::MockMemory;

    #[test]
    fn test_read_u8() {
        let memory = MockMemory::new(vec![0x7F, 0x01]);
        assert_eq!(memory.read_u8(0x1001).unwrap(), 0x01);
    }

    #[test]
    fn test_read_i32_negative() {
        let memory = MockMemory::new(vec![0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(memory.read_i32(0x1000).unwrap(), -1);
    }

    #[test]
    fn test_read_u32() {
        let memory = MockMemory::new(vec![0x80, 0xA3, 0x30, 0x00]);
        assert_eq!(memory.read_u32(0x1000).unwrap(), 0x30A380);
    }

    #[test]
    fn test_read_f32() {
        let memory = MockMemory::new(8.5f32.to_le_bytes().to_vec());
        assert_eq!(memory.read_f32(0x1000).unwrap(), 8.5);
    }

    #[test]
    fn test_write_then_read_f32() {
        let memory = MockMemory::new(vec![0; 8]);
        memory.write_f32(0x1004, 9.999).unwrap();
        assert_eq!(memory.read_f32(0x1004).unwrap(), 9.999);
    }

    #[test]
    fn test_write_u32_little_endian() {
        let memory = MockMemory::new(vec![0; 4]);
        memory.write_u32(0x1000, 0x0001_0005).unwrap();
        assert_eq!(memory.read_bytes(0x1000, 4).unwrap(), vec![0x05, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn test_read_out_of_bounds() {
        let memory = MockMemory::new(vec![0x01, 0x02]);
        assert!(memory.read_u32(0x1000).is_err());
    }

    #[test]
    fn test_write_out_of_bounds() {
        let memory = MockMemory::new(vec![0x01]);
        assert!(memory.write_u32(0x1000, 7).is_err());
    }
}
