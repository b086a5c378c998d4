//! Memory mapped accesses to a model.

/// Outcome of an access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IoReqStatus {
    Ok,
    Invalid,
}

/// A read or write at `offset` inside a model's address window.
///
/// Data is little endian.
#[derive(Debug)]
pub struct IoReq<'a> {
    pub offset: u64,
    pub data: &'a mut [u8],
    pub is_write: bool,
}

impl<'a> IoReq<'a> {
    pub fn read(offset: u64, data: &'a mut [u8]) -> Self {
        Self {
            offset,
            data,
            is_write: false,
        }
    }

    pub fn write(offset: u64, data: &'a mut [u8]) -> Self {
        Self {
            offset,
            data,
            is_write: true,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// The payload as a 32-bit word, if the access is exactly 4 bytes wide.
    pub fn word(&self) -> Option<u32> {
        let bytes = <[u8; 4]>::try_from(&*self.data).ok()?;
        Some(u32::from_le_bytes(bytes))
    }

    pub fn set_word(&mut self, value: u32) {
        if let Ok(bytes) = <&mut [u8; 4]>::try_from(&mut *self.data) {
            *bytes = value.to_le_bytes();
        }
    }
}

/// A model reachable through memory mapped accesses.
pub trait IoSlave {
    fn access(&mut self, req: &mut IoReq<'_>) -> IoReqStatus;

    fn read_word(&mut self, offset: u64) -> Result<u32, IoReqStatus> {
        let mut data = [0u8; 4];
        match self.access(&mut IoReq::read(offset, &mut data)) {
            IoReqStatus::Ok => Ok(u32::from_le_bytes(data)),
            status => Err(status),
        }
    }

    fn write_word(&mut self, offset: u64, value: u32) -> IoReqStatus {
        let mut data = value.to_le_bytes();
        self.access(&mut IoReq::write(offset, &mut data))
    }
}
