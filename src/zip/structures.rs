use byteorder::{LittleEndian, ReadBytesExt};
use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};
use std::fmt;
use std::io::Cursor;

use anyhow::{bail, Result};

/// ZIP compression methods, labelled the way Mozilla's libjar names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Shrunk,
    Reduced1,
    Reduced2,
    Reduced3,
    Reduced4,
    Imploded,
    Tokenized,
    Deflated,
    Unsupported,
    /// Non-standard brotli stream used in Firefox omni.ja files.
    MozJarBrotli,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            1 => CompressionMethod::Shrunk,
            2 => CompressionMethod::Reduced1,
            3 => CompressionMethod::Reduced2,
            4 => CompressionMethod::Reduced3,
            5 => CompressionMethod::Reduced4,
            6 => CompressionMethod::Imploded,
            7 => CompressionMethod::Tokenized,
            8 => CompressionMethod::Deflated,
            9 => CompressionMethod::Unsupported,
            129 => CompressionMethod::MozJarBrotli,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Shrunk => 1,
            CompressionMethod::Reduced1 => 2,
            CompressionMethod::Reduced2 => 3,
            CompressionMethod::Reduced3 => 4,
            CompressionMethod::Reduced4 => 5,
            CompressionMethod::Imploded => 6,
            CompressionMethod::Tokenized => 7,
            CompressionMethod::Deflated => 8,
            CompressionMethod::Unsupported => 9,
            CompressionMethod::MozJarBrotli => 129,
            CompressionMethod::Unknown(v) => *v,
        }
    }

    /// Descriptive label, `None` for codes outside the table.
    pub fn label(&self) -> Option<&'static str> {
        Some(match self {
            CompressionMethod::Stored => "STORED",
            CompressionMethod::Shrunk => "SHRUNK",
            CompressionMethod::Reduced1 => "REDUCED1",
            CompressionMethod::Reduced2 => "REDUCED2",
            CompressionMethod::Reduced3 => "REDUCED3",
            CompressionMethod::Reduced4 => "REDUCED4",
            CompressionMethod::Imploded => "IMPLODED",
            CompressionMethod::Tokenized => "TOKENIZED",
            CompressionMethod::Deflated => "DEFLATED",
            CompressionMethod::Unsupported => "UNSUPPORTED",
            CompressionMethod::MozJarBrotli => "MOZ_JAR_BROTLI",
            CompressionMethod::Unknown(_) => return None,
        })
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())?;
        if let Some(label) = self.label() {
            write!(f, " ({label})")?;
        }
        Ok(())
    }
}

/// End of Central Directory (EOCD) - 22 bytes minimum
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            bail!("Invalid End of Central Directory");
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            disk_number: cursor.read_u16::<LittleEndian>()?,
            disk_with_cd: cursor.read_u16::<LittleEndian>()?,
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        })
    }

    pub fn is_zip64(&self) -> bool {
        self.disk_entries == 0xFFFF
            || self.total_entries == 0xFFFF
            || self.cd_size == 0xFFFFFFFF
            || self.cd_offset == 0xFFFFFFFF
    }

    /// Multi-volume archives keep the central directory on another disk.
    pub fn is_multi_volume(&self) -> bool {
        self.disk_number != self.disk_with_cd || self.disk_entries != self.total_entries
    }
}

/// ZIP64 End of Central Directory Locator - 20 bytes
pub struct Zip64EOCDLocator {
    pub disk_with_eocd64: u32,
    pub eocd64_offset: u64,
    pub total_disks: u32,
}

impl Zip64EOCDLocator {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x07";
    pub const SIZE: usize = 20;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            bail!("Invalid ZIP64 format");
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            disk_with_eocd64: cursor.read_u32::<LittleEndian>()?,
            eocd64_offset: cursor.read_u64::<LittleEndian>()?,
            total_disks: cursor.read_u32::<LittleEndian>()?,
        })
    }
}

/// ZIP64 End of Central Directory - 56 bytes minimum
pub struct Zip64EOCD {
    pub total_entries: u64,
    pub cd_size: u64,
    pub cd_offset: u64,
}

impl Zip64EOCD {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x06";
    pub const MIN_SIZE: usize = 56;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::MIN_SIZE || &data[0..4] != Self::SIGNATURE {
            bail!("Invalid ZIP64 format");
        }

        // size (8), versions (2+2), disk numbers (4+4), entries on this disk (8)
        let mut cursor = Cursor::new(&data[32..]);

        Ok(Self {
            total_entries: cursor.read_u64::<LittleEndian>()?,
            cd_size: cursor.read_u64::<LittleEndian>()?,
            cd_offset: cursor.read_u64::<LittleEndian>()?,
        })
    }
}

/// Central Directory File Header (CDFH) - 46 bytes minimum
pub const CDFH_SIGNATURE: &[u8] = b"PK\x01\x02";
pub const CDFH_MIN_SIZE: usize = 46;

/// Local File Header (LFH) - 30 bytes
pub const LFH_SIGNATURE: &[u8] = b"PK\x03\x04";
pub const LFH_SIZE: usize = 30;

/// General purpose flag bit 0: entry is encrypted.
pub const FLAG_ENCRYPTED: u16 = 0x0001;

/// DOS date for 1980-01-01, stamped on synthetic directory entries.
pub const DOS_EPOCH_DATE: u16 = 1 | (1 << 5);

/// Parsed ZIP file entry information
#[derive(Debug, Clone)]
pub struct ZipFileEntry {
    pub file_name: String,
    pub compression_method: CompressionMethod,
    pub flags: u16,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub crc32: u32,
    pub lfh_offset: u64,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    /// Modification time from the extended timestamp extra field (0x5455).
    pub unix_mtime: Option<i64>,
    pub is_directory: bool,
    /// Materialised by the reader for an implied ancestor directory.
    pub is_synthetic: bool,
}

impl ZipFileEntry {
    /// Directory entry for an ancestor that is not stored in the archive.
    pub fn synthetic_directory(file_name: String) -> Self {
        Self {
            file_name,
            compression_method: CompressionMethod::Stored,
            flags: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            crc32: 0,
            lfh_offset: 0,
            last_mod_time: 0,
            last_mod_date: DOS_EPOCH_DATE,
            unix_mtime: None,
            is_directory: true,
            is_synthetic: true,
        }
    }

    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }

    /// Parse modification date to (year, month, day)
    pub fn mod_date(&self) -> (u16, u8, u8) {
        let day = (self.last_mod_date & 0x1F) as u8;
        let month = ((self.last_mod_date >> 5) & 0x0F) as u8;
        let year = ((self.last_mod_date >> 9) & 0x7F) + 1980;
        (year, month, day)
    }

    /// Parse modification time to (hour, minute, second)
    pub fn mod_time(&self) -> (u8, u8, u8) {
        let second = ((self.last_mod_time & 0x1F) * 2) as u8;
        let minute = ((self.last_mod_time >> 5) & 0x3F) as u8;
        let hour = ((self.last_mod_time >> 11) & 0x1F) as u8;
        (hour, minute, second)
    }

    /// Modification time in microseconds since the Unix epoch.
    ///
    /// Prefers the extended timestamp; DOS date/time fields carry no zone
    /// and are read as local time.
    pub fn last_modified_micros(&self) -> i64 {
        if let Some(secs) = self.unix_mtime {
            return secs * 1_000_000;
        }

        let naive = self.dos_datetime();
        match Local.from_local_datetime(&naive).earliest() {
            Some(local) => local.timestamp_micros(),
            None => naive.and_utc().timestamp_micros(),
        }
    }

    fn dos_datetime(&self) -> NaiveDateTime {
        let (year, month, day) = self.mod_date();
        let (hour, minute, second) = self.mod_time();
        NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
            .and_then(|date| date.and_hms_opt(hour as u32, minute as u32, second as u32))
            .unwrap_or_default()
            .max(dos_epoch())
    }
}

fn dos_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1980, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compression_labels() {
        assert_eq!(CompressionMethod::from_u16(8).to_string(), "8 (DEFLATED)");
        assert_eq!(CompressionMethod::from_u16(129).to_string(), "129 (MOZ_JAR_BROTLI)");
        assert_eq!(CompressionMethod::from_u16(0).to_string(), "0 (STORED)");
        assert_eq!(CompressionMethod::from_u16(42).to_string(), "42");
        assert_eq!(CompressionMethod::from_u16(42).as_u16(), 42);
    }

    #[test]
    fn dos_fields_decode() {
        let mut entry = ZipFileEntry::synthetic_directory("a/".to_string());
        // 2017-09-21 13:45:30
        entry.last_mod_date = ((2017 - 1980) << 9) | (9 << 5) | 21;
        entry.last_mod_time = (13 << 11) | (45 << 5) | 15;
        assert_eq!(entry.mod_date(), (2017, 9, 21));
        assert_eq!(entry.mod_time(), (13, 45, 30));
    }

    #[test]
    fn extended_timestamp_wins() {
        let mut entry = ZipFileEntry::synthetic_directory("a/".to_string());
        entry.unix_mtime = Some(1_500_000_000);
        assert_eq!(entry.last_modified_micros(), 1_500_000_000_000_000);
    }

    #[test]
    fn invalid_dos_date_clamps_to_epoch() {
        let mut entry = ZipFileEntry::synthetic_directory("a/".to_string());
        entry.last_mod_date = 0;
        assert_eq!(entry.dos_datetime(), dos_epoch());
    }
}
