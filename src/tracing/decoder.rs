//! # Record Decoding
//!
//! Turns raw ring-buffer samples into typed [`StateEvent`]s.
//!
//! The probe writes a fixed 24-byte little-endian record per state change:
//!
//! ```text
//! offset  0..4   state  (u32)
//! offset  4..8   padding (struct alignment, ignored)
//! offset  8..16  goid   (u64)
//! offset 16..20  pid    (u32)
//! offset 20..24  tgid   (u32)
//! ```
//!
//! Fields are read individually rather than by reinterpreting the buffer as
//! a struct, so compiler packing differences on either side cannot silently
//! skew the layout. This offset table is the one bit-compatibility surface
//! shared with the probe object and must stay in sync with it.

use std::fmt;

use crate::domain::{GoroutineId, MalformedRecord, Pid, Tgid};

/// Minimum length of a well-formed record.
pub const RECORD_LEN: usize = 24;

/// Scheduler state of a goroutine, as reported by `runtime.casgstatus`.
///
/// The ten known codes mirror the Go runtime's `_Gidle`..`_Gpreempted`
/// constants. Codes outside the table are preserved verbatim in
/// [`GoroutineState::Unknown`] rather than clamped or rejected, so a newer
/// runtime with extra states still traces usefully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoroutineState {
    Idle,
    Runnable,
    Running,
    Syscall,
    Waiting,
    MoribundUnused,
    Dead,
    EnqueueUnused,
    Copystack,
    Preempted,
    /// A state code outside the known table, raw value preserved.
    Unknown(u32),
}

impl GoroutineState {
    /// Map a raw state code from the record onto the known table.
    #[must_use]
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::Idle,
            1 => Self::Runnable,
            2 => Self::Running,
            3 => Self::Syscall,
            4 => Self::Waiting,
            5 => Self::MoribundUnused,
            6 => Self::Dead,
            7 => Self::EnqueueUnused,
            8 => Self::Copystack,
            9 => Self::Preempted,
            other => Self::Unknown(other),
        }
    }

    /// The raw numeric code, preserved exactly for unknown states.
    #[must_use]
    pub fn raw(self) -> u32 {
        match self {
            Self::Idle => 0,
            Self::Runnable => 1,
            Self::Running => 2,
            Self::Syscall => 3,
            Self::Waiting => 4,
            Self::MoribundUnused => 5,
            Self::Dead => 6,
            Self::EnqueueUnused => 7,
            Self::Copystack => 8,
            Self::Preempted => 9,
            Self::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for GoroutineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("IDLE"),
            Self::Runnable => f.write_str("RUNNABLE"),
            Self::Running => f.write_str("RUNNING"),
            Self::Syscall => f.write_str("SYSCALL"),
            Self::Waiting => f.write_str("WAITING"),
            Self::MoribundUnused => f.write_str("MORIBUND_UNUSED"),
            Self::Dead => f.write_str("DEAD"),
            Self::EnqueueUnused => f.write_str("ENQUEUE_UNUSED"),
            Self::Copystack => f.write_str("COPYSTACK"),
            Self::Preempted => f.write_str("PREEMPTED"),
            Self::Unknown(raw) => write!(f, "UNKNOWN({raw})"),
        }
    }
}

/// One decoded state-change observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateEvent {
    pub state: GoroutineState,
    pub goid: GoroutineId,
    pub pid: Pid,
    pub tgid: Tgid,
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(buf)
}

fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(buf)
}

/// Decode a raw ring-buffer sample.
///
/// Pure: no side effects, no allocation beyond the returned value.
///
/// # Errors
/// Returns [`MalformedRecord`] iff the sample is shorter than
/// [`RECORD_LEN`] bytes. Trailing bytes beyond the fixed layout are ignored.
pub fn decode(bytes: &[u8]) -> Result<StateEvent, MalformedRecord> {
    if bytes.len() < RECORD_LEN {
        return Err(MalformedRecord { len: bytes.len() });
    }

    let state = read_u32(bytes, 0);
    // offset 4..8 is struct padding
    let goid = read_u64(bytes, 8);
    let pid = read_u32(bytes, 16);
    let tgid = read_u32(bytes, 20);

    Ok(StateEvent {
        state: GoroutineState::from_raw(state),
        goid: GoroutineId(goid),
        pid: Pid(pid),
        tgid: Tgid(tgid),
    })
}
