//! Error types for machine-code emission.

use alloc::string::String;
use core::fmt;

use crate::buffer::Label;

/// Emission error with the offending buffer offset and descriptive context.
///
/// Every error is fatal to the emission session: the emitter does not rewind,
/// and once any operation has failed the buffer contents must be considered
/// invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitError {
    /// A primitive write would exceed the buffer capacity.
    BufferFull {
        /// Write offset at which the overflow occurred.
        offset: u32,
        /// Configured capacity of the backing buffer in bytes.
        capacity: u32,
        /// Number of bytes the failed write needed.
        need: u32,
    },

    /// A branch displacement does not fit the reserved slot width.
    BranchOutOfRange {
        /// The label the branch targets.
        label: Label,
        /// The actual displacement to the target.
        disp: i64,
        /// Maximum magnitude representable in the slot.
        max: i64,
        /// Offset of the displacement slot being patched.
        offset: u32,
    },

    /// `place_label` was called on a label that is already placed.
    LabelAlreadyPlaced {
        /// The label being re-placed.
        label: Label,
        /// Offset at which the label was first placed.
        placed_at: u32,
        /// Current write offset when the duplicate placement was attempted.
        offset: u32,
    },

    /// Operand shape/width combination not recognized for the opcode.
    UnsupportedEncoding {
        /// Description of the rejected combination.
        detail: String,
        /// Current write offset when the combination was rejected.
        offset: u32,
    },

    /// The request cannot be honored without silent sign-extension data loss.
    ///
    /// A 32-bit immediate into a 64-bit register is unconditionally
    /// sign-extended by the hardware ALU forms; an unsigned value with the
    /// high bit set would therefore come out wrong and is refused.
    SignExtensionLoss {
        /// The immediate value that would be corrupted.
        value: u64,
        /// Current write offset when the immediate was rejected.
        offset: u32,
    },
}

impl EmitError {
    /// The buffer offset at which the error was raised.
    #[must_use]
    pub fn offset(&self) -> u32 {
        match *self {
            EmitError::BufferFull { offset, .. }
            | EmitError::BranchOutOfRange { offset, .. }
            | EmitError::LabelAlreadyPlaced { offset, .. }
            | EmitError::UnsupportedEncoding { offset, .. }
            | EmitError::SignExtensionLoss { offset, .. } => offset,
        }
    }
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitError::BufferFull {
                offset,
                capacity,
                need,
            } => {
                write!(
                    f,
                    "code buffer full at offset {}: {} more byte(s) needed, capacity {}",
                    offset, need, capacity
                )
            }
            EmitError::BranchOutOfRange {
                label,
                disp,
                max,
                offset,
            } => {
                write!(
                    f,
                    "branch to {} out of range at offset {}: displacement {} exceeds ±{}",
                    label, offset, disp, max
                )
            }
            EmitError::LabelAlreadyPlaced {
                label,
                placed_at,
                offset,
            } => {
                write!(
                    f,
                    "{} re-placed at offset {} (first placed at {})",
                    label, offset, placed_at
                )
            }
            EmitError::UnsupportedEncoding { detail, offset } => {
                write!(f, "unsupported encoding at offset {}: {}", offset, detail)
            }
            EmitError::SignExtensionLoss { value, offset } => {
                write!(
                    f,
                    "immediate {:#x} at offset {} would be corrupted by sign extension; \
                     use a 64-bit mov or a narrower form",
                    value, offset
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EmitError {}
