//! Append-only code buffer over a caller-supplied byte region, with label
//! allocation, placement, and displacement fixups.
//!
//! The buffer never reallocates and never rewrites emitted bytes, with one
//! sanctioned exception: patching a previously reserved branch-displacement
//! slot once its label is placed.

use alloc::vec::Vec;
use core::fmt;
use core::mem;

use crate::error::EmitError;

/// Handle to a code position that may be defined before or after the
/// branches that target it.
///
/// A label is an index into the table of the buffer that allocated it and
/// must not be used with any other buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Label(u32);

impl Label {
    /// Rebuild a label from its raw id, e.g. after serialization.
    #[must_use]
    pub fn from_id(id: u32) -> Self {
        Self(id)
    }

    /// The raw label id.
    #[must_use]
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "label#{}", self.0)
    }
}

/// A deferred patch of a branch-displacement slot.
#[derive(Debug, Clone, Copy)]
struct Fixup {
    /// Label the displacement targets.
    label: u32,
    /// Offset of the reserved displacement slot.
    slot: u32,
    /// Slot width in bytes (1 or 4).
    width: u8,
    /// Offset just past the branch instruction; displacements are relative
    /// to this.
    end: u32,
}

/// Buffer sizing, in the spirit of a caller that knows its workload.
///
/// # Examples
///
/// ```rust
/// use x64emit::{BufferConfig, CodeBuffer};
///
/// let mut backing = [0u8; 4096];
/// let buf = CodeBuffer::with_config(
///     &mut backing,
///     BufferConfig {
///         capacity: 2048,
///         arena_capacity: 1024,
///     },
/// );
/// assert_eq!(buf.capacity(), 2048);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferConfig {
    /// Bytes of the backing region the buffer may write. Clamped to the
    /// region length.
    pub capacity: usize,
    /// Scratch bytes reserved up front for the pending-fixup list, so that
    /// label-heavy emission does not reallocate mid-stream.
    pub arena_capacity: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: usize::MAX,
            arena_capacity: 1024,
        }
    }
}

/// Append-only cursor over a caller-supplied byte region.
///
/// All multi-byte writes are little-endian. Each primitive writes either its
/// full width or nothing (on overflow). Offsets are `u32`; regions larger
/// than 4 GiB are clamped.
pub struct CodeBuffer<'a> {
    bytes: &'a mut [u8],
    capacity: u32,
    pos: u32,
    /// Placement state per allocated label; `None` while unplaced.
    labels: Vec<Option<u32>>,
    /// Flat list of pending fixups across all labels.
    fixups: Vec<Fixup>,
}

impl<'a> CodeBuffer<'a> {
    /// Wrap a caller-supplied region with default sizing.
    #[must_use]
    pub fn new(region: &'a mut [u8]) -> Self {
        Self::with_config(region, BufferConfig::default())
    }

    /// Wrap a caller-supplied region with explicit sizing.
    #[must_use]
    pub fn with_config(region: &'a mut [u8], config: BufferConfig) -> Self {
        let capacity = region.len().min(config.capacity).min(u32::MAX as usize) as u32;
        Self {
            bytes: region,
            capacity,
            pos: 0,
            labels: Vec::new(),
            fixups: Vec::with_capacity(config.arena_capacity / mem::size_of::<Fixup>()),
        }
    }

    /// Current write offset.
    #[must_use]
    pub fn current_offset(&self) -> u32 {
        self.pos
    }

    /// Usable capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Address of the first byte of the region, for handing emitted code to
    /// a disassembler or marking it executable.
    #[must_use]
    pub fn buffer_start(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    /// The bytes emitted so far.
    #[must_use]
    pub fn emitted(&self) -> &[u8] {
        &self.bytes[..self.pos as usize]
    }

    fn ensure(&self, need: u32) -> Result<(), EmitError> {
        if u64::from(self.pos) + u64::from(need) > u64::from(self.capacity) {
            return Err(EmitError::BufferFull {
                offset: self.pos,
                capacity: self.capacity,
                need,
            });
        }
        Ok(())
    }

    /// Append one byte.
    pub fn emit_u8(&mut self, v: u8) -> Result<(), EmitError> {
        self.ensure(1)?;
        self.bytes[self.pos as usize] = v;
        self.pos += 1;
        Ok(())
    }

    /// Append a 16-bit value, little-endian.
    pub fn emit_u16(&mut self, v: u16) -> Result<(), EmitError> {
        self.emit_bytes(&v.to_le_bytes())
    }

    /// Append a 32-bit value, little-endian.
    pub fn emit_u32(&mut self, v: u32) -> Result<(), EmitError> {
        self.emit_bytes(&v.to_le_bytes())
    }

    /// Append a 64-bit value, little-endian.
    pub fn emit_u64(&mut self, v: u64) -> Result<(), EmitError> {
        self.emit_bytes(&v.to_le_bytes())
    }

    /// Append a byte slice; writes all of it or nothing.
    pub fn emit_bytes(&mut self, src: &[u8]) -> Result<(), EmitError> {
        let need = src.len().min(u32::MAX as usize) as u32;
        self.ensure(need)?;
        let start = self.pos as usize;
        self.bytes[start..start + src.len()].copy_from_slice(src);
        self.pos += need;
        Ok(())
    }

    /// Rewrite a previously reserved 1- or 4-byte displacement slot.
    ///
    /// This is the only way already-emitted bytes may change. The value must
    /// fit the slot width; the range-checked paths are [`place_label`] and
    /// the branch emitters, which verify the delta before patching.
    ///
    /// [`place_label`]: CodeBuffer::place_label
    pub fn patch_displacement_at(&mut self, offset: u32, width: u8, value: i64) {
        debug_assert!(width == 1 || width == 4, "displacement slots are 1 or 4 bytes");
        debug_assert!(offset + u32::from(width) <= self.pos, "patch past cursor");
        let start = offset as usize;
        if width == 1 {
            debug_assert!(i8::try_from(value).is_ok(), "disp8 patch out of range");
            self.bytes[start] = value as i8 as u8;
        } else {
            debug_assert!(i32::try_from(value).is_ok(), "disp32 patch out of range");
            self.bytes[start..start + 4].copy_from_slice(&(value as i32).to_le_bytes());
        }
    }

    // ─── Labels ─────────────────────────────────────────────────────────

    /// Create a new, unplaced label.
    pub fn allocate_label(&mut self) -> Label {
        let id = self.labels.len() as u32;
        self.labels.push(None);
        Label(id)
    }

    /// The placement offset of `label`, or `None` while unplaced.
    #[must_use]
    pub fn label_offset(&self, label: Label) -> Option<u32> {
        self.labels.get(label.0 as usize).copied().flatten()
    }

    /// Place `label` at the current offset and patch every pending branch
    /// that targets it.
    ///
    /// # Errors
    ///
    /// [`EmitError::LabelAlreadyPlaced`] when the label is already placed;
    /// [`EmitError::BranchOutOfRange`] when a pending short branch cannot
    /// reach the placement offset.
    pub fn place_label(&mut self, label: Label) -> Result<(), EmitError> {
        if label.0 as usize >= self.labels.len() {
            return Err(self.foreign_label(label));
        }
        let slot = &mut self.labels[label.0 as usize];
        if let Some(placed_at) = *slot {
            return Err(EmitError::LabelAlreadyPlaced {
                label,
                placed_at,
                offset: self.pos,
            });
        }
        let target = self.pos;
        *slot = Some(target);

        let mut i = 0;
        while i < self.fixups.len() {
            if self.fixups[i].label != label.0 {
                i += 1;
                continue;
            }
            let fixup = self.fixups.swap_remove(i);
            let disp = i64::from(target) - i64::from(fixup.end);
            Self::check_range(label, disp, fixup.width, fixup.slot)?;
            self.patch_displacement_at(fixup.slot, fixup.width, disp);
        }
        Ok(())
    }

    fn foreign_label(&self, label: Label) -> EmitError {
        EmitError::UnsupportedEncoding {
            detail: alloc::format!("{} was not allocated by this buffer", label),
            offset: self.pos,
        }
    }

    fn check_range(label: Label, disp: i64, width: u8, slot: u32) -> Result<(), EmitError> {
        let max = if width == 1 {
            i64::from(i8::MAX)
        } else {
            i64::from(i32::MAX)
        };
        if disp < -max - 1 || disp > max {
            return Err(EmitError::BranchOutOfRange {
                label,
                disp,
                max,
                offset: slot,
            });
        }
        Ok(())
    }

    /// Append a complete branch instruction: `opcode` bytes followed by a
    /// displacement slot of `width` bytes targeting `label`.
    ///
    /// If the label is already placed the displacement is written
    /// immediately; otherwise the slot is zero-filled and a fixup recorded.
    /// The append is all-or-nothing.
    pub(crate) fn emit_branch(
        &mut self,
        opcode: &[u8],
        label: Label,
        width: u8,
    ) -> Result<(), EmitError> {
        if label.0 as usize >= self.labels.len() {
            return Err(self.foreign_label(label));
        }
        let total = opcode.len() as u32 + u32::from(width);
        self.ensure(total)?;

        let slot = self.pos + opcode.len() as u32;
        let end = self.pos + total;

        self.emit_bytes(opcode)?;
        match self.label_offset(label) {
            Some(target) => {
                let disp = i64::from(target) - i64::from(end);
                Self::check_range(label, disp, width, slot)?;
                if width == 1 {
                    self.emit_u8(disp as i8 as u8)?;
                } else {
                    self.emit_u32(disp as i32 as u32)?;
                }
            }
            None => {
                self.emit_bytes(if width == 1 { &[0] } else { &[0, 0, 0, 0] })?;
                self.fixups.push(Fixup {
                    label: label.0,
                    slot,
                    width,
                    end,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for CodeBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeBuffer")
            .field("capacity", &self.capacity)
            .field("pos", &self.pos)
            .field("labels", &self.labels.len())
            .field("pending_fixups", &self.fixups.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_endian_order() {
        let mut region = [0u8; 16];
        let mut buf = CodeBuffer::new(&mut region);
        buf.emit_u8(0x11).unwrap();
        buf.emit_u16(0x2233).unwrap();
        buf.emit_u32(0x4455_6677).unwrap();
        buf.emit_u64(0x8899_AABB_CCDD_EEFF).unwrap();
        assert_eq!(
            buf.emitted(),
            &[
                0x11, 0x33, 0x22, 0x77, 0x66, 0x55, 0x44, 0xFF, 0xEE, 0xDD, 0xCC, 0xBB, 0xAA,
                0x99, 0x88
            ]
        );
        assert_eq!(buf.current_offset(), 15);
    }

    #[test]
    fn overflow_writes_nothing() {
        let mut region = [0u8; 3];
        let mut buf = CodeBuffer::new(&mut region);
        buf.emit_u16(0x1122).unwrap();
        let err = buf.emit_u32(0xDEAD_BEEF).unwrap_err();
        assert_eq!(
            err,
            EmitError::BufferFull {
                offset: 2,
                capacity: 3,
                need: 4,
            }
        );
        // Cursor unchanged, no partial write.
        assert_eq!(buf.current_offset(), 2);
        assert_eq!(buf.emitted(), &[0x22, 0x11]);
    }

    #[test]
    fn config_clamps_capacity() {
        let mut region = [0u8; 64];
        let buf = CodeBuffer::with_config(
            &mut region,
            BufferConfig {
                capacity: 8,
                arena_capacity: 0,
            },
        );
        assert_eq!(buf.capacity(), 8);
    }

    #[test]
    fn patch_displacement() {
        let mut region = [0u8; 16];
        let mut buf = CodeBuffer::new(&mut region);
        buf.emit_u32(0).unwrap();
        buf.patch_displacement_at(0, 4, -2);
        assert_eq!(buf.emitted(), &[0xFE, 0xFF, 0xFF, 0xFF]);
        buf.patch_displacement_at(1, 1, -5);
        assert_eq!(buf.emitted(), &[0xFE, 0xFB, 0xFF, 0xFF]);
    }

    #[test]
    fn place_with_no_fixups_is_legal() {
        let mut region = [0u8; 16];
        let mut buf = CodeBuffer::new(&mut region);
        let l = buf.allocate_label();
        buf.emit_u8(0x90).unwrap();
        buf.place_label(l).unwrap();
        assert_eq!(buf.label_offset(l), Some(1));
    }

    #[test]
    fn replace_fails() {
        let mut region = [0u8; 16];
        let mut buf = CodeBuffer::new(&mut region);
        let l = buf.allocate_label();
        buf.place_label(l).unwrap();
        buf.emit_u8(0x90).unwrap();
        let err = buf.place_label(l).unwrap_err();
        assert_eq!(
            err,
            EmitError::LabelAlreadyPlaced {
                label: l,
                placed_at: 0,
                offset: 1,
            }
        );
    }

    #[test]
    fn foreign_label_rejected() {
        let mut region = [0u8; 16];
        let mut buf = CodeBuffer::new(&mut region);
        let err = buf.place_label(Label::from_id(7)).unwrap_err();
        assert!(matches!(err, EmitError::UnsupportedEncoding { .. }));
    }

    #[test]
    fn backward_branch_resolves_immediately() {
        let mut region = [0u8; 16];
        let mut buf = CodeBuffer::new(&mut region);
        let l = buf.allocate_label();
        buf.place_label(l).unwrap();
        buf.emit_branch(&[0xEB], l, 1).unwrap();
        // disp = 0 - 2 = -2
        assert_eq!(buf.emitted(), &[0xEB, 0xFE]);
    }

    #[test]
    fn forward_branch_patches_on_placement() {
        let mut region = [0u8; 32];
        let mut buf = CodeBuffer::new(&mut region);
        let l = buf.allocate_label();
        buf.emit_branch(&[0xE9], l, 4).unwrap();
        assert_eq!(buf.emitted(), &[0xE9, 0, 0, 0, 0]);
        buf.emit_u8(0x90).unwrap();
        buf.place_label(l).unwrap();
        // target 6, end 5 → disp 1
        assert_eq!(buf.emitted(), &[0xE9, 0x01, 0x00, 0x00, 0x00, 0x90]);
    }
}
