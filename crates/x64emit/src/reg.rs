//! Register model: physical register descriptions and named constants.
//!
//! A [`Reg`] is plain copyable data describing one physical register — its
//! 4-bit encoding index, its operand width in bytes, and its bank (general
//! purpose or XMM). For XMM registers the width doubles as the scalar-format
//! flag: width 4 is scalar-single, width 8 is scalar-double. The flag selects
//! SSE mandatory prefixes only; it never changes the register encoding.

// The JIT-facing constants are lowercase on purpose, matching the assembler
// names they stand for (`rax`, `r13b`, `xmm5s`).
#![allow(non_upper_case_globals)]

use core::fmt;

/// Register bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bank {
    /// General-purpose register file (`rax`..`r15` and their sub-widths).
    Gp,
    /// SSE register file (`xmm0`..`xmm15`).
    Xmm,
}

/// One physical register at a specific operand width.
///
/// Two `Reg` values are equal iff their `(index, bank)` identify the same
/// physical register *and* their widths match; `xmm3` (scalar-double) and
/// `xmm3s` (scalar-single) name the same hardware register but compare
/// unequal because they drive different encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reg {
    index: u8,
    size: u8,
    bank: Bank,
}

impl Reg {
    /// A general-purpose register. `index` is 0–15, `size` is 1/2/4/8 bytes.
    #[must_use]
    pub const fn gp(index: u8, size: u8) -> Self {
        assert!(index < 16);
        assert!(size == 1 || size == 2 || size == 4 || size == 8);
        Self {
            index,
            size,
            bank: Bank::Gp,
        }
    }

    /// An XMM register in scalar-double format. `index` is 0–15.
    #[must_use]
    pub const fn xmm(index: u8) -> Self {
        assert!(index < 16);
        Self {
            index,
            size: 8,
            bank: Bank::Xmm,
        }
    }

    /// An XMM register in scalar-single format. `index` is 0–15.
    #[must_use]
    pub const fn xmm_single(index: u8) -> Self {
        assert!(index < 16);
        Self {
            index,
            size: 4,
            bank: Bank::Xmm,
        }
    }

    /// The 4-bit register encoding index (0–15).
    #[must_use]
    pub fn index(self) -> u8 {
        self.index
    }

    /// Operand width in bytes (1/2/4/8; for XMM, the scalar width).
    #[must_use]
    pub fn size(self) -> u8 {
        self.size
    }

    /// Whether this register is in the general-purpose bank.
    #[must_use]
    pub fn is_gp(self) -> bool {
        matches!(self.bank, Bank::Gp)
    }

    /// Whether this register is in the XMM bank.
    #[must_use]
    pub fn is_xmm(self) -> bool {
        matches!(self.bank, Bank::Xmm)
    }

    /// Whether this is an extended register (index 8–15) requiring REX.R,
    /// REX.X, or REX.B depending on the field it lands in.
    #[must_use]
    pub fn is_extended(self) -> bool {
        self.index >= 8
    }

    /// Whether using this register as a byte operand forces an (otherwise
    /// empty) REX prefix: `spl`/`bpl`/`sil`/`dil` alias `ah`/`ch`/`dh`/`bh`
    /// without one.
    #[must_use]
    pub fn requires_rex_for_byte(self) -> bool {
        self.is_gp() && self.size == 1 && (4..=7).contains(&self.index)
    }

    /// The 3-bit encoding (bits 0–2 of the register index) placed in
    /// ModRM/SIB fields.
    #[must_use]
    pub fn low3(self) -> u8 {
        self.index & 7
    }
}

const GP8_NAMES: [&str; 16] = [
    "al", "cl", "dl", "bl", "spl", "bpl", "sil", "dil", "r8b", "r9b", "r10b", "r11b", "r12b",
    "r13b", "r14b", "r15b",
];
const GP16_NAMES: [&str; 16] = [
    "ax", "cx", "dx", "bx", "sp", "bp", "si", "di", "r8w", "r9w", "r10w", "r11w", "r12w", "r13w",
    "r14w", "r15w",
];
const GP32_NAMES: [&str; 16] = [
    "eax", "ecx", "edx", "ebx", "esp", "ebp", "esi", "edi", "r8d", "r9d", "r10d", "r11d", "r12d",
    "r13d", "r14d", "r15d",
];
const GP64_NAMES: [&str; 16] = [
    "rax", "rcx", "rdx", "rbx", "rsp", "rbp", "rsi", "rdi", "r8", "r9", "r10", "r11", "r12", "r13",
    "r14", "r15",
];

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.bank, self.size) {
            (Bank::Gp, 1) => f.write_str(GP8_NAMES[self.index as usize]),
            (Bank::Gp, 2) => f.write_str(GP16_NAMES[self.index as usize]),
            (Bank::Gp, 4) => f.write_str(GP32_NAMES[self.index as usize]),
            (Bank::Gp, _) => f.write_str(GP64_NAMES[self.index as usize]),
            (Bank::Xmm, 4) => write!(f, "xmm{}s", self.index),
            (Bank::Xmm, _) => write!(f, "xmm{}", self.index),
        }
    }
}

// ─── 8-bit general-purpose registers ────────────────────────────────────

pub const al: Reg = Reg::gp(0, 1);
pub const cl: Reg = Reg::gp(1, 1);
pub const dl: Reg = Reg::gp(2, 1);
pub const bl: Reg = Reg::gp(3, 1);
pub const spl: Reg = Reg::gp(4, 1);
pub const bpl: Reg = Reg::gp(5, 1);
pub const sil: Reg = Reg::gp(6, 1);
pub const dil: Reg = Reg::gp(7, 1);
pub const r8b: Reg = Reg::gp(8, 1);
pub const r9b: Reg = Reg::gp(9, 1);
pub const r10b: Reg = Reg::gp(10, 1);
pub const r11b: Reg = Reg::gp(11, 1);
pub const r12b: Reg = Reg::gp(12, 1);
pub const r13b: Reg = Reg::gp(13, 1);
pub const r14b: Reg = Reg::gp(14, 1);
pub const r15b: Reg = Reg::gp(15, 1);

// ─── 16-bit general-purpose registers ───────────────────────────────────

pub const ax: Reg = Reg::gp(0, 2);
pub const cx: Reg = Reg::gp(1, 2);
pub const dx: Reg = Reg::gp(2, 2);
pub const bx: Reg = Reg::gp(3, 2);
pub const sp: Reg = Reg::gp(4, 2);
pub const bp: Reg = Reg::gp(5, 2);
pub const si: Reg = Reg::gp(6, 2);
pub const di: Reg = Reg::gp(7, 2);
pub const r8w: Reg = Reg::gp(8, 2);
pub const r9w: Reg = Reg::gp(9, 2);
pub const r10w: Reg = Reg::gp(10, 2);
pub const r11w: Reg = Reg::gp(11, 2);
pub const r12w: Reg = Reg::gp(12, 2);
pub const r13w: Reg = Reg::gp(13, 2);
pub const r14w: Reg = Reg::gp(14, 2);
pub const r15w: Reg = Reg::gp(15, 2);

// ─── 32-bit general-purpose registers ───────────────────────────────────

pub const eax: Reg = Reg::gp(0, 4);
pub const ecx: Reg = Reg::gp(1, 4);
pub const edx: Reg = Reg::gp(2, 4);
pub const ebx: Reg = Reg::gp(3, 4);
pub const esp: Reg = Reg::gp(4, 4);
pub const ebp: Reg = Reg::gp(5, 4);
pub const esi: Reg = Reg::gp(6, 4);
pub const edi: Reg = Reg::gp(7, 4);
pub const r8d: Reg = Reg::gp(8, 4);
pub const r9d: Reg = Reg::gp(9, 4);
pub const r10d: Reg = Reg::gp(10, 4);
pub const r11d: Reg = Reg::gp(11, 4);
pub const r12d: Reg = Reg::gp(12, 4);
pub const r13d: Reg = Reg::gp(13, 4);
pub const r14d: Reg = Reg::gp(14, 4);
pub const r15d: Reg = Reg::gp(15, 4);

// ─── 64-bit general-purpose registers ───────────────────────────────────

pub const rax: Reg = Reg::gp(0, 8);
pub const rcx: Reg = Reg::gp(1, 8);
pub const rdx: Reg = Reg::gp(2, 8);
pub const rbx: Reg = Reg::gp(3, 8);
pub const rsp: Reg = Reg::gp(4, 8);
pub const rbp: Reg = Reg::gp(5, 8);
pub const rsi: Reg = Reg::gp(6, 8);
pub const rdi: Reg = Reg::gp(7, 8);
pub const r8: Reg = Reg::gp(8, 8);
pub const r9: Reg = Reg::gp(9, 8);
pub const r10: Reg = Reg::gp(10, 8);
pub const r11: Reg = Reg::gp(11, 8);
pub const r12: Reg = Reg::gp(12, 8);
pub const r13: Reg = Reg::gp(13, 8);
pub const r14: Reg = Reg::gp(14, 8);
pub const r15: Reg = Reg::gp(15, 8);

// ─── XMM registers, scalar-double ───────────────────────────────────────

pub const xmm0: Reg = Reg::xmm(0);
pub const xmm1: Reg = Reg::xmm(1);
pub const xmm2: Reg = Reg::xmm(2);
pub const xmm3: Reg = Reg::xmm(3);
pub const xmm4: Reg = Reg::xmm(4);
pub const xmm5: Reg = Reg::xmm(5);
pub const xmm6: Reg = Reg::xmm(6);
pub const xmm7: Reg = Reg::xmm(7);
pub const xmm8: Reg = Reg::xmm(8);
pub const xmm9: Reg = Reg::xmm(9);
pub const xmm10: Reg = Reg::xmm(10);
pub const xmm11: Reg = Reg::xmm(11);
pub const xmm12: Reg = Reg::xmm(12);
pub const xmm13: Reg = Reg::xmm(13);
pub const xmm14: Reg = Reg::xmm(14);
pub const xmm15: Reg = Reg::xmm(15);

// ─── XMM registers, scalar-single aliases ───────────────────────────────

pub const xmm0s: Reg = Reg::xmm_single(0);
pub const xmm1s: Reg = Reg::xmm_single(1);
pub const xmm2s: Reg = Reg::xmm_single(2);
pub const xmm3s: Reg = Reg::xmm_single(3);
pub const xmm4s: Reg = Reg::xmm_single(4);
pub const xmm5s: Reg = Reg::xmm_single(5);
pub const xmm6s: Reg = Reg::xmm_single(6);
pub const xmm7s: Reg = Reg::xmm_single(7);
pub const xmm8s: Reg = Reg::xmm_single(8);
pub const xmm9s: Reg = Reg::xmm_single(9);
pub const xmm10s: Reg = Reg::xmm_single(10);
pub const xmm11s: Reg = Reg::xmm_single(11);
pub const xmm12s: Reg = Reg::xmm_single(12);
pub const xmm13s: Reg = Reg::xmm_single(13);
pub const xmm14s: Reg = Reg::xmm_single(14);
pub const xmm15s: Reg = Reg::xmm_single(15);
