//! # x64emit — Pure Rust x86-64 Machine-Code Emitter
//!
//! `x64emit` is a pure Rust, zero-C-dependency x86-64 instruction emitter:
//! the back-end of a runtime code generator. It writes executable byte
//! sequences for a curated subset of the Intel 64 instruction set into a
//! caller-supplied buffer and resolves forward and backward branch targets.
//!
//! ## Quick Start
//!
//! ```rust
//! use x64emit::reg::{rax, rcx};
//! use x64emit::{Cond, Emitter, OpCode};
//!
//! let mut buf = [0u8; 128];
//! let mut asm = Emitter::new(&mut buf);
//!
//! let done = asm.allocate_label();
//! asm.emit_rr(OpCode::Mov, rax, rcx).unwrap();
//! asm.emit_ri(OpCode::Cmp, rax, 0).unwrap();
//! asm.emit_jcc(Cond::E, done).unwrap();
//! asm.emit_ri(OpCode::Add, rax, 1).unwrap();
//! asm.place_label(done).unwrap();
//! asm.emit(OpCode::Ret).unwrap();
//!
//! assert!(!asm.emitted().is_empty());
//! ```
//!
//! ## Features
//!
//! - **Byte-exact** — output matches the reference assembler listing for
//!   every supported form, including the ModR/M corner cases (`[rbp]`/
//!   `[r13]` forced `disp8`, `[rsp]`/`[r12]` forced SIB) and the
//!   sign-extension immediate rules.
//! - **Labels** — branches may target labels placed earlier or later;
//!   forward references are patched on placement.
//! - **Caller-owned memory** — the emitter never allocates code memory and
//!   never resizes; hand it a writable region, mark it executable yourself.
//! - **`no_std` + `alloc`** — embeddable in kernels and firmware.
//!
//! ## Errors
//!
//! Every failure is fatal to the emission session; see [`EmitError`].

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
// ── Pedantic lint policy ─────────────────────────────────────────────────
// An instruction encoder intentionally performs many narrowing /
// sign-changing casts between integer widths (i128→u8, i32→u8, etc.) and
// uses dense hex literals without separators (0x0F, 0xB8).  The lints below
// are expected and acceptable in this context.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::cast_possible_wrap,
    clippy::unreadable_literal,
    clippy::match_same_arms,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

extern crate alloc;

/// Append-only code buffer, labels, and displacement fixups.
pub mod buffer;
/// x86-64 instruction encoder (REX, ModR/M, SIB, immediates, branches).
pub mod encoder;
/// Error types for machine-code emission.
pub mod error;
/// Register model and named register constants.
pub mod reg;

// Re-exports
pub use buffer::{BufferConfig, CodeBuffer, Label};
pub use encoder::{Cond, Emitter, Imm, OpCode};
pub use error::EmitError;
pub use reg::{Bank, Reg};
