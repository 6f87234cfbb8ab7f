//! Emit a complete little function and dump its bytes.
//!
//! The function follows the Windows x64 convention the reference assembler
//! targets: argument in `rcx`, result in `rax`. It sums the integers
//! `1..=n` with a backward loop:
//!
//! ```text
//! sum:    push rbp
//!         mov  rbp, rsp
//!         xor  eax, eax
//! top:    cmp  rcx, 0
//!         jle  done
//!         add  rax, rcx
//!         sub  rcx, 1
//!         jmp  top
//! done:   pop  rbp
//!         ret
//! ```
//!
//! Run with: `cargo run --example function`

use x64emit::reg::*;
use x64emit::{Cond, EmitError, Emitter, OpCode};

fn main() -> Result<(), EmitError> {
    let mut region = [0u8; 256];
    let mut asm = Emitter::new(&mut region);

    let top = asm.allocate_label();
    let done = asm.allocate_label();

    asm.emit_r(OpCode::Push, rbp)?;
    asm.emit_rr(OpCode::Mov, rbp, rsp)?;
    asm.emit_rr(OpCode::Xor, eax, eax)?;

    asm.place_label(top)?;
    asm.emit_ri(OpCode::Cmp, rcx, 0)?;
    asm.emit_jcc(Cond::Le, done)?;
    asm.emit_rr(OpCode::Add, rax, rcx)?;
    asm.emit_ri(OpCode::Sub, rcx, 1)?;
    asm.emit_jmp(top)?;

    asm.place_label(done)?;
    asm.emit_r(OpCode::Pop, rbp)?;
    asm.emit(OpCode::Ret)?;

    println!("emitted {} bytes at {:p}:", asm.current_offset(), asm.buffer_start());
    for (i, chunk) in asm.emitted().chunks(8).enumerate() {
        print!("  {:04x}: ", i * 8);
        for byte in chunk {
            print!("{:02X} ", byte);
        }
        println!();
    }
    Ok(())
}
