#![no_main]
use libfuzzer_sys::fuzz_target;

use x64emit::reg::Reg;
use x64emit::{Cond, Emitter, Imm, OpCode};

const OPS: [OpCode; 26] = [
    OpCode::Add,
    OpCode::Or,
    OpCode::Adc,
    OpCode::Sbb,
    OpCode::And,
    OpCode::Sub,
    OpCode::Xor,
    OpCode::Cmp,
    OpCode::Mov,
    OpCode::Lea,
    OpCode::Push,
    OpCode::Pop,
    OpCode::Ret,
    OpCode::Call,
    OpCode::IMul,
    OpCode::MovZX,
    OpCode::MovSX,
    OpCode::CvtSI2FP,
    OpCode::CvtFP2SI,
    OpCode::CvtFP2FP,
    OpCode::Rol,
    OpCode::Ror,
    OpCode::Shl,
    OpCode::Shr,
    OpCode::Sar,
    OpCode::Shld,
];

fn reg(selector: u8) -> Reg {
    let index = selector & 0x0F;
    match (selector >> 4) & 0x07 {
        0 => Reg::gp(index, 1),
        1 => Reg::gp(index, 2),
        2 => Reg::gp(index, 4),
        3 => Reg::gp(index, 8),
        4 => Reg::xmm(index),
        _ => Reg::xmm_single(index),
    }
}

fn imm(kind: u8, raw: u64) -> Imm {
    match kind % 6 {
        0 => Imm::U8(raw as u8),
        1 => Imm::U16(raw as u16),
        2 => Imm::U32(raw as u32),
        3 => Imm::U64(raw),
        4 => Imm::I8(raw as i8),
        _ => Imm::I32(raw as i32),
    }
}

// Interpret the input as a little emission script. The emitter must never
// panic: every byte combination either emits or returns an error.
fuzz_target!(|data: &[u8]| {
    let mut region = [0u8; 4096];
    let mut asm = Emitter::new(&mut region);
    let mut labels = vec![asm.allocate_label()];

    let mut chunks = data.chunks_exact(8);
    for chunk in chunks.by_ref() {
        let op = OPS[chunk[0] as usize % OPS.len()];
        let a = reg(chunk[1]);
        let b = reg(chunk[2]);
        let disp = i32::from_le_bytes([chunk[3], chunk[4], chunk[5], chunk[6]]) >> (chunk[2] % 16);
        let raw = u64::from(chunk[3])
            | u64::from(chunk[4]) << 8
            | u64::from(chunk[5]) << 16
            | u64::from(chunk[6]) << 24;
        let label = labels[chunk[7] as usize % labels.len()];

        let _ = match chunk[0] % 12 {
            0 => asm.emit(op),
            1 => asm.emit_r(op, a),
            2 => asm.emit_rr(op, a, b),
            3 => asm.emit_rm(op, a, b, disp),
            4 => asm.emit_rm_sized(op, a, b, disp, chunk[7] % 9),
            5 => asm.emit_mr(op, a, disp, b),
            6 => asm.emit_ri(op, a, imm(chunk[7], raw)),
            7 => asm.emit_rri(op, a, b, imm(chunk[7], raw)),
            8 => asm.emit_rmi(op, a, b, disp, imm(chunk[7], raw)),
            9 => asm.emit_jmp(label),
            10 => asm.emit_jcc(Cond::Ne, label),
            _ => {
                if chunk[7] & 1 == 0 {
                    labels.push(asm.allocate_label());
                    Ok(())
                } else {
                    asm.place_label(label)
                }
            }
        };
    }
});
