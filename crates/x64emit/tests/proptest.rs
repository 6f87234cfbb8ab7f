//! Property-based tests using proptest.
//!
//! These verify the encoding invariants across large randomly generated
//! input spaces — displacement width selection, SIB forcing, REX
//! discipline, determinism — complementing the byte-exact listing corpus
//! and the iced-x86 cross-validation suite.

use iced_x86::{Decoder, DecoderOptions, Mnemonic};
use proptest::prelude::*;
use x64emit::reg::Reg;
use x64emit::{EmitError, Emitter, OpCode};

// ── Strategies ──────────────────────────────────────────────────────────

/// Displacement values at and around the width-selection boundaries, plus
/// a uniform range for good measure.
fn arb_disp() -> impl Strategy<Value = i32> {
    prop_oneof![
        Just(0),
        Just(1),
        Just(-1),
        Just(127),
        Just(-127),
        Just(128),
        Just(-128),
        Just(0x1234),
        Just(-0x1234),
        Just(i32::MAX),
        Just(i32::MIN),
        any::<i32>(),
    ]
}

fn arb_index() -> impl Strategy<Value = u8> {
    0u8..16
}

fn arb_gp_size() -> impl Strategy<Value = u8> {
    prop::sample::select(vec![1u8, 2, 4, 8])
}

fn arb_alu_op() -> impl Strategy<Value = OpCode> {
    prop::sample::select(vec![
        OpCode::Add,
        OpCode::Or,
        OpCode::Adc,
        OpCode::Sbb,
        OpCode::And,
        OpCode::Sub,
        OpCode::Xor,
        OpCode::Cmp,
    ])
}

fn emit_one(f: impl FnOnce(&mut Emitter) -> Result<(), EmitError>) -> Vec<u8> {
    let mut region = [0u8; 64];
    let mut asm = Emitter::new(&mut region);
    f(&mut asm).expect("emission failed");
    asm.emitted().to_vec()
}

/// Expected length of `add r64, [base + disp]`: optional REX is always
/// present here (REX.W), so opcode + ModR/M + optional SIB + disp.
fn expected_load_len(base: Reg, disp: i32) -> usize {
    let sib = usize::from(base.low3() == 4);
    let disp_len = if disp == 0 && base.low3() != 5 {
        0
    } else if (-128..=127).contains(&disp) {
        1
    } else {
        4
    };
    1 + 1 + 1 + sib + disp_len
}

proptest! {
    // Determinism: identical inputs produce identical bytes.
    #[test]
    fn identical_inputs_identical_bytes(
        op in arb_alu_op(),
        dst in arb_index(),
        base in arb_index(),
        disp in arb_disp(),
    ) {
        let a = emit_one(|e| e.emit_rm(op, Reg::gp(dst, 8), Reg::gp(base, 8), disp));
        let b = emit_one(|e| e.emit_rm(op, Reg::gp(dst, 8), Reg::gp(base, 8), disp));
        prop_assert_eq!(a, b);
    }

    // Displacement width selection: 0 bytes for disp 0 (except rbp/r13),
    // 1 byte within ±127, else 4 — observable as instruction length.
    #[test]
    fn displacement_width_policy(
        dst in arb_index(),
        base in arb_index(),
        disp in arb_disp(),
    ) {
        let base = Reg::gp(base, 8);
        let bytes = emit_one(|e| e.emit_rm(OpCode::Add, Reg::gp(dst, 8), base, disp));
        prop_assert_eq!(
            bytes.len(),
            expected_load_len(base, disp),
            "add r64, [{}{:+#x}] encoded as {:02X?}", base, disp, bytes
        );
    }

    // SIB forcing: any indirect through rsp/r12 carries the 24h SIB byte
    // right after the ModR/M byte; no other plain [base+disp] form has one.
    #[test]
    fn sib_iff_rsp_r12_base(
        dst in arb_index(),
        base in arb_index(),
        disp in arb_disp(),
    ) {
        let base_reg = Reg::gp(base, 8);
        let bytes = emit_one(|e| e.emit_rm(OpCode::Mov, Reg::gp(dst, 8), base_reg, disp));
        // bytes: REX opcode modrm [sib] [disp...]
        let modrm = bytes[2];
        if base_reg.low3() == 4 {
            prop_assert_eq!(modrm & 0x07, 0b100, "rm must select SIB");
            prop_assert_eq!(bytes[3], 0x24, "SIB must be scale=1/no-index/base");
        } else {
            prop_assert_ne!(modrm & 0x07, 0b100, "no SIB for base {}", base_reg);
        }
    }

    // REX discipline for register-register forms: a REX prefix appears iff
    // W, R, or B is needed or a byte register demands the empty prefix.
    #[test]
    fn rex_iff_needed_rr(
        op in arb_alu_op(),
        dst in arb_index(),
        src in arb_index(),
        size in arb_gp_size(),
    ) {
        let dst = Reg::gp(dst, size);
        let src = Reg::gp(src, size);
        let bytes = emit_one(|e| e.emit_rr(op, dst, src));
        // A possible 66 prefix comes first; the ALU opcodes (00..3B) never
        // collide with the REX range, so the check is unambiguous.
        let candidate = if size == 2 { bytes[1] } else { bytes[0] };
        let has_rex = (0x40..=0x4F).contains(&candidate);
        let wants_rex = size == 8
            || dst.is_extended()
            || src.is_extended()
            || dst.requires_rex_for_byte()
            || src.requires_rex_for_byte();
        prop_assert_eq!(has_rex, wants_rex, "bytes {:02X?}", bytes);
    }

    // Everything the emitter produces for the ALU load shape decodes
    // cleanly in iced-x86 with the right base and displacement.
    #[test]
    fn loads_decode_round_trip(
        dst in arb_index(),
        base in arb_index(),
        disp in arb_disp(),
    ) {
        let bytes = emit_one(|e| e.emit_rm(OpCode::Sub, Reg::gp(dst, 8), Reg::gp(base, 8), disp));
        let mut decoder = Decoder::with_ip(64, &bytes, 0, DecoderOptions::NONE);
        let instr = decoder.decode();
        prop_assert_eq!(instr.mnemonic(), Mnemonic::Sub);
        prop_assert_eq!(instr.len(), bytes.len());
        prop_assert_eq!(instr.memory_displacement64() as i64, i64::from(disp));
    }

    // Shift immediates: count survives the round trip for every register
    // width and every legal count.
    #[test]
    fn shift_counts_round_trip(
        reg in arb_index(),
        size in arb_gp_size(),
        count in 1u8..64,
    ) {
        let bytes = emit_one(|e| e.emit_ri(OpCode::Shr, Reg::gp(reg, size), count));
        let mut decoder = Decoder::with_ip(64, &bytes, 0, DecoderOptions::NONE);
        let instr = decoder.decode();
        prop_assert_eq!(instr.mnemonic(), Mnemonic::Shr);
        prop_assert_eq!(instr.len(), bytes.len());
        prop_assert_eq!(instr.immediate(1), u64::from(count));
    }
}
