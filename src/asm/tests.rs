use super::*;

#[test]
fn addresses_advance_by_one_per_emitted_instruction() {
    let mut asm = Assembler::new();
    assert_eq!(asm.next_addr(), 0);
    let a = asm.emit_lit(7);
    assert_eq!(a, 0);
    assert_eq!(asm.curr_addr(), 0);
    assert_eq!(asm.next_addr(), 1);
    let b = asm.emit_opr(Operator::Add);
    assert_eq!(b, 1);
    assert_eq!(asm.next_addr(), 2);
}

#[test]
fn patch_rewrites_jump_target() {
    let mut asm = Assembler::new();
    let jmp = asm.emit_jmp(0);
    asm.emit_lit(1);
    let target = asm.next_addr() as u32;
    asm.patch(jmp, target);
    match &asm.code()[jmp] {
        Instruction::Jmp { address } => assert_eq!(*address, target),
        _ => panic!("expected a Jmp"),
    }
}

#[test]
fn patch_rewrites_conditional_jump_target() {
    let mut asm = Assembler::new();
    let jpc = asm.emit_jpc(0);
    let target = asm.next_addr() as u32;
    asm.patch(jpc, target);
    match &asm.code()[jpc] {
        Instruction::Jpc { address } => assert_eq!(*address, target),
        _ => panic!("expected a Jpc"),
    }
}

#[test]
fn patch_rewrites_call_address_without_disturbing_level() {
    let mut asm = Assembler::new();
    let cal = asm.emit_cal(3, 0);
    asm.patch(cal, 99);
    match &asm.code()[cal] {
        Instruction::Cal { level, address } => {
            assert_eq!(*level, 3);
            assert_eq!(*address, 99);
        }
        _ => panic!("expected a Cal"),
    }
}

#[test]
fn patch_level_rewrites_call_level_without_disturbing_address() {
    let mut asm = Assembler::new();
    let cal = asm.emit_cal(0, 0);
    asm.patch_level(cal, 2);
    asm.patch(cal, 5);
    match &asm.code()[cal] {
        Instruction::Cal { level, address } => {
            assert_eq!(*level, 2);
            assert_eq!(*address, 5);
        }
        _ => panic!("expected a Cal"),
    }
}

#[test]
#[should_panic]
fn patch_level_on_a_non_call_instruction_panics() {
    let mut asm = Assembler::new();
    let jmp = asm.emit_jmp(0);
    asm.patch_level(jmp, 1);
}

#[test]
#[should_panic]
fn patching_a_non_jump_non_call_instruction_panics() {
    let mut asm = Assembler::new();
    let lit = asm.emit_lit(5);
    asm.patch(lit, 1);
}

#[test]
fn int_instruction_reserves_locals_plus_frame_header() {
    let mut asm = Assembler::new();
    asm.emit_int(4);
    assert_eq!(asm.code()[0].fields(), ("INT", 0, 7));
}

#[test]
fn opr_fields_carry_the_operator_code_in_address_not_level() {
    let mut asm = Assembler::new();
    asm.emit_opr(Operator::Add);
    assert_eq!(asm.code()[0].fields(), ("OPR", 0, Operator::Add.code()));
    assert_eq!(asm.code()[0].to_string(), "OPR 0, 2");
}

#[test]
fn operator_codes_match_the_fixed_abi() {
    assert_eq!(Operator::Ret.code(), 0);
    assert_eq!(Operator::Sub.code(), 1);
    assert_eq!(Operator::Add.code(), 2);
    assert_eq!(Operator::Div.code(), 3);
    assert_eq!(Operator::Mul.code(), 4);
    assert_eq!(Operator::Lt.code(), 5);
    assert_eq!(Operator::Leq.code(), 6);
    assert_eq!(Operator::Gt.code(), 7);
    assert_eq!(Operator::Geq.code(), 8);
    assert_eq!(Operator::Eq.code(), 9);
    assert_eq!(Operator::Neq.code(), 10);
    assert_eq!(Operator::Odd.code(), 11);
    assert_eq!(Operator::Write.code(), 14);
    assert_eq!(Operator::Read.code(), 16);
}

#[test]
fn operator_from_code_round_trips() {
    for op in [
        Operator::Ret,
        Operator::Sub,
        Operator::Add,
        Operator::Div,
        Operator::Mul,
        Operator::Lt,
        Operator::Leq,
        Operator::Gt,
        Operator::Geq,
        Operator::Eq,
        Operator::Neq,
        Operator::Odd,
        Operator::Write,
        Operator::Read,
    ] {
        assert_eq!(Operator::from_code(op.code()), Some(op));
    }
    assert_eq!(Operator::from_code(12), None);
}
