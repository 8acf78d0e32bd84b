use crate::isa::types::{
    hw::Word,
    schema::{Builder, InstDef, OperandKind},
};

const R: OperandKind = OperandKind::Register;

const fn imm(width: usize) -> OperandKind {
    OperandKind::Immediate(width)
}

// NOTE Operand order is the field order in the encoding: destination first,
// then sources, then any immediate fields.

fn gen_alu(builder: &mut Builder) {
    reg(builder, "ADD", 0b0000, vec![R, R, R]);
    reg(builder, "ADDI", 0b0001, vec![R, imm(8)]);
    reg(builder, "SUB", 0b0010, vec![R, R, R]);
    reg(builder, "AND", 0b0011, vec![R, R, R]);
    reg(builder, "OR", 0b0100, vec![R, R, R]);
    reg(builder, "XOR", 0b0101, vec![R, R, R]);
    reg(builder, "SHL", 0b1101, vec![R, R, imm(1), imm(3)]);
    reg(builder, "SHR", 0b1110, vec![R, R, imm(1), imm(3)]);
    reg(builder, "CMP", 0b1111, vec![R, R]);
}

fn gen_mem(builder: &mut Builder) {
    reg(builder, "LOADI", 0b0110, vec![R, imm(8)]);
    // Base register, then a 4-bit offset.
    reg(builder, "LOAD", 0b0111, vec![R, R, imm(4)]);
    reg(builder, "STORE", 0b1000, vec![R, R, imm(4)]);
}

fn gen_ctl(builder: &mut Builder) {
    reg(builder, "JMP", 0b1001, vec![imm(12)]);
    reg(builder, "BRZ", 0b1010, vec![imm(12)]);
    reg(builder, "BRNZ", 0b1011, vec![imm(12)]);
    reg(builder, "BRNN", 0b1100, vec![imm(12)]);
}

fn reg(builder: &mut Builder, mnemonic: &str, opcode: Word, operands: Vec<OperandKind>) {
    if let Err(err) = builder.register(InstDef::new(mnemonic, opcode, operands)) {
        panic!("bad builtin instruction definition: {}", err);
    }
}

pub(crate) fn register(builder: &mut Builder) {
    gen_alu(builder);
    gen_mem(builder);
    gen_ctl(builder);
}
