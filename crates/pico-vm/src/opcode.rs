//! Opcode byte values (§4.4). Kept as plain `u8` constants rather than a
//! closed `enum` — the dispatch loop matches on a byte read straight off
//! the wire, and an unrecognized byte must fall through to the `_ =>`
//! "unknown opcode" arm rather than fail to parse.

pub const LIC: u8 = 0x05;
pub const LSC: u8 = 0x06;
pub const LBT: u8 = 0x07;
pub const LBF: u8 = 0x08;
pub const STORE: u8 = 0x09;
pub const ISTORE: u8 = 0x0A;
pub const ILOAD: u8 = 0x0B;
pub const IINC: u8 = 0x0C;
pub const IDEC: u8 = 0x0D;

pub const IADD: u8 = 0x20;
pub const ISUB: u8 = 0x21;
pub const IMUL: u8 = 0x22;
pub const IDIV: u8 = 0x23;
pub const IREM: u8 = 0x24;
pub const IAND: u8 = 0x25;
pub const IOR: u8 = 0x26;
pub const IBAND: u8 = 0x27;
pub const IBOR: u8 = 0x28;
pub const IBXOR: u8 = 0x29;
pub const ISHL: u8 = 0x2A;
pub const ISHR: u8 = 0x2B;

pub const IEQ: u8 = 0x2C;
pub const INE: u8 = 0x2D;
pub const ILT: u8 = 0x2E;
pub const ILE: u8 = 0x2F;
pub const IGT: u8 = 0x30;
pub const IGE: u8 = 0x31;

pub const L2B: u8 = 0x5B;
pub const L2I: u8 = 0x5C;
pub const I2L: u8 = 0x5D;
pub const I2B: u8 = 0x5E;
pub const B2I: u8 = 0x5F;

pub const JF: u8 = 0x60;
pub const JMP: u8 = 0x62;
pub const RET: u8 = 0x66;
pub const CALL: u8 = 0x68;
pub const VOID_CALL: u8 = 0x69;
pub const CALL_EXTERN: u8 = 0x6A;
pub const VOID_CALL_EXTERN: u8 = 0x6B;

pub const ALLOCA_STRUCT: u8 = 0x70;
pub const SET_FIELD: u8 = 0x71;
pub const STORE_FIELD: u8 = 0x72;
pub const LOAD_FIELD: u8 = 0x73;
pub const IFIELD_INC: u8 = 0x74;
pub const IFIELD_DEC: u8 = 0x75;

pub const LOG: u8 = 0x85;

/// Human-readable mnemonic for an opcode byte, used by the disassembler
/// and in error diagnostics. Returns `None` for reserved/unknown bytes.
pub fn mnemonic(op: u8) -> Option<&'static str> {
    Some(match op {
        LIC => "LIC",
        LSC => "LSC",
        LBT => "LBT",
        LBF => "LBF",
        STORE => "STORE",
        ISTORE => "ISTORE",
        ILOAD => "ILOAD",
        IINC => "IINC",
        IDEC => "IDEC",
        IADD => "IADD",
        ISUB => "ISUB",
        IMUL => "IMUL",
        IDIV => "IDIV",
        IREM => "IREM",
        IAND => "IAND",
        IOR => "IOR",
        IBAND => "IBAND",
        IBOR => "IBOR",
        IBXOR => "IBXOR",
        ISHL => "ISHL",
        ISHR => "ISHR",
        IEQ => "IEQ",
        INE => "INE",
        ILT => "ILT",
        ILE => "ILE",
        IGT => "IGT",
        IGE => "IGE",
        L2B => "L2B",
        L2I => "L2I",
        I2L => "I2L",
        I2B => "I2B",
        B2I => "B2I",
        JF => "JF",
        JMP => "JMP",
        RET => "RET",
        CALL => "CALL",
        VOID_CALL => "VOID_CALL",
        CALL_EXTERN => "CALL_EXTERN",
        VOID_CALL_EXTERN => "VOID_CALL_EXTERN",
        ALLOCA_STRUCT => "ALLOCA_STRUCT",
        SET_FIELD => "SET_FIELD",
        STORE_FIELD => "STORE_FIELD",
        LOAD_FIELD => "LOAD_FIELD",
        IFIELD_INC => "IFIELD_INC",
        IFIELD_DEC => "IFIELD_DEC",
        LOG => "LOG",
        _ => return None,
    })
}

/// `true` for every opcode that carries a 2-byte little-endian operand.
pub fn has_operand(op: u8) -> bool {
    matches!(
        op,
        LIC | LSC
            | STORE
            | ISTORE
            | ILOAD
            | IINC
            | IDEC
            | JF
            | JMP
            | CALL
            | VOID_CALL
            | CALL_EXTERN
            | VOID_CALL_EXTERN
            | ALLOCA_STRUCT
            | SET_FIELD
            | STORE_FIELD
            | LOAD_FIELD
            | IFIELD_INC
            | IFIELD_DEC
    )
}
