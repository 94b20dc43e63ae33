//! Human-readable disassembly of a loaded `BytecodeUnit`, for `pico-cli
//! --disassemble`.

use std::fmt::Write as _;

use pico_gc::Value;

use crate::constant::ConstantPool;
use crate::function::FunctionTable;
use crate::opcode;

/// Renders every function's code buffer as one opcode per line, with
/// decoded operands where the mnemonic takes a constant-pool index.
pub fn disassemble(functions: &FunctionTable, constants: &ConstantPool) -> String {
    let mut out = String::new();
    for index in 0..functions.len() {
        let function = functions.get(index as u16).expect("index in range");
        let _ = writeln!(
            out,
            "Function {} (name_id={}, params={}, locals={}, code_len={}):",
            index,
            function.name_id,
            function.param_count,
            function.local_count,
            function.code_len()
        );

        let code = &function.code;
        let mut pc = 0usize;
        while pc < code.len() {
            let op = code[pc];
            let has_operand = opcode::has_operand(op);
            let size = if has_operand { 3 } else { 1 };
            let name = opcode::mnemonic(op).unwrap_or("UNKNOWN");

            let mut bytes = String::new();
            for i in 0..size {
                if pc + i < code.len() {
                    let _ = write!(bytes, "{:02X} ", code[pc + i]);
                }
            }

            let _ = write!(out, "{pc:>6} |> {bytes:<10}{name:<16}");

            if has_operand && pc + 2 < code.len() {
                let operand = code[pc + 1] as u16 | (u16::from(code[pc + 2]) << 8);
                match op {
                    opcode::LIC | opcode::LSC => {
                        if let Ok(value) = constants.get(operand) {
                            match value {
                                Value::Int(v) => {
                                    let _ = write!(out, "${v}");
                                }
                                Value::Str(s) => {
                                    let _ = write!(out, "'{}'", s.as_str());
                                }
                                _ => {
                                    let _ = write!(out, "?{operand}");
                                }
                            }
                        }
                    }
                    opcode::CALL_EXTERN | opcode::VOID_CALL_EXTERN => {
                        if let Ok(bytes) = constants.get_str_bytes(operand) {
                            let _ = write!(out, "@{}", String::from_utf8_lossy(bytes));
                        }
                    }
                    _ => {
                        let _ = write!(out, "{operand}");
                    }
                }
            }

            let _ = writeln!(out);
            pc += size;
        }
        let _ = writeln!(out);
    }
    out
}
