//! Shared `.pbc` fixture-building helpers for the end-to-end tests (§8).
//!
//! Mirrors the byte-level builder `pico-vm`'s own loader tests use, kept
//! here instead of depending on `pico-vm`'s `#[cfg(test)]` module (which
//! isn't visible across the crate boundary).

use pico_vm::opcode;

pub struct ConstBuilder {
    pub constants: Vec<u8>,
    count: u16,
}

impl ConstBuilder {
    pub fn new() -> Self {
        ConstBuilder {
            constants: Vec::new(),
            count: 0,
        }
    }

    pub fn int(mut self, v: i32) -> Self {
        self.constants.push(0x01);
        self.constants.extend_from_slice(&v.to_le_bytes());
        self.count += 1;
        self
    }

    pub fn string(mut self, s: &str) -> Self {
        self.constants.push(0x02);
        self.constants
            .extend_from_slice(&(s.len() as u16).to_le_bytes());
        self.constants.extend_from_slice(s.as_bytes());
        self.count += 1;
        self
    }
}

pub struct FunctionDef {
    pub param_count: u16,
    pub local_count: u16,
    pub code: Vec<u8>,
}

pub fn op2(op: u8, operand: u16) -> Vec<u8> {
    let mut v = vec![op];
    v.extend_from_slice(&operand.to_le_bytes());
    v
}

pub fn op0(op: u8) -> Vec<u8> {
    vec![op]
}

/// Assembles a full `.pbc` file buffer from a constant builder, the
/// designated main-function index, and the function table in placement
/// order. No extern imports.
pub fn build_pbc(consts: ConstBuilder, main_index: u16, functions: Vec<FunctionDef>) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"PEXB");
    buf.extend_from_slice(&1u16.to_le_bytes()); // version
    buf.extend_from_slice(&0u16.to_le_bytes()); // reserved
    buf.extend_from_slice(&0u32.to_le_bytes()); // entry point (unused)
    buf.extend_from_slice(&0u32.to_le_bytes()); // code length hint (unused)

    buf.extend_from_slice(&consts.count.to_le_bytes());
    buf.extend_from_slice(&consts.constants);

    buf.extend_from_slice(&main_index.to_le_bytes());

    buf.extend_from_slice(&(functions.len() as u16).to_le_bytes());
    for (i, f) in functions.iter().enumerate() {
        buf.extend_from_slice(&(i as u16).to_le_bytes()); // placement slot
        buf.extend_from_slice(&0u16.to_le_bytes()); // name_id (unused by the VM)
        buf.extend_from_slice(&f.param_count.to_le_bytes());
        buf.extend_from_slice(&f.local_count.to_le_bytes());
        buf.extend_from_slice(&(f.code.len() as u32).to_le_bytes());
        buf.extend_from_slice(&f.code);
    }

    buf.extend_from_slice(&0u16.to_le_bytes()); // num_libs
    buf
}

pub fn write_pbc(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

#[allow(dead_code)]
pub fn ret() -> Vec<u8> {
    op0(opcode::RET)
}
