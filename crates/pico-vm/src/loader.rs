//! Parses a `.pbc` bytecode file (§6.1) into a [`BytecodeUnit`].
//!
//! All multi-byte integers on the wire are little-endian. The cursor
//! tracks a byte offset (not a bit offset — the wire format is always
//! byte-aligned) so truncation errors can point at exactly where the
//! file ran out.

use std::path::Path;

use crate::constant::{ConstantPool, Entry};
use crate::error::{LoaderError, Result, VmError};
use crate::function::{Function, FunctionTable};
use crate::native::NativeRegistry;

const MAGIC: &[u8; 4] = b"PEXB";
const HEADER_LEN: usize = 16;

const TAG_INT: u8 = 0x01;
const TAG_STRING: u8 = 0x02;

/// A library an extern-imports section names, with the native function
/// names it requires (§4.1). Kept only for validation — it does not
/// drive linkage.
#[derive(Debug)]
pub struct ExternImport {
    pub lib_name_index: u16,
    pub fn_name_indices: Vec<u16>,
}

/// The deserialized form of a `.pbc` file (§2, §6.1).
pub struct BytecodeUnit {
    pub constants: ConstantPool,
    pub functions: FunctionTable,
    pub main_index: u16,
    pub extern_imports: Vec<ExternImport>,
}

/// A read-only byte cursor over an in-memory bytecode buffer.
struct Cursor<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Cursor { buf, offset: 0 }
    }

    fn need(&self, n: usize) -> Result<()> {
        if self.offset + n > self.buf.len() {
            return Err(VmError::Loader(LoaderError::Truncated {
                offset: self.offset,
                needed: n,
            }));
        }
        Ok(())
    }

    fn read_u8(&mut self) -> Result<u8> {
        self.need(1)?;
        let v = self.buf[self.offset];
        self.offset += 1;
        Ok(v)
    }

    fn read_u16(&mut self) -> Result<u16> {
        self.need(2)?;
        let v = u16::from_le_bytes([self.buf[self.offset], self.buf[self.offset + 1]]);
        self.offset += 2;
        Ok(v)
    }

    fn read_u32(&mut self) -> Result<u32> {
        self.need(4)?;
        let v = u32::from_le_bytes(self.buf[self.offset..self.offset + 4].try_into().unwrap());
        self.offset += 4;
        Ok(v)
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.need(n)?;
        let slice = &self.buf[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }
}

/// Loads and parses a `.pbc` file from `path`.
///
/// Fails fatally (per §7) on a missing file, a wrong extension, a
/// truncated record, or an invalid constant tag.
pub fn load(path: &Path) -> Result<BytecodeUnit> {
    if path.extension().and_then(|e| e.to_str()) != Some("pbc") {
        return Err(VmError::Loader(LoaderError::WrongExtension(
            path.display().to_string(),
        )));
    }

    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            VmError::Loader(LoaderError::NotFound(path.display().to_string()))
        } else {
            VmError::Loader(LoaderError::Io {
                path: path.display().to_string(),
                source: e,
            })
        }
    })?;

    parse(&bytes)
}

fn parse(bytes: &[u8]) -> Result<BytecodeUnit> {
    let mut cur = Cursor::new(bytes);

    cur.need(HEADER_LEN)?;
    let magic = cur.read_bytes(4)?;
    if magic != MAGIC {
        let mut found = [0u8; 4];
        found.copy_from_slice(magic);
        return Err(VmError::Loader(LoaderError::BadMagic { found }));
    }
    let _version = cur.read_u16()?;
    let _reserved = cur.read_u16()?;
    let _entry_point = cur.read_u32()?;
    let _code_length_hint = cur.read_u32()?;

    let num_constants = cur.read_u16()?;
    let mut entries = Vec::with_capacity(num_constants as usize);
    for _ in 0..num_constants {
        let tag_offset = cur.offset;
        let tag = cur.read_u8()?;
        match tag {
            TAG_INT => entries.push(Entry::Int(cur.read_i32()?)),
            TAG_STRING => {
                let len = cur.read_u16()? as usize;
                let raw = cur.read_bytes(len)?;
                let mut owned = Vec::with_capacity(len + 1);
                owned.extend_from_slice(raw);
                owned.push(0); // loader-appended trailing NUL, per §4.1
                entries.push(Entry::Str(owned.into_boxed_slice()));
            }
            other => {
                return Err(VmError::Loader(LoaderError::InvalidConstantTag {
                    tag: other,
                    offset: tag_offset,
                }))
            }
        }
    }
    let constants = ConstantPool::new(entries);

    let main_index = cur.read_u16()?;

    let num_functions = cur.read_u16()? as usize;
    let mut functions: Vec<Option<Function>> = (0..num_functions).map(|_| None).collect();
    for _ in 0..num_functions {
        let function_index = cur.read_u16()? as usize;
        let name_id = cur.read_u16()?;
        let param_count = cur.read_u16()?;
        let local_count = cur.read_u16()?;
        let code_len = cur.read_u32()? as usize;
        let code = cur.read_bytes(code_len)?.to_vec().into_boxed_slice();
        let function = Function {
            name_id,
            param_count,
            local_count,
            code,
        };
        if function_index >= num_functions {
            return Err(VmError::Loader(LoaderError::FunctionSlotOutOfRange {
                index: function_index,
                declared: num_functions,
            }));
        }
        functions[function_index] = Some(function);
    }
    let mut resolved = Vec::with_capacity(num_functions);
    for (i, slot) in functions.into_iter().enumerate() {
        resolved.push(slot.ok_or(VmError::Loader(LoaderError::UnfilledFunctionSlot {
            index: i,
            declared: num_functions,
        }))?);
    }
    let functions = FunctionTable::new(resolved);

    if main_index as usize >= functions.len() {
        return Err(VmError::Loader(LoaderError::MainIndexOutOfRange {
            index: main_index,
            count: functions.len(),
        }));
    }

    let num_libs = cur.read_u16()?;
    let mut extern_imports = Vec::with_capacity(num_libs as usize);
    for _ in 0..num_libs {
        let lib_name_index = cur.read_u16()?;
        let fn_count = cur.read_u16()?;
        let mut fn_name_indices = Vec::with_capacity(fn_count as usize);
        for _ in 0..fn_count {
            fn_name_indices.push(cur.read_u16()?);
        }
        extern_imports.push(ExternImport {
            lib_name_index,
            fn_name_indices,
        });
    }

    Ok(BytecodeUnit {
        constants,
        functions,
        main_index,
        extern_imports,
    })
}

/// Checks that every native the extern-imports section requires is
/// registered, without itself driving linkage (§4.1). Intended to run
/// once, after the extension loader has populated the registry and
/// before the root frame starts executing.
pub fn validate_extern_imports(unit: &BytecodeUnit, registry: &NativeRegistry) -> Result<()> {
    for import in &unit.extern_imports {
        for &fn_name_index in &import.fn_name_indices {
            let name_bytes = unit.constants.get_str_bytes(fn_name_index)?;
            let name = String::from_utf8_lossy(name_bytes);
            registry.get(&name)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode;
    use std::io::Write;

    /// Builds a minimal valid `.pbc` buffer: constants `[int 5]`, one
    /// function (index 0, arity 0, 0 locals) running `LIC 0; RET`, no
    /// extern imports. Matches end-to-end scenario 1 in §8.
    fn minimal_unit_bytes() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"PEXB");
        buf.extend_from_slice(&1u16.to_le_bytes()); // version
        buf.extend_from_slice(&0u16.to_le_bytes()); // reserved
        buf.extend_from_slice(&0u32.to_le_bytes()); // entry point (unused)
        buf.extend_from_slice(&0u32.to_le_bytes()); // code length hint (unused)

        buf.extend_from_slice(&1u16.to_le_bytes()); // num_constants
        buf.push(0x01); // tag: int
        buf.extend_from_slice(&5i32.to_le_bytes());

        buf.extend_from_slice(&0u16.to_le_bytes()); // main function index

        buf.extend_from_slice(&1u16.to_le_bytes()); // num_functions
        buf.extend_from_slice(&0u16.to_le_bytes()); // function_index (slot)
        buf.extend_from_slice(&0u16.to_le_bytes()); // name_id
        buf.extend_from_slice(&0u16.to_le_bytes()); // param_count
        buf.extend_from_slice(&0u16.to_le_bytes()); // local_count
        let code = [opcode::LIC, 0x00, 0x00, opcode::RET];
        buf.extend_from_slice(&(code.len() as u32).to_le_bytes());
        buf.extend_from_slice(&code);

        buf.extend_from_slice(&0u16.to_le_bytes()); // num_libs
        buf
    }

    fn write_temp_pbc(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".pbc").tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_a_minimal_valid_unit() {
        let file = write_temp_pbc(&minimal_unit_bytes());
        let unit = load(file.path()).unwrap();
        assert_eq!(unit.constants.len(), 1);
        assert_eq!(unit.functions.len(), 1);
        assert_eq!(unit.main_index, 0);
        assert!(unit.extern_imports.is_empty());
    }

    #[test]
    fn rejects_wrong_extension() {
        let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        file.write_all(&minimal_unit_bytes()).unwrap();
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, VmError::Loader(LoaderError::WrongExtension(_))));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = minimal_unit_bytes();
        bytes[0] = b'X';
        let file = write_temp_pbc(&bytes);
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, VmError::Loader(LoaderError::BadMagic { .. })));
    }

    #[test]
    fn rejects_truncated_file() {
        let mut bytes = minimal_unit_bytes();
        bytes.truncate(bytes.len() - 3);
        let file = write_temp_pbc(&bytes);
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, VmError::Loader(LoaderError::Truncated { .. })));
    }

    #[test]
    fn rejects_invalid_constant_tag() {
        let mut bytes = minimal_unit_bytes();
        // The int constant's tag byte sits right after the 16-byte header
        // and the 2-byte constant count.
        bytes[18] = 0xFF;
        let file = write_temp_pbc(&bytes);
        let err = load(file.path()).unwrap_err();
        assert!(matches!(
            err,
            VmError::Loader(LoaderError::InvalidConstantTag { tag: 0xFF, .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_main_index() {
        let mut bytes = minimal_unit_bytes();
        // main function index sits right after the constant table: 16
        // header bytes + 2 count + 1 tag + 4 int bytes = offset 23.
        bytes[23] = 0x09;
        let file = write_temp_pbc(&bytes);
        let err = load(file.path()).unwrap_err();
        assert!(matches!(
            err,
            VmError::Loader(LoaderError::MainIndexOutOfRange { .. })
        ));
    }
}
