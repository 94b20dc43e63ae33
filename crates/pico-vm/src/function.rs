//! Function descriptors: the code and metadata a `CALL` resolves against.

/// A function loaded from the bytecode file's function table (§6.1).
///
/// Owned by the VM for its whole lifetime; `code` is the raw opcode
/// stream the interpreter dispatches against, starting at offset 0 on
/// every call.
#[derive(Debug)]
pub struct Function {
    /// Constant-pool index of this function's name, for diagnostics and
    /// the disassembler.
    pub name_id: u16,
    pub param_count: u16,
    pub local_count: u16,
    pub code: Box<[u8]>,
}

impl Function {
    pub fn code_len(&self) -> usize {
        self.code.len()
    }
}

/// The function table: functions indexed by their placement slot, as
/// written on disk.
#[derive(Debug, Default)]
pub struct FunctionTable {
    functions: Vec<Function>,
}

impl FunctionTable {
    pub(crate) fn new(functions: Vec<Function>) -> Self {
        FunctionTable { functions }
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn get(&self, index: u16) -> Option<&Function> {
        self.functions.get(index as usize)
    }
}
