//! The fetch-decode-execute loop (§4.3, §4.4).
//!
//! The operand stack is one shared `Vec<Value>`; its length *is* the
//! stack pointer, so there is nothing separate to "synchronize" on
//! return the way a cached per-frame counter would need. A [`Frame`]
//! keeps only `bp`, the depth its own values start at, so arity checks
//! can refuse to let a call reach below the values it's actually owed.
//!
//! Root discovery for the GC is deliberately narrow (§4.2): a collection
//! traces exactly the live operand stack, nothing from frame locals.
//! `locals` arrays are always reachable some other way by the time they
//! matter (an object assigned into a local was built from a stack value
//! first), so this narrower root set is intentional, not an oversight.

use std::ffi::c_void;

use pico_gc::Value;

use crate::constant::ConstantPool;
use crate::env::Environment;
use crate::error::{ExecError, NativeError, Result, VmError};
use crate::frame::{Frame, MAX_FRAMES};
use crate::function::FunctionTable;
use crate::loader::BytecodeUnit;
use crate::native::{NativeEntry, RawValue};
use crate::opcode;

/// Maximum operand-stack depth (§3.6, §4.3).
pub const MAX_STACK: usize = 2048;

/// The execution engine: frame stack, operand stack, and the constant
/// pool / function table loaded for this run.
pub struct Vm {
    frames: Vec<Frame>,
    stack: Vec<Value>,
    constants: ConstantPool,
    functions: FunctionTable,
    main_index: u16,
}

impl Vm {
    pub fn new(unit: BytecodeUnit) -> Self {
        Vm {
            frames: Vec::with_capacity(MAX_FRAMES),
            stack: Vec::with_capacity(MAX_STACK),
            constants: unit.constants,
            functions: unit.functions,
            main_index: unit.main_index,
        }
    }

    pub fn constants(&self) -> &ConstantPool {
        &self.constants
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    pub fn main_index(&self) -> u16 {
        self.main_index
    }

    fn push(&mut self, value: Value) -> Result<()> {
        if self.stack.len() >= MAX_STACK {
            return Err(VmError::Execution(ExecError::StackOverflow { limit: MAX_STACK }));
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self) -> Result<Value> {
        self.stack
            .pop()
            .ok_or(VmError::Execution(ExecError::StackUnderflow))
    }

    fn peek(&self) -> Result<Value> {
        self.stack
            .last()
            .copied()
            .ok_or(VmError::Execution(ExecError::StackUnderflow))
    }

    fn pop_int(&mut self) -> Result<i32> {
        match self.pop()? {
            Value::Int(v) => Ok(v),
            other => Err(VmError::Execution(ExecError::WrongKind {
                expected: "Int",
                found: kind_name(&other),
            })),
        }
    }

    fn pop_bool(&mut self) -> Result<bool> {
        match self.pop()? {
            Value::Bool(v) => Ok(v),
            other => Err(VmError::Execution(ExecError::WrongKind {
                expected: "Bool",
                found: kind_name(&other),
            })),
        }
    }

    fn pop_object(&mut self) -> Result<pico_gc::ObjRef> {
        match self.pop()? {
            Value::Object(r) => Ok(r),
            other => Err(VmError::Execution(ExecError::WrongKind {
                expected: "Object",
                found: kind_name(&other),
            })),
        }
    }

    /// Runs until the root frame returns (§4.6 `Running` state).
    pub fn run(&mut self, env: &mut Environment) -> Result<()> {
        let main_function = self.functions.get(self.main_index).ok_or(VmError::Execution(
            ExecError::FunctionIndexOutOfRange {
                index: self.main_index,
                count: self.functions.len(),
            },
        ))?;
        let root = Frame::new(self.main_index, main_function.local_count, 0, None);
        self.frames.push(root);
        let mut current = self.frames.len() - 1;

        loop {
            let fidx = self.frames[current].function_index;
            let ip = self.frames[current].ip;
            let code_len = self.functions.get(fidx).expect("valid function index").code_len();

            if ip >= code_len {
                // Ran off the end of the code buffer without an explicit
                // RET: treat exactly like RET with no value, per the
                // source's bound-on-ip dispatch loop.
                match self.frames[current].parent {
                    Some(parent) => {
                        self.frames.pop();
                        current = parent;
                        continue;
                    }
                    None => {
                        self.frames.pop();
                        return Ok(());
                    }
                }
            }

            let (op, next_ip, operand) = {
                let code = &self.functions.get(fidx).expect("valid function index").code;
                let op = code[ip];
                let mut next = ip + 1;
                let operand = if opcode::has_operand(op) {
                    if next + 1 >= code.len() {
                        return Err(VmError::Execution(ExecError::UnknownOpcode {
                            opcode: op,
                            ip,
                            function: format!("#{fidx}"),
                        }));
                    }
                    let lo = code[next] as u16;
                    let hi = code[next + 1] as u16;
                    next += 2;
                    Some(lo | (hi << 8))
                } else {
                    None
                };
                (op, next, operand)
            };
            self.frames[current].ip = next_ip;

            match op {
                opcode::LIC => {
                    let v = self.constants.get(operand.unwrap())?;
                    self.push(v)?;
                }
                opcode::LSC => {
                    let v = self.constants.get(operand.unwrap())?;
                    self.push(v)?;
                }
                opcode::LBT => self.push(Value::Bool(true))?,
                opcode::LBF => self.push(Value::Bool(false))?,

                opcode::STORE | opcode::ISTORE => {
                    let idx = operand.unwrap();
                    let v = self.pop()?;
                    let frame = &mut self.frames[current];
                    let slot = frame.locals.get_mut(idx as usize).ok_or(VmError::Execution(
                        ExecError::LocalIndexOutOfRange {
                            index: idx,
                            count: frame.locals.len(),
                        },
                    ))?;
                    *slot = v;
                }
                opcode::ILOAD => {
                    let idx = operand.unwrap();
                    let frame = &self.frames[current];
                    let v = *frame.locals.get(idx as usize).ok_or(VmError::Execution(
                        ExecError::LocalIndexOutOfRange {
                            index: idx,
                            count: frame.locals.len(),
                        },
                    ))?;
                    self.push(v)?;
                }
                opcode::IINC => {
                    let idx = operand.unwrap();
                    let frame = &mut self.frames[current];
                    let slot = frame.locals.get_mut(idx as usize).ok_or(VmError::Execution(
                        ExecError::LocalIndexOutOfRange {
                            index: idx,
                            count: frame.locals.len(),
                        },
                    ))?;
                    match slot {
                        Value::Int(v) => *v = v.wrapping_add(1),
                        other => {
                            return Err(VmError::Execution(ExecError::WrongKind {
                                expected: "Int",
                                found: kind_name(other),
                            }))
                        }
                    }
                }
                opcode::IDEC => {
                    let idx = operand.unwrap();
                    let frame = &mut self.frames[current];
                    let slot = frame.locals.get_mut(idx as usize).ok_or(VmError::Execution(
                        ExecError::LocalIndexOutOfRange {
                            index: idx,
                            count: frame.locals.len(),
                        },
                    ))?;
                    match slot {
                        Value::Int(v) => *v = v.wrapping_sub(1),
                        other => {
                            return Err(VmError::Execution(ExecError::WrongKind {
                                expected: "Int",
                                found: kind_name(other),
                            }))
                        }
                    }
                }

                opcode::IADD => {
                    let b = self.pop_int()?;
                    let a = self.pop_int()?;
                    self.push(Value::Int(a.wrapping_add(b)))?;
                }
                opcode::ISUB => {
                    let b = self.pop_int()?;
                    let a = self.pop_int()?;
                    self.push(Value::Int(a.wrapping_sub(b)))?;
                }
                opcode::IMUL => {
                    let b = self.pop_int()?;
                    let a = self.pop_int()?;
                    self.push(Value::Int(a.wrapping_mul(b)))?;
                }
                opcode::IDIV => {
                    let b = self.pop_int()?;
                    let a = self.pop_int()?;
                    if b == 0 {
                        return Err(VmError::Execution(ExecError::DivisionByZero));
                    }
                    self.push(Value::Int(a.wrapping_div(b)))?;
                }
                opcode::IREM => {
                    let b = self.pop_int()?;
                    let a = self.pop_int()?;
                    if b == 0 {
                        return Err(VmError::Execution(ExecError::DivisionByZero));
                    }
                    self.push(Value::Int(a.wrapping_rem(b)))?;
                }
                opcode::IAND => {
                    let b = self.pop_bool()?;
                    let a = self.pop_bool()?;
                    self.push(Value::Bool(a && b))?;
                }
                opcode::IOR => {
                    let b = self.pop_bool()?;
                    let a = self.pop_bool()?;
                    self.push(Value::Bool(a || b))?;
                }
                opcode::IBAND => {
                    let b = self.pop_int()?;
                    let a = self.pop_int()?;
                    self.push(Value::Int(a & b))?;
                }
                opcode::IBOR => {
                    let b = self.pop_int()?;
                    let a = self.pop_int()?;
                    self.push(Value::Int(a | b))?;
                }
                opcode::IBXOR => {
                    let b = self.pop_int()?;
                    let a = self.pop_int()?;
                    self.push(Value::Int(a ^ b))?;
                }
                opcode::ISHL => {
                    let b = self.pop_int()?;
                    let a = self.pop_int()?;
                    self.push(Value::Int(a.wrapping_shl(b as u32 & 31)))?;
                }
                opcode::ISHR => {
                    let b = self.pop_int()?;
                    let a = self.pop_int()?;
                    self.push(Value::Int(a.wrapping_shr(b as u32 & 31)))?;
                }

                opcode::IEQ => {
                    let b = self.pop_int()?;
                    let a = self.pop_int()?;
                    self.push(Value::Bool(a == b))?;
                }
                opcode::INE => {
                    let b = self.pop_int()?;
                    let a = self.pop_int()?;
                    self.push(Value::Bool(a != b))?;
                }
                opcode::ILT => {
                    let b = self.pop_int()?;
                    let a = self.pop_int()?;
                    self.push(Value::Bool(a < b))?;
                }
                opcode::ILE => {
                    let b = self.pop_int()?;
                    let a = self.pop_int()?;
                    self.push(Value::Bool(a <= b))?;
                }
                opcode::IGT => {
                    let b = self.pop_int()?;
                    let a = self.pop_int()?;
                    self.push(Value::Bool(a > b))?;
                }
                opcode::IGE => {
                    let b = self.pop_int()?;
                    let a = self.pop_int()?;
                    self.push(Value::Bool(a >= b))?;
                }

                opcode::I2B => {
                    let a = self.pop_int()?;
                    self.push(Value::Bool(a != 0))?;
                }
                opcode::B2I => {
                    let a = self.pop_bool()?;
                    self.push(Value::Int(if a { 1 } else { 0 }))?;
                }

                opcode::JF => {
                    let target = operand.unwrap();
                    let cond = self.pop_bool()?;
                    if !cond {
                        self.frames[current].ip = target as usize;
                    }
                }
                opcode::JMP => {
                    let target = operand.unwrap();
                    self.frames[current].ip = target as usize;
                }

                opcode::RET => match self.frames[current].parent {
                    Some(parent) => {
                        self.frames.pop();
                        current = parent;
                    }
                    None => {
                        self.frames.pop();
                        return Ok(());
                    }
                },

                opcode::CALL | opcode::VOID_CALL => {
                    let target_index = operand.unwrap();
                    let target = self.functions.get(target_index).ok_or(VmError::Execution(
                        ExecError::FunctionIndexOutOfRange {
                            index: target_index,
                            count: self.functions.len(),
                        },
                    ))?;
                    let param_count = target.param_count;
                    let local_count = target.local_count;

                    let caller_bp = self.frames[current].bp;
                    let available = self.stack.len() - caller_bp;
                    if param_count as usize > available {
                        return Err(VmError::Execution(ExecError::ArityMismatch {
                            arity: param_count as usize,
                            available,
                        }));
                    }

                    // `bp` is the stack depth once arguments are consumed,
                    // not the depth they start at — the callee's own
                    // region (and any value it leaves behind for its
                    // caller) begins there, per the arity check above.
                    let new_bp = self.stack.len() - param_count as usize;
                    let mut child = Frame::new(target_index, local_count, new_bp, Some(current));
                    for i in (0..param_count as usize).rev() {
                        child.locals[i] = self.pop()?;
                    }

                    if self.frames.len() >= MAX_FRAMES {
                        return Err(VmError::Execution(ExecError::FrameOverflow {
                            limit: MAX_FRAMES,
                        }));
                    }
                    self.frames.push(child);
                    current = self.frames.len() - 1;
                }

                opcode::CALL_EXTERN | opcode::VOID_CALL_EXTERN => {
                    let name_index = operand.unwrap();
                    let name_bytes = self.constants.get_str_bytes(name_index)?;
                    let name = String::from_utf8_lossy(name_bytes).into_owned();
                    let entry = *env.registry.get(&name)?;
                    let arity = entry.arity() as usize;
                    let available = self.stack.len();
                    if arity > available {
                        return Err(VmError::Execution(ExecError::ArityMismatch {
                            arity,
                            available,
                        }));
                    }
                    let args_start = self.stack.len() - arity;
                    let raw_args: Vec<RawValue> = self.stack[args_start..]
                        .iter()
                        .map(|v| RawValue::from_value(*v))
                        .collect();
                    self.stack.truncate(args_start);

                    match (op, entry) {
                        (opcode::CALL_EXTERN, NativeEntry::ReturnsValue { func, .. }) => {
                            let env_ptr = env as *mut Environment as *mut c_void;
                            // SAFETY: `func` was registered with this exact
                            // signature by an extension library; `raw_args`
                            // holds exactly `arity` initialized values.
                            let raw = unsafe { func(env_ptr, raw_args.as_ptr()) };
                            // SAFETY: the native returned this value in the
                            // same call, so any `Str` payload still points
                            // at live storage.
                            let result = unsafe { raw.into_value() };
                            self.push(result)?;
                        }
                        (opcode::VOID_CALL_EXTERN, NativeEntry::ReturnsVoid { func, .. }) => {
                            let env_ptr = env as *mut Environment as *mut c_void;
                            // SAFETY: see above.
                            unsafe { func(env_ptr, raw_args.as_ptr()) };
                        }
                        (opcode::CALL_EXTERN, NativeEntry::ReturnsVoid { .. }) => {
                            return Err(VmError::Native(NativeError::KindMismatch {
                                name,
                                expected: "a value-returning native",
                                found: "void-returning",
                            }))
                        }
                        (opcode::VOID_CALL_EXTERN, NativeEntry::ReturnsValue { .. }) => {
                            return Err(VmError::Native(NativeError::KindMismatch {
                                name,
                                expected: "a void-returning native",
                                found: "value-returning",
                            }))
                        }
                        _ => unreachable!("op is CALL_EXTERN or VOID_CALL_EXTERN by the outer match"),
                    }
                }

                opcode::ALLOCA_STRUCT => {
                    let num_fields = operand.unwrap();
                    if num_fields > 255 {
                        return Err(VmError::Gc(pico_gc::GcError::TooManyFields {
                            num_fields: num_fields as usize,
                        }));
                    }
                    let obj = env.gc.allocate(num_fields as u8, self.stack.as_mut_slice())?;
                    self.push(Value::Object(obj))?;
                }
                opcode::SET_FIELD => {
                    let field_idx = operand.unwrap();
                    let value = self.pop()?;
                    let obj = self.peek()?;
                    let obj = match obj {
                        Value::Object(r) => r,
                        other => {
                            return Err(VmError::Execution(ExecError::WrongKind {
                                expected: "Object",
                                found: kind_name(&other),
                            }))
                        }
                    };
                    env.gc.set_field(obj, field_idx as u8, value)?;
                }
                opcode::STORE_FIELD => {
                    let field_idx = operand.unwrap();
                    let obj = self.pop_object()?;
                    let value = self.peek()?;
                    env.gc.set_field(obj, field_idx as u8, value)?;
                }
                opcode::LOAD_FIELD => {
                    let field_idx = operand.unwrap();
                    let obj = self.pop_object()?;
                    let value = env.gc.get_field(obj, field_idx as u8)?;
                    self.push(value)?;
                }
                opcode::IFIELD_INC => {
                    let field_idx = operand.unwrap();
                    let obj = self.pop_object()?;
                    let current_value = env.gc.get_field(obj, field_idx as u8)?;
                    match current_value {
                        Value::Int(v) => env.gc.set_field(
                            obj,
                            field_idx as u8,
                            Value::Int(v.wrapping_add(1)),
                        )?,
                        other => {
                            return Err(VmError::Execution(ExecError::WrongKind {
                                expected: "Int",
                                found: kind_name(&other),
                            }))
                        }
                    }
                }
                opcode::IFIELD_DEC => {
                    let field_idx = operand.unwrap();
                    let obj = self.pop_object()?;
                    let current_value = env.gc.get_field(obj, field_idx as u8)?;
                    match current_value {
                        Value::Int(v) => env.gc.set_field(
                            obj,
                            field_idx as u8,
                            Value::Int(v.wrapping_sub(1)),
                        )?,
                        other => {
                            return Err(VmError::Execution(ExecError::WrongKind {
                                expected: "Int",
                                found: kind_name(&other),
                            }))
                        }
                    }
                }

                opcode::LOG => {
                    let v = self.pop_int()?;
                    println!("{v}");
                }

                other => {
                    return Err(VmError::Execution(ExecError::UnknownOpcode {
                        opcode: other,
                        ip,
                        function: format!("#{fidx}"),
                    }))
                }
            }
        }
    }
}

fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Int(_) => "Int",
        Value::Bool(_) => "Bool",
        Value::Str(_) => "Str",
        Value::Object(_) => "Object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::Entry;
    use crate::function::Function;
    use pico_gc::GcConfig;

    fn unit(constants: Vec<Entry>, functions: Vec<Function>, main_index: u16) -> BytecodeUnit {
        BytecodeUnit {
            constants: ConstantPool::new(constants),
            functions: FunctionTable::new(functions),
            main_index,
            extern_imports: Vec::new(),
        }
    }

    fn function(param_count: u16, local_count: u16, code: Vec<u8>) -> Function {
        Function {
            name_id: 0,
            param_count,
            local_count,
            code: code.into_boxed_slice(),
        }
    }

    fn test_env() -> Environment {
        Environment::new(GcConfig::default()).unwrap()
    }

    fn operand(v: u16) -> [u8; 2] {
        v.to_le_bytes()
    }

    /// Scenario 1 (§8): `LIC 0; RET` leaves the constant on the stack.
    #[test]
    fn lic_then_ret_pushes_the_constant_and_terminates() {
        let mut code = vec![opcode::LIC];
        code.extend_from_slice(&operand(0));
        code.push(opcode::RET);
        let u = unit(vec![Entry::Int(42)], vec![function(0, 0, code)], 0);
        let mut vm = Vm::new(u);
        let mut env = test_env();
        vm.run(&mut env).unwrap();
        assert_eq!(vm.stack, vec![Value::Int(42)]);
    }

    /// A parameter-taking function that itself calls another function
    /// before returning must see its own argument as available, and the
    /// callee's call must not reach down into it. Regression test for a
    /// `bp` that was captured before arguments were popped off the stack.
    #[test]
    fn a_function_with_parameters_can_call_another_function() {
        // fn g(x) { return x }
        let mut g_code = vec![opcode::ILOAD];
        g_code.extend_from_slice(&operand(0));
        g_code.push(opcode::RET);

        // fn f(x) { return g(x) }
        let mut f_code = vec![opcode::ILOAD];
        f_code.extend_from_slice(&operand(0));
        f_code.push(opcode::CALL);
        f_code.extend_from_slice(&operand(2)); // call g (function 2)
        f_code.push(opcode::RET);

        // fn main() { return f(5) }
        let mut main_code = vec![opcode::LIC];
        main_code.extend_from_slice(&operand(0)); // constant 5
        main_code.push(opcode::CALL);
        main_code.extend_from_slice(&operand(1)); // call f (function 1)
        main_code.push(opcode::RET);

        let u = unit(
            vec![Entry::Int(5)],
            vec![
                function(0, 0, main_code),
                function(1, 1, f_code),
                function(1, 1, g_code),
            ],
            0,
        );
        let mut vm = Vm::new(u);
        let mut env = test_env();
        vm.run(&mut env).unwrap();
        assert_eq!(vm.stack, vec![Value::Int(5)]);
    }

    /// Scenario 4 (§8): allocate a struct, store into a field with each of
    /// the three field-write opcodes, then read it back.
    #[test]
    fn struct_fields_round_trip_through_alloca_and_load() {
        let mut code = Vec::new();
        code.push(opcode::ALLOCA_STRUCT);
        code.extend_from_slice(&operand(1)); // one field
        code.push(opcode::LIC);
        code.extend_from_slice(&operand(0)); // constant 7
        code.push(opcode::SET_FIELD);
        code.extend_from_slice(&operand(0));
        code.push(opcode::LOAD_FIELD);
        code.extend_from_slice(&operand(0));
        code.push(opcode::RET);

        let u = unit(vec![Entry::Int(7)], vec![function(0, 0, code)], 0);
        let mut vm = Vm::new(u);
        let mut env = test_env();
        vm.run(&mut env).unwrap();
        assert_eq!(vm.stack, vec![Value::Int(7)]);
    }

    /// Scenario 5 (§8): a loop that calls a leaf function many times
    /// returns the operand stack to exactly where it started, and never
    /// needs the frame stack any deeper than one call.
    #[test]
    fn repeated_calls_leave_the_stack_balanced() {
        // fn leaf() { return }
        // fn main() {
        //   counter = 1000
        //   while counter != 0 { leaf(); counter -= 1 }
        // }
        let leaf_code = vec![opcode::RET];

        let mut main_code = Vec::new();
        main_code.push(opcode::LIC);
        main_code.extend_from_slice(&operand(0)); // constant 1000
        main_code.push(opcode::ISTORE);
        main_code.extend_from_slice(&operand(0));

        let loop_start = main_code.len() as u16;
        main_code.push(opcode::ILOAD);
        main_code.extend_from_slice(&operand(0));
        main_code.push(opcode::LIC);
        main_code.extend_from_slice(&operand(1)); // constant 0
        main_code.push(opcode::INE);
        let jf_patch = main_code.len();
        main_code.push(opcode::JF);
        main_code.extend_from_slice(&operand(0)); // patched below
        main_code.push(opcode::VOID_CALL);
        main_code.extend_from_slice(&operand(1)); // call leaf (function 1)
        main_code.push(opcode::IDEC);
        main_code.extend_from_slice(&operand(0));
        main_code.push(opcode::JMP);
        main_code.extend_from_slice(&operand(loop_start));

        let end = main_code.len() as u16;
        main_code[jf_patch + 1..jf_patch + 3].copy_from_slice(&operand(end));
        main_code.push(opcode::RET);

        let u = unit(
            vec![Entry::Int(1000), Entry::Int(0)],
            vec![function(0, 1, main_code), function(0, 0, leaf_code)],
            0,
        );
        let mut vm = Vm::new(u);
        let mut env = test_env();
        let heap_before = env.gc.heap_size();
        vm.run(&mut env).unwrap();
        assert!(vm.stack.is_empty());
        assert_eq!(env.gc.heap_size(), heap_before);
    }

    /// Scenario 6 (§8): repeatedly allocating without retaining keeps the
    /// live set at zero, so the heap never needs to grow.
    #[test]
    fn unretained_allocations_do_not_grow_the_heap() {
        let mut code = Vec::new();
        for _ in 0..64 {
            code.push(opcode::ALLOCA_STRUCT);
            code.extend_from_slice(&operand(4));
        }
        code.push(opcode::RET);

        let u = unit(vec![], vec![function(0, 0, code)], 0);
        let mut vm = Vm::new(u);
        let mut env = test_env();
        let heap_before = env.gc.heap_size();
        vm.run(&mut env).unwrap();
        assert_eq!(env.gc.heap_size(), heap_before);
    }

    #[test]
    fn division_by_zero_is_a_fatal_error() {
        let mut code = Vec::new();
        code.push(opcode::LIC);
        code.extend_from_slice(&operand(0)); // constant 1
        code.push(opcode::LIC);
        code.extend_from_slice(&operand(1)); // constant 0
        code.push(opcode::IDIV);
        code.push(opcode::RET);

        let u = unit(vec![Entry::Int(1), Entry::Int(0)], vec![function(0, 0, code)], 0);
        let mut vm = Vm::new(u);
        let mut env = test_env();
        let err = vm.run(&mut env).unwrap_err();
        assert!(matches!(
            err,
            VmError::Execution(ExecError::DivisionByZero)
        ));
    }

    #[test]
    fn popping_an_empty_stack_underflows() {
        let code = vec![opcode::IADD];
        let u = unit(vec![], vec![function(0, 0, code)], 0);
        let mut vm = Vm::new(u);
        let mut env = test_env();
        let err = vm.run(&mut env).unwrap_err();
        assert!(matches!(
            err,
            VmError::Execution(ExecError::StackUnderflow)
        ));
    }
}
