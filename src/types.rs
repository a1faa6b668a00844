//! Format enumerations of the MVP binary format.
//!
//! Covers the language type codes, the external kinds used by exports,
//! the section ids, and the complete single-byte opcode table with the
//! immediate schema each opcode carries. Every enumeration exposes a
//! checked cast from its wire representation; values outside the
//! closed set are never representable in the enum types.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Language types
// ---------------------------------------------------------------------------

/// A type code as written on the wire (varint7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum TypeCode {
    I32 = -0x01,
    I64 = -0x02,
    F32 = -0x03,
    F64 = -0x04,
    AnyFunc = -0x10,
    Func = -0x20,
    EmptyBlock = -0x40,
}

impl TypeCode {
    pub fn from_i8(v: i8) -> Option<TypeCode> {
        match v {
            -0x01 => Some(TypeCode::I32),
            -0x02 => Some(TypeCode::I64),
            -0x03 => Some(TypeCode::F32),
            -0x04 => Some(TypeCode::F64),
            -0x10 => Some(TypeCode::AnyFunc),
            -0x20 => Some(TypeCode::Func),
            -0x40 => Some(TypeCode::EmptyBlock),
            _ => None,
        }
    }

    pub fn is_valid(v: i8) -> bool {
        TypeCode::from_i8(v).is_some()
    }

    pub fn code(self) -> i8 {
        self as i8
    }

    /// Narrows to a value type; `None` for the non-value codes.
    pub fn value_type(self) -> Option<ValueType> {
        match self {
            TypeCode::I32 => Some(ValueType::I32),
            TypeCode::I64 => Some(ValueType::I64),
            TypeCode::F32 => Some(ValueType::F32),
            TypeCode::F64 => Some(ValueType::F64),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TypeCode::I32 => "i32",
            TypeCode::I64 => "i64",
            TypeCode::F32 => "f32",
            TypeCode::F64 => "f64",
            TypeCode::AnyFunc => "anyfunc",
            TypeCode::Func => "func",
            TypeCode::EmptyBlock => "emptyBlock",
        }
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The subset of [`TypeCode`] usable for parameters, results, and locals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum ValueType {
    I32 = -0x01,
    I64 = -0x02,
    F32 = -0x03,
    F64 = -0x04,
}

impl ValueType {
    pub fn from_i8(v: i8) -> Option<ValueType> {
        match v {
            -0x01 => Some(ValueType::I32),
            -0x02 => Some(ValueType::I64),
            -0x03 => Some(ValueType::F32),
            -0x04 => Some(ValueType::F64),
            _ => None,
        }
    }

    pub fn is_valid(v: i8) -> bool {
        ValueType::from_i8(v).is_some()
    }

    pub fn code(self) -> i8 {
        self as i8
    }

    /// Widens to the general type code. Total: every value type is a type.
    pub fn type_code(self) -> TypeCode {
        match self {
            ValueType::I32 => TypeCode::I32,
            ValueType::I64 => TypeCode::I64,
            ValueType::F32 => TypeCode::F32,
            ValueType::F64 => TypeCode::F64,
        }
    }

    pub fn name(self) -> &'static str {
        self.type_code().name()
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ---------------------------------------------------------------------------
// External kinds
// ---------------------------------------------------------------------------

/// The kind of definition an export names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ExternalKind {
    Function = 0,
    Table = 1,
    Memory = 2,
    Global = 3,
}

impl ExternalKind {
    pub fn from_u8(v: u8) -> Option<ExternalKind> {
        match v {
            0 => Some(ExternalKind::Function),
            1 => Some(ExternalKind::Table),
            2 => Some(ExternalKind::Memory),
            3 => Some(ExternalKind::Global),
            _ => None,
        }
    }

    pub fn is_valid(v: u8) -> bool {
        ExternalKind::from_u8(v).is_some()
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            ExternalKind::Function => "function",
            ExternalKind::Table => "table",
            ExternalKind::Memory => "memory",
            ExternalKind::Global => "global",
        }
    }
}

impl fmt::Display for ExternalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ---------------------------------------------------------------------------
// Section ids
// ---------------------------------------------------------------------------

/// Section ids, consecutive from Custom (0) through Data (11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SectionCode {
    Custom = 0,
    Type = 1,
    Import = 2,
    Function = 3,
    Table = 4,
    Memory = 5,
    Global = 6,
    Export = 7,
    Start = 8,
    Element = 9,
    Code = 10,
    Data = 11,
}

impl SectionCode {
    pub fn from_u8(v: u8) -> Option<SectionCode> {
        match v {
            0 => Some(SectionCode::Custom),
            1 => Some(SectionCode::Type),
            2 => Some(SectionCode::Import),
            3 => Some(SectionCode::Function),
            4 => Some(SectionCode::Table),
            5 => Some(SectionCode::Memory),
            6 => Some(SectionCode::Global),
            7 => Some(SectionCode::Export),
            8 => Some(SectionCode::Start),
            9 => Some(SectionCode::Element),
            10 => Some(SectionCode::Code),
            11 => Some(SectionCode::Data),
            _ => None,
        }
    }

    pub fn is_valid(v: u8) -> bool {
        SectionCode::from_u8(v).is_some()
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            SectionCode::Custom => "Custom",
            SectionCode::Type => "Type",
            SectionCode::Import => "Import",
            SectionCode::Function => "Function",
            SectionCode::Table => "Table",
            SectionCode::Memory => "Memory",
            SectionCode::Global => "Global",
            SectionCode::Export => "Export",
            SectionCode::Start => "Start",
            SectionCode::Element => "Element",
            SectionCode::Code => "Code",
            SectionCode::Data => "Data",
        }
    }
}

impl fmt::Display for SectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ---------------------------------------------------------------------------
// Opcodes
// ---------------------------------------------------------------------------

/// Immediate schema an opcode carries after its byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Imm {
    /// No immediates.
    None,
    /// Block signature: varint7 type code (or emptyBlock).
    BlockType,
    /// One varuint32 index (labels, functions, locals, globals).
    Index,
    /// varuint32 target count, that many targets, then the default.
    BrTable,
    /// varuint32 type index plus the reserved varuint1.
    CallIndirect,
    /// varuint32 alignment flags plus varuint32 offset.
    MemArg,
    /// The reserved varuint1 memory index.
    MemIndex,
    /// varint32 literal.
    VarI32,
    /// varint64 literal.
    VarI64,
    /// 4-byte IEEE-754 literal.
    F32,
    /// 8-byte IEEE-754 literal.
    F64,
}

/// The MVP single-byte opcode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Unreachable = 0x00,
    Nop = 0x01,
    Block = 0x02,
    Loop = 0x03,
    If = 0x04,
    Else = 0x05,
    End = 0x0b,
    Br = 0x0c,
    BrIf = 0x0d,
    BrTable = 0x0e,
    Return = 0x0f,
    Call = 0x10,
    CallIndirect = 0x11,
    Drop = 0x1a,
    Select = 0x1b,
    GetLocal = 0x20,
    SetLocal = 0x21,
    TeeLocal = 0x22,
    GetGlobal = 0x23,
    SetGlobal = 0x24,
    I32Load = 0x28,
    I64Load = 0x29,
    F32Load = 0x2a,
    F64Load = 0x2b,
    I32Load8S = 0x2c,
    I32Load8U = 0x2d,
    I32Load16S = 0x2e,
    I32Load16U = 0x2f,
    I64Load8S = 0x30,
    I64Load8U = 0x31,
    I64Load16S = 0x32,
    I64Load16U = 0x33,
    I64Load32S = 0x34,
    I64Load32U = 0x35,
    I32Store = 0x36,
    I64Store = 0x37,
    F32Store = 0x38,
    F64Store = 0x39,
    I32Store8 = 0x3a,
    I32Store16 = 0x3b,
    I64Store8 = 0x3c,
    I64Store16 = 0x3d,
    I64Store32 = 0x3e,
    CurrentMemory = 0x3f,
    GrowMemory = 0x40,
    I32Const = 0x41,
    I64Const = 0x42,
    F32Const = 0x43,
    F64Const = 0x44,
    I32Eqz = 0x45,
    I32Eq = 0x46,
    I32Ne = 0x47,
    I32LtS = 0x48,
    I32LtU = 0x49,
    I32GtS = 0x4a,
    I32GtU = 0x4b,
    I32LeS = 0x4c,
    I32LeU = 0x4d,
    I32GeS = 0x4e,
    I32GeU = 0x4f,
    I64Eqz = 0x50,
    I64Eq = 0x51,
    I64Ne = 0x52,
    I64LtS = 0x53,
    I64LtU = 0x54,
    I64GtS = 0x55,
    I64GtU = 0x56,
    I64LeS = 0x57,
    I64LeU = 0x58,
    I64GeS = 0x59,
    I64GeU = 0x5a,
    F32Eq = 0x5b,
    F32Ne = 0x5c,
    F32Lt = 0x5d,
    F32Gt = 0x5e,
    F32Le = 0x5f,
    F32Ge = 0x60,
    F64Eq = 0x61,
    F64Ne = 0x62,
    F64Lt = 0x63,
    F64Gt = 0x64,
    F64Le = 0x65,
    F64Ge = 0x66,
    I32Clz = 0x67,
    I32Ctz = 0x68,
    I32Popcnt = 0x69,
    I32Add = 0x6a,
    I32Sub = 0x6b,
    I32Mul = 0x6c,
    I32DivS = 0x6d,
    I32DivU = 0x6e,
    I32RemS = 0x6f,
    I32RemU = 0x70,
    I32And = 0x71,
    I32Or = 0x72,
    I32Xor = 0x73,
    I32Shl = 0x74,
    I32ShrS = 0x75,
    I32ShrU = 0x76,
    I32Rotl = 0x77,
    I32Rotr = 0x78,
    I64Clz = 0x79,
    I64Ctz = 0x7a,
    I64Popcnt = 0x7b,
    I64Add = 0x7c,
    I64Sub = 0x7d,
    I64Mul = 0x7e,
    I64DivS = 0x7f,
    I64DivU = 0x80,
    I64RemS = 0x81,
    I64RemU = 0x82,
    I64And = 0x83,
    I64Or = 0x84,
    I64Xor = 0x85,
    I64Shl = 0x86,
    I64ShrS = 0x87,
    I64ShrU = 0x88,
    I64Rotl = 0x89,
    I64Rotr = 0x8a,
    F32Abs = 0x8b,
    F32Neg = 0x8c,
    F32Ceil = 0x8d,
    F32Floor = 0x8e,
    F32Trunc = 0x8f,
    F32Nearest = 0x90,
    F32Sqrt = 0x91,
    F32Add = 0x92,
    F32Sub = 0x93,
    F32Mul = 0x94,
    F32Div = 0x95,
    F32Min = 0x96,
    F32Max = 0x97,
    F32Copysign = 0x98,
    F64Abs = 0x99,
    F64Neg = 0x9a,
    F64Ceil = 0x9b,
    F64Floor = 0x9c,
    F64Trunc = 0x9d,
    F64Nearest = 0x9e,
    F64Sqrt = 0x9f,
    F64Add = 0xa0,
    F64Sub = 0xa1,
    F64Mul = 0xa2,
    F64Div = 0xa3,
    F64Min = 0xa4,
    F64Max = 0xa5,
    F64Copysign = 0xa6,
    I32WrapI64 = 0xa7,
    I32TruncSF32 = 0xa8,
    I32TruncUF32 = 0xa9,
    I32TruncSF64 = 0xaa,
    I32TruncUF64 = 0xab,
    I64ExtendSI32 = 0xac,
    I64ExtendUI32 = 0xad,
    I64TruncSF32 = 0xae,
    I64TruncUF32 = 0xaf,
    I64TruncSF64 = 0xb0,
    I64TruncUF64 = 0xb1,
    F32ConvertSI32 = 0xb2,
    F32ConvertUI32 = 0xb3,
    F32ConvertSI64 = 0xb4,
    F32ConvertUI64 = 0xb5,
    F32DemoteF64 = 0xb6,
    F64ConvertSI32 = 0xb7,
    F64ConvertUI32 = 0xb8,
    F64ConvertSI64 = 0xb9,
    F64ConvertUI64 = 0xba,
    F64PromoteF32 = 0xbb,
    I32ReinterpretF32 = 0xbc,
    I64ReinterpretF64 = 0xbd,
    F32ReinterpretI32 = 0xbe,
    F64ReinterpretI64 = 0xbf,
}

/// Name and immediate schema of one opcode.
#[derive(Debug, Clone, Copy)]
pub struct OpInfo {
    pub op: Opcode,
    pub name: &'static str,
    pub imm: Imm,
}

#[rustfmt::skip]
const OPCODE_TABLE: &[(Opcode, &str, Imm)] = &[
    (Opcode::Unreachable,       "unreachable",          Imm::None),
    (Opcode::Nop,               "nop",                  Imm::None),
    (Opcode::Block,             "block",                Imm::BlockType),
    (Opcode::Loop,              "loop",                 Imm::BlockType),
    (Opcode::If,                "if",                   Imm::BlockType),
    (Opcode::Else,              "else",                 Imm::None),
    (Opcode::End,               "end",                  Imm::None),
    (Opcode::Br,                "br",                   Imm::Index),
    (Opcode::BrIf,              "br_if",                Imm::Index),
    (Opcode::BrTable,           "br_table",             Imm::BrTable),
    (Opcode::Return,            "return",               Imm::None),
    (Opcode::Call,              "call",                 Imm::Index),
    (Opcode::CallIndirect,      "call_indirect",        Imm::CallIndirect),
    (Opcode::Drop,              "drop",                 Imm::None),
    (Opcode::Select,            "select",               Imm::None),
    (Opcode::GetLocal,          "get_local",            Imm::Index),
    (Opcode::SetLocal,          "set_local",            Imm::Index),
    (Opcode::TeeLocal,          "tee_local",            Imm::Index),
    (Opcode::GetGlobal,         "get_global",           Imm::Index),
    (Opcode::SetGlobal,         "set_global",           Imm::Index),
    (Opcode::I32Load,           "i32.load",             Imm::MemArg),
    (Opcode::I64Load,           "i64.load",             Imm::MemArg),
    (Opcode::F32Load,           "f32.load",             Imm::MemArg),
    (Opcode::F64Load,           "f64.load",             Imm::MemArg),
    (Opcode::I32Load8S,         "i32.load8_s",          Imm::MemArg),
    (Opcode::I32Load8U,         "i32.load8_u",          Imm::MemArg),
    (Opcode::I32Load16S,        "i32.load16_s",         Imm::MemArg),
    (Opcode::I32Load16U,        "i32.load16_u",         Imm::MemArg),
    (Opcode::I64Load8S,         "i64.load8_s",          Imm::MemArg),
    (Opcode::I64Load8U,         "i64.load8_u",          Imm::MemArg),
    (Opcode::I64Load16S,        "i64.load16_s",         Imm::MemArg),
    (Opcode::I64Load16U,        "i64.load16_u",         Imm::MemArg),
    (Opcode::I64Load32S,        "i64.load32_s",         Imm::MemArg),
    (Opcode::I64Load32U,        "i64.load32_u",         Imm::MemArg),
    (Opcode::I32Store,          "i32.store",            Imm::MemArg),
    (Opcode::I64Store,          "i64.store",            Imm::MemArg),
    (Opcode::F32Store,          "f32.store",            Imm::MemArg),
    (Opcode::F64Store,          "f64.store",            Imm::MemArg),
    (Opcode::I32Store8,         "i32.store8",           Imm::MemArg),
    (Opcode::I32Store16,        "i32.store16",          Imm::MemArg),
    (Opcode::I64Store8,         "i64.store8",           Imm::MemArg),
    (Opcode::I64Store16,        "i64.store16",          Imm::MemArg),
    (Opcode::I64Store32,        "i64.store32",          Imm::MemArg),
    (Opcode::CurrentMemory,     "current_memory",       Imm::MemIndex),
    (Opcode::GrowMemory,        "grow_memory",          Imm::MemIndex),
    (Opcode::I32Const,          "i32.const",            Imm::VarI32),
    (Opcode::I64Const,          "i64.const",            Imm::VarI64),
    (Opcode::F32Const,          "f32.const",            Imm::F32),
    (Opcode::F64Const,          "f64.const",            Imm::F64),
    (Opcode::I32Eqz,            "i32.eqz",              Imm::None),
    (Opcode::I32Eq,             "i32.eq",               Imm::None),
    (Opcode::I32Ne,             "i32.ne",               Imm::None),
    (Opcode::I32LtS,            "i32.lt_s",             Imm::None),
    (Opcode::I32LtU,            "i32.lt_u",             Imm::None),
    (Opcode::I32GtS,            "i32.gt_s",             Imm::None),
    (Opcode::I32GtU,            "i32.gt_u",             Imm::None),
    (Opcode::I32LeS,            "i32.le_s",             Imm::None),
    (Opcode::I32LeU,            "i32.le_u",             Imm::None),
    (Opcode::I32GeS,            "i32.ge_s",             Imm::None),
    (Opcode::I32GeU,            "i32.ge_u",             Imm::None),
    (Opcode::I64Eqz,            "i64.eqz",              Imm::None),
    (Opcode::I64Eq,             "i64.eq",               Imm::None),
    (Opcode::I64Ne,             "i64.ne",               Imm::None),
    (Opcode::I64LtS,            "i64.lt_s",             Imm::None),
    (Opcode::I64LtU,            "i64.lt_u",             Imm::None),
    (Opcode::I64GtS,            "i64.gt_s",             Imm::None),
    (Opcode::I64GtU,            "i64.gt_u",             Imm::None),
    (Opcode::I64LeS,            "i64.le_s",             Imm::None),
    (Opcode::I64LeU,            "i64.le_u",             Imm::None),
    (Opcode::I64GeS,            "i64.ge_s",             Imm::None),
    (Opcode::I64GeU,            "i64.ge_u",             Imm::None),
    (Opcode::F32Eq,             "f32.eq",               Imm::None),
    (Opcode::F32Ne,             "f32.ne",               Imm::None),
    (Opcode::F32Lt,             "f32.lt",               Imm::None),
    (Opcode::F32Gt,             "f32.gt",               Imm::None),
    (Opcode::F32Le,             "f32.le",               Imm::None),
    (Opcode::F32Ge,             "f32.ge",               Imm::None),
    (Opcode::F64Eq,             "f64.eq",               Imm::None),
    (Opcode::F64Ne,             "f64.ne",               Imm::None),
    (Opcode::F64Lt,             "f64.lt",               Imm::None),
    (Opcode::F64Gt,             "f64.gt",               Imm::None),
    (Opcode::F64Le,             "f64.le",               Imm::None),
    (Opcode::F64Ge,             "f64.ge",               Imm::None),
    (Opcode::I32Clz,            "i32.clz",              Imm::None),
    (Opcode::I32Ctz,            "i32.ctz",              Imm::None),
    (Opcode::I32Popcnt,         "i32.popcnt",           Imm::None),
    (Opcode::I32Add,            "i32.add",              Imm::None),
    (Opcode::I32Sub,            "i32.sub",              Imm::None),
    (Opcode::I32Mul,            "i32.mul",              Imm::None),
    (Opcode::I32DivS,           "i32.div_s",            Imm::None),
    (Opcode::I32DivU,           "i32.div_u",            Imm::None),
    (Opcode::I32RemS,           "i32.rem_s",            Imm::None),
    (Opcode::I32RemU,           "i32.rem_u",            Imm::None),
    (Opcode::I32And,            "i32.and",              Imm::None),
    (Opcode::I32Or,             "i32.or",               Imm::None),
    (Opcode::I32Xor,            "i32.xor",              Imm::None),
    (Opcode::I32Shl,            "i32.shl",              Imm::None),
    (Opcode::I32ShrS,           "i32.shr_s",            Imm::None),
    (Opcode::I32ShrU,           "i32.shr_u",            Imm::None),
    (Opcode::I32Rotl,           "i32.rotl",             Imm::None),
    (Opcode::I32Rotr,           "i32.rotr",             Imm::None),
    (Opcode::I64Clz,            "i64.clz",              Imm::None),
    (Opcode::I64Ctz,            "i64.ctz",              Imm::None),
    (Opcode::I64Popcnt,         "i64.popcnt",           Imm::None),
    (Opcode::I64Add,            "i64.add",              Imm::None),
    (Opcode::I64Sub,            "i64.sub",              Imm::None),
    (Opcode::I64Mul,            "i64.mul",              Imm::None),
    (Opcode::I64DivS,           "i64.div_s",            Imm::None),
    (Opcode::I64DivU,           "i64.div_u",            Imm::None),
    (Opcode::I64RemS,           "i64.rem_s",            Imm::None),
    (Opcode::I64RemU,           "i64.rem_u",            Imm::None),
    (Opcode::I64And,            "i64.and",              Imm::None),
    (Opcode::I64Or,             "i64.or",               Imm::None),
    (Opcode::I64Xor,            "i64.xor",              Imm::None),
    (Opcode::I64Shl,            "i64.shl",              Imm::None),
    (Opcode::I64ShrS,           "i64.shr_s",            Imm::None),
    (Opcode::I64ShrU,           "i64.shr_u",            Imm::None),
    (Opcode::I64Rotl,           "i64.rotl",             Imm::None),
    (Opcode::I64Rotr,           "i64.rotr",             Imm::None),
    (Opcode::F32Abs,            "f32.abs",              Imm::None),
    (Opcode::F32Neg,            "f32.neg",              Imm::None),
    (Opcode::F32Ceil,           "f32.ceil",             Imm::None),
    (Opcode::F32Floor,          "f32.floor",            Imm::None),
    (Opcode::F32Trunc,          "f32.trunc",            Imm::None),
    (Opcode::F32Nearest,        "f32.nearest",          Imm::None),
    (Opcode::F32Sqrt,           "f32.sqrt",             Imm::None),
    (Opcode::F32Add,            "f32.add",              Imm::None),
    (Opcode::F32Sub,            "f32.sub",              Imm::None),
    (Opcode::F32Mul,            "f32.mul",              Imm::None),
    (Opcode::F32Div,            "f32.div",              Imm::None),
    (Opcode::F32Min,            "f32.min",              Imm::None),
    (Opcode::F32Max,            "f32.max",              Imm::None),
    (Opcode::F32Copysign,       "f32.copysign",         Imm::None),
    (Opcode::F64Abs,            "f64.abs",              Imm::None),
    (Opcode::F64Neg,            "f64.neg",              Imm::None),
    (Opcode::F64Ceil,           "f64.ceil",             Imm::None),
    (Opcode::F64Floor,          "f64.floor",            Imm::None),
    (Opcode::F64Trunc,          "f64.trunc",            Imm::None),
    (Opcode::F64Nearest,        "f64.nearest",          Imm::None),
    (Opcode::F64Sqrt,           "f64.sqrt",             Imm::None),
    (Opcode::F64Add,            "f64.add",              Imm::None),
    (Opcode::F64Sub,            "f64.sub",              Imm::None),
    (Opcode::F64Mul,            "f64.mul",              Imm::None),
    (Opcode::F64Div,            "f64.div",              Imm::None),
    (Opcode::F64Min,            "f64.min",              Imm::None),
    (Opcode::F64Max,            "f64.max",              Imm::None),
    (Opcode::F64Copysign,       "f64.copysign",         Imm::None),
    (Opcode::I32WrapI64,        "i32.wrap/i64",         Imm::None),
    (Opcode::I32TruncSF32,      "i32.trunc_s/f32",      Imm::None),
    (Opcode::I32TruncUF32,      "i32.trunc_u/f32",      Imm::None),
    (Opcode::I32TruncSF64,      "i32.trunc_s/f64",      Imm::None),
    (Opcode::I32TruncUF64,      "i32.trunc_u/f64",      Imm::None),
    (Opcode::I64ExtendSI32,     "i64.extend_s/i32",     Imm::None),
    (Opcode::I64ExtendUI32,     "i64.extend_u/i32",     Imm::None),
    (Opcode::I64TruncSF32,      "i64.trunc_s/f32",      Imm::None),
    (Opcode::I64TruncUF32,      "i64.trunc_u/f32",      Imm::None),
    (Opcode::I64TruncSF64,      "i64.trunc_s/f64",      Imm::None),
    (Opcode::I64TruncUF64,      "i64.trunc_u/f64",      Imm::None),
    (Opcode::F32ConvertSI32,    "f32.convert_s/i32",    Imm::None),
    (Opcode::F32ConvertUI32,    "f32.convert_u/i32",    Imm::None),
    (Opcode::F32ConvertSI64,    "f32.convert_s/i64",    Imm::None),
    (Opcode::F32ConvertUI64,    "f32.convert_u/i64",    Imm::None),
    (Opcode::F32DemoteF64,      "f32.demote/f64",       Imm::None),
    (Opcode::F64ConvertSI32,    "f64.convert_s/i32",    Imm::None),
    (Opcode::F64ConvertUI32,    "f64.convert_u/i32",    Imm::None),
    (Opcode::F64ConvertSI64,    "f64.convert_s/i64",    Imm::None),
    (Opcode::F64ConvertUI64,    "f64.convert_u/i64",    Imm::None),
    (Opcode::F64PromoteF32,     "f64.promote/f32",      Imm::None),
    (Opcode::I32ReinterpretF32, "i32.reinterpret/f32",  Imm::None),
    (Opcode::I64ReinterpretF64, "i64.reinterpret/f64",  Imm::None),
    (Opcode::F32ReinterpretI32, "f32.reinterpret/i32",  Imm::None),
    (Opcode::F64ReinterpretI64, "f64.reinterpret/i64",  Imm::None),
];

static OPCODES_BY_BYTE: Lazy<HashMap<u8, OpInfo>> = Lazy::new(|| {
    let mut map = HashMap::with_capacity(OPCODE_TABLE.len());
    for &(op, name, imm) in OPCODE_TABLE {
        map.insert(op as u8, OpInfo { op, name, imm });
    }
    map
});

impl Opcode {
    pub fn from_u8(v: u8) -> Option<Opcode> {
        OPCODES_BY_BYTE.get(&v).map(|info| info.op)
    }

    pub fn is_valid(v: u8) -> bool {
        OPCODES_BY_BYTE.contains_key(&v)
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn info(self) -> &'static OpInfo {
        &OPCODES_BY_BYTE[&(self as u8)]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn immediates(self) -> Imm {
        self.info().imm
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
