//! In-memory representation of an MVP WebAssembly module.
//!
//! The types here are plain value aggregates: sections own their entries
//! and nothing is shared. Constructors validate the structural invariants
//! the binary format demands (at most one return type, exports of memory
//! and globals pinned to index 0, bodies terminated by `end`); the
//! [`Encoder`](crate::encoder::Encoder) can therefore assume validated
//! input. Deep equality (`PartialEq`) is what the round-trip guarantees
//! are stated in.

use thiserror::Error;

use crate::decoder::{DecodeError, Decoder};
use crate::encoder::{EncodeError, Encoder};
use crate::ops::OpEncoder;
use crate::types::{ExternalKind, Opcode, SectionCode, ValueType};

/// Structural constructor failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModuleError {
    #[error("unsupported module version: {0} (expected 1)")]
    UnsupportedVersion(u32),
    #[error("a function type may declare at most one return type, got {0}")]
    MultipleReturnTypes(usize),
    #[error("{kind} exports must use index 0, got {index}")]
    NonZeroExportIndex { kind: ExternalKind, index: u32 },
    #[error("function body code is empty")]
    EmptyCode,
    #[error("function body must end with the end opcode (0x0b), got 0x{last:02x}")]
    MissingEnd { last: u8 },
}

// ---------------------------------------------------------------------------
// Preamble
// ---------------------------------------------------------------------------

/// Binary format versions this codec understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WasmVersion {
    Mvp,
}

impl WasmVersion {
    /// The version number as written in the preamble.
    pub fn number(self) -> u32 {
        match self {
            WasmVersion::Mvp => 1,
        }
    }

    /// Rejects everything but the MVP version, including the pre-release
    /// 0x0d experiment.
    pub fn from_u32(v: u32) -> Result<WasmVersion, ModuleError> {
        match v {
            1 => Ok(WasmVersion::Mvp),
            other => Err(ModuleError::UnsupportedVersion(other)),
        }
    }
}

/// The fixed 8-byte module header: magic number then version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preamble {
    pub version: WasmVersion,
}

impl Preamble {
    /// `\0asm` read as a little-endian u32.
    pub const MAGIC: u32 = 0x6d73_6100;

    pub fn new(version: WasmVersion) -> Preamble {
        Preamble { version }
    }
}

// ---------------------------------------------------------------------------
// Function signatures
// ---------------------------------------------------------------------------

/// A function signature: parameter types and zero or one return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncType {
    pub param_types: Vec<ValueType>,
    pub return_types: Vec<ValueType>,
}

impl FuncType {
    pub fn new(
        param_types: Vec<ValueType>,
        return_types: Vec<ValueType>,
    ) -> Result<FuncType, ModuleError> {
        if return_types.len() > 1 {
            return Err(ModuleError::MultipleReturnTypes(return_types.len()));
        }
        Ok(FuncType {
            param_types,
            return_types,
        })
    }
}

impl std::fmt::Display for FuncType {
    /// `(f64, f64) => f64`, with `void` standing in for no return type.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params: Vec<&str> = self.param_types.iter().map(|p| p.name()).collect();
        let ret = self.return_types.first().map_or("void", |r| r.name());
        write!(f, "({}) => {}", params.join(", "), ret)
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// An id-0 section carrying an opaque named payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomSection {
    pub name: String,
    pub payload_data: Vec<u8>,
}

impl CustomSection {
    pub fn new(name: impl Into<String>, payload_data: Vec<u8>) -> CustomSection {
        CustomSection {
            name: name.into(),
            payload_data,
        }
    }

    pub fn id(&self) -> SectionCode {
        SectionCode::Custom
    }
}

/// Section 1: the module's function signatures.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeSection {
    pub entries: Vec<FuncType>,
}

impl TypeSection {
    pub fn new() -> TypeSection {
        TypeSection::default()
    }

    pub fn id(&self) -> SectionCode {
        SectionCode::Type
    }

    /// Appends a signature and returns its type index.
    pub fn add(&mut self, signature: FuncType) -> u32 {
        self.entries.push(signature);
        (self.entries.len() - 1) as u32
    }

    pub fn get(&self, index: u32) -> Option<&FuncType> {
        self.entries.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Section 3: one type index per function defined in the module.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunctionSection {
    pub entries: Vec<u32>,
}

impl FunctionSection {
    pub fn new() -> FunctionSection {
        FunctionSection::default()
    }

    pub fn id(&self) -> SectionCode {
        SectionCode::Function
    }

    /// Appends a type index and returns the function index it was given.
    pub fn add(&mut self, type_index: u32) -> u32 {
        self.entries.push(type_index);
        (self.entries.len() - 1) as u32
    }

    pub fn get(&self, index: u32) -> Option<u32> {
        self.entries.get(index as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One exported definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
    pub name: String,
    pub kind: ExternalKind,
    pub index: u32,
}

impl ExportEntry {
    pub fn new(
        name: impl Into<String>,
        kind: ExternalKind,
        index: u32,
    ) -> Result<ExportEntry, ModuleError> {
        // The MVP has exactly one memory and no mutable exported globals;
        // both kinds must refer to index 0.
        if matches!(kind, ExternalKind::Memory | ExternalKind::Global) && index != 0 {
            return Err(ModuleError::NonZeroExportIndex { kind, index });
        }
        Ok(ExportEntry {
            name: name.into(),
            kind,
            index,
        })
    }
}

/// Section 7: the module's exports.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportSection {
    pub entries: Vec<ExportEntry>,
}

impl ExportSection {
    pub fn new() -> ExportSection {
        ExportSection::default()
    }

    pub fn id(&self) -> SectionCode {
        SectionCode::Export
    }

    pub fn push(&mut self, entry: ExportEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names exported for a function index, in declaration order.
    pub fn function_names(&self, function_index: u32) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.kind == ExternalKind::Function && e.index == function_index)
            .map(|e| e.name.as_str())
            .collect()
    }
}

/// A run-length encoded local declaration: `count` locals of one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalEntry {
    pub count: u32,
    pub ty: ValueType,
}

impl LocalEntry {
    pub fn new(count: u32, ty: ValueType) -> LocalEntry {
        LocalEntry { count, ty }
    }
}

/// One function's locals and code, the code terminated by `end` (0x0b).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionBody {
    pub locals: Vec<LocalEntry>,
    pub code: Vec<u8>,
}

impl FunctionBody {
    pub fn new(locals: Vec<LocalEntry>, code: Vec<u8>) -> Result<FunctionBody, ModuleError> {
        match code.last() {
            None => return Err(ModuleError::EmptyCode),
            Some(&last) if last != Opcode::End.code() => {
                return Err(ModuleError::MissingEnd { last });
            }
            _ => {}
        }
        Ok(FunctionBody { locals, code })
    }
}

/// Section 10: one body per entry in the function section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeSection {
    pub bodies: Vec<FunctionBody>,
}

impl CodeSection {
    pub fn new() -> CodeSection {
        CodeSection::default()
    }

    pub fn id(&self) -> SectionCode {
        SectionCode::Code
    }

    pub fn push(&mut self, body: FunctionBody) {
        self.bodies.push(body);
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

/// A decoded section of any supported kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Custom(CustomSection),
    Type(TypeSection),
    Function(FunctionSection),
    Export(ExportSection),
    Code(CodeSection),
}

impl Section {
    pub fn id(&self) -> SectionCode {
        match self {
            Section::Custom(s) => s.id(),
            Section::Type(s) => s.id(),
            Section::Function(s) => s.id(),
            Section::Export(s) => s.id(),
            Section::Code(s) => s.id(),
        }
    }
}

// ---------------------------------------------------------------------------
// Module
// ---------------------------------------------------------------------------

/// A whole module: preamble plus the sections this codec supports.
#[derive(Debug, Clone, PartialEq)]
pub struct WasmModule {
    pub preamble: Preamble,
    pub types: TypeSection,
    pub functions: FunctionSection,
    pub exports: ExportSection,
    pub code: CodeSection,
    pub customs: Vec<CustomSection>,
}

impl WasmModule {
    pub fn new() -> WasmModule {
        WasmModule {
            preamble: Preamble::new(WasmVersion::Mvp),
            types: TypeSection::new(),
            functions: FunctionSection::new(),
            exports: ExportSection::new(),
            code: CodeSection::new(),
            customs: Vec::new(),
        }
    }

    /// Appends a function: signature, type/function indices, body, and
    /// (optionally) an export entry under `name`. The terminating `end`
    /// opcode is appended here; the opcode writer must not emit its own.
    ///
    /// Returns the new function's index.
    pub fn add_function(
        &mut self,
        name: &str,
        params: &[ValueType],
        results: &[ValueType],
        locals: Vec<LocalEntry>,
        exported: bool,
        ops: OpEncoder,
    ) -> Result<u32, ModuleError> {
        let signature = FuncType::new(params.to_vec(), results.to_vec())?;
        let type_index = self.types.add(signature);
        let function_index = self.functions.add(type_index);

        let mut code = ops.into_bytes();
        code.push(Opcode::End.code());
        self.code.push(FunctionBody::new(locals, code)?);

        if exported {
            self.exports
                .push(ExportEntry::new(name, ExternalKind::Function, function_index)?);
        }
        Ok(function_index)
    }

    pub fn add_custom(&mut self, section: CustomSection) {
        self.customs.push(section);
    }

    /// Encodes to the binary format. Non-custom sections are written in
    /// ascending id order and elided when empty; custom sections held by
    /// the module follow (the codec never invents one).
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut encoder = Encoder::new();
        encoder.module(self)?;
        Ok(encoder.into_bytes())
    }

    /// Decodes a binary module.
    pub fn decode(bytes: &[u8]) -> Result<WasmModule, DecodeError> {
        Decoder::new(bytes).module()
    }
}

impl Default for WasmModule {
    fn default() -> WasmModule {
        WasmModule::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
