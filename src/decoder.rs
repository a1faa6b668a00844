//! Binary decoder for the MVP module format.
//!
//! [`Decoder`] is a forward-only cursor over a borrowed byte slice with
//! one read per encoder operation. Every structural violation is fatal
//! for the read that hit it: there is no partial decode and no
//! backtracking. Callers that need fallible behaviour pre-validate.
//!
//! # Example
//!
//! ```
//! use mwasm::decoder::Decoder;
//!
//! let mut d = Decoder::new(&[0xe5, 0x8e, 0x26]);
//! assert_eq!(d.varuint32().unwrap(), 624485);
//! assert_eq!(d.remaining(), 0);
//! ```

use byteorder::{LittleEndian, ReadBytesExt};
use log::debug;
use std::io;
use thiserror::Error;

use crate::module::{
    CodeSection, CustomSection, ExportEntry, ExportSection, FuncType, FunctionBody,
    FunctionSection, LocalEntry, ModuleError, Preamble, Section, TypeSection, WasmModule,
    WasmVersion,
};
use crate::num;
use crate::types::{ExternalKind, Opcode, SectionCode, TypeCode, ValueType};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur while decoding a binary module.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of module: needed {needed} more byte(s), {remaining} left")]
    UnexpectedEof { needed: usize, remaining: usize },
    #[error("{what} does not fit in {width} bits")]
    IntegerOverflow { what: &'static str, width: u32 },
    #[error(transparent)]
    Range(#[from] num::RangeError),
    #[error("bad magic number 0x{found:08x}, expected 0x6d736100")]
    BadMagic { found: u32 },
    #[error("Unsupported section id: {0}")]
    UnsupportedSectionId(u8),
    #[error("unsupported function type form: {0}")]
    UnsupportedForm(i8),
    #[error("invalid type code: {0}")]
    InvalidTypeCode(i8),
    #[error("invalid value type: {0}")]
    InvalidValueType(i8),
    #[error("invalid external kind: {0}")]
    InvalidExternalKind(u8),
    #[error("unknown opcode 0x{0:02x}")]
    UnknownOpcode(u8),
    #[error("non-ascii code unit 0x{0:02x} in name")]
    NonAsciiName(u8),
    #[error("length mismatch: declared {declared} byte(s), decoded {observed}")]
    LengthMismatch { declared: u32, observed: u32 },
    #[error(transparent)]
    Module(#[from] ModuleError),
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Forward-only cursor over an immutable byte slice.
#[derive(Debug)]
pub struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(bytes: &'a [u8]) -> Decoder<'a> {
        Decoder { bytes, pos: 0 }
    }

    /// Current cursor position from the start of the slice.
    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    // Fixed-width primitives ------------------------------------------------

    pub fn uint8(&mut self) -> Result<u8, DecodeError> {
        if self.remaining() < 1 {
            return Err(DecodeError::UnexpectedEof {
                needed: 1,
                remaining: 0,
            });
        }
        let byte = self.bytes[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    pub fn bytes(&mut self, len: usize) -> Result<Vec<u8>, DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::UnexpectedEof {
                needed: len,
                remaining: self.remaining(),
            });
        }
        let out = self.bytes[self.pos..self.pos + len].to_vec();
        self.pos += len;
        Ok(out)
    }

    /// Four bytes, little-endian.
    pub fn uint32(&mut self) -> Result<u32, DecodeError> {
        let mut result: u32 = 0;
        for i in 0..4 {
            result |= (self.uint8()? as u32) << (i * 8);
        }
        Ok(result)
    }

    /// The IEEE-754 single-precision bit pattern, little-endian.
    pub fn float32(&mut self) -> Result<f32, DecodeError> {
        let bytes = self.bytes(4)?;
        let mut rdr = io::Cursor::new(bytes);
        Ok(rdr.read_f32::<LittleEndian>().unwrap())
    }

    /// The IEEE-754 double-precision bit pattern, little-endian.
    pub fn float64(&mut self) -> Result<f64, DecodeError> {
        let bytes = self.bytes(8)?;
        let mut rdr = io::Cursor::new(bytes);
        Ok(rdr.read_f64::<LittleEndian>().unwrap())
    }

    // LEB128 ----------------------------------------------------------------

    /// Unsigned LEB128, at most five bytes, result bounded to 32 bits.
    pub fn varuint32(&mut self) -> Result<u32, DecodeError> {
        let mut result: u64 = 0;
        let mut shift = 0u32;
        loop {
            let byte = self.uint8()?;
            result |= ((byte & 0x7f) as u64) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
            if shift >= 35 {
                return Err(DecodeError::IntegerOverflow {
                    what: "varuint32",
                    width: 32,
                });
            }
        }
        if result > u32::MAX as u64 {
            return Err(DecodeError::IntegerOverflow {
                what: "varuint32",
                width: 32,
            });
        }
        Ok(result as u32)
    }

    pub fn varuint7(&mut self) -> Result<u8, DecodeError> {
        let value = self.varuint32()?;
        Ok(num::expect_uint7(value as i64)?)
    }

    pub fn varuint1(&mut self) -> Result<u8, DecodeError> {
        let value = self.varuint32()?;
        Ok(num::expect_uint1(value as i64)?)
    }

    /// Signed LEB128 at the given bit width. Sign extension of a
    /// terminated group only applies while `shift < size`: a five-byte
    /// varint32's final group already carries the sign bits, and shifting
    /// by the accumulated 35 would corrupt it.
    fn read_varint(&mut self, size: u32, what: &'static str) -> Result<i64, DecodeError> {
        let max_shift = size.div_ceil(7) * 7;
        let mut result: i64 = 0;
        let mut shift = 0u32;
        loop {
            let byte = self.uint8()?;
            result |= ((byte & 0x7f) as i64) << shift;
            shift += 7;
            if byte & 0x80 == 0 {
                if shift < size && byte & 0x40 != 0 {
                    result |= -1i64 << shift;
                }
                break;
            }
            if shift >= max_shift {
                return Err(DecodeError::IntegerOverflow { what, width: size });
            }
        }
        Ok(result)
    }

    pub fn varint32(&mut self) -> Result<i32, DecodeError> {
        Ok(self.read_varint(32, "varint32")? as i32)
    }

    pub fn varint64(&mut self) -> Result<i64, DecodeError> {
        self.read_varint(64, "varint64")
    }

    pub fn varint7(&mut self) -> Result<i32, DecodeError> {
        let value = self.varint32()?;
        num::expect_int7(value as i64)?;
        Ok(value)
    }

    // Strings ---------------------------------------------------------------

    /// Length-prefixed name; code units at or above 0x80 are rejected.
    pub fn utf8(&mut self) -> Result<String, DecodeError> {
        let len = self.varuint32()? as usize;
        let bytes = self.bytes(len)?;
        if let Some(&byte) = bytes.iter().find(|&&b| b >= 0x80) {
            return Err(DecodeError::NonAsciiName(byte));
        }
        Ok(bytes.into_iter().map(char::from).collect())
    }

    // Enumerations ----------------------------------------------------------

    pub fn op(&mut self) -> Result<Opcode, DecodeError> {
        let byte = self.uint8()?;
        Opcode::from_u8(byte).ok_or(DecodeError::UnknownOpcode(byte))
    }

    pub fn type_code(&mut self) -> Result<TypeCode, DecodeError> {
        let code = self.varint7()? as i8;
        TypeCode::from_i8(code).ok_or(DecodeError::InvalidTypeCode(code))
    }

    pub fn value_type(&mut self) -> Result<ValueType, DecodeError> {
        let code = self.varint7()? as i8;
        ValueType::from_i8(code).ok_or(DecodeError::InvalidValueType(code))
    }

    pub fn external_kind(&mut self) -> Result<ExternalKind, DecodeError> {
        let byte = self.uint8()?;
        ExternalKind::from_u8(byte).ok_or(DecodeError::InvalidExternalKind(byte))
    }

    // Composite values ------------------------------------------------------

    /// Magic number then version. The version is validated by the model.
    pub fn module_preamble(&mut self) -> Result<Preamble, DecodeError> {
        let magic = self.uint32()?;
        if magic != Preamble::MAGIC {
            return Err(DecodeError::BadMagic { found: magic });
        }
        let version = self.uint32()?;
        Ok(Preamble::new(WasmVersion::from_u32(version)?))
    }

    /// A complete func_type, starting at its form byte. Forms other than
    /// `func` are unsupported.
    pub fn func_type(&mut self) -> Result<FuncType, DecodeError> {
        let form = self.varint7()? as i8;
        if form != TypeCode::Func.code() {
            return Err(DecodeError::UnsupportedForm(form));
        }
        let param_count = self.varuint32()?;
        let mut params = Vec::new();
        for _ in 0..param_count {
            params.push(self.value_type()?);
        }
        let return_count = self.varuint1()?;
        let mut returns = Vec::new();
        for _ in 0..return_count {
            returns.push(self.value_type()?);
        }
        Ok(FuncType::new(params, returns)?)
    }

    pub fn local_entry(&mut self) -> Result<LocalEntry, DecodeError> {
        let count = self.varuint32()?;
        let ty = self.value_type()?;
        Ok(LocalEntry::new(count, ty))
    }

    pub fn export_entry(&mut self) -> Result<ExportEntry, DecodeError> {
        let name = self.utf8()?;
        let kind = self.external_kind()?;
        let index = self.varuint32()?;
        Ok(ExportEntry::new(name, kind, index)?)
    }

    /// A length-prefixed function body: locals, then code bytes filling
    /// the remainder of the declared size. The trailing `end` is
    /// validated by the model constructor.
    pub fn function_body(&mut self) -> Result<FunctionBody, DecodeError> {
        let body_size = self.varuint32()?;
        let start = self.offset();

        let local_count = self.varuint32()?;
        let mut locals = Vec::new();
        for _ in 0..local_count {
            locals.push(self.local_entry()?);
        }

        let consumed = self.offset() - start;
        let code_len = (body_size as usize).checked_sub(consumed).ok_or(
            DecodeError::LengthMismatch {
                declared: body_size,
                observed: consumed as u32,
            },
        )?;
        let code = self.bytes(code_len)?;
        Ok(FunctionBody::new(locals, code)?)
    }

    // Sections --------------------------------------------------------------

    /// One section: id, declared payload length, payload. The observed
    /// payload length must match the declared one exactly.
    pub fn section(&mut self) -> Result<Section, DecodeError> {
        let id = self.varuint7()?;
        let payload_len = self.varuint32()?;
        if self.remaining() < payload_len as usize {
            return Err(DecodeError::UnexpectedEof {
                needed: payload_len as usize,
                remaining: self.remaining(),
            });
        }
        debug!("section id={id} len={payload_len}");

        let start = self.offset();
        let section = match SectionCode::from_u8(id) {
            Some(SectionCode::Custom) => Section::Custom(self.custom_section(payload_len)?),
            Some(SectionCode::Type) => Section::Type(self.type_section()?),
            Some(SectionCode::Function) => Section::Function(self.function_section()?),
            Some(SectionCode::Export) => Section::Export(self.export_section()?),
            Some(SectionCode::Code) => Section::Code(self.code_section()?),
            _ => return Err(DecodeError::UnsupportedSectionId(id)),
        };

        let observed = (self.offset() - start) as u32;
        if observed != payload_len {
            return Err(DecodeError::LengthMismatch {
                declared: payload_len,
                observed,
            });
        }
        Ok(section)
    }

    /// Name, then payload bytes filling the rest of the declared length.
    fn custom_section(&mut self, payload_len: u32) -> Result<CustomSection, DecodeError> {
        let before_name = self.offset();
        let name = self.utf8()?;
        let name_len = self.offset() - before_name;
        let data_len = (payload_len as usize).checked_sub(name_len).ok_or(
            DecodeError::LengthMismatch {
                declared: payload_len,
                observed: name_len as u32,
            },
        )?;
        let payload_data = self.bytes(data_len)?;
        Ok(CustomSection::new(name, payload_data))
    }

    fn type_section(&mut self) -> Result<TypeSection, DecodeError> {
        let count = self.varuint32()?;
        let mut section = TypeSection::new();
        for _ in 0..count {
            section.add(self.func_type()?);
        }
        Ok(section)
    }

    fn function_section(&mut self) -> Result<FunctionSection, DecodeError> {
        let count = self.varuint32()?;
        let mut section = FunctionSection::new();
        for _ in 0..count {
            let type_index = self.varuint32()?;
            section.add(type_index);
        }
        Ok(section)
    }

    fn export_section(&mut self) -> Result<ExportSection, DecodeError> {
        let count = self.varuint32()?;
        let mut section = ExportSection::new();
        for _ in 0..count {
            section.push(self.export_entry()?);
        }
        Ok(section)
    }

    fn code_section(&mut self) -> Result<CodeSection, DecodeError> {
        let count = self.varuint32()?;
        let mut section = CodeSection::new();
        for _ in 0..count {
            section.push(self.function_body()?);
        }
        Ok(section)
    }

    /// The whole module: preamble, then sections until the buffer is
    /// exhausted.
    pub fn module(&mut self) -> Result<WasmModule, DecodeError> {
        let mut module = WasmModule::new();
        module.preamble = self.module_preamble()?;
        while self.remaining() > 0 {
            match self.section()? {
                Section::Custom(s) => module.customs.push(s),
                Section::Type(s) => module.types = s,
                Section::Function(s) => module.functions = s,
                Section::Export(s) => module.exports = s,
                Section::Code(s) => module.code = s,
            }
        }
        Ok(module)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
