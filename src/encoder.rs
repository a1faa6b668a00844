//! Binary encoder for the MVP module format.
//!
//! [`Encoder`] is an append-only builder over an owned byte buffer with
//! one operation per primitive, type, and section of the format. Section
//! payloads are encoded into a fresh sub-encoder first, so the
//! `varuint32` length prefix is always exact:
//!
//! ```text
//! section_id: varuint7 | payload_len: varuint32 | payload: byte*
//! ```
//!
//! The encoder's contract assumes inputs validated by the model
//! constructors; the remaining failure surface (range-checked scalars,
//! ASCII-only names, terminated bodies) is re-checked here and reported
//! as [`EncodeError`].
//!
//! # Example
//!
//! ```
//! use mwasm::encoder::Encoder;
//!
//! let mut e = Encoder::new();
//! e.varuint32(624485);
//! assert_eq!(e.as_bytes(), &[0xe5, 0x8e, 0x26]);
//! ```

use byteorder::{LittleEndian, WriteBytesExt};
use std::fmt;

use crate::module::{
    CodeSection, CustomSection, ExportEntry, ExportSection, FuncType, FunctionBody,
    FunctionSection, LocalEntry, Preamble, TypeSection, WasmModule,
};
use crate::num::{self, RangeError};
use crate::types::{ExternalKind, Opcode, SectionCode, TypeCode, ValueType};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur during binary encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A scalar failed the range check for the width being written.
    Range(RangeError),
    /// A name contained a code unit outside the ASCII range.
    NonAsciiName { byte: u8 },
    /// A function body's code did not finish with the `end` opcode.
    MissingEnd { last: Option<u8> },
    /// A function type declared more than one return type.
    MultipleReturnTypes(usize),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::Range(e) => write!(f, "{e}"),
            EncodeError::NonAsciiName { byte } => {
                write!(f, "non-ascii code unit 0x{byte:02x} in name")
            }
            EncodeError::MissingEnd { last: Some(last) } => {
                write!(
                    f,
                    "function body must end with the end opcode (0x0b), got 0x{last:02x}"
                )
            }
            EncodeError::MissingEnd { last: None } => {
                write!(f, "function body must end with the end opcode (0x0b), got nothing")
            }
            EncodeError::MultipleReturnTypes(n) => {
                write!(f, "a function type may declare at most one return type, got {n}")
            }
        }
    }
}

impl std::error::Error for EncodeError {}

impl From<RangeError> for EncodeError {
    fn from(e: RangeError) -> Self {
        EncodeError::Range(e)
    }
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// Append-only builder of a binary module.
#[derive(Debug, Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Encoder {
        Encoder { buf: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // Fixed-width primitives ------------------------------------------------

    pub fn uint8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Four bytes, little-endian.
    pub fn uint32(&mut self, v: u32) {
        self.buf.write_u32::<LittleEndian>(v).unwrap();
    }

    /// The IEEE-754 single-precision bit pattern, little-endian.
    pub fn float32(&mut self, v: f32) {
        self.buf.write_f32::<LittleEndian>(v).unwrap();
    }

    /// The IEEE-754 double-precision bit pattern, little-endian.
    pub fn float64(&mut self, v: f64) {
        self.buf.write_f64::<LittleEndian>(v).unwrap();
    }

    // LEB128 ----------------------------------------------------------------

    /// Unsigned LEB128, at most five bytes for a u32.
    pub fn varuint32(&mut self, v: u32) {
        let mut value = v;
        while value >= 0x80 {
            self.buf.push(0x80 | (value & 0x7f) as u8);
            value >>= 7;
        }
        self.buf.push(value as u8);
    }

    /// Single-byte unsigned value below 128.
    pub fn varuint7(&mut self, v: u32) -> Result<(), EncodeError> {
        let byte = num::expect_uint7(v as i64)?;
        self.buf.push(byte);
        Ok(())
    }

    /// Single-byte flag, 0 or 1.
    pub fn varuint1(&mut self, v: u32) -> Result<(), EncodeError> {
        let byte = num::expect_uint1(v as i64)?;
        self.buf.push(byte);
        Ok(())
    }

    /// Signed LEB128; termination is sensitive to the sign bit of the
    /// final 7-bit group.
    pub fn varint32(&mut self, v: i32) {
        self.varint64(v as i64);
    }

    /// Signed LEB128 at 64-bit width.
    pub fn varint64(&mut self, v: i64) {
        let mut value = v;
        while !(-0x40..=0x3f).contains(&value) {
            self.buf.push(0x80 | (value & 0x7f) as u8);
            value >>= 7;
        }
        self.buf.push((value & 0x7f) as u8);
    }

    /// Single-byte signed value in [-64, 63].
    pub fn varint7(&mut self, v: i32) -> Result<(), EncodeError> {
        let byte = num::expect_int7(v as i64)?;
        self.buf.push(byte as u8 & 0x7f);
        Ok(())
    }

    // Strings ---------------------------------------------------------------

    /// Length-prefixed name. This revision restricts code units to ASCII;
    /// anything at or above 0x80 is rejected before a byte is written.
    pub fn utf8(&mut self, s: &str) -> Result<(), EncodeError> {
        if let Some(byte) = s.bytes().find(|&b| b >= 0x80) {
            return Err(EncodeError::NonAsciiName { byte });
        }
        self.varuint32(s.len() as u32);
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    // Enumerations ----------------------------------------------------------

    pub fn op(&mut self, op: Opcode) {
        self.buf.push(op.code());
    }

    /// A type code as varint7. Every code in the table fits a single byte.
    pub fn type_code(&mut self, t: TypeCode) {
        self.buf.push(t.code() as u8 & 0x7f);
    }

    pub fn value_type(&mut self, vt: ValueType) {
        self.type_code(vt.type_code());
    }

    pub fn external_kind(&mut self, kind: ExternalKind) {
        self.buf.push(kind.code());
    }

    /// A section id as varuint7.
    pub fn section_code(&mut self, code: SectionCode) {
        self.buf.push(code.code());
    }

    // Composite values ------------------------------------------------------

    /// `func` form, parameter count and types, return count and types.
    pub fn func_type(&mut self, signature: &FuncType) -> Result<(), EncodeError> {
        if signature.return_types.len() > 1 {
            return Err(EncodeError::MultipleReturnTypes(signature.return_types.len()));
        }
        self.type_code(TypeCode::Func);
        self.varuint32(signature.param_types.len() as u32);
        for param in &signature.param_types {
            self.value_type(*param);
        }
        self.varuint1(signature.return_types.len() as u32)?;
        for ret in &signature.return_types {
            self.value_type(*ret);
        }
        Ok(())
    }

    /// Magic number then version, both fixed-width little-endian.
    pub fn module_preamble(&mut self, preamble: &Preamble) {
        self.uint32(Preamble::MAGIC);
        self.uint32(preamble.version.number());
    }

    pub fn export_entry(&mut self, entry: &ExportEntry) -> Result<(), EncodeError> {
        self.utf8(&entry.name)?;
        self.external_kind(entry.kind);
        self.varuint32(entry.index);
        Ok(())
    }

    pub fn local_entry(&mut self, entry: &LocalEntry) {
        self.varuint32(entry.count);
        self.value_type(entry.ty);
    }

    /// Length-prefixed body: locals then code. The code's trailing byte
    /// must be the `end` opcode.
    pub fn function_body(&mut self, body: &FunctionBody) -> Result<(), EncodeError> {
        match body.code.last() {
            Some(&last) if last == Opcode::End.code() => {}
            last => return Err(EncodeError::MissingEnd { last: last.copied() }),
        }

        let mut payload = Encoder::new();
        payload.varuint32(body.locals.len() as u32);
        for local in &body.locals {
            payload.local_entry(local);
        }
        payload.bytes(&body.code);

        self.varuint32(payload.len() as u32);
        self.bytes(payload.as_bytes());
        Ok(())
    }

    // Sections --------------------------------------------------------------

    /// Frames a section: the payload is encoded into a fresh sub-encoder
    /// first so its exact length can be written before its bytes. When the
    /// payload writer reports no entries and `elide_if_empty` is set,
    /// nothing is written at all.
    ///
    /// Returns whether entries were present.
    fn section<F>(
        &mut self,
        code: SectionCode,
        elide_if_empty: bool,
        write_payload: F,
    ) -> Result<bool, EncodeError>
    where
        F: FnOnce(&mut Encoder) -> Result<bool, EncodeError>,
    {
        let mut payload = Encoder::new();
        let has_entries = write_payload(&mut payload)?;
        if !has_entries && elide_if_empty {
            return Ok(false);
        }
        self.section_code(code);
        self.varuint32(payload.len() as u32);
        self.bytes(payload.as_bytes());
        Ok(has_entries)
    }

    /// A custom section's presence is meaningful even with an empty name
    /// and payload, so it always reports entries present.
    pub fn custom_section(&mut self, section: &CustomSection) -> Result<bool, EncodeError> {
        self.section(SectionCode::Custom, false, |payload| {
            payload.utf8(&section.name)?;
            payload.bytes(&section.payload_data);
            Ok(true)
        })
    }

    pub fn type_section(
        &mut self,
        section: &TypeSection,
        elide_if_empty: bool,
    ) -> Result<bool, EncodeError> {
        self.section(SectionCode::Type, elide_if_empty, |payload| {
            payload.varuint32(section.entries.len() as u32);
            for signature in &section.entries {
                payload.func_type(signature)?;
            }
            Ok(!section.entries.is_empty())
        })
    }

    pub fn function_section(
        &mut self,
        section: &FunctionSection,
        elide_if_empty: bool,
    ) -> Result<bool, EncodeError> {
        self.section(SectionCode::Function, elide_if_empty, |payload| {
            payload.varuint32(section.entries.len() as u32);
            for type_index in &section.entries {
                payload.varuint32(*type_index);
            }
            Ok(!section.entries.is_empty())
        })
    }

    pub fn export_section(
        &mut self,
        section: &ExportSection,
        elide_if_empty: bool,
    ) -> Result<bool, EncodeError> {
        self.section(SectionCode::Export, elide_if_empty, |payload| {
            payload.varuint32(section.entries.len() as u32);
            for entry in &section.entries {
                payload.export_entry(entry)?;
            }
            Ok(!section.entries.is_empty())
        })
    }

    pub fn code_section(
        &mut self,
        section: &CodeSection,
        elide_if_empty: bool,
    ) -> Result<bool, EncodeError> {
        self.section(SectionCode::Code, elide_if_empty, |payload| {
            payload.varuint32(section.bodies.len() as u32);
            for body in &section.bodies {
                payload.function_body(body)?;
            }
            Ok(!section.bodies.is_empty())
        })
    }

    /// A whole module: preamble, non-custom sections in ascending id
    /// order (elided when empty), then any custom sections the module
    /// holds.
    pub fn module(&mut self, module: &WasmModule) -> Result<(), EncodeError> {
        self.module_preamble(&module.preamble);
        self.type_section(&module.types, true)?;
        self.function_section(&module.functions, true)?;
        self.export_section(&module.exports, true)?;
        self.code_section(&module.code, true)?;
        for custom in &module.customs {
            self.custom_section(custom)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
