//! Text disassembler for MVP modules.
//!
//! Produces a deterministic dump of a binary module: a full hex listing,
//! then each decoded structure annotated with the exact bytes that
//! encoded it. The layout is stable enough to serve as a test baseline;
//! every hex line carries its 8-digit offset.
//!
//! # Example
//!
//! ```
//! use mwasm::disasm;
//! use mwasm::module::WasmModule;
//! use mwasm::ops::OpEncoder;
//! use mwasm::types::ValueType;
//!
//! let mut module = WasmModule::new();
//! let mut ops = OpEncoder::new();
//! ops.f64().constant(std::f64::consts::PI);
//! ops.ret();
//! module.add_function("pi", &[], &[ValueType::F64], vec![], true, ops).unwrap();
//!
//! let text = disasm::disassemble(&module.encode().unwrap()).unwrap();
//! assert!(text.contains("module version 1"));
//! assert!(text.contains("f64.const 0x400921fb54442d18"));
//! ```

use fhex::ToHex;

use crate::decoder::{DecodeError, Decoder};
use crate::module::{CodeSection, CustomSection, ExportSection, FunctionSection, Section, TypeSection};
use crate::num::{hex32, hex8};
use crate::types::Imm;

/// Column where instruction comments begin, counted from the start of
/// the instruction text.
const COMMENT_COLUMN: usize = 30;

/// Disassembles a binary module using `\n` line endings.
pub fn disassemble(bytes: &[u8]) -> Result<String, DecodeError> {
    disassemble_with_newline(bytes, "\n")
}

/// Disassembles a binary module with the given newline convention.
pub fn disassemble_with_newline(bytes: &[u8], newline: &str) -> Result<String, DecodeError> {
    Disassembler::new(bytes, newline).run()
}

struct Disassembler<'a> {
    bytes: &'a [u8],
    dec: Decoder<'a>,
    out: String,
    /// Offset of the last byte already dumped; [`Self::decoded`] emits
    /// everything between here and the decoder's cursor.
    mark: usize,
    newline: &'a str,
    // Earlier sections, kept for resolving code bodies against their
    // signatures and export names.
    types: TypeSection,
    functions: FunctionSection,
    exports: ExportSection,
}

impl<'a> Disassembler<'a> {
    fn new(bytes: &'a [u8], newline: &'a str) -> Disassembler<'a> {
        Disassembler {
            bytes,
            dec: Decoder::new(bytes),
            out: String::new(),
            mark: 0,
            newline,
            types: TypeSection::new(),
            functions: FunctionSection::new(),
            exports: ExportSection::new(),
        }
    }

    fn run(mut self) -> Result<String, DecodeError> {
        self.hex_dump(0, self.bytes.len(), 0);
        self.blank();

        let preamble = self.dec.module_preamble()?;
        self.line(2, &format!("module version {}", preamble.version.number()));
        self.decoded(4);

        while self.dec.remaining() > 0 {
            self.blank();
            self.section()?;
        }
        Ok(self.out)
    }

    // Output helpers --------------------------------------------------------

    fn line(&mut self, indent: usize, text: &str) {
        for _ in 0..indent {
            self.out.push(' ');
        }
        self.out.push_str(text);
        self.out.push_str(self.newline);
    }

    fn blank(&mut self) {
        self.out.push_str(self.newline);
    }

    /// 16 bytes per line, each line prefixed with its 8-digit offset.
    fn hex_dump(&mut self, start: usize, end: usize, indent: usize) {
        let mut offset = start;
        while offset < end {
            let line_end = (offset + 16).min(end);
            let parts: Vec<String> = self.bytes[offset..line_end].iter().map(|&b| hex8(b)).collect();
            let text = format!("{}  {}", hex32(offset as u32), parts.join(" "));
            self.line(indent, &text);
            offset = line_end;
        }
    }

    /// Dumps the bytes decoded since the previous mark and advances it.
    fn decoded(&mut self, indent: usize) {
        let upto = self.dec.offset();
        self.hex_dump(self.mark, upto, indent);
        self.mark = upto;
    }

    // Sections --------------------------------------------------------------

    fn section(&mut self) -> Result<(), DecodeError> {
        let section = self.dec.section()?;
        let id = section.id();
        self.line(2, &format!("{} Section (id={})", id.name(), id.code()));
        self.decoded(4);

        match section {
            Section::Custom(s) => self.custom_payload(&s),
            Section::Type(s) => {
                self.type_payload(&s);
                self.types = s;
            }
            Section::Function(s) => {
                self.function_payload(&s);
                self.functions = s;
            }
            Section::Export(s) => {
                self.export_payload(&s);
                self.exports = s;
            }
            Section::Code(s) => self.code_payload(&s)?,
        }
        Ok(())
    }

    fn custom_payload(&mut self, section: &CustomSection) {
        let text = if section.payload_data.is_empty() {
            format!("{} = {{ }}", section.name)
        } else {
            let parts: Vec<String> = section.payload_data.iter().map(|&b| hex8(b)).collect();
            format!("{} = {{ {} }}", section.name, parts.join(" "))
        };
        self.line(4, &text);
    }

    fn type_payload(&mut self, section: &TypeSection) {
        for (i, signature) in section.entries.iter().enumerate() {
            let text = format!("[{i}] func_type: {signature}");
            self.line(4, &text);
        }
    }

    fn function_payload(&mut self, section: &FunctionSection) {
        for (i, type_index) in section.entries.iter().enumerate() {
            let text = format!("[{i}] {type_index}");
            self.line(4, &text);
        }
    }

    fn export_payload(&mut self, section: &ExportSection) {
        for (i, entry) in section.entries.iter().enumerate() {
            let text = format!("[{i}] '{}' {} index: {}", entry.name, entry.kind, entry.index);
            self.line(4, &text);
        }
    }

    fn code_payload(&mut self, section: &CodeSection) -> Result<(), DecodeError> {
        for (i, body) in section.bodies.iter().enumerate() {
            if i > 0 {
                self.blank();
            }

            let names: Vec<String> = self
                .exports
                .function_names(i as u32)
                .iter()
                .map(|name| format!("'{name}'"))
                .collect();
            if !names.is_empty() {
                let text = names.join(" ... ");
                self.line(4, &text);
            }

            let signature = self
                .functions
                .get(i as u32)
                .and_then(|type_index| self.types.get(type_index))
                .cloned();
            if let Some(signature) = signature {
                self.line(4, &signature.to_string());
                self.line(4, "params:");
                for (j, param) in signature.param_types.iter().enumerate() {
                    let text = format!("${j}: {param}");
                    self.line(6, &text);
                }
                self.line(4, "locals:");
                let mut index = signature.param_types.len();
                for local in &body.locals {
                    for _ in 0..local.count {
                        let text = format!("${index}: {}", local.ty);
                        self.line(6, &text);
                        index += 1;
                    }
                }
            }

            self.line(4, "code:");
            self.code_lines(&body.code)?;
        }
        Ok(())
    }

    // Instructions ----------------------------------------------------------

    /// One opcode per line, immediates rendered per the opcode's schema,
    /// raw bytes as an aligned comment.
    fn code_lines(&mut self, code: &[u8]) -> Result<(), DecodeError> {
        let mut d = Decoder::new(code);
        while d.remaining() > 0 {
            let start = d.offset();
            let op = d.op()?;
            let mut suffix = String::new();
            let text = match op.immediates() {
                Imm::None => op.name().to_string(),
                Imm::BlockType => {
                    let block_type = d.type_code()?;
                    match block_type.value_type() {
                        Some(vt) => format!("{} {vt}", op.name()),
                        None => op.name().to_string(),
                    }
                }
                Imm::Index => {
                    let index = d.varuint32()?;
                    format!("{} {index}", op.name())
                }
                Imm::BrTable => {
                    let count = d.varuint32()?;
                    let mut targets = Vec::new();
                    for _ in 0..count {
                        targets.push(d.varuint32()?.to_string());
                    }
                    let default = d.varuint32()?;
                    if targets.is_empty() {
                        format!("{} {default}", op.name())
                    } else {
                        format!("{} {} {default}", op.name(), targets.join(" "))
                    }
                }
                Imm::CallIndirect => {
                    let type_index = d.varuint32()?;
                    let _reserved = d.varuint1()?;
                    format!("{} {type_index}", op.name())
                }
                Imm::MemArg => {
                    let align = d.varuint32()?;
                    let offset = d.varuint32()?;
                    format!("{} align={align} offset={offset}", op.name())
                }
                Imm::MemIndex => {
                    let _reserved = d.varuint1()?;
                    op.name().to_string()
                }
                Imm::VarI32 => {
                    let value = d.varint32()?;
                    format!("{} {value}", op.name())
                }
                Imm::VarI64 => {
                    let value = d.varint64()?;
                    format!("{} {value}", op.name())
                }
                Imm::F32 => {
                    let value = d.float32()?;
                    suffix = format!(" = {}", value.to_hex());
                    format!("{} 0x{:08x}", op.name(), value.to_bits())
                }
                Imm::F64 => {
                    let value = d.float64()?;
                    suffix = format!(" = {}", value.to_hex());
                    format!("{} 0x{:016x}", op.name(), value.to_bits())
                }
            };

            let raw: Vec<String> = code[start..d.offset()].iter().map(|&b| hex8(b)).collect();
            let comment = format!("{}{}", raw.join(" "), suffix);
            self.code_line(&text, &comment);
        }
        Ok(())
    }

    fn code_line(&mut self, text: &str, comment: &str) {
        let width = COMMENT_COLUMN;
        let line = if text.len() >= width {
            format!("{text} // {comment}")
        } else {
            format!("{text:<width$}// {comment}")
        };
        self.line(6, &line);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{CustomSection, WasmModule};
    use crate::ops::OpEncoder;
    use crate::types::ValueType;

    #[test]
    fn test_hex_dump_wraps_at_16() {
        let bytes: Vec<u8> = (0u8..20).collect();
        let mut d = Disassembler::new(&bytes, "\n");
        d.hex_dump(0, bytes.len(), 0);
        assert_eq!(
            d.out,
            "00000000  00 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f\n\
             00000010  10 11 12 13\n"
        );
    }

    #[test]
    fn test_custom_section_payload_line() {
        let mut module = WasmModule::new();
        module.add_custom(CustomSection::new("notes", vec![0xde, 0xad]));
        let text = disassemble(&module.encode().unwrap()).unwrap();
        assert!(text.contains("Custom Section (id=0)"));
        assert!(text.contains("notes = { de ad }"));
    }

    #[test]
    fn test_crlf_newlines() {
        let module = WasmModule::new();
        let text = disassemble_with_newline(&module.encode().unwrap(), "\r\n").unwrap();
        assert!(text.contains("module version 1\r\n"));
        assert!(!text.replace("\r\n", "").contains('\r'));
    }

    #[test]
    fn test_locals_numbered_after_params() {
        let mut module = WasmModule::new();
        let mut ops = OpEncoder::new();
        ops.get_local(0);
        module
            .add_function(
                "f",
                &[ValueType::I32],
                &[],
                vec![crate::module::LocalEntry::new(2, ValueType::F64)],
                false,
                ops,
            )
            .unwrap();
        let text = disassemble(&module.encode().unwrap()).unwrap();
        assert!(text.contains("$0: i32"));
        assert!(text.contains("$1: f64"));
        assert!(text.contains("$2: f64"));
    }

    #[test]
    fn test_comment_alignment() {
        let mut module = WasmModule::new();
        let mut ops = OpEncoder::new();
        ops.ret();
        module
            .add_function("f", &[], &[], vec![], false, ops)
            .unwrap();
        let text = disassemble(&module.encode().unwrap()).unwrap();
        // "return" padded to the comment column
        assert!(text.contains("return                        // 0f"));
        assert!(text.contains("end                           // 0b"));
    }
}
