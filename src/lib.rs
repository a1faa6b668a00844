//! A binary codec and disassembler for MVP WebAssembly modules.
//!
//! mwasm round-trips the binary format: an in-memory [`module::WasmModule`]
//! encodes to the canonical byte stream, the byte stream decodes back to a
//! deeply-equal module, and any module dumps to deterministic annotated
//! text.
//!
//! # Modules
//!
//! - [`num`] -- Range predicates and hex formatting for codec scalars.
//! - [`types`] -- Format enumerations: type codes, external kinds, section
//!   ids, and the MVP opcode table.
//! - [`module`] -- The module data model: preamble, sections, and entries.
//! - [`encoder`] -- Append-only binary encoder with section framing.
//! - [`decoder`] -- Forward-only binary decoder over a borrowed slice.
//! - [`ops`] -- Typed opcode writer for function bodies.
//! - [`disasm`] -- Deterministic text dump of a binary module.
//!
//! # Example
//!
//! Build a module with one exported function returning π, encode it, and
//! decode it back:
//!
//! ```
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
//! let bytes = module.encode().unwrap();
//! assert_eq!(&bytes[0..4], b"\0asm");
//!
//! let decoded = WasmModule::decode(&bytes).unwrap();
//! assert_eq!(decoded, module);
//! ```

pub mod decoder;
pub mod disasm;
pub mod encoder;
pub mod module;
pub mod num;
pub mod ops;
pub mod types;
