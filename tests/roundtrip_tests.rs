//! Codec round-trip tests: primitives, sections, and whole modules.
//!
//! Testing strategy mirrors the codec's symmetry contract: everything a
//! documented constructor can build must decode back deeply equal, and
//! re-encoding the decoded value must reproduce the original bytes
//! (deterministic encoding makes byte equality prove semantic
//! equivalence).

use mwasm::decoder::{DecodeError, Decoder};
use mwasm::encoder::Encoder;
use mwasm::module::{
    CodeSection, CustomSection, ExportEntry, ExportSection, FuncType, FunctionBody,
    FunctionSection, LocalEntry, Section, TypeSection, WasmModule, WasmVersion,
};
use mwasm::num;
use mwasm::ops::OpEncoder;
use mwasm::types::{ExternalKind, ValueType};
use rand::Rng;
use rstest::rstest;

// ===========================================================================
// Primitive codecs, driven through one table
// ===========================================================================

/// One scalar codec: its domain and encode/decode entry points lifted to
/// a common `i64` signature. A single test walks the whole table, so
/// every codec faces the same boundary scrutiny.
struct ScalarCodec {
    name: &'static str,
    min: i64,
    max: i64,
    /// Returns false when the value is outside the codec's domain.
    encode: fn(&mut Encoder, i64) -> bool,
    decode: fn(&mut Decoder) -> Option<i64>,
}

const SCALAR_CODECS: &[ScalarCodec] = &[
    ScalarCodec {
        name: "uint8",
        min: 0,
        max: 0xff,
        encode: |e, v| match num::expect_uint8(v) {
            Ok(b) => {
                e.uint8(b);
                true
            }
            Err(_) => false,
        },
        decode: |d| d.uint8().ok().map(i64::from),
    },
    ScalarCodec {
        name: "uint32",
        min: 0,
        max: u32::MAX as i64,
        encode: |e, v| match num::expect_uint32(v) {
            Ok(u) => {
                e.uint32(u);
                true
            }
            Err(_) => false,
        },
        decode: |d| d.uint32().ok().map(i64::from),
    },
    ScalarCodec {
        name: "varuint1",
        min: 0,
        max: 1,
        encode: |e, v| u32::try_from(v).map(|u| e.varuint1(u).is_ok()).unwrap_or(false),
        decode: |d| d.varuint1().ok().map(i64::from),
    },
    ScalarCodec {
        name: "varuint7",
        min: 0,
        max: 0x7f,
        encode: |e, v| u32::try_from(v).map(|u| e.varuint7(u).is_ok()).unwrap_or(false),
        decode: |d| d.varuint7().ok().map(i64::from),
    },
    ScalarCodec {
        name: "varuint32",
        min: 0,
        max: u32::MAX as i64,
        encode: |e, v| match num::expect_uint32(v) {
            Ok(u) => {
                e.varuint32(u);
                true
            }
            Err(_) => false,
        },
        decode: |d| d.varuint32().ok().map(i64::from),
    },
    ScalarCodec {
        name: "varint7",
        min: -64,
        max: 63,
        encode: |e, v| {
            i32::try_from(v)
                .map(|s| e.varint7(s).is_ok())
                .unwrap_or(false)
        },
        decode: |d| d.varint7().ok().map(i64::from),
    },
    ScalarCodec {
        name: "varint32",
        min: i32::MIN as i64,
        max: i32::MAX as i64,
        encode: |e, v| match num::expect_int32(v) {
            Ok(s) => {
                e.varint32(s);
                true
            }
            Err(_) => false,
        },
        decode: |d| d.varint32().ok().map(i64::from),
    },
    ScalarCodec {
        name: "varint64",
        min: i64::MIN,
        max: i64::MAX,
        encode: |e, v| {
            e.varint64(v);
            true
        },
        decode: |d| d.varint64().ok(),
    },
];

fn round_trip(codec: &ScalarCodec, value: i64) {
    let mut encoder = Encoder::new();
    assert!(
        (codec.encode)(&mut encoder, value),
        "{}: {} should be encodable",
        codec.name,
        value
    );
    let bytes = encoder.into_bytes();
    let mut decoder = Decoder::new(&bytes);
    let back = (codec.decode)(&mut decoder);
    assert_eq!(back, Some(value), "{}: {} failed to round-trip", codec.name, value);
    assert_eq!(decoder.remaining(), 0, "{}: {} left trailing bytes", codec.name, value);
}

#[test]
fn every_scalar_codec_round_trips_its_boundaries() {
    for codec in SCALAR_CODECS {
        let mut values = vec![codec.min, codec.max];
        if codec.min < codec.max {
            values.push(codec.min + 1);
            values.push(codec.max - 1);
        }
        if codec.min <= 0 && codec.max >= 0 {
            values.push(0);
        }
        if codec.min <= 1 && codec.max >= 1 {
            values.push(1);
        }
        for value in values {
            round_trip(codec, value);
        }
    }
}

#[test]
fn every_scalar_codec_rejects_out_of_range() {
    for codec in SCALAR_CODECS {
        let mut encoder = Encoder::new();
        if let Some(above) = codec.max.checked_add(1) {
            assert!(
                !(codec.encode)(&mut encoder, above),
                "{}: {} should be rejected",
                codec.name,
                above
            );
        }
        if let Some(below) = codec.min.checked_sub(1) {
            assert!(
                !(codec.encode)(&mut encoder, below),
                "{}: {} should be rejected",
                codec.name,
                below
            );
        }
    }
}

#[test]
fn every_scalar_codec_round_trips_random_values() {
    let mut rng = rand::rng();
    for codec in SCALAR_CODECS {
        for _ in 0..200 {
            round_trip(codec, rng.random_range(codec.min..=codec.max));
        }
    }
}

#[test]
fn float64_round_trips_bit_patterns() {
    for value in [
        0.0f64,
        -0.0,
        1.0,
        std::f64::consts::PI,
        f64::MAX,
        f64::MIN_POSITIVE,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::NAN,
    ] {
        let mut encoder = Encoder::new();
        encoder.float64(value);
        let bytes = encoder.into_bytes();
        assert_eq!(bytes.len(), 8);
        let back = Decoder::new(&bytes).float64().unwrap();
        assert_eq!(back.to_bits(), value.to_bits());
    }
}

// ===========================================================================
// LEB128 byte-length boundaries
// ===========================================================================

#[rstest]
#[case(0x3f)]
#[case(0x7f)]
#[case(0x1fff)]
#[case(0x3fff)]
#[case(0xfffff)]
#[case(0x1fffff)]
#[case(0x7ffffff)]
#[case(0x0fffffff)]
fn leb128_byte_length_boundaries(#[case] x: u32) {
    // unsigned: the boundary value and its successor
    for value in [x, x + 1] {
        let mut encoder = Encoder::new();
        encoder.varuint32(value);
        let bytes = encoder.into_bytes();
        assert_eq!(Decoder::new(&bytes).varuint32().unwrap(), value);
    }
    // signed: the mirrored negative values straddling the same transition
    for value in [-(x as i32) - 1, -(x as i32) - 2] {
        let mut encoder = Encoder::new();
        encoder.varint32(value);
        let bytes = encoder.into_bytes();
        assert_eq!(Decoder::new(&bytes).varint32().unwrap(), value);
    }
}

#[test]
fn varint32_negative_boundary_lengths() {
    // -64 still fits one byte; -65 forces a second
    let mut encoder = Encoder::new();
    encoder.varint32(-64);
    assert_eq!(encoder.as_bytes(), &[0x40]);

    let mut encoder = Encoder::new();
    encoder.varint32(-65);
    assert_eq!(encoder.as_bytes(), &[0xbf, 0x7f]);

    for value in [-64, -65] {
        let mut encoder = Encoder::new();
        encoder.varint32(value);
        let bytes = encoder.into_bytes();
        assert_eq!(Decoder::new(&bytes).varint32().unwrap(), value);
    }
}

// ===========================================================================
// Preamble
// ===========================================================================

#[test]
fn preamble_encodes_magic_first() {
    let bytes = WasmModule::new().encode().unwrap();
    assert_eq!(bytes, vec![0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00]);

    let decoded = WasmModule::decode(&bytes).unwrap();
    assert_eq!(decoded.preamble.version, WasmVersion::Mvp);
}

#[test]
fn preamble_rejection_cites_expected_magic() {
    let err = WasmModule::decode(&[0xba, 0xda, 0xda, 0xba, 0x00, 0x00, 0x00, 0x00]).unwrap_err();
    assert_eq!(err, DecodeError::BadMagic { found: 0xbadadaba });
    assert!(err.to_string().contains("0x6d736100"));
}

// ===========================================================================
// Sections
// ===========================================================================

fn section_round_trip(encoded: Vec<u8>) -> Section {
    let mut decoder = Decoder::new(&encoded);
    let section = decoder.section().unwrap();
    assert_eq!(decoder.remaining(), 0);
    section
}

#[test]
fn custom_section_round_trips() {
    let original = CustomSection::new("name", vec![0x70, 0x61, 0x79, 0x6c, 0x6f, 0x61, 0x64]);
    let mut encoder = Encoder::new();
    assert!(encoder.custom_section(&original).unwrap());
    match section_round_trip(encoder.into_bytes()) {
        Section::Custom(decoded) => assert_eq!(decoded, original),
        other => panic!("expected a custom section, got {other:?}"),
    }
}

#[test]
fn custom_section_with_empty_name_and_payload_round_trips() {
    let original = CustomSection::new("", Vec::new());
    let mut encoder = Encoder::new();
    encoder.custom_section(&original).unwrap();
    let bytes = encoder.into_bytes();
    assert_eq!(bytes, vec![0x00, 0x01, 0x00]);
    match section_round_trip(bytes) {
        Section::Custom(decoded) => assert_eq!(decoded, original),
        other => panic!("expected a custom section, got {other:?}"),
    }
}

#[test]
fn empty_type_section_elided_or_explicit() {
    let section = TypeSection::new();

    let mut encoder = Encoder::new();
    assert!(!encoder.type_section(&section, true).unwrap());
    assert!(encoder.as_bytes().is_empty());

    let mut encoder = Encoder::new();
    assert!(!encoder.type_section(&section, false).unwrap());
    assert_eq!(encoder.as_bytes(), &[0x01, 0x01, 0x00]);
    match section_round_trip(encoder.into_bytes()) {
        Section::Type(decoded) => assert!(decoded.is_empty()),
        other => panic!("expected a type section, got {other:?}"),
    }
}

#[test]
fn func_type_round_trips_inside_type_section() {
    let mut section = TypeSection::new();
    let index = section.add(
        FuncType::new(vec![ValueType::F64, ValueType::F64], vec![ValueType::F64]).unwrap(),
    );
    assert_eq!(index, 0);

    let mut encoder = Encoder::new();
    assert!(encoder.type_section(&section, true).unwrap());
    match section_round_trip(encoder.into_bytes()) {
        Section::Type(decoded) => assert_eq!(decoded, section),
        other => panic!("expected a type section, got {other:?}"),
    }
}

#[test]
fn function_section_round_trips() {
    let mut section = FunctionSection::new();
    assert_eq!(section.add(0), 0);
    assert_eq!(section.add(7), 1);
    assert_eq!(section.add(0x1234), 2);

    let mut encoder = Encoder::new();
    assert!(encoder.function_section(&section, true).unwrap());
    match section_round_trip(encoder.into_bytes()) {
        Section::Function(decoded) => assert_eq!(decoded, section),
        other => panic!("expected a function section, got {other:?}"),
    }
}

#[test]
fn export_section_round_trips() {
    let mut section = ExportSection::new();
    section.push(ExportEntry::new("main", ExternalKind::Function, 2).unwrap());
    section.push(ExportEntry::new("mem", ExternalKind::Memory, 0).unwrap());
    section.push(ExportEntry::new("", ExternalKind::Global, 0).unwrap());

    let mut encoder = Encoder::new();
    assert!(encoder.export_section(&section, true).unwrap());
    match section_round_trip(encoder.into_bytes()) {
        Section::Export(decoded) => assert_eq!(decoded, section),
        other => panic!("expected an export section, got {other:?}"),
    }
}

#[test]
fn function_body_round_trips_inside_code_section() {
    let mut section = CodeSection::new();
    section.push(
        FunctionBody::new(vec![LocalEntry::new(1, ValueType::I32)], vec![0x0b]).unwrap(),
    );

    let mut encoder = Encoder::new();
    assert!(encoder.code_section(&section, true).unwrap());
    match section_round_trip(encoder.into_bytes()) {
        Section::Code(decoded) => assert_eq!(decoded, section),
        other => panic!("expected a code section, got {other:?}"),
    }
}

// ===========================================================================
// Whole modules
// ===========================================================================

/// Encodes, decodes, re-encodes, and asserts both deep equality and byte
/// equality.
fn assert_module_round_trip(module: &WasmModule) -> Vec<u8> {
    let bytes_a = module.encode().unwrap();
    let decoded = WasmModule::decode(&bytes_a).unwrap();
    assert_eq!(&decoded, module, "decoded module differs");
    let bytes_b = decoded.encode().unwrap();
    assert_eq!(bytes_a, bytes_b, "encode stability failed");
    bytes_a
}

fn pi_module() -> WasmModule {
    let mut module = WasmModule::new();
    let mut ops = OpEncoder::new();
    ops.f64().constant(std::f64::consts::PI);
    ops.ret();
    module
        .add_function("pi", &[], &[ValueType::F64], vec![], true, ops)
        .unwrap();
    module
}

#[test]
fn pi_module_round_trips() {
    let module = pi_module();
    let bytes = assert_module_round_trip(&module);
    assert_eq!(&bytes[0..4], b"\0asm");
    // one exported function whose body ends with return, end
    assert_eq!(&bytes[bytes.len() - 2..], &[0x0f, 0x0b]);
}

#[test]
fn multi_function_module_round_trips() {
    let mut module = WasmModule::new();

    let mut ops = OpEncoder::new();
    ops.get_local(0);
    ops.get_local(1);
    ops.f64().add();
    ops.ret();
    let add = module
        .add_function(
            "add",
            &[ValueType::F64, ValueType::F64],
            &[ValueType::F64],
            vec![],
            true,
            ops,
        )
        .unwrap();
    assert_eq!(add, 0);

    let mut ops = OpEncoder::new();
    ops.i32().constant(-624485);
    ops.set_local(1);
    ops.get_local(1);
    ops.ret();
    let internal = module
        .add_function(
            "scratch",
            &[ValueType::I32],
            &[ValueType::I32],
            vec![LocalEntry::new(1, ValueType::I32)],
            false,
            ops,
        )
        .unwrap();
    assert_eq!(internal, 1);

    assert_module_round_trip(&module);
}

#[test]
fn module_with_custom_sections_round_trips() {
    let mut module = pi_module();
    module.add_custom(CustomSection::new("name", vec![0x01, 0x02, 0x03]));
    module.add_custom(CustomSection::new("", Vec::new()));
    let bytes = assert_module_round_trip(&module);
    let decoded = WasmModule::decode(&bytes).unwrap();
    assert_eq!(decoded.customs.len(), 2);
}

#[test]
fn module_with_many_signatures_round_trips() {
    let mut module = WasmModule::new();
    let value_types = [ValueType::I32, ValueType::I64, ValueType::F32, ValueType::F64];
    for (i, &vt) in value_types.iter().enumerate() {
        let mut ops = OpEncoder::new();
        ops.nop();
        module
            .add_function(
                &format!("f{i}"),
                &value_types[..=i],
                &[vt],
                vec![],
                i % 2 == 0,
                ops,
            )
            .unwrap();
    }
    assert_module_round_trip(&module);
}

#[test]
fn decode_rejects_unsupported_section_in_module() {
    // preamble + well-formed Memory section (id 5)
    let mut bytes = WasmModule::new().encode().unwrap();
    bytes.extend_from_slice(&[0x05, 0x01, 0x00]);
    assert_eq!(
        WasmModule::decode(&bytes),
        Err(DecodeError::UnsupportedSectionId(5))
    );
}

#[test]
fn decode_rejects_truncated_module() {
    let bytes = pi_module().encode().unwrap();
    let truncated = &bytes[..bytes.len() - 1];
    assert!(WasmModule::decode(truncated).is_err());
}

#[test]
fn add_function_terminates_body_with_end() {
    let module = pi_module();
    let body = &module.code.bodies[0];
    assert_eq!(*body.code.last().unwrap(), 0x0b);
}
