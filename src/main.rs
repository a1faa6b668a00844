use clap::{Parser, Subcommand};
use mwasm::disasm;
use mwasm::module::WasmModule;
use mwasm::num::hex32;
use std::fs;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "mwasm")]
#[command(about = "MVP WebAssembly module codec and disassembler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump module information (defaults to a per-section summary)
    Dump {
        /// Path to the WebAssembly module
        file: String,

        /// Show only the module header (magic, version)
        #[arg(long)]
        header: bool,

        /// Show the full annotated disassembly
        #[arg(long, short = 'd')]
        disassemble: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Dump {
            file,
            header,
            disassemble,
        } => dump_module(&file, header, disassemble),
    }
}

fn dump_module(file: &str, header: bool, disassemble: bool) -> ExitCode {
    let bytes = match fs::read(file) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error reading {}: {}", file, e);
            return ExitCode::FAILURE;
        }
    };

    if disassemble {
        return match disasm::disassemble(&bytes) {
            Ok(text) => {
                print!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error disassembling {}: {}", file, e);
                ExitCode::FAILURE
            }
        };
    }

    let module = match WasmModule::decode(&bytes) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error decoding {}: {}", file, e);
            return ExitCode::FAILURE;
        }
    };

    println!("magic: 0x{}", hex32(mwasm::module::Preamble::MAGIC));
    println!("version: {}", module.preamble.version.number());
    if header {
        return ExitCode::SUCCESS;
    }

    println!();
    println!("Type[{}]:", module.types.len());
    for (i, signature) in module.types.entries.iter().enumerate() {
        println!(" - type[{}] {}", i, signature);
    }
    println!("Function[{}]:", module.functions.len());
    for (i, type_index) in module.functions.entries.iter().enumerate() {
        let names = module.exports.function_names(i as u32);
        let exported = names
            .first()
            .map(|name| format!(" <{}>", name))
            .unwrap_or_default();
        println!(" - func[{}] sig={}{}", i, type_index, exported);
    }
    println!("Export[{}]:", module.exports.len());
    for (i, entry) in module.exports.entries.iter().enumerate() {
        println!(" - {}[{}] \"{}\" index: {}", entry.kind, i, entry.name, entry.index);
    }
    println!("Code[{}]:", module.code.len());
    for (i, body) in module.code.bodies.iter().enumerate() {
        println!(" - func[{}] size={}", i, body.code.len());
    }
    if !module.customs.is_empty() {
        println!("Custom[{}]:", module.customs.len());
        for custom in &module.customs {
            println!(" - \"{}\" {} byte(s)", custom.name, custom.payload_data.len());
        }
    }
    ExitCode::SUCCESS
}
