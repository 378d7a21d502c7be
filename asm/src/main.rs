use color_print::cprintln;
use fvmasm::SymbolKind;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input file
    #[clap(default_value = "main.fvm")]
    input: String,

    /// Output file
    #[clap(short, long, default_value = "main.fvm.bin")]
    output: String,

    /// Dump the symbol table and the emitted bytes
    #[clap(short, long)]
    dump: bool,
}

fn main() {
    use clap::Parser;

    pretty_env_logger::init();
    let args = Args::parse();
    println!("FVM-2000 Assembler");

    println!("  < {}", args.input);
    let source = match std::fs::read_to_string(&args.input) {
        Ok(source) => source,
        Err(err) => {
            cprintln!("<red,bold>error</>: failed to open {}: {}", args.input, err);
            std::process::exit(1);
        }
    };

    let assembly = match fvmasm::assemble(&source) {
        Ok(assembly) => assembly,
        Err(err) => {
            err.print_diag(&source);
            std::process::exit(1);
        }
    };

    if let Err(err) = std::fs::write(&args.output, &assembly.image) {
        cprintln!("<red,bold>error</>: failed to write {}: {}", args.output, err);
        std::process::exit(1);
    }
    println!("  > {} ({} bytes used)", args.output, assembly.len);

    if args.dump {
        for (name, kind, value) in assembly.symbols.iter() {
            match kind {
                SymbolKind::Builtin => continue,
                SymbolKind::Label => cprintln!("<green>{:>12}</> = 0x{:04X}", name, value),
                SymbolKind::Define => cprintln!("<yellow>{:>12}</> = 0x{:04X}", name, value),
            }
        }
        for (row, chunk) in assembly.image[..assembly.len].chunks(16).enumerate() {
            print!("{:04X}:", row * 16);
            for byte in chunk {
                print!(" {byte:02X}");
            }
            println!();
        }
    }
}
