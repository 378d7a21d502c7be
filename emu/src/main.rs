use clap::Parser;
use color_print::cprintln;

use fvmemu::{Cpu, VmError};

#[derive(Parser, Debug)]
#[clap(
    name = "FVM-2000 Emulator",
    version,
    about = "Execution engine for the FVM-2000 fictional processor"
)]
struct Args {
    /// Binary image produced by the assembler
    #[arg(default_value = "main.fvm.bin")]
    input: String,

    /// Stop after at most this many instructions
    #[arg(short, long)]
    tmax: Option<u64>,

    /// Log every executed instruction (same as RUST_LOG=trace)
    #[arg(long)]
    trace: bool,

    /// Write the final machine state to a YAML file
    #[arg(short, long)]
    dump: Option<String>,
}

/// Step until halt or the instruction budget runs out.
fn run_bounded(cpu: &mut Cpu, tmax: u64) -> Result<u64, VmError> {
    let mut cycles = 0;
    while cycles < tmax && !cpu.halted()? {
        cpu.step()?;
        cycles += 1;
    }
    Ok(cycles)
}

fn main() {
    let args = Args::parse();
    if args.trace {
        std::env::set_var("RUST_LOG", "trace");
    }
    pretty_env_logger::init();

    println!("FVM-2000 Emulator");
    println!("+-----------------------------------------------+");
    println!("| {:<45} |", args.input);
    println!("+-----------------------------------------------+");

    let image = match std::fs::read(&args.input) {
        Ok(image) => image,
        Err(err) => {
            cprintln!("<red,bold>error</>: failed to open {}: {}", args.input, err);
            std::process::exit(1);
        }
    };

    let mut cpu = match Cpu::new(&image) {
        Ok(cpu) => cpu,
        Err(err) => {
            cprintln!("<red,bold>error</>: {}", err);
            std::process::exit(1);
        }
    };

    let outcome = match args.tmax {
        Some(tmax) => run_bounded(&mut cpu, tmax),
        None => cpu.run(),
    };
    let cycles = match outcome {
        Ok(cycles) => cycles,
        Err(err) => {
            cprintln!("<red,bold>error</>: {}", err);
            std::process::exit(1);
        }
    };

    println!("{}", cpu.snapshot().cformat());
    println!("halted after {cycles} cycles");

    if let Some(path) = args.dump {
        let state = match serde_yaml::to_string(&cpu.snapshot()) {
            Ok(state) => state,
            Err(err) => {
                cprintln!("<red,bold>error</>: failed to serialize state: {}", err);
                std::process::exit(1);
            }
        };
        if let Err(err) = std::fs::write(&path, state) {
            cprintln!("<red,bold>error</>: failed to write {}: {}", path, err);
            std::process::exit(1);
        }
        println!("  > {path}");
    }

    println!("=================================================");
}
