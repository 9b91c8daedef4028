use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;

use bc_drv::compile::compile_to_asm;
use bc_drv::{assemble_and_link, exit_code, prepare, DriverError, Options, VERSION};
use bc_util::report;

/// Compiles B source files to a native executable via NASM.
#[derive(ClapParser, Debug)]
#[command(name = "bc", disable_version_flag = true)]
struct Cli {
    /// B source files, concatenated with the target library in order.
    files: Vec<PathBuf>,

    /// Output path; extension selects the final binary's name too.
    #[arg(short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,

    /// Target format: win32, win64, lin32, or lin64. Defaults to the host.
    #[arg(short = 'f', value_name = "FORMAT")]
    format: Option<String>,

    /// Keep the generated .asm file instead of deleting it.
    #[arg(short = 'S')]
    keep_asm: bool,

    /// Print the compiler version and continue (not an exit-on-parse flag).
    #[arg(short = 'v')]
    print_version: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.print_version {
        println!("bc {VERSION}");
    }

    let options = Options {
        files: cli.files,
        output: cli.output,
        format: cli.format,
        keep_asm: cli.keep_asm,
    };

    if options.files.is_empty() {
        if cli.print_version {
            return ExitCode::SUCCESS;
        }
        eprintln!("bc: no input files");
        return exit_with(exit_code::NO_INPUT_OR_UNBUILDABLE_TARGET);
    }

    let prep = match prepare(&options) {
        Ok(prep) => prep,
        Err(DriverError::NoInputFiles) => {
            eprintln!("bc: no input files");
            return exit_with(exit_code::NO_INPUT_OR_UNBUILDABLE_TARGET);
        }
        Err(DriverError::UnbuildableTarget) => {
            eprintln!("bc: could not determine a target; pass -f win32|win64|lin32|lin64");
            return exit_with(exit_code::NO_INPUT_OR_UNBUILDABLE_TARGET);
        }
        Err(DriverError::Io(e)) => {
            eprintln!("bc: {e}");
            return exit_with(exit_code::IO_ERROR);
        }
        Err(DriverError::Stage(_)) => unreachable!("prepare() never runs the pipeline"),
    };

    let asm = match compile_to_asm(&prep.sources, prep.target) {
        Ok(asm) => asm,
        Err(failure) => {
            eprintln!("{}", report(&prep.sources, failure.as_diagnostic()));
            return exit_with(failure.code());
        }
    };

    let asm_path = prep.out.asm_path();
    if let Err(e) = fs::write(&asm_path, &asm) {
        eprintln!("bc: failed to write {}: {e}", asm_path.display());
        return exit_with(exit_code::IO_ERROR);
    }

    let link_result = assemble_and_link(prep.target, &prep.out);

    let obj_path = prep.out.obj_path(prep.target);
    let _ = fs::remove_file(&obj_path);
    if !options.keep_asm {
        let _ = fs::remove_file(&asm_path);
    }

    if let Err(e) = link_result {
        eprintln!("bc: {e}");
        return exit_with(exit_code::IO_ERROR);
    }

    exit_with(exit_code::SUCCESS)
}

fn exit_with(code: i32) -> ExitCode {
    ExitCode::from(code.rem_euclid(256) as u8)
}
