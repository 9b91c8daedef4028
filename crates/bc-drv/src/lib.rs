//! The compiler driver: CLI surface, library discovery, pipeline
//! orchestration, and invocation of the external assembler/linker —
//! functionality deliberately kept outside the core compilation
//! pipeline but still necessary for a runnable binary.

pub mod compile;
pub mod host;
pub mod library;
pub mod toolchain;

use std::fs;
use std::path::{Path, PathBuf};

use bc_util::{SourceMap, Target};
use tracing::{debug, info};

use compile::{compile_to_asm, StageFailure};
use library::LibraryFiles;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes the driver assigns outside each stage's own positive
/// error codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const NO_INPUT_OR_UNBUILDABLE_TARGET: i32 = -100;
    pub const IO_ERROR: i32 = -1;
}

pub struct Options {
    pub files: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub keep_asm: bool,
}

/// Base name / extension split on `-o`: a path with no `.` uses the
/// whole string as the base and an empty extension.
pub struct OutputSpec {
    pub base: String,
    pub extension: String,
}

impl OutputSpec {
    pub fn from_flag(path: Option<&Path>) -> Self {
        match path {
            None => Self { base: "out".to_string(), extension: "exe".to_string() },
            Some(p) => {
                let raw = p.to_string_lossy().to_string();
                match raw.rfind('.') {
                    Some(idx) => Self { base: raw[..idx].to_string(), extension: raw[idx + 1..].to_string() },
                    None => Self { base: raw, extension: String::new() },
                }
            }
        }
    }

    pub fn asm_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.asm", self.base))
    }

    pub fn obj_path(&self, target: Target) -> PathBuf {
        let ext = if target.is_windows() { "obj" } else { "o" };
        PathBuf::from(format!("{}.{}", self.base, ext))
    }

    pub fn exe_path(&self) -> PathBuf {
        if self.extension.is_empty() {
            PathBuf::from(self.base.clone())
        } else {
            PathBuf::from(format!("{}.{}", self.base, self.extension))
        }
    }
}

/// Resolves `-f`, falling back to host detection. Returns `None` for
/// an unrecognized explicit flag or an undetectable host — both count
/// as an unbuildable target.
pub fn resolve_target(format: Option<&str>) -> Option<Target> {
    match format {
        Some(s) => s.parse().ok(),
        None => host::detect(),
    }
}

/// Locates the directory `lib/` lives under, relative to the running
/// binary: the parent of the directory containing the executable,
/// which skips past a `bin/`-style directory holding the binary
/// itself.
pub fn install_dir() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let exe_dir = exe.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    Ok(exe_dir.parent().map(Path::to_path_buf).unwrap_or(exe_dir))
}

/// Reads one file into `buf`. A library file that exists but cannot be
/// read surfaces as a plain I/O error.
fn append_file(buf: &mut String, path: &Path) -> std::io::Result<()> {
    debug!(path = %path.display(), "reading source file");
    let content = fs::read_to_string(path)?;
    buf.push_str(&content);
    Ok(())
}

/// Concatenates target headers, common headers, the user's sources (in
/// the order given), target bodies, then common bodies into one
/// translation unit — there is no separate compilation.
pub fn build_source_map(
    install_dir: &Path,
    target: Target,
    user_files: &[PathBuf],
) -> std::io::Result<SourceMap> {
    let lib = LibraryFiles::discover(install_dir, target)?;
    let mut buf = String::new();

    for path in &lib.target_headers {
        append_file(&mut buf, path)?;
    }
    for path in &lib.common_headers {
        append_file(&mut buf, path)?;
    }
    for path in user_files {
        append_file(&mut buf, path)?;
    }
    for path in &lib.target_bodies {
        append_file(&mut buf, path)?;
    }
    for path in &lib.common_bodies {
        append_file(&mut buf, path)?;
    }

    Ok(SourceMap::new(buf))
}

/// Assembles and links the emitted NASM source for one of the four
/// targets. A spawn failure or nonzero exit status from either tool is
/// an I/O error — their own diagnostics aren't parsed or re-rendered
/// here.
pub fn assemble_and_link(target: Target, out: &OutputSpec) -> std::io::Result<()> {
    let asm_path = out.asm_path();
    let obj_path = out.obj_path(target);
    let exe_path = out.exe_path();

    info!(tool = "nasm", "assembling");
    let status = toolchain::assemble_command(target, &asm_path, &obj_path).status()?;
    if !status.success() {
        return Err(std::io::Error::other("nasm exited with a failure status"));
    }

    info!(tool = "linker", "linking");
    let status = toolchain::link_command(target, &obj_path, &exe_path).status()?;
    if !status.success() {
        return Err(std::io::Error::other("linker exited with a failure status"));
    }

    Ok(())
}

/// Resolves the target, gathers and concatenates every source file,
/// but stops short of running the pipeline — split out so a stage
/// failure can still be rendered against the `SourceMap` it occurred
/// in (`main.rs` holds onto `Preparation.sources` across that call).
pub fn prepare(options: &Options) -> Result<Preparation, DriverError> {
    if options.files.is_empty() {
        return Err(DriverError::NoInputFiles);
    }

    let target = resolve_target(options.format.as_deref()).ok_or(DriverError::UnbuildableTarget)?;
    let out = OutputSpec::from_flag(options.output.as_deref());

    let install_dir = install_dir().map_err(DriverError::Io)?;
    let sources =
        build_source_map(&install_dir, target, &options.files).map_err(DriverError::Io)?;

    Ok(Preparation { sources, target, out })
}

/// Runs the full pipeline from user-supplied options down to an
/// emitted assembly string, without touching the external toolchain.
/// `main.rs` layers file writes and toolchain invocation, and the
/// exit-code mapping, on top of this.
pub fn compile(options: &Options) -> Result<CompileOutcome, DriverError> {
    let prep = prepare(options)?;
    let asm = compile_to_asm(&prep.sources, prep.target).map_err(DriverError::Stage)?;
    Ok(CompileOutcome { sources: prep.sources, target: prep.target, out: prep.out, asm })
}

pub struct Preparation {
    pub sources: SourceMap,
    pub target: Target,
    pub out: OutputSpec,
}

pub struct CompileOutcome {
    pub sources: SourceMap,
    pub target: Target,
    pub out: OutputSpec,
    pub asm: String,
}

#[derive(Debug)]
pub enum DriverError {
    NoInputFiles,
    UnbuildableTarget,
    Io(std::io::Error),
    Stage(StageFailure),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_spec_splits_at_last_dot() {
        let out = OutputSpec::from_flag(Some(Path::new("build/prog.exe")));
        assert_eq!(out.base, "build/prog");
        assert_eq!(out.extension, "exe");
    }

    #[test]
    fn output_spec_with_no_dot_uses_whole_path_as_base() {
        let out = OutputSpec::from_flag(Some(Path::new("build/prog")));
        assert_eq!(out.base, "build/prog");
        assert_eq!(out.extension, "");
        assert_eq!(out.exe_path(), PathBuf::from("build/prog"));
    }

    #[test]
    fn output_spec_default_is_out_exe() {
        let out = OutputSpec::from_flag(None);
        assert_eq!(out.asm_path(), PathBuf::from("out.asm"));
        assert_eq!(out.exe_path(), PathBuf::from("out.exe"));
    }

    #[test]
    fn resolve_target_rejects_unknown_format() {
        assert!(resolve_target(Some("macos32")).is_none());
    }

    #[test]
    fn resolve_target_accepts_known_formats() {
        assert_eq!(resolve_target(Some("lin64")), Some(Target::Lin64));
    }

    #[test]
    fn compile_rejects_empty_file_list() {
        let opts = Options { files: Vec::new(), output: None, format: Some("lin64".into()), keep_asm: false };
        assert!(matches!(compile(&opts), Err(DriverError::NoInputFiles)));
    }
}
