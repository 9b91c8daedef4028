//! Assembler/linker invocation.
//!
//! The external assembler and linker are treated as collaborators
//! consuming or supplying bytes only: this module builds the same
//! commands the reference driver shells out to, via
//! [`std::process::Command`], and does not interpret their diagnostics
//! — a nonzero exit status or a failure to spawn is reported as a
//! single I/O error.
//!
//! Command construction is split from execution so tests can assert on
//! the argv a target produces without actually invoking `nasm`/`ld`
//! (which may not be installed in a test environment).

use std::path::Path;
use std::process::Command;

use bc_util::Target;

/// NASM's `-f` format name for a target, distinct from this compiler's
/// own `-f` flag spelling (`win32` vs `elf32`, etc.).
fn nasm_format(target: Target) -> &'static str {
    match target {
        Target::Win32 => "win32",
        Target::Win64 => "win64",
        Target::Lin32 => "elf32",
        Target::Lin64 => "elf64",
    }
}

pub fn assemble_command(target: Target, asm_path: &Path, obj_path: &Path) -> Command {
    let mut cmd = Command::new("nasm");
    cmd.arg(format!("-f{}", nasm_format(target)))
        .arg(format!("-o{}", obj_path.display()))
        .arg(asm_path);
    cmd
}

pub fn link_command(target: Target, obj_path: &Path, out_path: &Path) -> Command {
    match target {
        Target::Win32 | Target::Win64 => {
            let machine = if target.is_64_bit() { "x64" } else { "x86" };
            let mut cmd = Command::new("link.exe");
            cmd.arg("/entry:_start")
                .arg("/subsystem:console")
                .arg(format!("/machine:{machine}"))
                .arg("/defaultlib:kernel32.lib")
                .arg(format!("/out:{}", out_path.display()))
                .arg(obj_path);
            cmd
        }
        Target::Lin32 | Target::Lin64 => {
            let elf = if target.is_64_bit() { "elf_x86_64" } else { "elf_i386" };
            let mut cmd = Command::new("ld");
            cmd.arg("-o").arg(out_path).arg(format!("-m{elf}")).arg(obj_path);
            cmd
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn args(cmd: &Command) -> Vec<&OsStr> {
        cmd.get_args().collect()
    }

    #[test]
    fn nasm_format_matches_target() {
        assert_eq!(nasm_format(Target::Win32), "win32");
        assert_eq!(nasm_format(Target::Lin32), "elf32");
        assert_eq!(nasm_format(Target::Lin64), "elf64");
    }

    #[test]
    fn assemble_command_shape() {
        let cmd = assemble_command(Target::Lin64, Path::new("a.asm"), Path::new("a.o"));
        assert_eq!(cmd.get_program(), "nasm");
        let a = args(&cmd);
        assert!(a.iter().any(|s| *s == "-felf64"));
        assert!(a.iter().any(|s| s.to_str().unwrap().starts_with("-oa.o")));
    }

    #[test]
    fn windows_link_uses_link_exe_with_machine_flag() {
        let cmd = link_command(Target::Win64, Path::new("a.obj"), Path::new("a.exe"));
        assert_eq!(cmd.get_program(), "link.exe");
        let a = args(&cmd);
        assert!(a.iter().any(|s| *s == "/machine:x64"));
        assert!(a.iter().any(|s| *s == "/entry:_start"));
    }

    #[test]
    fn linux_link_uses_ld_with_elf_variant() {
        let cmd = link_command(Target::Lin32, Path::new("a.o"), Path::new("a.out"));
        assert_eq!(cmd.get_program(), "ld");
        let a = args(&cmd);
        assert!(a.iter().any(|s| *s == "-melf_i386"));
    }
}
