//! Target machine formats and their register/word conventions.
//!
//! Grounded on `parse.py`'s `a()`/`b()`/`c()`/`d()`/`bp()`/`sp()`/
//! `sys_data()`/`sys_prefix()`/`low_byte()` accessor methods, which
//! switch on `self.options["f"]`. Collected here as a single indexed
//! table instead of six near-identical methods repeating the same
//! `win32, lin32` / `win64, lin64` split.

use std::fmt;
use std::str::FromStr;

/// One of the four assembly targets this compiler emits for. `Win*`
/// and `Lin*` share identical register/word conventions per bit width
/// — the only target-specific difference elsewhere is the calling
/// convention's symbol decoration, handled in `bc-par`/`bc-gen`, not
/// here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Win32,
    Win64,
    Lin32,
    Lin64,
}

impl Target {
    pub fn word_size(self) -> u32 {
        match self {
            Target::Win32 | Target::Lin32 => 4,
            Target::Win64 | Target::Lin64 => 8,
        }
    }

    pub fn is_64_bit(self) -> bool {
        self.word_size() == 8
    }

    /// NASM `bits` directive value for this target.
    pub fn bits(self) -> u32 {
        if self.is_64_bit() {
            64
        } else {
            32
        }
    }

    pub fn reg_a(self) -> &'static str {
        if self.is_64_bit() { "rax" } else { "eax" }
    }
    pub fn reg_b(self) -> &'static str {
        if self.is_64_bit() { "rbx" } else { "ebx" }
    }
    pub fn reg_c(self) -> &'static str {
        if self.is_64_bit() { "rcx" } else { "ecx" }
    }
    pub fn reg_d(self) -> &'static str {
        if self.is_64_bit() { "rdx" } else { "edx" }
    }
    pub fn reg_bp(self) -> &'static str {
        if self.is_64_bit() { "rbp" } else { "ebp" }
    }
    pub fn reg_sp(self) -> &'static str {
        if self.is_64_bit() { "rsp" } else { "esp" }
    }

    /// The NASM data-declaration directive for one machine word
    /// (`dd`/`dq`).
    pub fn sys_data(self) -> &'static str {
        if self.is_64_bit() { "dq" } else { "dd" }
    }

    /// The NASM size-override keyword for one machine word
    /// (`dword`/`qword`), used whenever an operand's size can't be
    /// inferred from a register operand alone.
    pub fn sys_prefix(self) -> &'static str {
        if self.is_64_bit() { "qword" } else { "dword" }
    }

    /// The 8-bit sub-register name for one of the four general-purpose
    /// registers this target uses, for instructions that need an r8
    /// operand.
    pub fn low_byte(self, reg: &str) -> Option<&'static str> {
        if reg == self.reg_a() {
            Some("al")
        } else if reg == self.reg_b() {
            Some("bl")
        } else if reg == self.reg_c() {
            Some("cl")
        } else if reg == self.reg_d() {
            Some("dl")
        } else {
            None
        }
    }

    pub fn is_windows(self) -> bool {
        matches!(self, Target::Win32 | Target::Win64)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Target::Win32 => "win32",
            Target::Win64 => "win64",
            Target::Lin32 => "lin32",
            Target::Lin64 => "lin64",
        };
        f.write_str(s)
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win32" => Ok(Target::Win32),
            "win64" => Ok(Target::Win64),
            "lin32" => Ok(Target::Lin32),
            "lin64" => Ok(Target::Lin64),
            other => Err(format!("unrecognized target format '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_size_matches_bit_width() {
        assert_eq!(Target::Win32.word_size(), 4);
        assert_eq!(Target::Lin64.word_size(), 8);
    }

    #[test]
    fn register_names_follow_bit_width_not_os() {
        assert_eq!(Target::Win64.reg_a(), Target::Lin64.reg_a());
        assert_ne!(Target::Win32.reg_a(), Target::Win64.reg_a());
    }

    #[test]
    fn low_byte_resolves_known_registers_only() {
        assert_eq!(Target::Win32.low_byte("eax"), Some("al"));
        assert_eq!(Target::Win32.low_byte("esi"), None);
    }

    #[test]
    fn parses_from_cli_flag_spelling() {
        assert_eq!("lin64".parse::<Target>().unwrap(), Target::Lin64);
        assert!("macos".parse::<Target>().is_err());
    }
}
