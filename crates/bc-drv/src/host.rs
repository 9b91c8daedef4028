//! Host-target detection, used when `-f` isn't given on the command
//! line.
//!
//! Mirrors the reference driver's OS-plus-bitness derivation, restricted
//! to the two operating systems this compiler actually targets — an
//! unresolvable host (any OS other than Windows/Linux) is a hard error
//! here instead of a guess.

use bc_util::Target;

pub fn detect() -> Option<Target> {
    let is_64 = cfg!(target_pointer_width = "64");
    if cfg!(target_os = "windows") {
        Some(if is_64 { Target::Win64 } else { Target::Win32 })
    } else if cfg!(target_os = "linux") {
        Some(if is_64 { Target::Lin64 } else { Target::Lin32 })
    } else {
        None
    }
}
