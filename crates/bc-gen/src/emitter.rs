//! Final assembly assembly: stitches the `bits` directive, `extern`/
//! `global` symbol lines, and the three segment buffers into one NASM
//! source string.
//!
//! Grounded on the tail of `parse.py`'s `parser()` method (the
//! `self.outp.append(...)` block after the statement loop exits).

use crate::segments::Segments;

pub struct Emitter {
    segments: Segments,
}

impl Emitter {
    pub fn new(segments: Segments) -> Self {
        Self { segments }
    }

    /// `prototypes` are the true (decorated) symbol names of functions
    /// declared but not defined in this translation unit; `globals`
    /// are the true names of functions defined here. Order within each
    /// slice is preserved in the output.
    ///
    /// The `bits` directive is always `"bits 32"`, independent of the
    /// target: `parse.py`'s `Parser.__init__` hardcodes `self.outp =
    /// ["bits 32", ""]` unconditionally, even though the rest of the
    /// compiler parametrizes registers and word size by target — a
    /// 64-bit build emits `bits 32` alongside `rax`/`rbp`. Preserved
    /// as-is rather than corrected to match the target's actual width.
    pub fn finish(self, prototypes: &[String], globals: &[String]) -> String {
        let mut out = Vec::new();
        out.push("bits 32".to_string());
        out.push(String::new());

        for name in prototypes {
            out.push(format!("extern {name}"));
        }
        out.push(String::new());

        for name in globals {
            out.push(format!("global {name}"));
        }
        out.push(String::new());

        for (header, lines) in [
            (".text", self.segments.text()),
            (".data", self.segments.data()),
            (".bss", self.segments.bss()),
        ] {
            out.push(format!("segment {header}"));
            out.push(String::new());
            out.extend(lines.iter().cloned());
        }

        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::Segment;

    #[test]
    fn finish_orders_sections_text_data_bss() {
        let mut segs = Segments::new();
        segs.push(Segment::Text, "mov eax, 1");
        segs.push(Segment::Data, "_x: dd 0");
        segs.push(Segment::Bss, "_y: resd 1");
        let out = Emitter::new(segs).finish(&["_proto".to_string()], &["_main".to_string()]);
        assert!(out.starts_with("bits 32"));
        let text_pos = out.find("segment .text").unwrap();
        let data_pos = out.find("segment .data").unwrap();
        let bss_pos = out.find("segment .bss").unwrap();
        assert!(text_pos < data_pos && data_pos < bss_pos);
        assert!(out.contains("extern _proto"));
        assert!(out.contains("global _main"));
    }
}
