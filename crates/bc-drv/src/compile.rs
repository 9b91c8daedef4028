//! The pure lex → parse → emit pipeline, kept free of any filesystem
//! or process I/O so it can be exercised directly in tests without
//! shelling out to `nasm`/`ld`.

use bc_gen::Emitter;
use bc_lex::{LexError, Lexer};
use bc_par::{ParseError, Parser};
use bc_util::{SourceMap, Stage, StageDiagnostic, Target};

/// Either stage's failure, unified so the driver can render and exit
/// with one code path regardless of which stage raised it. The RPN
/// stage doesn't get its own variant here — `ParseError::Rpn` already
/// carries its own `Stage::Rpn` tag through [`StageDiagnostic`].
#[derive(Debug)]
pub enum StageFailure {
    Lex(LexError),
    Parse(ParseError),
}

impl StageFailure {
    pub fn as_diagnostic(&self) -> &dyn StageDiagnostic {
        match self {
            StageFailure::Lex(e) => e,
            StageFailure::Parse(e) => e,
        }
    }

    pub fn stage(&self) -> Stage {
        self.as_diagnostic().stage()
    }

    pub fn code(&self) -> i32 {
        self.as_diagnostic().code()
    }
}

/// Runs the scanner, the parser/codegen, and the emitter over one
/// already-concatenated source buffer, returning the final NASM text.
pub fn compile_to_asm(sources: &SourceMap, target: Target) -> Result<String, StageFailure> {
    let tokens = Lexer::new(sources.content()).tokenize().map_err(StageFailure::Lex)?;
    let unit = Parser::new(tokens, target).parse().map_err(StageFailure::Parse)?;

    let mut prototypes: Vec<String> = Vec::new();
    let mut globals: Vec<String> = Vec::new();
    for record in unit.funcs.values() {
        if record.prototype {
            prototypes.push(record.tname.clone());
        } else {
            globals.push(record.tname.clone());
        }
    }

    Ok(Emitter::new(unit.segments).finish(&prototypes, &globals))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asm_for(src: &str, target: Target) -> String {
        let sources = SourceMap::new(src.to_string());
        compile_to_asm(&sources, target).expect("expected source to compile")
    }

    #[test]
    fn s1_minimal_function_shape() {
        let asm = asm_for("main() { return(0); }", Target::Win32);
        assert!(asm.contains("_main:"));
        assert!(asm.contains("push ebp"));
        assert!(asm.contains("mov ebp, esp"));
        assert!(asm.contains("xor eax, eax"));
        assert!(asm.contains("jmp .L0"));
        assert!(asm.contains(".L0:"));
        assert!(asm.contains("mov esp, ebp"));
        assert!(asm.contains("pop ebp"));
        assert!(asm.contains("ret"));
        assert!(asm.contains("global _main"));
    }

    #[test]
    fn bits_directive_is_always_32_even_for_64_bit_targets() {
        // The reference compiler hardcodes `bits 32` regardless of
        // `-f`, even though registers/word size still follow the
        // target — a 64-bit build emits `bits 32` alongside `rax`.
        let asm = asm_for("main() { return(0); }", Target::Lin64);
        assert!(asm.starts_with("bits 32"));
        assert!(asm.contains("rax"));
    }

    #[test]
    fn s2_auto_scalar_assignment() {
        let asm = asm_for("main() { auto x; x = 5; }", Target::Win32);
        assert_eq!(asm.matches("sub esp, 4").count(), 1);
        assert!(asm.contains("mov dword [ebp-4], 5"));
    }

    #[test]
    fn s3_auto_vector_allocation() {
        let asm = asm_for("main() { auto v[3]; }", Target::Win32);
        assert!(asm.contains("lea eax, [ebp-12]"));
        assert!(asm.contains("mov [ebp-16], eax"));
        assert!(asm.contains("sub esp, 16"));
    }

    #[test]
    fn s4_while_loop_has_one_compare_and_back_edge() {
        let asm = asm_for(
            "main() { auto i; i = 0; while (i < 10) { i = i + 1; } }",
            Target::Win32,
        );
        assert_eq!(asm.matches("cmp").count(), 1);
        assert_eq!(asm.matches("jmp .L").count(), 1); // loop back-edge
        assert_eq!(asm.matches("je .L").count(), 1); // skip-body branch
    }

    #[test]
    fn s5_stdcall_extern_no_caller_cleanup() {
        let src = "stdcall putchar(c); main() { putchar(65); }";
        let asm = asm_for(src, Target::Win32);
        assert!(asm.contains("extern _putchar@4"));
        assert!(asm.contains("call _putchar@4"));
        assert!(!asm.contains("add esp"));
    }

    #[test]
    fn s6_mixed_calling_conventions() {
        let src = "stdcall f(a, b); main() { f(1, 2); }";
        let asm = asm_for(src, Target::Win32);
        assert!(asm.contains("call _f@8"));
        assert!(!asm.contains("add esp"));
    }

    #[test]
    fn lex_error_surfaces_lexer_stage() {
        let sources = SourceMap::new("main() { /* never closes".to_string());
        let err = compile_to_asm(&sources, Target::Win32).unwrap_err();
        assert_eq!(err.stage(), Stage::Lexer);
    }

    #[test]
    fn goto_is_unimplemented() {
        let sources = SourceMap::new("main() { goto l; }".to_string());
        let err = compile_to_asm(&sources, Target::Win32).unwrap_err();
        assert_eq!(err.code(), 500);
    }
}
