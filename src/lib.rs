//! Compiles human-written infix arithmetic expressions into flat prefix
//! (Polish notation) token streams suitable for stack-based evaluation.

pub mod compiler;
