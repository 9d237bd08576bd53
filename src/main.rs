use anyhow::{Context, Result};
use clap::Parser;
use prefix_compiler::compiler::evaluator::evaluate;
use prefix_compiler::compiler::operator::Catalogue;
use prefix_compiler::compiler::parser::Parser as ExpressionParser;
use std::collections::HashMap;

/// Compiles the given infix expression to prefix notation
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Arguments {
    /// The infix expression to compile
    expression: String,

    /// Variable bindings as name=value pairs, used with --eval
    #[clap(short, long)]
    var: Vec<String>,

    /// Also evaluate the compiled expression
    #[clap(short, long)]
    eval: bool,
}

fn main() -> Result<()> {
    let args = Arguments::parse();

    let catalogue = Catalogue::standard();
    let parser = ExpressionParser::new(&catalogue);
    let stream = parser.parse(&args.expression)?;
    println!("{}", stream.export(&catalogue)?);

    if args.eval {
        let mut bindings = HashMap::new();
        for binding in &args.var {
            let (name, value) = parse_binding(&parser, binding)?;
            bindings.insert(name, value);
        }
        println!("{}", evaluate(&stream, &catalogue, &bindings)?);
    }

    Ok(())
}

fn parse_binding(parser: &ExpressionParser<'_>, binding: &str) -> Result<(String, f64)> {
    let (name, value) = binding
        .split_once('=')
        .with_context(|| format!("Binding `{binding}` is not in name=value form"))?;
    let name = parser.parse_variable(name)?;
    let value = value
        .trim()
        .parse()
        .with_context(|| format!("Binding `{binding}` has a non-numeric value"))?;
    Ok((name, value))
}
