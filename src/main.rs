// Macroscript: parse and inspect automation macros

use std::fs;
use std::path::Path;

use tracing_subscriber::EnvFilter;

use macroscript::macros::list_macros;
use macroscript::parser::parser::Parser;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command-line arguments
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("macroscript");

    if args.len() < 2 {
        eprintln!("Error: No input provided");
        eprintln!();
        eprintln!("Usage: {} <file.macro | macro-dir>", program_name);
        eprintln!();
        eprintln!("Examples:");
        eprintln!(
            "  {} demos/default.macro   # Print the parse tree of a macro",
            program_name
        );
        eprintln!(
            "  {} demos                 # List the macros in a directory",
            program_name
        );
        std::process::exit(1);
    }

    let target = Path::new(&args[1]);

    if !target.exists() {
        eprintln!("Error: '{}' not found", target.display());
        eprintln!("Usage: {} <file.macro | macro-dir>", program_name);
        std::process::exit(1);
    }

    if target.is_dir() {
        for name in list_macros(target) {
            println!("{}", name);
        }
        return Ok(());
    }

    // Read and parse the macro
    let source = fs::read_to_string(target)?;
    eprintln!("Parsing {}...", target.display());

    let mut parser = Parser::new(&source);
    let ast = match parser.parse() {
        Ok(ast) => ast,
        Err(e) => {
            eprintln!("Parser error: {}", e);
            std::process::exit(1);
        }
    };

    eprintln!(
        "Parsed successfully. Found {} top-level statements.",
        ast.root().children.len()
    );
    print!("{}", ast);

    Ok(())
}
