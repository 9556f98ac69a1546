//! Unit tests for CLI commands

use crate::builtins::register_builtins;
use crate::cli::{describe_functions, render_functions, Cli, Commands, ListFormat};
use crate::function::{FunctionRegistry, HandlerKind};
use clap::Parser;

#[test]
fn test_serve_defaults() {
    let cli = Cli::try_parse_from(["brrtfn", "serve"]).unwrap();
    match cli.command {
        Commands::Serve {
            config,
            debug,
            base_path,
            ..
        } => {
            assert!(config.is_none());
            assert!(!debug);
            assert!(base_path.is_none());
        }
        _ => panic!("Expected Serve command"),
    }
}

#[test]
fn test_serve_with_flags() {
    let cli = Cli::try_parse_from([
        "brrtfn",
        "serve",
        "--addr",
        "127.0.0.1:9000",
        "--config",
        "brrtfn.yaml",
        "--debug",
        "--base-path",
        "/fn",
    ])
    .unwrap();

    match cli.command {
        Commands::Serve {
            addr,
            config,
            debug,
            base_path,
        } => {
            assert_eq!(addr.as_deref(), Some("127.0.0.1:9000"));
            assert_eq!(config.unwrap().to_string_lossy(), "brrtfn.yaml");
            assert!(debug);
            assert_eq!(base_path.as_deref(), Some("/fn"));
        }
        _ => panic!("Expected Serve command"),
    }
}

#[test]
fn test_functions_format() {
    let cli = Cli::try_parse_from(["brrtfn", "functions", "--format", "json"]).unwrap();
    match cli.command {
        Commands::Functions { format } => assert_eq!(format, ListFormat::Json),
        _ => panic!("Expected Functions command"),
    }
    assert!(Cli::try_parse_from(["brrtfn", "functions", "--format", "xml"]).is_err());
}

#[test]
fn test_describe_builtins_sorted() {
    let registry = FunctionRegistry::new();
    register_builtins(&registry);
    let functions = describe_functions(&registry);
    let names: Vec<&str> = functions.iter().map(|f| f.name.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);

    let sum = functions.iter().find(|f| f.name == "sum").unwrap();
    assert_eq!(sum.kind, HandlerKind::Transform);
    assert_eq!(sum.signature, "sequence<integer> -> future<integer>");
}

#[test]
fn test_render_table_and_json() {
    let registry = FunctionRegistry::new();
    register_builtins(&registry);
    let functions = describe_functions(&registry);

    let table = render_functions(&functions, ListFormat::Table).unwrap();
    assert!(table.starts_with("NAME"));
    assert!(table.lines().any(|l| l.starts_with("log") && l.contains("sink")));

    let json = render_functions(&functions, ListFormat::Json).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), functions.len());
    assert!(json.contains("\"kind\": \"source\""));
}
