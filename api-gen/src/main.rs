use std::path::PathBuf;
use std::process;

use api_gen::error::ApiError;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let (manifest, compact) = match parse_args(&args) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("error: {msg}");
            eprintln!();
            eprintln!("Usage: modelet-api-gen <manifest.json> [--compact]");
            eprintln!();
            eprintln!("Arguments:");
            eprintln!("  <manifest.json>  Signature manifest of an exported model bundle");
            eprintln!();
            eprintln!("Options:");
            eprintln!("  --compact        Emit single-line JSON instead of pretty-printed");
            process::exit(2);
        }
    };

    if let Err(e) = run(&manifest, compact) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<(PathBuf, bool), String> {
    let mut manifest: Option<PathBuf> = None;
    let mut compact = false;

    let mut i = 1; // skip argv[0]
    while i < args.len() {
        match args[i].as_str() {
            "--compact" => compact = true,
            "--help" | "-h" => return Err("".to_string()),
            arg if arg.starts_with('-') => return Err(format!("unknown flag: {arg}")),
            arg => {
                if manifest.is_some() {
                    return Err(format!("unexpected argument: {arg}"));
                }
                manifest = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }

    let manifest = manifest.ok_or("missing required argument: <manifest.json>")?;
    Ok((manifest, compact))
}

fn run(manifest: &std::path::Path, compact: bool) -> Result<(), ApiError> {
    let signatures = api_gen::manifest::load_signatures(manifest)?;
    let description = api_gen::schema::generate_api_description(&signatures)?;

    let json = if compact {
        serde_json::to_string(&description)
    } else {
        serde_json::to_string_pretty(&description)
    }
    .map_err(|e| ApiError::Other(format!("JSON serialization failed: {e}")))?;

    println!("{json}");

    Ok(())
}
