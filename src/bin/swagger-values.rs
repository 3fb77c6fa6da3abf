use std::{env, fs, path::Path, process::ExitCode};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value as JsonValue;
use tracing_subscriber::EnvFilter;

use swagger_values::{JsonSchema, SchemaNode, Value, ValueError};

#[derive(Debug, Default)]
struct ValueOptions {
    path: String,
    json_input: bool,
    pretty: bool,
}

#[derive(Debug)]
struct SampleOptions {
    count: usize,
    seed: Option<u64>,
    pretty: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    if args.len() < 3 {
        return Err("not enough arguments".to_string());
    }

    let command = args[1].as_str();
    let schema = load_schema(Path::new(&args[2])).map_err(describe)?;

    match command {
        "parse" => {
            let raw = args
                .get(3)
                .ok_or_else(|| "parse requires a raw value".to_string())?;
            let options = parse_value_options(&args[4..], true)?;
            let input = if options.json_input {
                let decoded: JsonValue = serde_json::from_str(raw)
                    .map_err(|e| describe(ValueError::from(e)))?;
                Value::from(decoded)
            } else {
                Value::String(raw.clone())
            };
            let parsed = JsonSchema::new(&schema)
                .parse(Some(input), &options.path)
                .map_err(describe)?;
            print_value(parsed, options.pretty)
        }
        "serialize" => {
            let file = args
                .get(3)
                .ok_or_else(|| "serialize requires a value file".to_string())?;
            let options = parse_value_options(&args[4..], false)?;
            let text = fs::read_to_string(file).map_err(|e| describe(ValueError::from(e)))?;
            let decoded: JsonValue =
                serde_json::from_str(&text).map_err(|e| describe(ValueError::from(e)))?;
            let serialized = JsonSchema::new(&schema).serialize(Some(decoded.into()), &options.path);
            print_value(serialized, options.pretty)
        }
        "sample" => {
            let options = parse_sample_options(&args[3..])?;
            let engine = JsonSchema::new(&schema);
            let mut rng = match options.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            for _ in 0..options.count {
                print_value(Some(engine.sample_with(&mut rng)), options.pretty)?;
            }
            Ok(())
        }
        _ => Err(format!("unknown command '{command}'")),
    }
}

fn load_schema(file: &Path) -> Result<SchemaNode, ValueError> {
    let text = fs::read_to_string(file)?;
    let raw: JsonValue = serde_json::from_str(&text)?;
    SchemaNode::from_json(&raw)
}

fn describe(err: ValueError) -> String {
    format!("error ({}): {err}", err.status())
}

fn print_value(value: Option<Value>, pretty: bool) -> Result<(), String> {
    let json = value.as_ref().map(Value::to_json).unwrap_or(JsonValue::Null);
    let text = if pretty {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    }
    .map_err(|e| describe(ValueError::from(e)))?;
    println!("{text}");
    Ok(())
}

/// Options shared by `parse` and `serialize`; only `parse` takes `--json`.
fn parse_value_options(args: &[String], allow_json: bool) -> Result<ValueOptions, String> {
    let mut options = ValueOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--pretty" => {
                options.pretty = true;
                i += 1;
            }
            "--json" if allow_json => {
                options.json_input = true;
                i += 1;
            }
            "--path" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| "missing value for --path".to_string())?;
                options.path = value.clone();
                i += 2;
            }
            other => return Err(format!("unknown option '{other}'")),
        }
    }

    Ok(options)
}

fn parse_sample_options(args: &[String]) -> Result<SampleOptions, String> {
    let mut options = SampleOptions {
        count: 1,
        seed: None,
        pretty: false,
    };
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--pretty" => {
                options.pretty = true;
                i += 1;
            }
            "--count" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| "missing value for --count".to_string())?;
                options.count = value
                    .parse()
                    .map_err(|_| format!("invalid --count '{value}'"))?;
                i += 2;
            }
            "--seed" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| "missing value for --seed".to_string())?;
                options.seed = Some(
                    value
                        .parse()
                        .map_err(|_| format!("invalid --seed '{value}'"))?,
                );
                i += 2;
            }
            other => return Err(format!("unknown option '{other}'")),
        }
    }

    Ok(options)
}

fn print_usage() {
    eprintln!("usage:");
    eprintln!("  swagger-values parse <schema.json> <raw-value> [--json] [--path NAME] [--pretty]");
    eprintln!("  swagger-values serialize <schema.json> <value.json> [--path NAME] [--pretty]");
    eprintln!("  swagger-values sample <schema.json> [--count N] [--seed N] [--pretty]");
    eprintln!();
    eprintln!("parse options:");
    eprintln!("  --json                 decode the raw value as JSON instead of treating it as text");
    eprintln!("  --path NAME            property name used in error messages");
    eprintln!();
    eprintln!("note: set RUST_LOG=debug to trace value resolution on stderr.");
}

#[cfg(test)]
mod tests {
    use super::{parse_sample_options, parse_value_options};

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn json_flag_is_only_accepted_for_parse() {
        let options = parse_value_options(&args(&["--json", "--path", "pet"]), true).unwrap();
        assert!(options.json_input);
        assert_eq!(options.path, "pet");

        let err = parse_value_options(&args(&["--json"]), false).unwrap_err();
        assert_eq!(err, "unknown option '--json'");
    }

    #[test]
    fn sample_options_require_numeric_values() {
        let options = parse_sample_options(&args(&["--count", "3", "--seed", "9"])).unwrap();
        assert_eq!(options.count, 3);
        assert_eq!(options.seed, Some(9));

        let err = parse_sample_options(&args(&["--count", "many"])).unwrap_err();
        assert!(err.contains("invalid --count"));
        assert!(parse_sample_options(&args(&["--seed"])).is_err());
    }
}
