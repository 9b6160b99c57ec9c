//! Command-line tool for reading, checking, editing and transcoding
//! OpenFOAM-style dictionary files.
//!
//! Usage: foamdict [OPTIONS] [FILE]
//!
//! Options:
//!   -t, --to <FORMAT>         Output format (foam, yaml, toml)
//!   -w, --write               Write output next to the input (or over it for foam)
//!   -o, --output <FILE>       Write output to specified file
//!   --check                   Check if file parses (exit 0 if valid, 1 if invalid)
//!   --get <PATH>              Print one entry, e.g. `boundaryField/inlet/value`
//!   --set <PATH> <VALUE>      Replace one entry in FILE (keeps a backup)
//!   --test                    With --set, print the result instead of writing
//!   --expand                  Expand #include and $name
//!   --unparsed <N>            Keep lists of N or more items as raw text
//!   --no-header               Input has no FoamFile header
//!   --list                    Input is a bare list
//!   --boundary                Input is a polyMesh boundary file
//!   --debug                   Trace tokens and include resolution
//!   -h, --help                Print help
//!   -V, --version             Print version

use libfoam::{encode_file, encode_value, parse_value, parse_with_filename, ParameterFile, ParseOptions};
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

mod transcode;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Format {
    Foam,
    Yaml,
    Toml,
}

fn parse_format(s: &str) -> Option<Format> {
    match s {
        "foam" | "openfoam" => Some(Format::Foam),
        "yaml" | "yml" => Some(Format::Yaml),
        "toml" => Some(Format::Toml),
        _ => None,
    }
}

fn format_extension(format: Format) -> Option<&'static str> {
    match format {
        Format::Foam => None,
        Format::Yaml => Some("yaml"),
        Format::Toml => Some("toml"),
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut to_format = Format::Foam;
    let mut write_back = false;
    let mut output_file: Option<&str> = None;
    let mut check_only = false;
    let mut get_path: Option<&str> = None;
    let mut set_entry: Option<(&str, &str)> = None;
    let mut test_only = false;
    let mut debug = false;
    let mut input_path: Option<&str> = None;
    let mut options = ParseOptions::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "-V" | "--version" => {
                println!("foamdict {}", env!("CARGO_PKG_VERSION"));
                return;
            }
            "-t" | "--to" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: -t requires a format argument");
                    process::exit(1);
                }
                to_format = match parse_format(&args[i]) {
                    Some(f) => f,
                    None => {
                        eprintln!("Error: Unknown format: {}", args[i]);
                        process::exit(1);
                    }
                };
            }
            "-w" | "--write" => {
                write_back = true;
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --output requires an argument");
                    process::exit(1);
                }
                output_file = Some(&args[i]);
            }
            "--check" => {
                check_only = true;
            }
            "--get" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --get requires a path argument");
                    process::exit(1);
                }
                get_path = Some(&args[i]);
            }
            "--set" => {
                if i + 2 >= args.len() {
                    eprintln!("Error: --set requires a path and a value");
                    process::exit(1);
                }
                set_entry = Some((args[i + 1].as_str(), args[i + 2].as_str()));
                i += 2;
            }
            "--test" => {
                test_only = true;
            }
            "--expand" => {
                options = options.with_macro_expansion(true);
            }
            "--unparsed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --unparsed requires a length argument");
                    process::exit(1);
                }
                match args[i].parse::<usize>() {
                    Ok(n) => options = options.with_list_length_unparsed(n),
                    Err(_) => {
                        eprintln!("Error: --unparsed expects a number, got {}", args[i]);
                        process::exit(1);
                    }
                }
            }
            "--no-header" => {
                options = options.with_no_header();
            }
            "--list" => {
                options = options.with_list_dict();
            }
            "--boundary" => {
                options = options.with_boundary_dict();
            }
            "--debug" => {
                debug = true;
                options = options.with_debug(true);
            }
            "-" => {
                // Explicit stdin
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                process::exit(1);
            }
            _ => {
                if input_path.is_some() {
                    eprintln!("Error: Only one input file may be given");
                    process::exit(1);
                }
                input_path = Some(&args[i]);
            }
        }
        i += 1;
    }

    init_tracing(debug);

    if let Err(e) = options.start_mode() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if output_file.is_some() && write_back {
        eprintln!("Error: --output and --write are mutually exclusive");
        process::exit(1);
    }

    if let Some((path, value)) = set_entry {
        let input = match input_path {
            Some(p) => p,
            None => {
                eprintln!("Error: --set requires an input file");
                process::exit(1);
            }
        };
        process::exit(set_value(input, path, value, options, test_only));
    }

    let input = match input_path {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {}", path, e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading stdin: {}", e);
                process::exit(1);
            }
            buffer
        }
    };

    let code = process_input(
        &input,
        input_path,
        &options,
        to_format,
        output_file,
        write_back,
        check_only,
        get_path,
    );
    process::exit(code);
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[allow(clippy::too_many_arguments)]
fn process_input(
    input: &str,
    input_file: Option<&str>,
    options: &ParseOptions,
    output_format: Format,
    output_file: Option<&str>,
    write_back: bool,
    check_only: bool,
    get_path: Option<&str>,
) -> i32 {
    let parsed = match parse_with_filename(input, input_file, options) {
        Ok(parsed) => parsed,
        Err(e) => {
            if let Some(path) = input_file {
                eprintln!("{}: {}", path, e);
            } else {
                eprintln!("Parse error: {}", e);
            }
            return 1;
        }
    };

    if check_only {
        match input_file {
            Some(path) => println!("{}: ok", path),
            None => println!("ok"),
        }
        return 0;
    }

    if let Some(path) = get_path {
        let segments = split_path(path);
        let value = match parsed.body.get_path(&segments) {
            Some(v) => v,
            None => {
                eprintln!("Error: No entry at {}", path);
                return 1;
            }
        };
        return match encode_value(value, 0) {
            Ok(text) => {
                println!("{}", text);
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        };
    }

    let header = parsed.header.as_ref();
    let output = match output_format {
        Format::Foam => encode_file(header, &parsed.body).map_err(|e| e.to_string()),
        Format::Yaml => transcode::yaml::encode(header, &parsed.body)
            .map_err(|e| format!("Cannot convert to YAML: {}", e)),
        Format::Toml => transcode::toml::encode(header, &parsed.body)
            .map_err(|e| format!("Cannot convert to TOML: {}", e)),
    };
    match output {
        Ok(text) => {
            write_text_output(&text, output_file, write_back, input_file, output_format);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn set_value(input_file: &str, path: &str, value_text: &str, options: ParseOptions, test_only: bool) -> i32 {
    let segments = split_path(path);
    let (last, parents) = match segments.split_last() {
        Some(split) => split,
        None => {
            eprintln!("Error: --set requires a non-empty path");
            return 1;
        }
    };
    let value = match parse_value(value_text) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: Bad value {:?}: {}", value_text, e);
            return 1;
        }
    };

    let mut file = match ParameterFile::builder(input_file)
        .options(options)
        .backup(!test_only)
        .open()
    {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{}: {}", input_file, e);
            return 1;
        }
    };

    let parent = match file.body_mut().get_path_mut(parents).and_then(|v| v.as_dict_mut()) {
        Some(dict) => dict,
        None => {
            eprintln!("Error: No dictionary at {}", parents.join("/"));
            return 1;
        }
    };
    tracing::debug!(path, "setting entry");
    parent.insert(*last, value);

    if test_only {
        return match file.to_foam_string() {
            Ok(text) => {
                print!("{}", text);
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        };
    }
    match file.write_file() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn write_text_output(
    output: &str,
    output_file: Option<&str>,
    write_back: bool,
    input_file: Option<&str>,
    format: Format,
) {
    if let Some(path) = output_file {
        if let Err(e) = fs::write(path, output) {
            eprintln!("Error writing {}: {}", path, e);
            process::exit(1);
        }
    } else if write_back {
        if let Some(input_path) = input_file {
            let output_path = match format_extension(format) {
                Some(ext) => Path::new(input_path).with_extension(ext),
                None => Path::new(input_path).to_path_buf(),
            };
            if let Err(e) = fs::write(&output_path, output) {
                eprintln!("Error writing {}: {}", output_path.display(), e);
                process::exit(1);
            }
        } else {
            eprintln!("Error: --write requires an input file");
            process::exit(1);
        }
    } else {
        print!("{}", output);
        if !output.ends_with('\n') {
            println!();
        }
    }
}

fn print_help() {
    println!(
        "foamdict - OpenFOAM dictionary tool

USAGE:
    foamdict [OPTIONS] [FILE]

ARGS:
    [FILE]    Input file (reads from stdin if not provided or '-')

OPTIONS:
    -t, --to <FORMAT>      Output format [default: foam]
                           Supported: foam, yaml, toml

    -w, --write            Write output next to the input file. For foam
                           output the input is reformatted in place; yaml
                           and toml output replaces the extension.

    -o, --output <FILE>    Write output to specified file

    --check                Check if input parses (exit 0 if valid, 1 if invalid)

    --get <PATH>           Print the entry at PATH, segments separated by '/'.
                           Numeric segments index into lists.

    --set <PATH> <VALUE>   Replace the entry at PATH in FILE with VALUE.
                           The original is kept as FILE.backup.

    --test                 With --set, print the result instead of writing

    --expand               Expand #include directives and $name substitutions

    --unparsed <N>         Keep length-prefixed lists of N or more items as
                           raw text

    --no-header            Input has no FoamFile header
    --list                 Input is a bare list
    --boundary             Input is a polyMesh boundary file (header + list)

    --debug                Trace tokens and include resolution on stderr
                           (RUST_LOG overrides the level)

    -h, --help             Print help

    -V, --version          Print version

EXAMPLES:
    # Reformat a dictionary to canonical text
    foamdict system/controlDict

    # Validate a file
    foamdict --check constant/transportProperties

    # Print one entry
    foamdict --get boundaryField/inlet/value 0/U

    # Change one entry, keeping a backup
    foamdict --set endTime 2000 system/controlDict

    # Preview a change without writing
    foamdict --test --set solvers/p/tolerance 1e-07 system/fvSolution

    # Convert to YAML with includes expanded
    foamdict --expand -t yaml system/fvSchemes

    # Convert a large field file without parsing its values
    foamdict --unparsed 1000 -t toml 0/p
"
    );
}
