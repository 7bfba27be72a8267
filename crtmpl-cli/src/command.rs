/// This module defines the command-line interface for the CLI.
/// It is separated into its own file because it is used both by the main
/// application and by build.rs to generate the man page.
use std::path::PathBuf;

use clap::{arg, command, value_parser, ArgAction, Command};

const ADVANCED: &str = "Advanced";
const BEHAVIOR: &str = "Template Behavior";

/// Supported formats
pub static SUPPORTED_FORMATS: &[(&str, &str, &[&str])] = &[
    ("json", "JSON", &["json"]),
    #[cfg(feature = "toml")]
    ("toml", "TOML", &["toml"]),
    #[cfg(feature = "yaml")]
    ("yaml", "YAML", &["yaml", "yml"]),
];

fn format_formats(s: &str) -> String {
    use std::fmt::Write;
    let mut formats = String::new();

    for (fmt, title, exts) in SUPPORTED_FORMATS.iter() {
        write!(formats, "- {} ({}): ", fmt, title).ok();
        for (idx, ext) in exts.iter().enumerate() {
            if idx > 0 {
                formats.push_str(", ");
            }
            formats.push_str("*.");
            formats.push_str(ext);
        }
        formats.push('\n');
    }

    s.replace("###FORMATS###", &formats)
}

pub(super) fn make_command() -> Command {
    command!()
        .max_term_width(120)
        .args([
            #[cfg(feature = "toml")]
            arg!(--"config-file" <PATH> "Alternative path to the config file")
                .value_parser(value_parser!(PathBuf))
                .long_help("\
                    Sets an alternative path to the config file.  By default the config file \
                    is loaded from $HOME/.crtmpl.toml if it exists.\n\n\
                    \
                    To see the possible config values use --print-config which will print the \
                    current state of the config.\n\n\
                    [env var: CRTMPL_CONFIG_FILE]"),
            arg!(-f --format <FORMAT> "The format of the input data")
                .long_help(format_formats("\
                    Sets the format of the input data.\n\n\
                    \
                    The following formats are supported (and the default detected file extensions):\n\n\
                    - auto\n\
                    ###FORMATS###\n\
                    Auto detection (auto) is unavailable when stdin is used as input format.\n\n\
                    \
                    [env var: CRTMPL_FORMAT]"))
                .value_parser([
                    "auto",
                    "json",
                    #[cfg(feature = "toml")]
                    "toml",
                    #[cfg(feature = "yaml")]
                    "yaml",
                ]),
            arg!(-D --define <EXPR> "Defines an input variable (key=value / key:=json_value)")
                .long_help("\
                    This defines an input variable for the template.  This is used in addition \
                    to the input data file and takes precedence over it.  It supports three forms: \
                    key defines a single bool, key=value defines a string value, key:=json_value \
                    defines a JSON/YAML value.  It can be supplied multiple times to set more than \
                    one value.\n\n\
                    \
                    Examples:\n\
                    -D color=#ffc       defines a basic string\n\
                    -D width:=400       defines an integer\n\
                    -D is_draft         shortform to define true boolean")
                .action(ArgAction::Append),
            arg!(-n --"no-newline" "Do not output a trailing newline")
                .long_help("\
                    Do not output a trailing newline after rendering.\n\n\
                    \
                    [env var: CRTMPL_NEWLINE]")
                .help_heading(BEHAVIOR),
            arg!(--select <SELECTOR> "Select a subset of the input data")
                .long_help("\
                    Select a subset of the input data with a dotted path.\n\n\
                    \
                    By default the input file is fed directly as bindings.  With --select=context \
                    the keys below 'context' become the bindings instead.  Numeric segments index \
                    into arrays (eg: --select=reviews.0)."),
            arg!(-o --output <FILENAME> "Path to the output file")
                .long_help("\
                    Path to the output file instead of stdout.\n\n\
                    \
                    Files are written atomically.  This means that if rendering fails the original \
                    file remains.")
                .default_value("-")
                .value_parser(value_parser!(PathBuf)),
            arg!(--dump <KIND> "Dump internals of a template")
                .long_help("\
                    Dump internals of a template to stdout.\n\n\
                    \
                    'tokens' prints a line per token of the template after lexing, 'tree' prints \
                    the parsed node tree.")
                .value_parser(["tokens", "tree"])
                .help_heading(ADVANCED),
            arg!(--"print-config" "Print out the loaded config")
                .help_heading(ADVANCED),
            arg!(template_file: [TEMPLATE_FILE] "Path to the input template")
                .long_help("\
                    This is the path to the input template.  If not provided this defaults \
                    to '-' which means the template is loaded from stdin.")
                .default_value("-"),
            arg!(data_file: [DATA_FILE] "Path to the data file")
                .long_help("\
                    Path to the data file in the given format.\n\n\
                    \
                    The data file supplies the bindings of the template and must contain an \
                    object at the top (or at the --select path).  When data is read from stdin \
                    (by using '-' as file name), --format must be specified as auto detection is \
                    based on file extensions.")
                .value_parser(value_parser!(PathBuf)),
        ])
        .about("Renders a code-review overlay template with the given data to stdout.")
}
