use std::io::Write;
use std::path::{Path, PathBuf};
use std::{fs, io};

use anyhow::{bail, Context, Error};
use clap::ArgMatches;
use crtmpl::machinery::tokenize;
use crtmpl::{Error as TError, Template};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::output::{Output, STDIN_STDOUT};

mod command;
mod config;
mod output;

fn read_input(path: &Path, what: &str) -> Result<(String, bool), Error> {
    if path == Path::new(STDIN_STDOUT) {
        Ok((
            io::read_to_string(io::stdin())
                .with_context(|| format!("unable to read {} from stdin", what))?,
            true,
        ))
    } else {
        Ok((
            fs::read_to_string(path)
                .with_context(|| format!("unable to read {} file '{}'", what, path.display()))?,
            false,
        ))
    }
}

fn detect_format<'a>(format: &'a str, path: &Path, stdin_used: bool) -> Result<&'a str, Error> {
    if format != "auto" {
        return Ok(format);
    }
    if stdin_used {
        bail!("auto detection does not work with data from stdin");
    }
    Ok(match path.extension().and_then(|x| x.to_str()) {
        Some("json") => "json",
        #[cfg(feature = "yaml")]
        Some("yaml" | "yml") => "yaml",
        #[cfg(feature = "toml")]
        Some("toml") => "toml",
        _ => bail!("cannot auto detect format from extension"),
    })
}

fn load_data(
    format: &str,
    path: &Path,
    selector: Option<&str>,
) -> Result<(Map<String, Value>, bool), Error> {
    let (contents, stdin_used) = read_input(path, "data")?;
    let mut data: Value = match detect_format(format, path, stdin_used)? {
        "json" => serde_json::from_str(&contents)?,
        #[cfg(feature = "yaml")]
        "yaml" => {
            // merge keys (`<<: *base`) are only resolved by `apply_merge`
            let mut v: serde_yaml::Value = serde_yaml::from_str(&contents)?;
            v.apply_merge()?;
            serde_json::to_value(v)?
        }
        #[cfg(feature = "toml")]
        "toml" => toml::from_str(&contents)?,
        other => bail!("unsupported format '{}'", other),
    };

    if let Some(selector) = selector {
        data = select(data, selector)?;
    }

    match data {
        Value::Object(map) => Ok((map, stdin_used)),
        other => bail!(
            "failed to interpret input data as object (got {})",
            json_kind(&other)
        ),
    }
}

fn select(mut data: Value, selector: &str) -> Result<Value, Error> {
    for part in selector.split('.') {
        let kind = json_kind(&data);
        let selected = match data {
            Value::Array(mut items) => part
                .parse::<usize>()
                .ok()
                .filter(|idx| *idx < items.len())
                .map(|idx| items.swap_remove(idx)),
            Value::Object(mut map) => map.remove(part),
            _ => None,
        };
        data = selected.with_context(|| {
            format!(
                "unable to select {:?} in {:?} (value was {})",
                part, selector, kind
            )
        })?;
    }
    Ok(data)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "none",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "map",
    }
}

fn print_config(config: &Config) -> Result<(), Error> {
    #[cfg(feature = "toml")]
    {
        print!("{}", toml::to_string_pretty(config)?);
    }
    #[cfg(not(feature = "toml"))]
    {
        println!("{}", serde_json::to_string_pretty(config)?);
    }
    Ok(())
}

fn dump(output: &mut Output, tmpl: &Template<'_>, kind: &str) -> Result<(), Error> {
    match kind {
        "tokens" => {
            for item in tokenize(tmpl.source()) {
                let (token, span) = item?;
                writeln!(output, "{token:?}{span:?}")?;
            }
        }
        "tree" => writeln!(output, "{:#?}", tmpl.nodes())?,
        _ => bail!("unknown dump kind '{}'", kind),
    }
    Ok(())
}

fn execute() -> Result<i32, Error> {
    let matches = command::make_command().get_matches();
    let config = Config::load(&matches)?;

    if matches.get_flag("print-config") {
        print_config(&config)?;
        return Ok(0);
    }

    let (mut bindings, data_from_stdin) = match matches.get_one::<PathBuf>("data_file") {
        Some(path) => load_data(
            config.format(),
            path,
            matches.get_one::<String>("select").map(|x| x.as_str()),
        )?,
        None => (Map::new(), false),
    };
    for (key, value) in config.defines() {
        bindings.insert(key.clone(), value.clone());
    }

    let template_file = template_file(&matches);
    if template_file == STDIN_STDOUT && data_from_stdin {
        bail!("cannot read both template and data from stdin");
    }
    let (source, template_from_stdin) = read_input(Path::new(template_file), "template")?;
    let tmpl = if template_from_stdin {
        Template::new(&source)?
    } else {
        Template::named(template_file, &source)?
    };

    let mut output = Output::new(
        matches
            .get_one::<PathBuf>("output")
            .map_or(Path::new(STDIN_STDOUT), |x| x.as_path()),
    )?;
    if let Some(kind) = matches.get_one::<String>("dump") {
        dump(&mut output, &tmpl, kind)?;
    } else {
        let rendered = tmpl.render(&bindings)?;
        output.write_rendered(&rendered, config.newline())?;
    }
    output.commit()?;
    Ok(0)
}

fn template_file(matches: &ArgMatches) -> &str {
    matches
        .get_one::<String>("template_file")
        .map_or(STDIN_STDOUT, |x| x.as_str())
}

fn print_debug_info(err: Option<&TError>) {
    if let Some(err) = err {
        if err.template_source().is_some() {
            eprintln!("{}", err.display_debug_info());
        }
    }
}

pub fn print_error(err: &Error) {
    eprintln!("error: {err}");
    print_debug_info(err.downcast_ref::<TError>());
    let mut source_opt = err.source();
    while let Some(source) = source_opt {
        eprintln!();
        eprintln!("caused by: {source}");
        print_debug_info(source.downcast_ref::<TError>());
        source_opt = source.source();
    }
}

fn main() {
    match execute() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            print_error(&err);
            std::process::exit(1);
        }
    }
}
