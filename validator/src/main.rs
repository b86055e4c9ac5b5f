// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! A hardware requirement validator. The intent is to compile this validator as WASM / WASI too.
//! The validator expects a hardware specification in JSON or YAML from stdin, or requirements
//! given with `--hardware`, and produces a result as a YAML string in stdout.

#![deny(clippy::all)]

use clap::Parser;
use hardware::{Hardware, HardwareError, Spec};
use serde::Serialize;
use std::io::{self, Read};
use tracing::{Level, debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about = "Validate hardware requirements of test guests", long_about = None)]
struct Cmdline {
    #[arg(
        long,
        value_name = "REQUIREMENT",
        help = "Hardware requirement, e.g. 'memory >= 8 GiB' (repeatable, stdin is read if none is given)"
    )]
    hardware: Vec<String>,

    #[arg(
        long,
        value_name = "NAME",
        help = "Requirement supported by the target backend, e.g. 'memory' or 'cpu.processors' (repeatable)"
    )]
    supported: Vec<String>,
}

/// The type representing an error when validating a request
enum ValidateError {
    /// This type contains errors that may occur when using this tool.
    Environment(String),

    /// This type contains errors that may occur when deserializing from JSON or YAML.
    Deserialize(String),

    /// A value or a name does not follow the requirement grammar.
    Parse(String),

    /// The specification is well formed but not a valid set of requirements.
    Specification(String),

    /// Anything else the engine reports.
    General(String),
}

impl ValidateError {
    /// Provide a string indicating the type of error
    fn get_type(&self) -> &str {
        match self {
            ValidateError::Environment(_) => "Environment",
            ValidateError::Deserialize(_) => "Deserialization",
            ValidateError::Parse(_) => "Parse",
            ValidateError::Specification(_) => "Specification",
            ValidateError::General(_) => "General",
        }
    }

    fn get_msg(&self) -> &str {
        match self {
            ValidateError::Environment(v)
            | ValidateError::Deserialize(v)
            | ValidateError::Parse(v)
            | ValidateError::Specification(v)
            | ValidateError::General(v) => v,
        }
    }
}

impl From<HardwareError> for ValidateError {
    fn from(value: HardwareError) -> Self {
        match &value {
            HardwareError::Parse(_) => ValidateError::Parse(value.to_string()),
            HardwareError::Specification(_) => ValidateError::Specification(value.to_string()),
            HardwareError::General(_) => ValidateError::General(value.to_string()),
        }
    }
}

impl From<&ValidateError> for ValidateReply {
    fn from(value: &ValidateError) -> Self {
        ValidateReply {
            success: false,
            errors: vec![ValidateErrorOut {
                r#type: value.get_type().to_owned(),
                message: value.get_msg().to_owned(),
            }],
            ..ValidateReply::default()
        }
    }
}

#[derive(Serialize)]
struct ValidateErrorOut {
    r#type: String,
    message: String,
}

/// The type representing the outcome of a validation request
#[derive(Default, Serialize)]
struct ValidateReply {
    success: bool,
    errors: Vec<ValidateErrorOut>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    variants: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unsupported: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    spec: Option<Spec>,
}

impl ValidateReply {
    fn success(hardware: &Hardware, supported: &[String]) -> Self {
        let variants = hardware
            .constraint()
            .map(|constraint| {
                constraint
                    .variants()
                    .map(|variant| variant.iter().map(ToString::to_string).collect())
                    .collect()
            })
            .unwrap_or_default();
        let unsupported = if supported.is_empty() {
            vec![]
        } else {
            let names: Vec<&str> = supported.iter().map(String::as_str).collect();
            hardware
                .unsupported(&names, |_| false)
                .into_iter()
                .map(|constraint| {
                    let name = constraint.printable_name();
                    warn!("Hardware requirement '{name}' is not supported");
                    name
                })
                .collect()
        };
        Self {
            success: true,
            errors: vec![],
            variants,
            unsupported,
            spec: Some(hardware.to_spec()),
        }
    }
}

/// Read a JSON/YAML specification from stdin
fn spec_from_stdin() -> Result<Spec, ValidateError> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| ValidateError::Environment(format!("Failed to read from stdin: {e}")))?;
    serde_yaml_ng::from_str::<Spec>(&input).map_err(|e| ValidateError::Deserialize(e.to_string()))
}

/// Main validation function
fn validate(cmdline: &Cmdline) -> Result<Hardware, ValidateError> {
    let spec = if cmdline.hardware.is_empty() {
        spec_from_stdin()?
    } else {
        Spec::Sequence(cmdline.hardware.iter().cloned().map(Spec::String).collect())
    };
    let hardware = Hardware::from_spec(spec)?;
    if tracing::enabled!(Level::DEBUG) {
        for line in hardware.format_variants() {
            debug!("{line}");
        }
    }
    Ok(hardware)
}

/// Build a validation reply to be output as YAML
fn build_reply(cmdline: &Cmdline, result: Result<Hardware, ValidateError>) -> ValidateReply {
    match result {
        Ok(hardware) => ValidateReply::success(&hardware, &cmdline.supported),
        Err(e) => ValidateReply::from(&e),
    }
}

fn main() {
    let cmdline = Cmdline::parse();
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();
    let result = validate(&cmdline);
    let reply = build_reply(&cmdline, result);
    match serde_yaml_ng::to_string(&reply) {
        Ok(out) => println!("{out}"),
        Err(e) => eprintln!("Failure serializing validation response: {e}"),
    }
}
