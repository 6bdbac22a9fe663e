//! Operator CLI for the IP filter policy engine: validate a policy document,
//! explain the decision for a single IP, or compile a document into the
//! packet-filter rule list an installer would receive.

#![deny(unsafe_code)]

use clap::{Parser, Subcommand};
use policy::Matcher;
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "ipfilterctl", about = "Validate, explain, and compile IP filter policy documents")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and validate a policy document, reporting every error found.
    ValidatePolicy {
        /// Path to the policy document (YAML).
        policy: PathBuf,
    },
    /// Show the admit/deny decision and reason a policy document would
    /// produce for a given source IP.
    Explain {
        /// Path to the policy document (YAML).
        policy: PathBuf,
        /// Source IP to evaluate.
        #[arg(long)]
        ip: IpAddr,
    },
    /// Compile a policy document into its packet-filter rule list and print
    /// it as JSON.
    CompileRules {
        /// Path to the policy document (YAML).
        policy: PathBuf,
    },
}

fn main() -> ExitCode {
    telemetry::init_logging(ipfilter_core::config::LogLevel::default());

    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::ValidatePolicy { policy } => cmd_validate_policy(&policy),
        Command::Explain { policy, ip } => cmd_explain(&policy, ip),
        Command::CompileRules { policy } => cmd_compile_rules(&policy),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_validate_policy(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let p = policy::from_path(path)?;
    println!(
        "ok: mode={:?} default_action={:?} allow={} deny={}",
        p.mode(),
        p.default_action(),
        p.allow().len(),
        p.deny().len()
    );
    Ok(())
}

fn cmd_explain(path: &PathBuf, ip: IpAddr) -> Result<(), Box<dyn std::error::Error>> {
    let p = policy::from_path(path)?;
    let matcher = Matcher::new(p);
    let (admit, reason) = matcher.is_allowed(ip);
    println!("ip={ip} admit={admit} reason=\"{reason}\"");
    Ok(())
}

fn cmd_compile_rules(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let p = policy::from_path(path)?;
    let rules = compiler::compile(&p)?;
    println!("{}", serde_json::to_string_pretty(&rules)?);
    Ok(())
}
