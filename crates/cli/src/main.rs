use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow, bail};
use clap::{ArgGroup, Parser};
use garg_engine::{ArgumentBinder, InteractiveForm, MemoryForm, SessionOutcome, SignatureManifest, SignatureSource, SignatureText};
use garg_tui::TerminalForm;
use garg_types::{BinderOptions, BoundArguments};
use garg_util::GargConfig;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Collect arguments for a callable through a form and print them as JSON.
#[derive(Debug, Parser)]
#[command(name = "garg", version, about)]
#[command(group(ArgGroup::new("source").required(true).args(["signature", "manifest"])))]
struct Cli {
    /// Declaration text, e.g. "f(a, b='test', *, c=3)"
    #[arg(long)]
    signature: Option<String>,
    /// YAML or JSON signature manifest
    #[arg(long, value_name = "PATH")]
    manifest: Option<PathBuf>,
    /// Callable to use from a manifest that declares several
    #[arg(long, value_name = "NAME", requires = "manifest")]
    function: Option<String>,
    /// Field text for a parameter; implies --headless
    #[arg(long = "set", value_name = "NAME=TEXT", value_parser = parse_assignment)]
    assignments: Vec<(String, String)>,
    /// Confirm once without showing the terminal form
    #[arg(long)]
    headless: bool,
    /// Omit parameters whose text does not parse
    #[arg(long)]
    ignore_syntax_errors: bool,
    /// Omit parameters that cannot be entered in the form
    #[arg(long)]
    ignore_positional_only: bool,
    /// Give positional-only parameters a field
    #[arg(long)]
    include_positional_only: bool,
    /// Fill omitted parameters that have defaults before printing
    #[arg(long)]
    apply_defaults: bool,
    /// Print the classified parameter groups and exit
    #[arg(long)]
    describe: bool,
    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Cli {
    fn is_headless(&self) -> bool {
        self.headless || !self.assignments.is_empty()
    }

    /// Config file options with command-line flags layered on top.
    fn binder_options(&self, config: &GargConfig) -> BinderOptions {
        let mut options = config.binder.clone();
        options.ignore_syntax_errors |= self.ignore_syntax_errors;
        options.ignore_positional_only |= self.ignore_positional_only;
        if self.include_positional_only {
            options = options.with_positional_only();
        }
        options
    }

    fn source(&self) -> Result<Box<dyn SignatureSource>> {
        if let Some(text) = &self.signature {
            return Ok(Box::new(SignatureText::new(text.clone())));
        }
        let path = self.manifest.as_ref().ok_or_else(|| anyhow!("either --signature or --manifest is required"))?;
        let manifest = SignatureManifest::from_path(path).with_context(|| format!("loading {}", path.display()))?;
        Ok(match &self.function {
            Some(name) => Box::new(manifest.select(name.clone())),
            None => Box::new(manifest),
        })
    }
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, text)) if !name.trim().is_empty() => Ok((name.trim().to_string(), text.to_string())),
        _ => Err(format!("expected NAME=TEXT, got '{raw}'")),
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => GargConfig::load_from(path)?,
        None => GargConfig::load()?,
    };
    let log_path = (!cli.is_headless()).then(|| config.log_path());
    init_tracing(log_path.as_deref());

    let source = cli.source()?;
    let options = cli.binder_options(&config);
    let mut binder = ArgumentBinder::new(source.as_ref(), options)?;

    if cli.describe {
        print!("{}", describe(&binder));
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = if cli.is_headless() {
        let mut form = MemoryForm::new();
        binder.build_form(&mut form);
        for (name, text) in &cli.assignments {
            if !form.set_text(name, text.as_str()) {
                bail!("'{name}' is not a field of {}", binder.signature().callable());
            }
        }
        run_session(&mut binder, &mut form)?
    } else {
        let mut form = TerminalForm::new(binder.signature().to_string());
        binder.build_form(&mut form);
        run_session(&mut binder, &mut form)?
    };

    match outcome {
        Some(mut bound) => {
            if cli.apply_defaults {
                bound.apply_defaults();
            }
            let arguments = bound.to_json();
            let output = serde_json::json!({
                "callable": bound.signature().callable(),
                "args": arguments["args"],
                "kwargs": arguments["kwargs"],
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("Cancelled; no arguments were produced.");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Runs `form` against `binder` and turns the outcome into a result.
fn run_session(binder: &mut ArgumentBinder, form: &mut dyn InteractiveForm) -> Result<Option<BoundArguments>> {
    form.run(binder)?;
    match binder.take_outcome() {
        SessionOutcome::Bound(bound) => {
            info!(arguments = bound.len(), "arguments bound");
            Ok(Some(bound))
        }
        SessionOutcome::Failed(error) => Err(anyhow!(error.describe())),
        SessionOutcome::Cancelled | SessionOutcome::Pending => {
            debug!("form closed without arguments");
            Ok(None)
        }
    }
}

fn describe(binder: &ArgumentBinder) -> String {
    let mut out = format!("{}\n", binder.signature());
    for group in binder.groups() {
        let marker = if binder.options().is_eligible(group.kind) { "" } else { " (no field)" };
        out.push_str(&format!("{}{marker}\n", group.label()));
        for parameter in group.parameters {
            out.push_str(&format!("  {parameter}\n"));
        }
    }
    out
}

/// Logs go to stderr, or to `log_file` while the terminal form owns the
/// screen. `RUST_LOG` overrides the default `info` filter.
fn init_tracing(log_file: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log_file.map(open_log_file) {
        Some(Ok(file)) => {
            let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
        }
        Some(Err(error)) => {
            let _ = builder.with_writer(std::io::stderr).try_init();
            tracing::warn!(error = %error, "could not open log file; logging to stderr");
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
}

fn open_log_file(path: &Path) -> std::io::Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use garg_types::ParameterKind;

    #[test]
    fn assignments_split_on_the_first_equals() {
        assert_eq!(parse_assignment("a=b=c"), Ok(("a".to_string(), "b=c".to_string())));
        assert_eq!(parse_assignment("text="), Ok(("text".to_string(), String::new())));
        assert!(parse_assignment("=1").is_err());
        assert!(parse_assignment("novalue").is_err());
    }

    #[test]
    fn set_implies_headless() {
        let cli = Cli::try_parse_from(["garg", "--signature", "f(a)", "--set", "a=1"]).unwrap();
        assert!(cli.is_headless());
        assert_eq!(cli.assignments, vec![("a".to_string(), "1".to_string())]);
    }

    #[test]
    fn a_source_is_required() {
        assert!(Cli::try_parse_from(["garg", "--headless"]).is_err());
        assert!(Cli::try_parse_from(["garg", "--signature", "f()", "--manifest", "m.yaml"]).is_err());
    }

    #[test]
    fn flags_layer_over_config() {
        let config = GargConfig {
            binder: BinderOptions {
                ignore_syntax_errors: true,
                ..BinderOptions::default()
            },
            log_file: None,
        };
        let cli = Cli::try_parse_from(["garg", "--signature", "f(a)", "--include-positional-only", "--ignore-positional-only"]).unwrap();
        let options = cli.binder_options(&config);
        assert!(options.ignore_syntax_errors);
        assert!(options.ignore_positional_only);
        assert!(options.is_eligible(ParameterKind::PositionalOnly));
    }

    #[test]
    fn describe_marks_groups_without_fields() {
        let binder = ArgumentBinder::new(&SignatureText::new("f(x, /, a, *args, k=1)"), BinderOptions::default()).unwrap();
        let text = describe(&binder);
        assert!(text.contains("POSITIONAL_ONLY (no field)\n  x\n"));
        assert!(text.contains("POSITIONAL_OR_KEYWORD\n  a\n"));
        assert!(text.contains("VAR_POSITIONAL (no field)\n  *args\n"));
        assert!(text.contains("KEYWORD_ONLY\n  k=1\n"));
    }

    #[test]
    fn headless_sessions_bind_set_values() {
        let mut binder = ArgumentBinder::new(&SignatureText::new("f(a, *, c=3)"), BinderOptions::default()).unwrap();
        let mut form = MemoryForm::new();
        binder.build_form(&mut form);
        assert!(form.set_text("a", "'x'"));
        let bound = run_session(&mut binder, &mut form).unwrap().unwrap();
        assert_eq!(bound.to_json(), serde_json::json!({"args": ["x"], "kwargs": {"c": 3}}));
    }

    #[test]
    fn failed_sessions_report_the_parameter() {
        let mut binder = ArgumentBinder::new(&SignatureText::new("f(a)"), BinderOptions::default()).unwrap();
        let mut form = MemoryForm::new();
        binder.build_form(&mut form);
        let error = run_session(&mut binder, &mut form).unwrap_err();
        assert!(error.to_string().contains("parameter 'a'"));
    }
}
