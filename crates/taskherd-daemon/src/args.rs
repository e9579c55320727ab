//! Startup argument handling.
//!
//! Only three tokens are recognised here:
//!
//! - `--only=a,b` restricts the job set to sources containing `a` or `b`
//! - `--except=a,b` drops sources containing `a` or `b`
//! - `--do-nothing` starts the process without running anything
//!
//! Every other token passes through untouched.

use taskherd_core::FilterSpec;
use tracing::warn;

pub const NO_OP_FLAG: &str = "--do-nothing";
pub const ONLY_FLAG: &str = "--only";
pub const EXCEPT_FLAG: &str = "--except";

/// What `start` should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupMode {
    /// Return immediately without discovering or scheduling anything.
    NoOp,
    /// Discover, filter and schedule jobs.
    Run(FilterSpec),
}

/// Parsed startup arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupArgs {
    pub mode: StartupMode,
    /// Tokens this layer does not interpret.
    pub passthrough: Vec<String>,
}

impl StartupArgs {
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut no_op = false;
        let mut only: Option<Vec<String>> = None;
        let mut except: Option<Vec<String>> = None;
        let mut passthrough = Vec::new();

        for arg in args {
            let arg = arg.as_ref();
            if arg == NO_OP_FLAG {
                no_op = true;
            } else if let Some(value) = flag_value(arg, ONLY_FLAG) {
                set_once(&mut only, ONLY_FLAG, value);
            } else if let Some(value) = flag_value(arg, EXCEPT_FLAG) {
                set_once(&mut except, EXCEPT_FLAG, value);
            } else {
                passthrough.push(arg.to_string());
            }
        }

        let mode = if no_op {
            StartupMode::NoOp
        } else {
            StartupMode::Run(FilterSpec {
                only: only.unwrap_or_default(),
                except: except.unwrap_or_default(),
            })
        };

        Self { mode, passthrough }
    }

    pub fn is_no_op(&self) -> bool {
        matches!(self.mode, StartupMode::NoOp)
    }

    /// The filter to apply, empty in no-op mode.
    pub fn filter(&self) -> FilterSpec {
        match &self.mode {
            StartupMode::NoOp => FilterSpec::default(),
            StartupMode::Run(spec) => spec.clone(),
        }
    }
}

impl Default for StartupArgs {
    fn default() -> Self {
        Self {
            mode: StartupMode::Run(FilterSpec::default()),
            passthrough: Vec::new(),
        }
    }
}

/// `Some(Some(list))` for `--flag=list`, `Some(None)` for a bare `--flag`.
fn flag_value<'a>(arg: &'a str, flag: &str) -> Option<Option<&'a str>> {
    let rest = arg.strip_prefix(flag)?;
    if rest.is_empty() {
        return Some(None);
    }
    rest.strip_prefix('=').map(Some)
}

fn set_once(slot: &mut Option<Vec<String>>, flag: &str, value: Option<&str>) {
    let Some(value) = value else {
        warn!("Ignoring {} without a value; use {}=a,b", flag, flag);
        return;
    };
    if slot.is_some() {
        warn!("Ignoring repeated {}={}", flag, value);
        return;
    }
    *slot = Some(split_list(value));
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_spec(args: &[&str]) -> FilterSpec {
        match StartupArgs::parse(args).mode {
            StartupMode::Run(spec) => spec,
            StartupMode::NoOp => panic!("unexpected no-op"),
        }
    }

    #[test]
    fn test_no_args() {
        let args = StartupArgs::parse(Vec::<String>::new());
        assert_eq!(args, StartupArgs::default());
        assert!(args.filter().is_empty());
    }

    #[test]
    fn test_only_and_except() {
        let spec = run_spec(&["--only=toadcamp,newsfeed", "--except=newsfeed_digest"]);
        assert_eq!(spec.only, vec!["toadcamp", "newsfeed"]);
        assert_eq!(spec.except, vec!["newsfeed_digest"]);
    }

    #[test]
    fn test_empty_segments_dropped() {
        let spec = run_spec(&["--except=,toadcamp,,"]);
        assert_eq!(spec.except, vec!["toadcamp"]);

        let spec = run_spec(&["--only="]);
        assert!(spec.only.is_empty());
    }

    #[test]
    fn test_first_occurrence_wins() {
        let spec = run_spec(&["--only=a", "--only=b"]);
        assert_eq!(spec.only, vec!["a"]);
    }

    #[test]
    fn test_bare_flag_ignored() {
        let args = StartupArgs::parse(["--only", "--except=x"]);
        assert_eq!(args.filter().only, Vec::<String>::new());
        assert_eq!(args.filter().except, vec!["x"]);
        assert!(args.passthrough.is_empty());
    }

    #[test]
    fn test_similar_flags_pass_through() {
        let args = StartupArgs::parse(["--onlyx=a", "--verbose", "run"]);
        assert!(args.filter().is_empty());
        assert_eq!(args.passthrough, vec!["--onlyx=a", "--verbose", "run"]);
    }

    #[test]
    fn test_no_op_anywhere() {
        assert!(StartupArgs::parse(["--do-nothing"]).is_no_op());
        assert!(StartupArgs::parse(["--only=a", "--do-nothing"]).is_no_op());
        assert!(!StartupArgs::parse(["--do-nothing-else"]).is_no_op());
    }

    #[test]
    fn test_values_are_literal() {
        let spec = run_spec(&["--only=a.b,c*"]);
        assert_eq!(spec.only, vec!["a.b", "c*"]);
    }
}
