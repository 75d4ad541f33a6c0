//! Command line arguments

use std::collections::HashMap;

pub const USAGE: &str = "\
Usage: deploywatch [options]

Options:
  --token=<token>        API token (or VERCEL_TOKEN)
  --project=<id>         Project id to watch (or VERCEL_PROJECT_ID)
  --team=<id>            Team id for team-owned projects (or VERCEL_TEAM_ID)
  --interval=<seconds>   Polling interval, default 15 (or DEPLOYWATCH_INTERVAL)
  --limit=<n>            Deployments to show, default 5 (or DEPLOYWATCH_LIMIT)
  -v, --verbose          Render every poll, not only on change
  --config=<path>        JSON settings file
  --log-level=<level>    trace, debug, info, warn or error
  --log-file=<path>      Write logs to a daily rolling file instead of stderr
  --json-logs            Emit logs as JSON
  --api-url=<url>        Override the API base URL
  --version              Print version information
  --help                 Print this help";

/// Collect `--key=value` pairs and bare `--flag`s, keyed without dashes.
/// Bare flags map to `"true"`.
pub fn parse_args<I>(args: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = String>,
{
    let mut cli_args = HashMap::new();

    for arg in args {
        if let Some((key, value)) = arg.split_once('=') {
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with('-') {
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    cli_args
}
