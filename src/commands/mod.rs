mod registry;

pub use registry::{all_commands, find_command, CommandInvocation};

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::amortization::{LoanParameters, LoanSummary};
use crate::core::config::{Config, ThemePreference};
use crate::core::constants::LOAN_TOPICS;
use crate::core::orchestrator::{ChatSession, Submission};
use crate::core::surface::Surface;
use crate::export::{export_transcript, ExportLayout, DEFAULT_EXPORT_FILENAME};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    Submit(Submission),
    ThemeChanged(ThemePreference),
    Quit,
}

/// Everything a chat command may touch.
pub struct CommandContext<'a, S: Surface> {
    pub session: &'a mut ChatSession<S>,
    pub config: &'a mut Config,
    /// Where preference changes are saved. `None` keeps them in memory.
    pub config_path: Option<&'a Path>,
}

impl<S: Surface> CommandContext<'_, S> {
    fn notice(&mut self, text: impl AsRef<str>) {
        self.session.surface_mut().notice(text.as_ref());
    }
}

pub fn process_input<S: Surface>(ctx: &mut CommandContext<'_, S>, input: &str) -> CommandResult {
    let trimmed = input.trim();

    let Some(rest) = trimmed.strip_prefix('/') else {
        return CommandResult::Submit(Submission::Text(input.to_string()));
    };

    let mut parts = rest.splitn(2, char::is_whitespace);
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::Submit(Submission::Text(input.to_string())),
    };
    let args = parts.next().unwrap_or("").trim();

    let Some(command) = find_command(command_name) else {
        // Unknown commands are ordinary questions ("/ what is APR?").
        return CommandResult::Submit(Submission::Text(input.to_string()));
    };

    let invocation = CommandInvocation { args };
    debug!(command = command.name, "chat command");
    match command.name {
        "help" => handle_help(ctx),
        "topics" => handle_topics(ctx),
        "topic" => handle_topic(ctx, invocation),
        "calc" => handle_calc(ctx, invocation),
        "export" => handle_export(ctx, invocation),
        "theme" => handle_theme(ctx),
        "log" => handle_log(ctx, invocation),
        "quit" => CommandResult::Quit,
        _ => CommandResult::Continue,
    }
}

pub fn help_text() -> String {
    let mut help = String::from("Ask anything about loans, or use a command:\n");
    for command in all_commands() {
        for usage in command.usages {
            help.push_str(&format!("  {:<52} {}\n", usage.syntax, usage.description));
        }
    }
    help.push_str("Press Ctrl+C while a reply is on its way to interrupt it.");
    help
}

pub fn topics_text() -> String {
    let mut text = String::from("Loan topics:");
    for (index, topic) in LOAN_TOPICS.iter().enumerate() {
        text.push_str(&format!("\n  {}. {}", index + 1, topic));
    }
    text
}

/// Match a topic by its 1-based number, full name, or first word
/// ("car" finds "Car Loan").
pub fn resolve_topic(query: &str) -> Option<&'static str> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    if let Ok(number) = query.parse::<usize>() {
        return number
            .checked_sub(1)
            .and_then(|index| LOAN_TOPICS.get(index))
            .copied();
    }
    LOAN_TOPICS.iter().copied().find(|topic| {
        topic.eq_ignore_ascii_case(query)
            || topic
                .split_whitespace()
                .next()
                .is_some_and(|first| first.eq_ignore_ascii_case(query))
    })
}

fn handle_help<S: Surface>(ctx: &mut CommandContext<'_, S>) -> CommandResult {
    ctx.notice(help_text());
    CommandResult::Continue
}

fn handle_topics<S: Surface>(ctx: &mut CommandContext<'_, S>) -> CommandResult {
    ctx.notice(topics_text());
    CommandResult::Continue
}

fn handle_topic<S: Surface>(
    ctx: &mut CommandContext<'_, S>,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    match resolve_topic(invocation.args) {
        Some(topic) => CommandResult::Submit(Submission::Topic(topic.to_string())),
        None => {
            ctx.notice(format!("Usage: /topic <name|number>\n{}", topics_text()));
            CommandResult::Continue
        }
    }
}

/// Parse `principal rate years [fee] [penalty]`.
pub fn parse_loan_args(args: &str) -> Result<LoanParameters, String> {
    let values = args
        .split_whitespace()
        .map(|raw| {
            raw.trim_end_matches('%')
                .replace(',', "")
                .parse::<f64>()
                .map_err(|_| format!("'{raw}' is not a number"))
        })
        .collect::<Result<Vec<f64>, String>>()?;

    match values.as_slice() {
        [principal, rate, years, rest @ ..] if rest.len() <= 2 => {
            let mut params = LoanParameters::new(*principal, *rate, *years);
            if let Some(fee) = rest.first() {
                params = params.with_processing_fee(*fee);
            }
            if let Some(penalty) = rest.get(1) {
                params = params.with_prepayment_penalty(*penalty);
            }
            Ok(params)
        }
        _ => Err("expected <principal> <rate%> <years> [fee] [penalty]".to_string()),
    }
}

fn handle_calc<S: Surface>(
    ctx: &mut CommandContext<'_, S>,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let outcome = parse_loan_args(invocation.args).and_then(|params| {
        LoanSummary::compute(&params)
            .map(|summary| summary.describe(&params))
            .map_err(|err| err.to_string())
    });
    match outcome {
        Ok(description) => ctx.notice(description),
        Err(err) => ctx.notice(format!(
            "Calc error: {err}\nUsage: /calc <principal> <rate%> <years> [fee] [penalty]"
        )),
    }
    CommandResult::Continue
}

fn handle_export<S: Surface>(
    ctx: &mut CommandContext<'_, S>,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let mut filename = None;
    let mut overwrite = false;
    for arg in invocation.args.split_whitespace() {
        match arg {
            "--force" | "-f" => overwrite = true,
            name if filename.is_none() => filename = Some(name),
            _ => {
                ctx.notice("Usage: /export [filename] [--force]");
                return CommandResult::Continue;
            }
        }
    }

    let path = PathBuf::from(filename.unwrap_or(DEFAULT_EXPORT_FILENAME));
    let layout = ExportLayout::default().with_width(ctx.config.export_width());
    match export_transcript(ctx.session.history(), &path, &layout, overwrite) {
        Ok(pages) => {
            let plural = if pages == 1 { "" } else { "s" };
            ctx.notice(format!(
                "Conversation exported to {} ({pages} page{plural})",
                path.display()
            ));
        }
        Err(err) => {
            warn!(error = %err, path = %path.display(), "export failed");
            ctx.notice(err.to_string());
        }
    }
    CommandResult::Continue
}

fn handle_theme<S: Surface>(ctx: &mut CommandContext<'_, S>) -> CommandResult {
    let preference = ctx.config.theme_preference().toggled();
    ctx.config.theme = Some(preference);

    let saved = match ctx.config_path {
        Some(path) => match ctx.config.save_to_path(path) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "could not persist theme preference");
                false
            }
        },
        None => false,
    };

    if saved {
        ctx.notice(format!("Theme set: {preference}"));
    } else {
        ctx.notice(format!("Theme set: {preference} (unsaved)"));
    }
    CommandResult::ThemeChanged(preference)
}

fn handle_log<S: Surface>(
    ctx: &mut CommandContext<'_, S>,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let result = match invocation.arg_count() {
        0 => ctx
            .session
            .logging_mut()
            .toggle_logging()
            .map_err(|err| format!("Log error: {err}")),
        1 => {
            let filename = invocation.args.to_string();
            ctx.session
                .logging_mut()
                .set_log_file(filename)
                .map_err(|err| format!("Logfile error: {err}"))
        }
        _ => Err("Usage: /log [filename]".to_string()),
    };
    match result {
        Ok(message) | Err(message) => ctx.notice(message),
    }
    CommandResult::Continue
}
