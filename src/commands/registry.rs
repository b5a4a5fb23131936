pub struct CommandUsage {
    pub syntax: &'static str,
    pub description: &'static str,
}

pub struct Command {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub usages: &'static [CommandUsage],
}

impl Command {
    fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(name))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CommandInvocation<'a> {
    pub args: &'a str,
}

impl CommandInvocation<'_> {
    pub fn arg_count(&self) -> usize {
        self.args.split_whitespace().count()
    }
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands().iter().find(|command| command.matches(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        aliases: &["?"],
        usages: &[CommandUsage {
            syntax: "/help",
            description: "Show available commands.",
        }],
    },
    Command {
        name: "topics",
        aliases: &[],
        usages: &[CommandUsage {
            syntax: "/topics",
            description: "List the predefined loan topics.",
        }],
    },
    Command {
        name: "topic",
        aliases: &[],
        usages: &[CommandUsage {
            syntax: "/topic <name|number>",
            description: "Ask about one of the predefined loan topics.",
        }],
    },
    Command {
        name: "calc",
        aliases: &[],
        usages: &[CommandUsage {
            syntax: "/calc <principal> <rate%> <years> [fee] [penalty]",
            description: "Compute a monthly payment locally.",
        }],
    },
    Command {
        name: "export",
        aliases: &[],
        usages: &[
            CommandUsage {
                syntax: "/export",
                description: "Export the conversation to loan_chat.txt.",
            },
            CommandUsage {
                syntax: "/export <filename> [--force]",
                description: "Export to a file, overwriting it with --force.",
            },
        ],
    },
    Command {
        name: "theme",
        aliases: &[],
        usages: &[CommandUsage {
            syntax: "/theme",
            description: "Toggle between light and dark mode.",
        }],
    },
    Command {
        name: "log",
        aliases: &[],
        usages: &[
            CommandUsage {
                syntax: "/log",
                description: "Pause or resume transcript logging.",
            },
            CommandUsage {
                syntax: "/log <filename>",
                description: "Log the transcript to a file.",
            },
        ],
    },
    Command {
        name: "quit",
        aliases: &["exit"],
        usages: &[CommandUsage {
            syntax: "/quit",
            description: "Leave the chat.",
        }],
    },
];
