use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use home_library::cli::{ConnectionArgs, LibraryCommand, LibraryContext};
use home_library::cli_style::{
    get_prompt, get_styles, print_error, print_goodbye, print_help, print_welcome, CommandHelp,
};
use home_library::service::CatalogOrigin;
use rustyline::{
    completion::Completer, highlight::Highlighter, history::FileHistory, validate::Validator,
    CompletionType, Config, Editor, Helper,
};
use tokio::runtime::Runtime;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(styles = get_styles(), version = env!("APP_VERSION"))]
struct CliArgs {
    #[command(flatten)]
    connection: ConnectionArgs,
}

#[derive(Parser)]
#[command(styles = get_styles(), name = "", disable_help_subcommand = true)]
struct InnerCli {
    #[command(subcommand)]
    command: InnerCommand,
}

#[derive(Subcommand)]
enum InnerCommand {
    #[command(flatten)]
    Library(LibraryCommand),

    /// Shows the available commands.
    Help,

    /// Close this program.
    Exit,
}

const COMMANDS_HELP: &[CommandHelp] = &[
    CommandHelp {
        group: "Browse",
        name: "list",
        args: "",
        description: "Show every book",
    },
    CommandHelp {
        group: "Browse",
        name: "search",
        args: "<query>",
        description: "Find books by title, author or location",
    },
    CommandHelp {
        group: "Browse",
        name: "ask",
        args: "<question>",
        description: "Ask about the library in plain language",
    },
    CommandHelp {
        group: "Add",
        name: "add",
        args: "<title> [author] [-l location]",
        description: "Add a single book",
    },
    CommandHelp {
        group: "Add",
        name: "scan",
        args: "<image> [-l location] [--commit]",
        description: "Read a bookshelf photo, --commit adds the books found",
    },
    CommandHelp {
        group: "System",
        name: "where",
        args: "",
        description: "Show where the catalog is stored",
    },
    CommandHelp {
        group: "System",
        name: "help",
        args: "",
        description: "Show this help",
    },
    CommandHelp {
        group: "System",
        name: "exit",
        args: "",
        description: "Close the shell",
    },
];

enum CommandExecutionResult {
    Ok,
    Exit,
    Error(String),
}

fn execute_command(line: &str, runtime: &Runtime, context: &LibraryContext) -> CommandExecutionResult {
    let line = line.trim();
    if line.is_empty() {
        return CommandExecutionResult::Ok;
    }

    let args =
        shlex::split(line).unwrap_or_else(|| line.split_whitespace().map(String::from).collect());

    let cli = InnerCli::try_parse_from(std::iter::once(" ").chain(args.iter().map(String::as_str)));

    match cli {
        Ok(cli) => match cli.command {
            InnerCommand::Library(command) => {
                if let Err(err) = runtime.block_on(context.execute(command)) {
                    return CommandExecutionResult::Error(format!("{:#}", err));
                }
            }
            InnerCommand::Help => print_help(COMMANDS_HELP),
            InnerCommand::Exit => return CommandExecutionResult::Exit,
        },
        Err(e) => {
            if e.print().is_err() {
                println!("{}", e);
            }
        }
    }
    CommandExecutionResult::Ok
}

#[derive(rustyline_derive::Hinter)]
struct CommandHelper {
    commands_names: Vec<String>,
}

impl CommandHelper {
    pub fn new() -> Self {
        let commands_names: Vec<String> = InnerCli::command()
            .get_subcommands()
            .map(|sc| sc.get_name().to_string())
            .collect();

        CommandHelper { commands_names }
    }
}

impl Completer for CommandHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        if line.contains(' ') {
            return Ok((0, Vec::with_capacity(0)));
        }
        let matches = self
            .commands_names
            .iter()
            .filter(|c| c.starts_with(line))
            .cloned()
            .collect::<Vec<_>>();

        Ok((0, matches))
    }
}

impl Highlighter for CommandHelper {}
impl Validator for CommandHelper {}
impl Helper for CommandHelper {}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let config = cli_args.connection.resolve()?;
    let context = LibraryContext::from_config(&config)?;
    let runtime = Runtime::new()?;

    let loaded = runtime.block_on(context.service().load_or_empty());
    let book_count = match loaded.origin {
        CatalogOrigin::Unavailable(_) => None,
        _ => Some(loaded.catalog.len()),
    };
    print_welcome(context.service().location(), book_count);

    let rl_config = Config::builder()
        .completion_type(CompletionType::List)
        .build();

    let mut rl = Editor::<CommandHelper, FileHistory>::with_config(rl_config)?;
    rl.set_helper(Some(CommandHelper::new()));

    let prompt = get_prompt();
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match execute_command(&line, &runtime, &context) {
                    CommandExecutionResult::Ok => {}
                    CommandExecutionResult::Exit => break,
                    CommandExecutionResult::Error(err) => {
                        print_error(&err);
                        continue;
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("CTRL-D: exiting.");
                break;
            }
            Err(e) => {
                print_error(&format!("{:?}", e));
                break;
            }
        }
    }

    print_goodbye();
    Ok(())
}
