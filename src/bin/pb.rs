extern crate planbook as lib;

use flexi_logger::{FileSpec, Logger};
use itertools::Itertools;
use lib::agenda::{Field, Period};
use lib::cmds::DaySpec;
use lib::context::Context;
use lib::planner::{PeriodView, Planner};
use lib::storage::{FileStorage, Storage};
use lib::theme::Theme;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "pb", about = "Planbook - a daily class planner.")]
pub struct Args {
    #[structopt(
        name = "CONFIG",
        short = "c",
        long = "config",
        help = "path to config file",
        parse(from_os_str)
    )]
    pub configfile: Option<PathBuf>,

    #[structopt(long = "log-file", help = "path to log file", parse(from_os_str))]
    pub log_file: Option<PathBuf>,

    #[structopt(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Show all periods of a day
    Show {
        #[structopt(
            default_value = "today",
            help = "today, tomorrow, yesterday, +N, -N or YYYY-MM-DD"
        )]
        day: DaySpec,
    },
    /// Set the subject, notes or homework of a period
    Set {
        day: DaySpec,
        period: Period,
        #[structopt(help = "subject, notes or homework")]
        field: Field,
        value: String,
    },
    /// Show the default subjects, or set the one of PERIOD
    #[structopt(name = "default")]
    Defaults {
        period: Option<Period>,
        value: Option<String>,
    },
    /// Show the theme, or switch it
    Theme {
        #[structopt(possible_values = &["light", "dark", "toggle"])]
        theme: Option<String>,
    },
}

fn period_lines(view: &PeriodView) -> String {
    let mut lines = vec![format!(
        "Period {}  {}{}",
        view.period,
        if view.subject.is_empty() {
            "(no subject)"
        } else {
            view.subject.as_str()
        },
        if view.subject_is_default && !view.subject.is_empty() {
            " (default)"
        } else {
            ""
        }
    )];

    if !view.notes.is_empty() {
        lines.push(format!("    notes:    {}", view.notes));
    }
    if !view.homework.is_empty() {
        lines.push(format!("    homework: {}", view.homework));
    }

    lines.join("\n")
}

fn show_day<S: Storage>(context: &Context<S>) {
    let title = match context.secondary_label() {
        Some(short) => format!("{} ({})", context.selected_label(), short),
        None => context.selected_label(),
    };
    let key = context.selected_key();

    println!("{}  [{}]", title, key);
    println!(
        "{}",
        context
            .planner()
            .day_view(&key)
            .iter()
            .map(period_lines)
            .join("\n")
    );
}

fn show_defaults<S: Storage>(planner: &Planner<S>) {
    println!(
        "{}",
        planner
            .defaults()
            .iter()
            .map(|(period, subject)| format!("Period {}  {}", period, subject))
            .join("\n")
    );
}

fn run<S: Storage>(mut context: Context<S>, command: Command) -> lib::error::Result<()> {
    let today = context.planner().resolver().current_date();

    match command {
        Command::Show { day } => {
            context = context.with_cursor(day.resolve(today)?);
            show_day(&context);
        }
        Command::Set {
            day,
            period,
            field,
            value,
        } => {
            context = context.with_cursor(day.resolve(today)?);
            let key = context.selected_key();
            context.planner_mut().set_field(key, period, field, value);
            println!(
                "{}",
                period_lines(&context.planner().period_view(&key, period))
            );
        }
        Command::Defaults { period, value } => match (period, value) {
            (Some(period), Some(value)) => {
                context.planner_mut().set_default(period, value);
                show_defaults(context.planner());
            }
            (Some(period), None) => {
                println!("{}", context.planner().default_subject(period));
            }
            _ => show_defaults(context.planner()),
        },
        Command::Theme { theme } => {
            let theme = match theme.as_deref() {
                None => context.planner().theme(),
                Some("toggle") => context.planner_mut().toggle_theme(),
                Some(name) => {
                    let theme = name.parse::<Theme>()?;
                    context.planner_mut().set_theme(theme);
                    theme
                }
            };
            println!("{}", theme);
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_args();

    const DEFAULT_LOG_LEVEL: &'static str = if cfg!(debug_assertions) {
        "info"
    } else {
        "warn"
    };

    let mut logger = Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)?;

    if let Some(log_file) = args.log_file {
        logger = logger
            .log_to_file(FileSpec::try_from(log_file)?)
            .print_message();
    }

    let _logger = logger.start()?;

    std::panic::set_hook(Box::new(move |info| {
        println!(
            "{} {} ran into a fatal error!",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        );
        println!("{}", info);
        println!("{:?}", backtrace::Backtrace::new());
    }));

    let config = lib::config::load_suitable_config(args.configfile.as_deref())?;
    let storage = FileStorage::new(&config.data_dir()?);
    log::debug!("Using data directory '{}'", storage.dir().display());

    let planner = Planner::load(storage, config.resolver());
    let context = Context::new(planner);

    run(context, args.command.unwrap_or(Command::Show { day: DaySpec::Today }))?;

    Ok(())
}
