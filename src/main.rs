use clap::Parser;
use std::process::ExitCode;

use promptcron::api::{self, DynScheduleApi};
use promptcron::config::{Config, TIMEZONES};
use promptcron::log;
use promptcron::session::Session;
use promptcron::template;

mod cli;
mod ux;

use cli::{Command, CreateArgs, ListArgs};

fn load_config(args: &cli::Args) -> anyhow::Result<Config> {
    let mut cfg = Config::load(args.config.as_deref())?;
    if let Some(url) = &args.api_url {
        cfg.api_url = url.clone();
    }
    if let Some(t) = args.timeout_secs {
        cfg.timeout_secs = t;
    }
    if args.lax_emails {
        cfg.strict_emails = false;
    }
    Ok(cfg)
}

fn open_session(cfg: &Config) -> anyhow::Result<Session<DynScheduleApi>> {
    let api = api::make_api(cfg)?;
    Ok(Session::new(api, cfg.clone()))
}

/// Drain and print notices; true when none of them is an error.
fn flush_notices(session: &mut Session<DynScheduleApi>) -> bool {
    let notices = session.take_notices();
    ux::print_notices(&notices);
    !notices.iter().any(|n| n.is_error())
}

async fn refresh(session: &mut Session<DynScheduleApi>) -> bool {
    let pb = ux::spinner("Fetching schedules...");
    let ok = session.refresh().await.is_ok();
    pb.finish_and_clear();
    ok
}

async fn run_list(cfg: &Config, args: &ListArgs) -> anyhow::Result<bool> {
    let mut session = open_session(cfg)?;
    if !refresh(&mut session).await {
        return Ok(flush_notices(&mut session));
    }
    ux::print_schedules(session.records(), args.search_by, &args.query, args.order());
    Ok(flush_notices(&mut session))
}

async fn run_create(cfg: &Config, args: &CreateArgs, debug: bool) -> anyhow::Result<bool> {
    let mut draft = args.draft.to_draft(cfg)?;
    ux::show_draft(&draft);

    if args.dry_run {
        return match draft.submit(cfg.strict_emails) {
            Ok(record) => {
                println!("{}", serde_json::to_string_pretty(&record)?);
                Ok(true)
            }
            Err(e) => {
                ux::print_notices(&[promptcron::session::Notice::error(e.to_string())]);
                Ok(false)
            }
        };
    }

    if !args.yes && !ux::confirm("Create this schedule?") {
        println!("Aborted by user.");
        return Ok(true);
    }

    let mut session = open_session(cfg)?;
    let pb = ux::spinner("Creating schedule...");
    let created = session.create(&mut draft).await;
    pb.finish_and_clear();

    if let Ok(record) = &created {
        if debug {
            log::print_json_debug("create", record)?;
        }
        ux::print_schedules(session.records(), Default::default(), "", Default::default());
    }
    Ok(flush_notices(&mut session))
}

async fn run_delete(cfg: &Config, id: &str, yes: bool) -> anyhow::Result<bool> {
    let mut session = open_session(cfg)?;
    if !refresh(&mut session).await {
        return Ok(flush_notices(&mut session));
    }

    match session.records().iter().find(|r| r.id == id) {
        Some(r) => {
            if !yes && !ux::confirm(&format!("Delete \"{}\" ({})?", r.email_title, r.id)) {
                println!("Aborted by user.");
                return Ok(true);
            }
        }
        None => {
            tracing::warn!(%id, "schedule not in fetched list; deleting anyway");
            if !yes && !ux::confirm(&format!("Schedule {id} is not in the list. Delete anyway?")) {
                println!("Aborted by user.");
                return Ok(true);
            }
        }
    }

    let pb = ux::spinner("Deleting schedule...");
    let deleted = session.delete(id).await.is_ok();
    pb.finish_and_clear();
    if deleted {
        ux::print_schedules(session.records(), Default::default(), "", Default::default());
    }
    Ok(flush_notices(&mut session))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let args = cli::Args::parse();

    if args.no_color {
        colored::control::set_override(false);
    }
    log::init(args.debug);

    let cfg = load_config(&args)?;
    if args.debug {
        log::print_json_debug("config", &cfg)?;
    }

    let ok = match &args.command {
        Command::List(list) => run_list(&cfg, list).await?,
        Command::Create(create) => run_create(&cfg, create, args.debug).await?,
        Command::Delete { id, yes } => run_delete(&cfg, id, *yes).await?,
        Command::Vars { title, prompt } => {
            for v in template::extract_variables([prompt.as_str(), title.as_str()]) {
                println!("{v}");
            }
            true
        }
        Command::Preview(draft_args) => {
            let draft = draft_args.to_draft(&cfg)?;
            ux::print_preview(&draft);
            true
        }
        Command::Timezones => {
            for tz in TIMEZONES {
                println!("{tz}");
            }
            true
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
