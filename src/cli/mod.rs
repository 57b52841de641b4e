use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use promptcron::config::Config;
use promptcron::draft::Draft;
use promptcron::errors::Result;
use promptcron::view::{SearchMode, SortOrder};
use promptcron::wire::{ScheduleType, Weekday};

#[derive(Parser, Debug)]
#[command(name = "promptcron", version, about = "Schedule AI prompts to be delivered to your email")]
pub struct Args {
    /// Base url of the schedules API.
    #[arg(long, env = "PROMPTCRON_API_URL", global = true)]
    pub api_url: Option<String>,

    /// TOML config file.
    #[arg(long, env = "PROMPTCRON_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Accept any non-blank recipient instead of checking address syntax.
    #[arg(long, default_value_t = false, global = true)]
    pub lax_emails: bool,

    #[arg(long, default_value_t = false, global = true)]
    pub debug: bool,

    #[arg(long, default_value_t = false, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show scheduled prompts.
    List(ListArgs),
    /// Author and submit a new schedule.
    Create(CreateArgs),
    /// Remove a schedule by id.
    Delete {
        id: String,
        #[arg(long, short = 'y', default_value_t = false)]
        yes: bool,
    },
    /// Print the variables referenced by a title and prompt.
    Vars {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        prompt: String,
    },
    /// Render the title and prompt for every variable value.
    Preview(DraftArgs),
    /// List suggested timezones.
    Timezones,
}

#[derive(ClapArgs, Debug)]
pub struct ListArgs {
    #[arg(long, value_enum, default_value_t = SearchMode::Title)]
    pub search_by: SearchMode,

    #[arg(long, short = 'q', default_value = "")]
    pub query: String,

    /// Sort titles Z→A.
    #[arg(long, default_value_t = false)]
    pub desc: bool,
}

impl ListArgs {
    pub fn order(&self) -> SortOrder {
        if self.desc { SortOrder::Desc } else { SortOrder::Asc }
    }
}

#[derive(ClapArgs, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub draft: DraftArgs,

    /// Print the record that would be sent and stop.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    #[arg(long, short = 'y', default_value_t = false)]
    pub yes: bool,
}

#[derive(ClapArgs, Debug, Default)]
pub struct DraftArgs {
    /// Start from a JSON, YAML or TOML draft file.
    #[arg(long)]
    pub draft: Option<PathBuf>,

    #[arg(long = "email")]
    pub emails: Vec<String>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub prompt: Option<String>,

    /// Candidate value as name=value; repeat for more values.
    #[arg(long = "var", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    #[arg(long)]
    pub schedule: Option<ScheduleType>,

    #[arg(long)]
    pub time: Option<String>,

    #[arg(long)]
    pub timezone: Option<String>,

    /// Weekday to deliver on; implies a weekly schedule.
    #[arg(long = "day")]
    pub days: Vec<Weekday>,

    #[arg(long)]
    pub start: Option<NaiveDate>,

    #[arg(long)]
    pub end: Option<NaiveDate>,
}

fn parse_var(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got {s:?}")),
    }
}

impl DraftArgs {
    /// The draft file (or a blank form) with the flags applied on top.
    pub fn to_draft(&self, cfg: &Config) -> Result<Draft> {
        let mut draft = match &self.draft {
            Some(path) => Draft::from_file(path, cfg)?,
            None => Draft::new(cfg),
        };

        if !self.emails.is_empty() {
            draft.emails.retain(|e| !e.trim().is_empty());
            for e in &self.emails {
                draft.add_email(e.clone());
            }
        }
        if let Some(t) = &self.title {
            draft.set_email_title(t.clone());
        }
        if let Some(p) = &self.prompt {
            draft.set_prompt(p.clone());
        }
        for (name, value) in &self.vars {
            draft.add_variable_value(name, value.clone())?;
        }

        if let Some(kind) = self.schedule {
            draft.set_schedule_type(kind);
        } else if !self.days.is_empty() {
            draft.set_schedule_type(ScheduleType::Weekly);
        }
        for day in &self.days {
            if !draft.selected_days.contains(day) {
                draft.toggle_day(*day);
            }
        }
        if let Some(t) = &self.time {
            draft.set_time(t.clone());
        }
        if let Some(tz) = &self.timezone {
            draft.set_timezone(tz.clone());
        }
        if self.start.is_some() || self.end.is_some() {
            draft.set_date_range(self.start.or(draft.start_date), self.end.or(draft.end_date));
        }
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn create_flags_build_a_weekly_draft() {
        let args = Args::parse_from([
            "promptcron", "create",
            "--email", "bob@x.com",
            "--title", "{{topic}} digest",
            "--prompt", "News on {{topic}}",
            "--var", "topic=rust",
            "--var", "topic=go",
            "--day", "mon",
            "--day", "Friday",
            "--start", "2024-01-01",
            "--yes",
        ]);
        let Command::Create(create) = args.command else { panic!("expected create") };
        assert!(create.yes);

        let draft = create.draft.to_draft(&Config::default()).unwrap();

        assert_eq!(draft.emails, vec!["bob@x.com".to_string()]);
        assert_eq!(draft.prompt_variables["topic"], vec!["rust".to_string(), "go".to_string()]);
        assert_eq!(draft.schedule_type, ScheduleType::Weekly);
        assert_eq!(draft.selected_days.len(), 2);
        assert_eq!(draft.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert!(draft.validate(true).is_ok());
    }

    #[test]
    fn var_for_unreferenced_name_is_an_error() {
        let args = DraftArgs {
            prompt: Some("plain".into()),
            vars: vec![("ghost".into(), "x".into())],
            ..Default::default()
        };
        assert!(args.to_draft(&Config::default()).is_err());
    }

    #[test]
    fn var_flag_needs_equals() {
        assert!(parse_var("topic").is_err());
        assert!(parse_var("=x").is_err());
        assert_eq!(parse_var("a=b=c").unwrap(), ("a".to_string(), "b=c".to_string()));
    }

    #[test]
    fn list_flags() {
        let args = Args::parse_from(["promptcron", "list", "--search-by", "email", "-q", "bob", "--desc"]);
        let Command::List(list) = args.command else { panic!("expected list") };
        assert_eq!(list.search_by, SearchMode::Email);
        assert_eq!(list.order(), SortOrder::Desc);
    }
}
