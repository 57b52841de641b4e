use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

use promptcron::draft::Draft;
use promptcron::session::{Notice, NoticeLevel};
use promptcron::template;
use promptcron::view::{self, SearchMode, SortOrder};
use promptcron::wire::{ScheduleRecord, ScheduleType};

pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    let _ = io::stdout().flush();
    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        let ans = s.trim().to_lowercase();
        ans == "y" || ans == "yes"
    } else {
        false
    }
}

/// Spinner shown while waiting on the API. Hidden when stderr is not a terminal.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()));
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn print_notices(notices: &[Notice]) {
    for n in notices {
        match n.level {
            NoticeLevel::Success => println!("{} {}", "✔".green().bold(), n.message),
            NoticeLevel::Warning => eprintln!("{} {}", "!".yellow().bold(), n.message),
            NoticeLevel::Error => eprintln!("{} {}", "✖".red().bold(), n.message),
        }
    }
}

pub fn show_draft(draft: &Draft) {
    println!("\n=== NEW SCHEDULE ===");
    println!("{} {}", "Title:".bold(), draft.email_title);
    println!("{} {}", "Recipients:".bold(), draft.emails.join(", "));
    println!("{} {}", "Prompt:".bold(), draft.prompt);

    let vars = draft.variables();
    if !vars.is_empty() {
        println!("{}", "Variable values:".bold());
        for v in vars {
            let values = draft.prompt_variables.get(&v).cloned().unwrap_or_default();
            let shown = if values.is_empty() { "(none)".dimmed().to_string() } else { values.join(", ") };
            println!("  {}: {}", v.cyan(), shown);
        }
    }

    let when = match draft.schedule_type {
        ScheduleType::Daily => format!("Daily at {} ({})", draft.time, draft.timezone),
        ScheduleType::Weekly => {
            let days: Vec<&str> = draft.selected_days.iter().map(|d| d.as_str()).collect();
            format!("Weekly on {} at {} ({})", days.join(", "), draft.time, draft.timezone)
        }
    };
    println!("{} {}", "Schedule:".bold(), when);
    if let Some(s) = draft.start_date {
        println!("{} {}", "Starts:".bold(), s);
    }
    if let Some(e) = draft.end_date {
        println!("{} {}", "Ends:".bold(), e);
    }
    println!();
}

pub fn print_preview(draft: &Draft) {
    let rendered = template::expand(&draft.email_title, &draft.prompt, &draft.prompt_variables);
    if rendered.is_empty() {
        println!("{}", "(no variable values to render)".dimmed());
        return;
    }
    for (i, r) in rendered.iter().enumerate() {
        println!("{}. {}={}", i + 1, r.variable.cyan().bold(), r.value);
        println!("   {} {}", "Title:".bold(), r.email_title);
        println!("   {} {}", "Prompt:".bold(), r.prompt);
    }
}

pub fn print_schedules(records: &[ScheduleRecord], mode: SearchMode, query: &str, order: SortOrder) {
    if records.is_empty() {
        println!("{}", "No schedules created yet. Create your first schedule with `promptcron create`.".dimmed());
        return;
    }

    let shown = view::filter_and_sort(records, mode, query, order);
    let by = match mode {
        SearchMode::Title => "title",
        SearchMode::Email => "email",
    };
    println!(
        "\n{}  {} of {}  (search by {}{})  Title {}",
        "=== SCHEDULES ===".bold(),
        shown.len(),
        records.len(),
        by,
        if query.is_empty() { String::new() } else { format!(": {query:?}") },
        order.arrow()
    );

    for r in shown {
        println!("\n{}  {}", r.email_title.bold(), format!("[{}]", r.id).dimmed());
        println!("  {}", r.emails.iter().map(|e| e.blue().to_string()).collect::<Vec<_>>().join(" "));
        println!("  {}", view::schedule_text(r));
        println!("  {} {}", "Prompt:".bold(), r.prompt);
        if !r.prompt_variables.is_empty() {
            println!("  {}", "Variables:".bold());
            for (name, values) in &r.prompt_variables {
                println!("    - {}: {}", name.cyan(), values.join(", "));
            }
        }
    }
    println!();
}
