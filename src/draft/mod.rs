use chrono::{NaiveDate, NaiveTime};
use fs_err as fs;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::{CronError, Result, ValidationError};
use crate::template;
use crate::wire::{PromptVariables, Recurrence, ScheduleRecord, ScheduleType, Weekday};

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

/// A schedule being authored, not yet submitted.
///
/// `prompt_variables` always holds exactly the variables found in the prompt
/// and title; every text setter re-reconciles it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Draft {
    pub emails: Vec<String>,
    pub email_title: String,
    pub prompt: String,
    pub prompt_variables: PromptVariables,
    pub schedule_type: ScheduleType,
    pub time: String,
    pub timezone: String,
    pub selected_days: BTreeSet<Weekday>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// On-disk draft; absent keys keep the configured defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DraftFile {
    emails: Option<Vec<String>>,
    email_title: Option<String>,
    prompt: Option<String>,
    prompt_variables: Option<PromptVariables>,
    schedule_type: Option<ScheduleType>,
    time: Option<String>,
    timezone: Option<String>,
    selected_days: Option<BTreeSet<Weekday>>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl DraftFile {
    fn apply(self, draft: &mut Draft) {
        if let Some(v) = self.emails {
            draft.emails = v;
        }
        if let Some(v) = self.email_title {
            draft.email_title = v;
        }
        if let Some(v) = self.prompt {
            draft.prompt = v;
        }
        if let Some(v) = self.prompt_variables {
            draft.prompt_variables = v;
        }
        if let Some(v) = self.schedule_type {
            draft.schedule_type = v;
        }
        if let Some(v) = self.time {
            draft.time = v;
        }
        if let Some(v) = self.timezone {
            draft.timezone = v;
        }
        if let Some(v) = self.selected_days {
            draft.selected_days = v;
        }
        draft.start_date = self.start_date.or(draft.start_date);
        draft.end_date = self.end_date.or(draft.end_date);
    }
}

impl Default for Draft {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Draft {
    pub fn new(cfg: &Config) -> Self {
        Self {
            emails: vec![String::new()],
            email_title: String::new(),
            prompt: String::new(),
            prompt_variables: PromptVariables::new(),
            schedule_type: ScheduleType::Daily,
            time: cfg.default_time.clone(),
            timezone: cfg.default_timezone.clone(),
            selected_days: BTreeSet::new(),
            start_date: None,
            end_date: None,
        }
    }

    /// Load a draft from a `.json`, `.yaml`/`.yml` or `.toml` file on top of
    /// the blank form for `cfg`.
    pub fn from_file(path: &Path, cfg: &Config) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| CronError::Draft(e.to_string()))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let file: DraftFile = match ext.as_str() {
            "json" => serde_json::from_str(&raw).map_err(|e| CronError::Draft(e.to_string()))?,
            "yaml" | "yml" => serde_yaml::from_str(&raw).map_err(|e| CronError::Draft(e.to_string()))?,
            "toml" => toml::from_str(&raw).map_err(|e| CronError::Draft(e.to_string()))?,
            other => return Err(CronError::Draft(format!("unsupported draft format: {other:?}"))),
        };
        let mut draft = Self::new(cfg);
        file.apply(&mut draft);
        draft.sync_variables();
        tracing::debug!(path = %path.display(), variables = ?draft.variables(), "draft loaded");
        Ok(draft)
    }

    /// Back to the blank form.
    pub fn reset(&mut self, cfg: &Config) {
        *self = Self::new(cfg);
    }

    /// Variables currently referenced by prompt or title, in first-seen order.
    pub fn variables(&self) -> Vec<String> {
        template::extract_variables([self.prompt.as_str(), self.email_title.as_str()])
    }

    fn sync_variables(&mut self) {
        let vars = self.variables();
        if template::reconcile(&vars, &mut self.prompt_variables) {
            tracing::trace!(?vars, "variables reconciled");
        }
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
        self.sync_variables();
    }

    pub fn set_email_title(&mut self, title: impl Into<String>) {
        self.email_title = title.into();
        self.sync_variables();
    }

    pub fn add_email(&mut self, email: impl Into<String>) {
        self.emails.push(email.into());
    }

    pub fn set_email(&mut self, index: usize, email: impl Into<String>) -> Result<()> {
        let slot = self
            .emails
            .get_mut(index)
            .ok_or_else(|| CronError::Draft(format!("no email field at index {index}")))?;
        *slot = email.into();
        Ok(())
    }

    pub fn remove_email(&mut self, index: usize) -> Result<String> {
        if index >= self.emails.len() {
            return Err(CronError::Draft(format!("no email field at index {index}")));
        }
        Ok(self.emails.remove(index))
    }

    fn values_mut(&mut self, name: &str) -> Result<&mut Vec<String>> {
        self.prompt_variables
            .get_mut(name)
            .ok_or_else(|| CronError::UnknownVariable(name.to_string()))
    }

    pub fn add_variable_value(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        self.values_mut(name)?.push(value.into());
        Ok(())
    }

    pub fn set_variable_value(&mut self, name: &str, index: usize, value: impl Into<String>) -> Result<()> {
        let slot = self
            .values_mut(name)?
            .get_mut(index)
            .ok_or_else(|| CronError::Draft(format!("no value {index} for variable {name}")))?;
        *slot = value.into();
        Ok(())
    }

    pub fn remove_variable_value(&mut self, name: &str, index: usize) -> Result<String> {
        let values = self.values_mut(name)?;
        if index >= values.len() {
            return Err(CronError::Draft(format!("no value {index} for variable {name}")));
        }
        Ok(values.remove(index))
    }

    /// Select `day` if unselected, otherwise unselect it. Returns whether it is now selected.
    pub fn toggle_day(&mut self, day: Weekday) -> bool {
        if self.selected_days.remove(&day) {
            false
        } else {
            self.selected_days.insert(day);
            true
        }
    }

    pub fn set_schedule_type(&mut self, schedule_type: ScheduleType) {
        self.schedule_type = schedule_type;
    }

    pub fn set_time(&mut self, time: impl Into<String>) {
        self.time = time.into();
    }

    pub fn set_timezone(&mut self, timezone: impl Into<String>) {
        self.timezone = timezone.into();
    }

    pub fn set_date_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.start_date = start;
        self.end_date = end;
    }

    /// Check every submit constraint; the first violation wins.
    pub fn validate(&self, strict_emails: bool) -> std::result::Result<(), ValidationError> {
        if self.emails.is_empty() {
            return Err(ValidationError::NoRecipients);
        }
        if self.emails.iter().any(|e| e.trim().is_empty()) {
            return Err(ValidationError::BlankRecipient);
        }
        if strict_emails {
            if let Some(bad) = self.emails.iter().find(|e| !EMAIL.is_match(e.trim())) {
                return Err(ValidationError::InvalidRecipient(bad.trim().to_string()));
            }
        }
        if self.prompt.trim().is_empty() {
            return Err(ValidationError::MissingPrompt);
        }
        if self.email_title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if NaiveTime::parse_from_str(self.time.trim(), "%H:%M").is_err() {
            return Err(ValidationError::InvalidTime(self.time.clone()));
        }
        if self.timezone.trim().is_empty() {
            return Err(ValidationError::MissingTimezone);
        }
        if self.schedule_type == ScheduleType::Weekly && self.selected_days.is_empty() {
            return Err(ValidationError::NoDaysSelected);
        }

        let missing: Vec<String> = self
            .variables()
            .into_iter()
            .filter(|v| {
                self.prompt_variables
                    .get(v)
                    .map_or(true, |vals| vals.iter().all(|x| x.trim().is_empty()))
            })
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingVariableValues(missing));
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start >= end {
                return Err(ValidationError::DateOrder);
            }
        }
        Ok(())
    }

    /// Validate and assemble the record to submit under `id`.
    pub fn build(&self, id: impl Into<String>, strict_emails: bool) -> std::result::Result<ScheduleRecord, ValidationError> {
        self.validate(strict_emails)?;

        let time = self.time.trim().to_string();
        let timezone = self.timezone.trim().to_string();
        let schedule = match self.schedule_type {
            ScheduleType::Daily => Recurrence::Daily { time, timezone },
            ScheduleType::Weekly => Recurrence::Weekly { time, timezone, days: self.selected_days.clone() },
        };

        let prompt_variables = self
            .prompt_variables
            .iter()
            .map(|(k, vals)| {
                let kept: Vec<String> = vals.iter().filter(|v| !v.trim().is_empty()).cloned().collect();
                (k.clone(), kept)
            })
            .collect();

        Ok(ScheduleRecord {
            id: id.into(),
            emails: self.emails.iter().map(|e| e.trim().to_string()).collect(),
            email_title: self.email_title.clone(),
            prompt: self.prompt.clone(),
            prompt_variables,
            schedule,
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }

    /// Build with a freshly generated identifier.
    pub fn submit(&self, strict_emails: bool) -> std::result::Result<ScheduleRecord, ValidationError> {
        self.build(Uuid::new_v4().to_string(), strict_emails)
    }
}
