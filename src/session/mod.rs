use crate::api::ScheduleApi;
use crate::config::Config;
use crate::draft::Draft;
use crate::errors::{CronError, Result};
use crate::view::{self, SearchMode, SortOrder};
use crate::wire::ScheduleRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A user-facing message produced by a session flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Local view of the remote schedules plus the notices raised while
/// changing them. Failed calls leave `records` as they were.
#[derive(Debug)]
pub struct Session<A: ScheduleApi> {
    api: A,
    config: Config,
    records: Vec<ScheduleRecord>,
    notices: Vec<Notice>,
}

impl<A: ScheduleApi> Session<A> {
    pub fn new(api: A, config: Config) -> Self {
        Self { api, config, records: Vec::new(), notices: Vec::new() }
    }

    pub fn records(&self) -> &[ScheduleRecord] {
        &self.records
    }

    /// Drain pending notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn fail(&mut self, context: &str, err: CronError) -> CronError {
        tracing::warn!(error = %err, "{context}");
        self.notices.push(Notice::error(err.to_string()));
        err
    }

    async fn fetch(&mut self) -> Result<()> {
        let records = self.api.list().await?;
        tracing::debug!(count = records.len(), "schedules fetched");
        self.records = records;
        Ok(())
    }

    pub async fn refresh(&mut self) -> Result<()> {
        match self.fetch().await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail("failed to fetch schedules", e)),
        }
    }

    /// Validate `draft`, send it, reset it and re-fetch the list.
    ///
    /// Nothing is sent when validation fails; the draft is only reset once
    /// the create call succeeded.
    pub async fn create(&mut self, draft: &mut Draft) -> Result<ScheduleRecord> {
        let record = match draft.submit(self.config.strict_emails) {
            Ok(r) => r,
            Err(e) => return Err(self.fail("draft rejected", e.into())),
        };

        let created = match self.api.create(&record).await {
            Ok(c) => c,
            Err(e) => return Err(self.fail("failed to create schedule", e.into())),
        };
        tracing::info!(id = %created.id, title = %created.email_title, "schedule created");
        self.notices.push(Notice::success("Schedule created successfully!"));
        draft.reset(&self.config);

        // The create already succeeded; a failed refetch is only a warning.
        if let Err(e) = self.fetch().await {
            tracing::warn!(error = %e, "failed to refresh schedules after create");
            self.notices.push(Notice::warning(format!(
                "Schedule created, but refreshing the list failed: {e}"
            )));
            if !self.records.iter().any(|r| r.id == created.id) {
                self.records.push(created.clone());
            }
        }
        Ok(created)
    }

    /// Delete remotely, then drop the record locally.
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        if let Err(e) = self.api.delete(id).await {
            return Err(self.fail("failed to delete schedule", e.into()));
        }
        self.records.retain(|r| r.id != id);
        tracing::info!(%id, "schedule deleted");
        self.notices.push(Notice::success("Schedule deleted successfully"));
        Ok(())
    }

    pub fn view(&self, mode: SearchMode, query: &str, order: SortOrder) -> Vec<&ScheduleRecord> {
        view::filter_and_sort(&self.records, mode, query, order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ApiError;
    use crate::wire::{PromptVariables, Recurrence};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeApi {
        stored: Mutex<Vec<ScheduleRecord>>,
        fail_list: bool,
        fail_create: bool,
        fail_delete: bool,
        calls: Mutex<Vec<String>>,
    }

    fn boom() -> ApiError {
        ApiError::Status { status: 500, message: "backend down".into() }
    }

    #[async_trait]
    impl ScheduleApi for FakeApi {
        async fn list(&self) -> std::result::Result<Vec<ScheduleRecord>, ApiError> {
            self.calls.lock().unwrap().push("list".into());
            if self.fail_list {
                return Err(boom());
            }
            Ok(self.stored.lock().unwrap().clone())
        }

        async fn create(&self, record: &ScheduleRecord) -> std::result::Result<ScheduleRecord, ApiError> {
            self.calls.lock().unwrap().push("create".into());
            if self.fail_create {
                return Err(boom());
            }
            self.stored.lock().unwrap().push(record.clone());
            Ok(record.clone())
        }

        async fn delete(&self, id: &str) -> std::result::Result<(), ApiError> {
            self.calls.lock().unwrap().push(format!("delete {id}"));
            if self.fail_delete {
                return Err(boom());
            }
            self.stored.lock().unwrap().retain(|r| r.id != id);
            Ok(())
        }
    }

    fn record(id: &str, title: &str) -> ScheduleRecord {
        ScheduleRecord {
            id: id.into(),
            emails: vec!["bob@x.com".into()],
            email_title: title.into(),
            prompt: "hello".into(),
            prompt_variables: PromptVariables::new(),
            schedule: Recurrence::Daily { time: "09:00".into(), timezone: "UTC".into() },
            start_date: None,
            end_date: None,
        }
    }

    fn valid_draft() -> Draft {
        let mut d = Draft::default();
        d.set_email(0, "ann@x.com").unwrap();
        d.set_email_title("Digest");
        d.set_prompt("Summarise the day");
        d
    }

    #[tokio::test]
    async fn create_sends_then_refetches() {
        let mut s = Session::new(FakeApi::default(), Config::default());
        let mut draft = valid_draft();

        let created = s.create(&mut draft).await.unwrap();

        assert_eq!(s.records(), &[created]);
        assert_eq!(*s.api.calls.lock().unwrap(), vec!["create", "list"]);
        assert_eq!(draft, Draft::default());
        assert_eq!(s.take_notices(), vec![Notice::success("Schedule created successfully!")]);
    }

    #[tokio::test]
    async fn failed_refetch_after_create_is_only_a_warning() {
        let api = FakeApi { fail_list: true, ..Default::default() };
        let mut s = Session::new(api, Config::default());
        let mut draft = valid_draft();

        let created = s.create(&mut draft).await.unwrap();

        assert_eq!(s.records(), &[created]);
        assert_eq!(draft, Draft::default());
        let notices = s.take_notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0], Notice::success("Schedule created successfully!"));
        assert_eq!(notices[1].level, NoticeLevel::Warning);
        assert!(notices[1].message.contains("backend down"));
        assert!(!notices.iter().any(Notice::is_error));
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_api() {
        let mut s = Session::new(FakeApi::default(), Config::default());
        let mut draft = valid_draft();
        draft.remove_email(0).unwrap();
        let before = draft.clone();

        let err = s.create(&mut draft).await.unwrap_err();

        assert!(matches!(err, CronError::Validation(_)));
        assert!(s.api.calls.lock().unwrap().is_empty());
        assert_eq!(draft, before);
        let notices = s.take_notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].is_error());
        assert!(notices[0].message.contains("email"));
    }

    #[tokio::test]
    async fn failed_create_keeps_list_and_draft() {
        let api = FakeApi { fail_create: true, ..Default::default() };
        api.stored.lock().unwrap().push(record("1", "Old"));
        let mut s = Session::new(api, Config::default());
        s.refresh().await.unwrap();
        let mut draft = valid_draft();
        let before = draft.clone();

        assert!(s.create(&mut draft).await.is_err());

        assert_eq!(s.records().len(), 1);
        assert_eq!(draft, before);
        assert_eq!(s.take_notices(), vec![Notice::error("backend down")]);
    }

    #[tokio::test]
    async fn failed_delete_keeps_record_and_raises_one_notice() {
        let api = FakeApi { fail_delete: true, ..Default::default() };
        api.stored.lock().unwrap().push(record("1", "Keep me"));
        let mut s = Session::new(api, Config::default());
        s.refresh().await.unwrap();

        assert!(s.delete("1").await.is_err());

        assert_eq!(s.records().len(), 1);
        let notices = s.take_notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].is_error());
    }

    #[tokio::test]
    async fn successful_delete_removes_locally() {
        let api = FakeApi::default();
        api.stored.lock().unwrap().extend([record("1", "A"), record("2", "B")]);
        let mut s = Session::new(api, Config::default());
        s.refresh().await.unwrap();

        s.delete("1").await.unwrap();

        assert_eq!(s.records().iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["2"]);
        assert!(!s.take_notices()[0].is_error());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_list() {
        let api = FakeApi::default();
        api.stored.lock().unwrap().push(record("1", "A"));
        let mut s = Session::new(api, Config::default());
        s.refresh().await.unwrap();

        s.api = FakeApi { fail_list: true, ..Default::default() };
        assert!(s.refresh().await.is_err());
        assert_eq!(s.records().len(), 1);
    }

    #[tokio::test]
    async fn view_filters_loaded_records() {
        let api = FakeApi::default();
        api.stored.lock().unwrap().extend([record("1", "Beta"), record("2", "Alpha")]);
        let mut s = Session::new(api, Config::default());
        s.refresh().await.unwrap();

        let titles: Vec<&str> = s
            .view(SearchMode::Title, "", SortOrder::Asc)
            .into_iter()
            .map(|r| r.email_title.as_str())
            .collect();
        assert_eq!(titles, vec!["Alpha", "Beta"]);
    }
}
