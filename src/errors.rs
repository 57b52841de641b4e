use thiserror::Error;

/// Constraint violated by a draft on submit. `Display` is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please add at least one email address")] NoRecipients,
    #[error("Please fill in all email fields")] BlankRecipient,
    #[error("Invalid email address: {0}")] InvalidRecipient(String),
    #[error("Please enter a prompt")] MissingPrompt,
    #[error("Please enter an email title")] MissingTitle,
    #[error("Invalid time format: {0} (expected HH:MM)")] InvalidTime(String),
    #[error("Please select a timezone")] MissingTimezone,
    #[error("Please select at least one day")] NoDaysSelected,
    #[error("Please add values for: {}", .0.join(", "))] MissingVariableValues(Vec<String>),
    #[error("Start date must be before end date")] DateOrder,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to process response: {0}")]
    Decode(String),
    #[error("invalid api url: {0}")]
    InvalidUrl(String),
}

#[derive(Error, Debug)]
pub enum CronError {
    #[error(transparent)] Validation(#[from] ValidationError),
    #[error(transparent)] Api(#[from] ApiError),
    #[error("config error: {0}")] Config(String),
    #[error("draft error: {0}")] Draft(String),
    #[error("unknown variable: {0}")] UnknownVariable(String),
}

pub type Result<T> = std::result::Result<T, CronError>;
