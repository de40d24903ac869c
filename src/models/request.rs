//! Request submission and state-transition payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Body of `PUT /upgradeState` and `PUT /degradeState`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateState {
    pub request_id: i32,
    pub user_id: i32,
    #[serde(default)]
    pub comment: String,
}

impl UpdateState {
    /// The comment, or `None` when it is blank.
    pub fn comment(&self) -> Option<&str> {
        let trimmed = self.comment.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Direction of a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Upgrade,
    Degrade,
}

impl Transition {
    pub fn success_message(self) -> &'static str {
        match self {
            Self::Upgrade => "State updated successfully",
            Self::Degrade => "State downgraded successfully",
        }
    }
}

/// A new request assembled from the submission form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRequest {
    pub request_title: String,
    pub user_id: i32,
    pub requester_name: String,
    pub analysis_purpose: String,
    pub requested_finish_date: Option<DateTime<Utc>>,
    pub pic_request: String,
    pub urgent: bool,
    pub requirement_type: i32,
    pub answers: Vec<String>,
    pub remark: String,
    pub docx: Attachment,
    pub excel: Attachment,
}

/// An optional file sent with a new request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attachment {
    pub filename: Option<String>,
    pub content: Option<Vec<u8>>,
}

impl Attachment {
    /// Filename as stored, `""` when none was given.
    pub fn filename(&self) -> &str {
        self.filename.as_deref().unwrap_or_default()
    }

    pub fn content(&self) -> Option<&[u8]> {
        self.content.as_deref()
    }
}

/// Collects multipart text fields into a [`NewRequest`].
#[derive(Debug, Default)]
pub struct NewRequestForm {
    request: NewRequest,
    has_title: bool,
    has_user: bool,
}

impl NewRequestForm {
    /// Apply one named text field. Unknown fields are ignored.
    pub fn set(&mut self, name: &str, value: String) -> Result<(), AppError> {
        let req = &mut self.request;
        match name {
            "requestTitle" => {
                self.has_title = !value.trim().is_empty();
                req.request_title = value;
            }
            "userId" => {
                req.user_id = parse_int(name, &value)?;
                self.has_user = true;
            }
            "requesterName" => req.requester_name = value,
            "analysisPurpose" => req.analysis_purpose = value,
            "requestedFinishDate" => {
                // The form sends "" when no date was picked.
                req.requested_finish_date = DateTime::parse_from_rfc3339(value.trim())
                    .ok()
                    .map(|ts| ts.with_timezone(&Utc));
            }
            "picRequest" => req.pic_request = value,
            "urgent" => req.urgent = parse_bool(&value),
            "requirementType" => req.requirement_type = parse_int(name, &value)?,
            "answers" => {
                if !value.trim().is_empty() {
                    req.answers = serde_json::from_str(&value).map_err(|_| {
                        AppError::Validation("answers must be a JSON array of strings".to_string())
                    })?;
                }
            }
            "remark" => req.remark = value,
            "docxFilename" => {
                req.docx.filename = non_empty(value).or(req.docx.filename.take())
            }
            "excelFilename" => {
                req.excel.filename = non_empty(value).or(req.excel.filename.take())
            }
            _ => {}
        }
        Ok(())
    }

    /// Apply one file part. Returns `false` for fields that carry no attachment.
    ///
    /// An explicit `docxFilename`/`excelFilename` field wins over the part's
    /// own filename, whichever arrives first.
    pub fn attach(&mut self, name: &str, file_name: Option<&str>, content: Vec<u8>) -> bool {
        let attachment = match name {
            "docxAttachment" => &mut self.request.docx,
            "excelAttachment" => &mut self.request.excel,
            _ => return false,
        };
        if attachment.filename.is_none() {
            attachment.filename = file_name.map(str::to_string).and_then(non_empty);
        }
        attachment.content = Some(content);
        true
    }

    /// Finish the form, checking required fields.
    pub fn finish(self) -> Result<NewRequest, AppError> {
        if !self.has_title {
            return Err(AppError::MissingParameter("requestTitle".to_string()));
        }
        if !self.has_user {
            return Err(AppError::MissingParameter("userId".to_string()));
        }
        Ok(self.request)
    }
}

fn parse_int(name: &str, value: &str) -> Result<i32, AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("{name} must be an integer, got '{value}'")))
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "t")
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
