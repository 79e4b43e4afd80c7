use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EmployerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for KeywordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Temporary,
}

impl JobType {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::FullTime,
            Self::PartTime,
            Self::Contract,
            Self::Temporary,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FullTime => "Full-Time",
            Self::PartTime => "Part-Time",
            Self::Contract => "Contract",
            Self::Temporary => "Temporary",
        }
    }
}

/// A job posting. Drafts circulate through curation until published; deletion
/// is a tombstone timestamp so the edit trail stays intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub url: String,
    pub description: String,
    pub job_type: JobType,
    pub employer: Option<EmployerId>,
    pub subjects: Vec<SubjectId>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub creator: String,
    pub posted: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub published: Option<DateTime<Utc>>,
    pub deleted: Option<DateTime<Utc>>,
    pub page_views: u64,
}

impl Job {
    pub fn is_live(&self) -> bool {
        self.deleted.is_none()
    }

    pub fn is_published(&self) -> bool {
        self.is_live() && self.published.is_some()
    }

    pub fn is_draft(&self) -> bool {
        self.is_live() && self.published.is_none()
    }

    /// First condition still blocking publication, if any.
    pub fn publish_blocker(&self) -> Option<PublishBlocker> {
        if self.title.trim().is_empty() {
            Some(PublishBlocker::MissingTitle)
        } else if self.url.trim().is_empty() {
            Some(PublishBlocker::MissingUrl)
        } else if self.description.trim().is_empty() {
            Some(PublishBlocker::MissingDescription)
        } else if self.employer.is_none() {
            Some(PublishBlocker::MissingEmployer)
        } else if self.subjects.is_empty() {
            Some(PublishBlocker::MissingSubjects)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishBlocker {
    MissingTitle,
    MissingUrl,
    MissingDescription,
    MissingEmployer,
    MissingSubjects,
}

impl PublishBlocker {
    pub const fn reason(self) -> &'static str {
        match self {
            Self::MissingTitle => "a title is required",
            Self::MissingUrl => "a link to the posting is required",
            Self::MissingDescription => "a description is required",
            Self::MissingEmployer => "an employer must be assigned",
            Self::MissingSubjects => "at least one subject is required",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employer {
    pub id: EmployerId,
    pub name: String,
    pub slug: String,
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub slug: String,
    pub external_id: Option<String>,
}

/// A mined keyword awaiting curation: either promoted into a subject, linked
/// to an existing one, or ignored. The miner that produces keywords is an
/// external collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyword {
    pub id: KeywordId,
    pub name: String,
    pub ignore: bool,
    pub subject: Option<SubjectId>,
    pub jobs: Vec<JobId>,
}

/// One entry in the edit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEdit {
    pub job: JobId,
    pub editor: String,
    pub edited_at: DateTime<Utc>,
}

/// Caller-supplied employer reference; resolved by get-or-create on the slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerInput {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub external_id: Option<String>,
}

/// Caller-supplied subject reference; slugs come from the (external) slugifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectInput {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub external_id: Option<String>,
}

/// Incoming job form for create and update operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobForm {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    pub job_type: JobType,
    #[serde(default)]
    pub employer: Option<EmployerInput>,
    #[serde(default)]
    pub subjects: Vec<SubjectInput>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    pub editor: String,
}
