use super::domain::{
    Employer, Job, JobEdit, JobId, Keyword, KeywordId, Subject, SubjectId,
};

/// Storage abstraction so the board service can be exercised in isolation.
/// The service does its own filtering and ordering; implementations only need
/// to hand back snapshots.
pub trait BoardRepository: Send + Sync {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError>;
    fn update_job(&self, job: Job) -> Result<(), RepositoryError>;
    fn fetch_job(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;
    fn jobs(&self) -> Result<Vec<Job>, RepositoryError>;

    fn insert_employer(&self, employer: Employer) -> Result<Employer, RepositoryError>;
    fn employer_by_slug(&self, slug: &str) -> Result<Option<Employer>, RepositoryError>;
    fn employers(&self) -> Result<Vec<Employer>, RepositoryError>;

    fn insert_subject(&self, subject: Subject) -> Result<Subject, RepositoryError>;
    fn subject_by_slug(&self, slug: &str) -> Result<Option<Subject>, RepositoryError>;
    fn subject(&self, id: SubjectId) -> Result<Option<Subject>, RepositoryError>;
    fn subjects(&self) -> Result<Vec<Subject>, RepositoryError>;

    fn insert_keyword(&self, keyword: Keyword) -> Result<Keyword, RepositoryError>;
    fn update_keyword(&self, keyword: Keyword) -> Result<(), RepositoryError>;
    fn fetch_keyword(&self, id: KeywordId) -> Result<Option<Keyword>, RepositoryError>;
    fn keywords(&self) -> Result<Vec<Keyword>, RepositoryError>;

    fn record_edit(&self, edit: JobEdit) -> Result<(), RepositoryError>;
    fn edits_by(&self, editor: &str, limit: usize) -> Result<Vec<JobEdit>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
