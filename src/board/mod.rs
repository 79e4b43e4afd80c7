//! Job-board domain: postings, subject tagging, employer pages, curator
//! workflows, and activity reporting, all paginated through the page-window
//! paginator.

pub mod domain;
pub mod import;
pub mod reports;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;

pub use domain::{
    Employer, EmployerId, EmployerInput, Job, JobEdit, JobForm, JobId, JobType, Keyword,
    KeywordId, PublishBlocker, Subject, SubjectId, SubjectInput,
};
pub use import::{JobCsvImporter, JobImportError};
pub use reports::ActivityReport;
pub use repository::{BoardRepository, RepositoryError};
pub use router::board_router;
pub use service::{
    BoardError, BoardPagination, BoardService, CurationQueue, EmployerDetail, EmployerSummary,
    Feed, JobListing, KeywordSummary, Paged, SubjectSummary,
};
pub use store::InMemoryBoardRepository;
