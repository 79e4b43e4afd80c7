use std::cmp::Reverse;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::paginator::{
    Page, PageOutOfRange, PageRange, Paginator, PaginatorConfigError, WindowConfig,
};

use super::domain::{
    Employer, EmployerId, EmployerInput, Job, JobEdit, JobForm, JobId, Keyword, KeywordId,
    PublishBlocker, Subject, SubjectId, SubjectInput,
};
use super::reports::{self, ActivityReport};
use super::repository::{BoardRepository, RepositoryError};

/// How many trail entries a profile page shows.
const RECENT_EDITS: usize = 15;

/// Keywords need more than this many live jobs before the matcher surfaces
/// them for curation.
const MATCHER_MIN_JOBS: usize = 2;

/// Page sizes and window shape for the board's listings.
#[derive(Debug, Clone, Copy)]
pub struct BoardPagination {
    pub job_page_size: usize,
    pub feed_page_size: usize,
    pub panel_page_size: usize,
    pub window: WindowConfig,
}

impl Default for BoardPagination {
    fn default() -> Self {
        Self {
            job_page_size: 20,
            feed_page_size: 25,
            panel_page_size: 25,
            window: WindowConfig::default(),
        }
    }
}

/// One page of results plus everything a pagination control needs.
#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub page: Page,
    pub pages: PageRange,
    pub total_count: usize,
    pub page_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobListing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
    #[serde(flatten)]
    pub paged: Paged<Job>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Feed {
    /// Timestamp of the most recently touched published job, the feed's
    /// freshness watermark.
    pub updated: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub paged: Paged<Job>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectSummary {
    #[serde(flatten)]
    pub subject: Subject,
    pub job_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployerSummary {
    #[serde(flatten)]
    pub employer: Employer,
    pub job_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployerDetail {
    #[serde(flatten)]
    pub employer: Employer,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeywordSummary {
    #[serde(flatten)]
    pub keyword: Keyword,
    pub job_count: usize,
}

/// Snapshot of the two curator queues.
#[derive(Debug, Clone, Serialize)]
pub struct CurationQueue {
    pub need_employer: usize,
    pub need_publish: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_missing_employer: Option<Job>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_draft: Option<Job>,
}

/// Error raised by the board service.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("job {0} not found")]
    JobNotFound(JobId),
    #[error("job {0} has been deleted")]
    JobGone(JobId),
    #[error("unknown subject '{0}'")]
    UnknownSubject(String),
    #[error("unknown employer '{0}'")]
    UnknownEmployer(String),
    #[error("keyword {0} not found")]
    KeywordNotFound(KeywordId),
    #[error("cannot publish yet: {}", .0.reason())]
    PublishBlocked(PublishBlocker),
    #[error("job {0} is published and cannot be deleted")]
    DeletePublished(JobId),
    #[error(transparent)]
    PageOutOfRange(#[from] PageOutOfRange),
    #[error(transparent)]
    Pagination(#[from] PaginatorConfigError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

static JOB_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static EMPLOYER_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static SUBJECT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static KEYWORD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_job_id() -> JobId {
    JobId(JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn next_employer_id() -> EmployerId {
    EmployerId(EMPLOYER_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn next_subject_id() -> SubjectId {
    SubjectId(SUBJECT_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn next_keyword_id() -> KeywordId {
    KeywordId(KEYWORD_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// Service composing the repository seam with the page-window paginator.
pub struct BoardService<R> {
    repository: Arc<R>,
    pagination: BoardPagination,
}

impl<R> BoardService<R>
where
    R: BoardRepository + 'static,
{
    pub fn new(repository: Arc<R>, pagination: BoardPagination) -> Self {
        Self {
            repository,
            pagination,
        }
    }

    pub fn pagination(&self) -> BoardPagination {
        self.pagination
    }

    /// Published jobs, newest first, optionally narrowed to one subject.
    pub fn list_jobs(
        &self,
        page: usize,
        subject_slug: Option<&str>,
    ) -> Result<JobListing, BoardError> {
        let subject = match subject_slug {
            Some(slug) => Some(
                self.repository
                    .subject_by_slug(slug)?
                    .ok_or_else(|| BoardError::UnknownSubject(slug.to_string()))?,
            ),
            None => None,
        };

        let mut jobs = self.published_jobs()?;
        if let Some(subject) = &subject {
            jobs.retain(|job| job.subjects.contains(&subject.id));
        }

        let paged = self.paged(&jobs, self.pagination.job_page_size, page)?;
        Ok(JobListing { subject, paged })
    }

    /// Published jobs for syndication, with the feed's freshness watermark.
    pub fn feed(&self, page: usize) -> Result<Feed, BoardError> {
        let jobs = self.published_jobs()?;
        let updated = jobs.iter().map(|job| job.updated).max();
        let paged = self.paged(&jobs, self.pagination.feed_page_size, page)?;
        Ok(Feed { updated, paged })
    }

    /// Fetch one job. Reading a published posting counts as a page view.
    pub fn job(&self, id: JobId) -> Result<Job, BoardError> {
        let mut job = self
            .repository
            .fetch_job(id)?
            .ok_or(BoardError::JobNotFound(id))?;
        if !job.is_live() {
            return Err(BoardError::JobGone(id));
        }

        if job.is_published() {
            job.page_views += 1;
            self.repository.update_job(job.clone())?;
        }
        Ok(job)
    }

    pub fn create_job(&self, form: JobForm, now: DateTime<Utc>) -> Result<Job, BoardError> {
        let job = self.build_job(form, now, None, 0)?;
        let stored = self.repository.insert_job(job)?;
        self.record_edit(&stored, now)?;
        Ok(stored)
    }

    /// Rehydrate a job from an export, preserving its original timestamps and
    /// view counter. Used by the CSV importer and test seeding.
    pub fn restore_job(
        &self,
        form: JobForm,
        posted: DateTime<Utc>,
        published: Option<DateTime<Utc>>,
        page_views: u64,
    ) -> Result<Job, BoardError> {
        let mut job = self.build_job(form, posted, published, page_views)?;
        job.updated = published.unwrap_or(posted);
        Ok(self.repository.insert_job(job)?)
    }

    pub fn update_job(
        &self,
        id: JobId,
        form: JobForm,
        now: DateTime<Utc>,
    ) -> Result<Job, BoardError> {
        let mut job = self
            .repository
            .fetch_job(id)?
            .ok_or(BoardError::JobNotFound(id))?;
        if !job.is_live() {
            return Err(BoardError::JobGone(id));
        }

        let JobForm {
            title,
            url,
            description,
            job_type,
            employer,
            subjects,
            contact_name,
            contact_email,
            editor,
        } = form;

        job.title = title;
        job.url = url;
        job.description = description;
        job.job_type = job_type;
        job.contact_name = contact_name;
        job.contact_email = contact_email;
        job.employer = match employer {
            Some(input) => Some(self.resolve_employer(input)?),
            None => job.employer,
        };
        job.subjects = self.resolve_subjects(subjects)?;
        job.updated = now;

        self.repository.update_job(job.clone())?;
        self.repository.record_edit(JobEdit {
            job: job.id,
            editor,
            edited_at: now,
        })?;
        Ok(job)
    }

    /// Publish a draft once nothing blocks it. Publishing twice is a no-op.
    pub fn publish_job(
        &self,
        id: JobId,
        editor: &str,
        now: DateTime<Utc>,
    ) -> Result<Job, BoardError> {
        let mut job = self
            .repository
            .fetch_job(id)?
            .ok_or(BoardError::JobNotFound(id))?;
        if !job.is_live() {
            return Err(BoardError::JobGone(id));
        }
        if job.published.is_some() {
            return Ok(job);
        }
        if let Some(blocker) = job.publish_blocker() {
            return Err(BoardError::PublishBlocked(blocker));
        }

        job.published = Some(now);
        job.updated = now;
        self.repository.update_job(job.clone())?;
        self.repository.record_edit(JobEdit {
            job: job.id,
            editor: editor.to_string(),
            edited_at: now,
        })?;
        Ok(job)
    }

    /// Tombstone a draft. Published jobs stay on the record.
    pub fn delete_job(&self, id: JobId, now: DateTime<Utc>) -> Result<(), BoardError> {
        let mut job = self
            .repository
            .fetch_job(id)?
            .ok_or(BoardError::JobNotFound(id))?;
        if !job.is_live() {
            return Err(BoardError::JobGone(id));
        }
        if job.published.is_some() {
            return Err(BoardError::DeletePublished(id));
        }

        job.deleted = Some(now);
        job.updated = now;
        self.repository.update_job(job)?;
        Ok(())
    }

    /// Subjects carrying at least one live job, busiest first.
    pub fn subjects(&self, page: usize) -> Result<Paged<SubjectSummary>, BoardError> {
        let jobs = self.live_jobs()?;
        let mut summaries: Vec<SubjectSummary> = self
            .repository
            .subjects()?
            .into_iter()
            .map(|subject| {
                let job_count = jobs
                    .iter()
                    .filter(|job| job.subjects.contains(&subject.id))
                    .count();
                SubjectSummary { subject, job_count }
            })
            .filter(|summary| summary.job_count > 0)
            .collect();
        summaries.sort_by_key(|summary| (Reverse(summary.job_count), summary.subject.name.clone()));

        self.paged(&summaries, self.pagination.panel_page_size, page)
    }

    /// Employers carrying at least one live job, busiest first.
    pub fn employers(&self, page: usize) -> Result<Paged<EmployerSummary>, BoardError> {
        let jobs = self.live_jobs()?;
        let mut summaries: Vec<EmployerSummary> = self
            .repository
            .employers()?
            .into_iter()
            .map(|employer| {
                let job_count = jobs
                    .iter()
                    .filter(|job| job.employer == Some(employer.id))
                    .count();
                EmployerSummary {
                    employer,
                    job_count,
                }
            })
            .filter(|summary| summary.job_count > 0)
            .collect();
        summaries
            .sort_by_key(|summary| (Reverse(summary.job_count), summary.employer.name.clone()));

        self.paged(&summaries, self.pagination.panel_page_size, page)
    }

    pub fn employer(&self, slug: &str) -> Result<EmployerDetail, BoardError> {
        let employer = self
            .repository
            .employer_by_slug(slug)?
            .ok_or_else(|| BoardError::UnknownEmployer(slug.to_string()))?;
        let mut jobs = self.live_jobs()?;
        jobs.retain(|job| job.employer == Some(employer.id));
        jobs.sort_by_key(|job| (Reverse(job.posted), Reverse(job.id)));

        Ok(EmployerDetail { employer, jobs })
    }

    /// Keywords worth a curator's attention: frequent, not ignored, and not
    /// yet linked to a subject.
    pub fn keyword_matcher(&self, page: usize) -> Result<Paged<KeywordSummary>, BoardError> {
        let jobs = self.live_jobs()?;
        let live_ids: Vec<JobId> = jobs.iter().map(|job| job.id).collect();

        let mut summaries: Vec<KeywordSummary> = self
            .repository
            .keywords()?
            .into_iter()
            .filter(|keyword| !keyword.ignore && keyword.subject.is_none())
            .map(|keyword| {
                let job_count = keyword
                    .jobs
                    .iter()
                    .filter(|id| live_ids.contains(id))
                    .count();
                KeywordSummary { keyword, job_count }
            })
            .filter(|summary| summary.job_count > MATCHER_MIN_JOBS)
            .collect();
        summaries.sort_by_key(|summary| (Reverse(summary.job_count), summary.keyword.name.clone()));

        self.paged(&summaries, self.pagination.panel_page_size, page)
    }

    pub fn ignore_keyword(&self, id: KeywordId) -> Result<Keyword, BoardError> {
        self.modify_keyword(id, |keyword| keyword.ignore = true)
    }

    pub fn unlink_keyword(&self, id: KeywordId) -> Result<Keyword, BoardError> {
        self.modify_keyword(id, |keyword| keyword.subject = None)
    }

    /// Promote a keyword into a subject (creating the subject on first use)
    /// and link the keyword to it.
    pub fn promote_keyword(
        &self,
        id: KeywordId,
        input: SubjectInput,
    ) -> Result<Subject, BoardError> {
        let subject_id = self.resolve_subject(input)?;
        self.modify_keyword(id, |keyword| keyword.subject = Some(subject_id))?;
        let subject = self
            .repository
            .subject(subject_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(subject)
    }

    /// Register a keyword produced by the external miner.
    pub fn register_keyword(&self, name: &str, jobs: Vec<JobId>) -> Result<Keyword, BoardError> {
        let keyword = Keyword {
            id: next_keyword_id(),
            name: name.to_string(),
            ignore: false,
            subject: None,
            jobs,
        };
        Ok(self.repository.insert_keyword(keyword)?)
    }

    pub fn curation_queue(&self) -> Result<CurationQueue, BoardError> {
        let mut jobs = self.live_jobs()?;
        jobs.sort_by_key(|job| (Reverse(job.posted), Reverse(job.id)));

        let missing_employer: Vec<&Job> =
            jobs.iter().filter(|job| job.employer.is_none()).collect();
        let drafts: Vec<&Job> = jobs.iter().filter(|job| job.published.is_none()).collect();

        Ok(CurationQueue {
            need_employer: missing_employer.len(),
            need_publish: drafts.len(),
            next_missing_employer: missing_employer.first().map(|job| (*job).clone()),
            next_draft: drafts.first().map(|job| (*job).clone()),
        })
    }

    pub fn recent_edits(&self, editor: &str) -> Result<Vec<JobEdit>, BoardError> {
        Ok(self.repository.edits_by(editor, RECENT_EDITS)?)
    }

    pub fn activity_report(&self, today: DateTime<Utc>) -> Result<ActivityReport, BoardError> {
        let jobs = self.live_jobs()?;
        let subjects = self.repository.subjects()?;
        let employers = self.repository.employers()?;
        Ok(reports::build(&jobs, &subjects, &employers, today))
    }

    fn build_job(
        &self,
        form: JobForm,
        posted: DateTime<Utc>,
        published: Option<DateTime<Utc>>,
        page_views: u64,
    ) -> Result<Job, BoardError> {
        let JobForm {
            title,
            url,
            description,
            job_type,
            employer,
            subjects,
            contact_name,
            contact_email,
            editor,
        } = form;

        let employer = match employer {
            Some(input) => Some(self.resolve_employer(input)?),
            None => None,
        };
        let subjects = self.resolve_subjects(subjects)?;

        Ok(Job {
            id: next_job_id(),
            title,
            url,
            description,
            job_type,
            employer,
            subjects,
            contact_name,
            contact_email,
            creator: editor,
            posted,
            updated: posted,
            published,
            deleted: None,
            page_views,
        })
    }

    fn resolve_employer(&self, input: EmployerInput) -> Result<EmployerId, BoardError> {
        if let Some(existing) = self.repository.employer_by_slug(&input.slug)? {
            return Ok(existing.id);
        }
        let employer = self.repository.insert_employer(Employer {
            id: next_employer_id(),
            name: input.name,
            slug: input.slug,
            external_id: input.external_id,
        })?;
        Ok(employer.id)
    }

    fn resolve_subject(&self, input: SubjectInput) -> Result<SubjectId, BoardError> {
        if let Some(existing) = self.repository.subject_by_slug(&input.slug)? {
            return Ok(existing.id);
        }
        let subject = self.repository.insert_subject(Subject {
            id: next_subject_id(),
            name: input.name,
            slug: input.slug,
            external_id: input.external_id,
        })?;
        Ok(subject.id)
    }

    fn resolve_subjects(&self, inputs: Vec<SubjectInput>) -> Result<Vec<SubjectId>, BoardError> {
        let mut ids = Vec::with_capacity(inputs.len());
        for input in inputs {
            let id = self.resolve_subject(input)?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    fn modify_keyword<F>(&self, id: KeywordId, apply: F) -> Result<Keyword, BoardError>
    where
        F: FnOnce(&mut Keyword),
    {
        let mut keyword = self
            .repository
            .fetch_keyword(id)?
            .ok_or(BoardError::KeywordNotFound(id))?;
        apply(&mut keyword);
        self.repository.update_keyword(keyword.clone())?;
        Ok(keyword)
    }

    fn record_edit(&self, job: &Job, now: DateTime<Utc>) -> Result<(), BoardError> {
        self.repository.record_edit(JobEdit {
            job: job.id,
            editor: job.creator.clone(),
            edited_at: now,
        })?;
        Ok(())
    }

    fn published_jobs(&self) -> Result<Vec<Job>, BoardError> {
        let mut jobs: Vec<Job> = self
            .repository
            .jobs()?
            .into_iter()
            .filter(Job::is_published)
            .collect();
        jobs.sort_by_key(|job| (Reverse(job.published), Reverse(job.id)));
        Ok(jobs)
    }

    fn live_jobs(&self) -> Result<Vec<Job>, BoardError> {
        Ok(self
            .repository
            .jobs()?
            .into_iter()
            .filter(Job::is_live)
            .collect())
    }

    fn paged<T: Clone>(
        &self,
        snapshot: &[T],
        page_size: usize,
        page: usize,
    ) -> Result<Paged<T>, BoardError> {
        let paginator = Paginator::for_source(snapshot, page_size, self.pagination.window)?;
        let (page, pages) = paginator.paginate(page)?;
        let items = paginator.items(snapshot, &page);

        Ok(Paged {
            items,
            page,
            pages,
            total_count: paginator.total_count(),
            page_count: paginator.page_count(),
        })
    }
}
