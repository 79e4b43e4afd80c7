use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::domain::{
    Employer, EmployerId, Job, JobEdit, JobId, Keyword, KeywordId, Subject, SubjectId,
};
use super::repository::{BoardRepository, RepositoryError};

/// In-memory board storage. Database persistence is an external collaborator;
/// this keeps the service and routes runnable on their own.
#[derive(Default, Clone)]
pub struct InMemoryBoardRepository {
    inner: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    jobs: BTreeMap<JobId, Job>,
    employers: BTreeMap<EmployerId, Employer>,
    subjects: BTreeMap<SubjectId, Subject>,
    keywords: BTreeMap<KeywordId, Keyword>,
    edits: Vec<JobEdit>,
}

impl InMemoryBoardRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BoardRepository for InMemoryBoardRepository {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut tables = self.inner.lock().expect("board mutex poisoned");
        if tables.jobs.contains_key(&job.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    fn update_job(&self, job: Job) -> Result<(), RepositoryError> {
        let mut tables = self.inner.lock().expect("board mutex poisoned");
        if tables.jobs.contains_key(&job.id) {
            tables.jobs.insert(job.id, job);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch_job(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        let tables = self.inner.lock().expect("board mutex poisoned");
        Ok(tables.jobs.get(&id).cloned())
    }

    fn jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        let tables = self.inner.lock().expect("board mutex poisoned");
        Ok(tables.jobs.values().cloned().collect())
    }

    fn insert_employer(&self, employer: Employer) -> Result<Employer, RepositoryError> {
        let mut tables = self.inner.lock().expect("board mutex poisoned");
        if tables.employers.contains_key(&employer.id)
            || tables
                .employers
                .values()
                .any(|existing| existing.slug == employer.slug)
        {
            return Err(RepositoryError::Conflict);
        }
        tables.employers.insert(employer.id, employer.clone());
        Ok(employer)
    }

    fn employer_by_slug(&self, slug: &str) -> Result<Option<Employer>, RepositoryError> {
        let tables = self.inner.lock().expect("board mutex poisoned");
        Ok(tables
            .employers
            .values()
            .find(|employer| employer.slug == slug)
            .cloned())
    }

    fn employers(&self) -> Result<Vec<Employer>, RepositoryError> {
        let tables = self.inner.lock().expect("board mutex poisoned");
        Ok(tables.employers.values().cloned().collect())
    }

    fn insert_subject(&self, subject: Subject) -> Result<Subject, RepositoryError> {
        let mut tables = self.inner.lock().expect("board mutex poisoned");
        if tables.subjects.contains_key(&subject.id)
            || tables
                .subjects
                .values()
                .any(|existing| existing.slug == subject.slug)
        {
            return Err(RepositoryError::Conflict);
        }
        tables.subjects.insert(subject.id, subject.clone());
        Ok(subject)
    }

    fn subject_by_slug(&self, slug: &str) -> Result<Option<Subject>, RepositoryError> {
        let tables = self.inner.lock().expect("board mutex poisoned");
        Ok(tables
            .subjects
            .values()
            .find(|subject| subject.slug == slug)
            .cloned())
    }

    fn subject(&self, id: SubjectId) -> Result<Option<Subject>, RepositoryError> {
        let tables = self.inner.lock().expect("board mutex poisoned");
        Ok(tables.subjects.get(&id).cloned())
    }

    fn subjects(&self) -> Result<Vec<Subject>, RepositoryError> {
        let tables = self.inner.lock().expect("board mutex poisoned");
        Ok(tables.subjects.values().cloned().collect())
    }

    fn insert_keyword(&self, keyword: Keyword) -> Result<Keyword, RepositoryError> {
        let mut tables = self.inner.lock().expect("board mutex poisoned");
        if tables.keywords.contains_key(&keyword.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.keywords.insert(keyword.id, keyword.clone());
        Ok(keyword)
    }

    fn update_keyword(&self, keyword: Keyword) -> Result<(), RepositoryError> {
        let mut tables = self.inner.lock().expect("board mutex poisoned");
        if tables.keywords.contains_key(&keyword.id) {
            tables.keywords.insert(keyword.id, keyword);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch_keyword(&self, id: KeywordId) -> Result<Option<Keyword>, RepositoryError> {
        let tables = self.inner.lock().expect("board mutex poisoned");
        Ok(tables.keywords.get(&id).cloned())
    }

    fn keywords(&self) -> Result<Vec<Keyword>, RepositoryError> {
        let tables = self.inner.lock().expect("board mutex poisoned");
        Ok(tables.keywords.values().cloned().collect())
    }

    fn record_edit(&self, edit: JobEdit) -> Result<(), RepositoryError> {
        let mut tables = self.inner.lock().expect("board mutex poisoned");
        tables.edits.push(edit);
        Ok(())
    }

    fn edits_by(&self, editor: &str, limit: usize) -> Result<Vec<JobEdit>, RepositoryError> {
        let tables = self.inner.lock().expect("board mutex poisoned");
        let mut edits: Vec<JobEdit> = tables
            .edits
            .iter()
            .filter(|edit| edit.editor == editor)
            .cloned()
            .collect();
        edits.sort_by(|a, b| b.edited_at.cmp(&a.edited_at));
        edits.truncate(limit);
        Ok(edits)
    }
}
