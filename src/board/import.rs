//! Job-export import. Hydrates a repository from the CSV format produced by
//! the board's export tooling, used by the `board report` CLI and test
//! seeding.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use super::domain::{EmployerInput, JobForm, JobType, SubjectInput};
use super::repository::BoardRepository;
use super::service::{BoardError, BoardService};

#[derive(Debug, thiserror::Error)]
pub enum JobImportError {
    #[error("failed to read job export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid job export data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unknown job type '{value}'")]
    UnknownJobType { row: usize, value: String },
    #[error("row {row}: unparseable timestamp '{value}'")]
    BadTimestamp { row: usize, value: String },
    #[error("could not store imported job: {0}")]
    Board(#[from] BoardError),
}

#[derive(Debug, Deserialize)]
struct JobRow {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Url")]
    url: String,
    #[serde(rename = "Description", default)]
    description: String,
    #[serde(rename = "Job Type")]
    job_type: String,
    #[serde(rename = "Employer", default, deserialize_with = "empty_string_as_none")]
    employer: Option<String>,
    #[serde(
        rename = "Employer Slug",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    employer_slug: Option<String>,
    #[serde(rename = "Subjects", default)]
    subjects: String,
    #[serde(rename = "Creator")]
    creator: String,
    #[serde(rename = "Posted At")]
    posted_at: String,
    #[serde(
        rename = "Published At",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    published_at: Option<String>,
    #[serde(rename = "Page Views", default)]
    page_views: u64,
}

pub struct JobCsvImporter;

impl JobCsvImporter {
    pub fn from_path<P, R>(
        path: P,
        service: &BoardService<R>,
    ) -> Result<usize, JobImportError>
    where
        P: AsRef<Path>,
        R: BoardRepository + 'static,
    {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, service)
    }

    pub fn from_reader<I, R>(
        reader: I,
        service: &BoardService<R>,
    ) -> Result<usize, JobImportError>
    where
        I: Read,
        R: BoardRepository + 'static,
    {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut imported = 0;
        for (index, record) in csv_reader.deserialize::<JobRow>().enumerate() {
            let row_number = index + 2; // header occupies row 1
            let row = record?;

            let job_type = parse_job_type(&row.job_type).ok_or(JobImportError::UnknownJobType {
                row: row_number,
                value: row.job_type.clone(),
            })?;
            let posted = parse_timestamp(&row.posted_at).ok_or(JobImportError::BadTimestamp {
                row: row_number,
                value: row.posted_at.clone(),
            })?;
            let published = match &row.published_at {
                Some(raw) => Some(parse_timestamp(raw).ok_or(JobImportError::BadTimestamp {
                    row: row_number,
                    value: raw.clone(),
                })?),
                None => None,
            };

            let employer = match (row.employer, row.employer_slug) {
                (Some(name), Some(slug)) => Some(EmployerInput {
                    name,
                    slug,
                    external_id: None,
                }),
                _ => None,
            };

            let form = JobForm {
                title: row.title,
                url: row.url,
                description: row.description,
                job_type,
                employer,
                subjects: parse_subjects(&row.subjects),
                contact_name: None,
                contact_email: None,
                editor: row.creator,
            };

            service.restore_job(form, posted, published, row.page_views)?;
            imported += 1;
        }

        Ok(imported)
    }
}

fn parse_job_type(value: &str) -> Option<JobType> {
    let normalized: String = value
        .trim()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    match normalized.as_str() {
        "fulltime" => Some(JobType::FullTime),
        "parttime" => Some(JobType::PartTime),
        "contract" => Some(JobType::Contract),
        "temporary" => Some(JobType::Temporary),
        _ => None,
    }
}

/// Subject cells hold `slug:Name` pairs separated by semicolons; slugs come
/// from the export, never generated here.
fn parse_subjects(value: &str) -> Vec<SubjectInput> {
    value
        .split(';')
        .filter_map(|pair| {
            let pair = pair.trim();
            if pair.is_empty() {
                return None;
            }
            let (slug, name) = match pair.split_once(':') {
                Some((slug, name)) => (slug.trim(), name.trim()),
                None => (pair, pair),
            };
            Some(SubjectInput {
                name: name.to_string(),
                slug: slug.to_string(),
                external_id: None,
            })
        })
        .collect()
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc));
    }

    None
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::service::BoardPagination;
    use crate::board::store::InMemoryBoardRepository;
    use std::io::Cursor;
    use std::sync::Arc;

    const EXPORT: &str = "\
Title,Url,Description,Job Type,Employer,Employer Slug,Subjects,Creator,Posted At,Published At,Page Views
Systems Librarian,https://example.org/jobs/1,Keep the ILS running,Full-Time,State Library,state-library,ils:Integrated Library Systems;linux:Linux,edsu,2026-08-01,2026-08-02,44
Archives Intern,https://example.org/jobs/2,Summer appointment,temporary,,,archives:Archives,anarchivist,2026-08-10,,0
";

    fn service() -> BoardService<InMemoryBoardRepository> {
        BoardService::new(
            Arc::new(InMemoryBoardRepository::new()),
            BoardPagination::default(),
        )
    }

    #[test]
    fn imports_published_and_draft_rows() {
        let service = service();
        let imported =
            JobCsvImporter::from_reader(Cursor::new(EXPORT), &service).expect("import succeeds");
        assert_eq!(imported, 2);

        let listing = service.list_jobs(1, None).expect("listing builds");
        assert_eq!(listing.paged.total_count, 1);
        assert_eq!(listing.paged.items[0].title, "Systems Librarian");
        assert_eq!(listing.paged.items[0].page_views, 44);

        let queue = service.curation_queue().expect("queue builds");
        assert_eq!(queue.need_publish, 1);
        assert_eq!(queue.need_employer, 1);
    }

    #[test]
    fn subject_pairs_resolve_to_shared_records() {
        let service = service();
        JobCsvImporter::from_reader(Cursor::new(EXPORT), &service).expect("import succeeds");

        let listing = service
            .list_jobs(1, Some("linux"))
            .expect("subject filter resolves");
        assert_eq!(listing.paged.total_count, 1);
        assert_eq!(
            listing.subject.as_ref().map(|s| s.name.as_str()),
            Some("Linux")
        );
    }

    #[test]
    fn unknown_job_type_is_rejected_with_row_number() {
        let bad = "\
Title,Url,Description,Job Type,Employer,Employer Slug,Subjects,Creator,Posted At,Published At,Page Views
Oddity,https://example.org/x,,gig,,,,nobody,2026-08-01,,0
";
        let service = service();
        let err = JobCsvImporter::from_reader(Cursor::new(bad), &service).unwrap_err();
        match err {
            JobImportError::UnknownJobType { row, value } => {
                assert_eq!(row, 2);
                assert_eq!(value, "gig");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
