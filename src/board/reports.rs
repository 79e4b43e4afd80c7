//! Periodic activity rollups for the board's reports page: which postings are
//! drawing attention and which subjects and employers are the most active.

use std::cmp::Reverse;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::domain::{Employer, Job, JobId, Subject};

const TOP_N: usize = 10;
const WEEK_DAYS: i64 = 7;
const MONTH_DAYS: i64 = 31;
const YEAR_DAYS: i64 = 365;

#[derive(Debug, Clone, Serialize)]
pub struct HotJob {
    pub id: JobId,
    pub title: String,
    pub url: String,
    pub page_views: u64,
    pub posted: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectActivity {
    pub name: String,
    pub slug: String,
    pub job_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployerActivity {
    pub name: String,
    pub slug: String,
    pub job_count: usize,
}

/// Rolling activity windows: the last week and month for hot postings, the
/// last month and year for subject and employer volume.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityReport {
    pub generated_at: DateTime<Utc>,
    pub hot_jobs_week: Vec<HotJob>,
    pub hot_jobs_month: Vec<HotJob>,
    pub subjects_month: Vec<SubjectActivity>,
    pub subjects_year: Vec<SubjectActivity>,
    pub employers_month: Vec<EmployerActivity>,
    pub employers_year: Vec<EmployerActivity>,
}

pub(crate) fn build(
    jobs: &[Job],
    subjects: &[Subject],
    employers: &[Employer],
    today: DateTime<Utc>,
) -> ActivityReport {
    let week = today - Duration::days(WEEK_DAYS);
    let month = today - Duration::days(MONTH_DAYS);
    let year = today - Duration::days(YEAR_DAYS);

    ActivityReport {
        generated_at: today,
        hot_jobs_week: hot_jobs(jobs, week),
        hot_jobs_month: hot_jobs(jobs, month),
        subjects_month: subject_activity(jobs, subjects, month),
        subjects_year: subject_activity(jobs, subjects, year),
        employers_month: employer_activity(jobs, employers, month),
        employers_year: employer_activity(jobs, employers, year),
    }
}

fn hot_jobs(jobs: &[Job], cutoff: DateTime<Utc>) -> Vec<HotJob> {
    let mut hot: Vec<HotJob> = jobs
        .iter()
        .filter(|job| job.is_live() && job.posted >= cutoff)
        .map(|job| HotJob {
            id: job.id,
            title: job.title.clone(),
            url: job.url.clone(),
            page_views: job.page_views,
            posted: job.posted,
        })
        .collect();
    hot.sort_by_key(|job| (Reverse(job.page_views), Reverse(job.posted)));
    hot.truncate(TOP_N);
    hot
}

fn subject_activity(
    jobs: &[Job],
    subjects: &[Subject],
    cutoff: DateTime<Utc>,
) -> Vec<SubjectActivity> {
    let recent: Vec<&Job> = jobs
        .iter()
        .filter(|job| job.is_live() && job.posted >= cutoff)
        .collect();

    let mut activity: Vec<SubjectActivity> = subjects
        .iter()
        .map(|subject| SubjectActivity {
            name: subject.name.clone(),
            slug: subject.slug.clone(),
            job_count: recent
                .iter()
                .filter(|job| job.subjects.contains(&subject.id))
                .count(),
        })
        .filter(|entry| entry.job_count > 0)
        .collect();
    activity.sort_by_key(|entry| (Reverse(entry.job_count), entry.name.clone()));
    activity.truncate(TOP_N);
    activity
}

fn employer_activity(
    jobs: &[Job],
    employers: &[Employer],
    cutoff: DateTime<Utc>,
) -> Vec<EmployerActivity> {
    let recent: Vec<&Job> = jobs
        .iter()
        .filter(|job| job.is_live() && job.posted >= cutoff)
        .collect();

    let mut activity: Vec<EmployerActivity> = employers
        .iter()
        .map(|employer| EmployerActivity {
            name: employer.name.clone(),
            slug: employer.slug.clone(),
            job_count: recent
                .iter()
                .filter(|job| job.employer == Some(employer.id))
                .count(),
        })
        .filter(|entry| entry.job_count > 0)
        .collect();
    activity.sort_by_key(|entry| (Reverse(entry.job_count), entry.name.clone()));
    activity.truncate(TOP_N);
    activity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::domain::{EmployerId, JobType, SubjectId};
    use chrono::TimeZone;

    fn job(id: u64, posted: DateTime<Utc>, views: u64, subject: SubjectId) -> Job {
        Job {
            id: JobId(id),
            title: format!("Job {id}"),
            url: format!("https://example.org/jobs/{id}"),
            description: "A role".to_string(),
            job_type: JobType::FullTime,
            employer: Some(EmployerId(1)),
            subjects: vec![subject],
            contact_name: None,
            contact_email: None,
            creator: "curator".to_string(),
            posted,
            updated: posted,
            published: Some(posted),
            deleted: None,
            page_views: views,
        }
    }

    #[test]
    fn hot_jobs_respect_window_and_view_ordering() {
        let today = Utc.with_ymd_and_hms(2026, 8, 27, 12, 0, 0).unwrap();
        let recent = today - Duration::days(2);
        let stale = today - Duration::days(40);

        let jobs = vec![
            job(1, recent, 5, SubjectId(1)),
            job(2, recent, 50, SubjectId(1)),
            job(3, stale, 900, SubjectId(1)),
        ];

        let report = build(&jobs, &[], &[], today);
        let week_ids: Vec<JobId> = report.hot_jobs_week.iter().map(|j| j.id).collect();
        assert_eq!(week_ids, vec![JobId(2), JobId(1)]);
        assert!(report
            .hot_jobs_month
            .iter()
            .all(|hot| hot.id != JobId(3)));
    }

    #[test]
    fn subject_activity_counts_only_recent_live_jobs() {
        let today = Utc.with_ymd_and_hms(2026, 8, 27, 12, 0, 0).unwrap();
        let recent = today - Duration::days(10);
        let old = today - Duration::days(200);

        let subjects = vec![
            Subject {
                id: SubjectId(1),
                name: "Metadata".to_string(),
                slug: "metadata".to_string(),
                external_id: None,
            },
            Subject {
                id: SubjectId(2),
                name: "Archives".to_string(),
                slug: "archives".to_string(),
                external_id: None,
            },
        ];

        let mut deleted = job(3, recent, 0, SubjectId(2));
        deleted.deleted = Some(today);

        let jobs = vec![
            job(1, recent, 0, SubjectId(1)),
            job(2, old, 0, SubjectId(2)),
            deleted,
        ];

        let report = build(&jobs, &subjects, &[], today);
        assert_eq!(report.subjects_month.len(), 1);
        assert_eq!(report.subjects_month[0].slug, "metadata");

        let year_slugs: Vec<&str> = report
            .subjects_year
            .iter()
            .map(|entry| entry.slug.as_str())
            .collect();
        assert_eq!(year_slugs, vec!["archives", "metadata"]);
    }
}
