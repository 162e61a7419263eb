use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::job_dto::{CreateJobPayload, JobListQuery, UpdateJobPayload};
use crate::error::{Error, Result};
use crate::models::job::Job;

#[derive(Clone)]
pub struct JobService {
    pool: PgPool,
}

pub struct JobList {
    pub items: Vec<Job>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterArg {
    Text(String),
    Id(Uuid),
}

/// WHERE clause and positional arguments for a job listing. Only open jobs
/// are visible, except a recruiter's own postings.
#[derive(Debug, Clone, PartialEq)]
pub struct JobFilter {
    pub where_clause: String,
    pub args: Vec<FilterArg>,
}

/// Substring pattern for `ILIKE` with `%`, `_` and `\` matched literally.
pub fn contains_pattern(input: &str) -> String {
    let mut pattern = String::with_capacity(input.len() + 2);
    pattern.push('%');
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

pub fn build_job_filter(query: &JobListQuery, viewer_id: Uuid) -> JobFilter {
    let mut filters = Vec::new();
    let mut args = Vec::new();

    args.push(FilterArg::Id(viewer_id));
    filters.push(format!("(status = 'open' OR recruiter_id = ${})", args.len()));

    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        args.push(FilterArg::Text(contains_pattern(search)));
        filters.push(format!(
            "(title ILIKE ${n} OR description ILIKE ${n})",
            n = args.len()
        ));
    }
    if let Some(location) = query.location.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        args.push(FilterArg::Text(contains_pattern(location)));
        filters.push(format!("location ILIKE ${}", args.len()));
    }
    if let Some(employment_type) = query.employment_type.as_deref().filter(|s| !s.is_empty()) {
        args.push(FilterArg::Text(employment_type.to_string()));
        filters.push(format!("employment_type = ${}", args.len()));
    }
    if let Some(company_id) = query.company_id {
        args.push(FilterArg::Id(company_id));
        filters.push(format!("company_id = ${}", args.len()));
    }

    JobFilter {
        where_clause: format!("WHERE {}", filters.join(" AND ")),
        args,
    }
}

pub fn page_bounds(page: Option<i64>, per_page: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(20).clamp(1, 100);
    (page, per_page, (page - 1) * per_page)
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, recruiter_id: Uuid, payload: CreateJobPayload) -> Result<Job> {
        let status = payload.status.unwrap_or_else(|| "open".to_string());
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (
                recruiter_id, company_id, title, description, location,
                employment_type, salary_min, salary_max, photo_url, status
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
            RETURNING *
            "#,
        )
        .bind(recruiter_id)
        .bind(payload.company_id)
        .bind(payload.title)
        .bind(payload.description)
        .bind(payload.location)
        .bind(payload.employment_type)
        .bind(payload.salary_min)
        .bind(payload.salary_max)
        .bind(payload.photo_url)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(job_id = %job.id, recruiter_id = %recruiter_id, "job created");
        Ok(job)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(job)
    }

    /// Non-open jobs are only visible to the recruiter who posted them.
    pub async fn get_visible(&self, id: Uuid, viewer_id: Uuid) -> Result<Job> {
        let job = self.get_by_id(id).await?;
        if job.status != "open" && job.recruiter_id != viewer_id {
            return Err(Error::NotFound("Job not found".into()));
        }
        Ok(job)
    }

    pub async fn get_owned(&self, id: Uuid, recruiter_id: Uuid) -> Result<Job> {
        let job = self.get_by_id(id).await?;
        if job.recruiter_id != recruiter_id {
            return Err(Error::Forbidden("You do not own this job".into()));
        }
        Ok(job)
    }

    pub async fn update(&self, id: Uuid, recruiter_id: Uuid, payload: UpdateJobPayload) -> Result<Job> {
        let current = self.get_owned(id, recruiter_id).await?;
        let salary_min = payload.salary_min.or(current.salary_min);
        let salary_max = payload.salary_max.or(current.salary_max);
        if let (Some(min), Some(max)) = (salary_min, salary_max) {
            if min > max {
                return Err(Error::BadRequest("salary_min must not exceed salary_max".into()));
            }
        }

        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET
                company_id = COALESCE($2, company_id),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                location = COALESCE($5, location),
                employment_type = COALESCE($6, employment_type),
                salary_min = COALESCE($7, salary_min),
                salary_max = COALESCE($8, salary_max),
                photo_url = COALESCE($9, photo_url),
                status = COALESCE($10, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.company_id)
        .bind(payload.title)
        .bind(payload.description)
        .bind(payload.location)
        .bind(payload.employment_type)
        .bind(payload.salary_min)
        .bind(payload.salary_max)
        .bind(payload.photo_url)
        .bind(payload.status)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(job_id = %id, status = %job.status, "job updated");
        Ok(job)
    }

    pub async fn delete(&self, id: Uuid, recruiter_id: Uuid) -> Result<()> {
        self.get_owned(id, recruiter_id).await?;
        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::info!(job_id = %id, "job deleted");
        Ok(())
    }

    pub async fn list(&self, query: JobListQuery, viewer_id: Uuid) -> Result<JobList> {
        let (page, per_page, offset) = page_bounds(query.page, query.per_page);
        let filter = build_job_filter(&query, viewer_id);

        let items_query = format!(
            "SELECT * FROM jobs {} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            filter.where_clause,
            filter.args.len() + 1,
            filter.args.len() + 2
        );
        let total_query = format!("SELECT COUNT(*) FROM jobs {}", filter.where_clause);

        let mut items_statement = sqlx::query_as::<_, Job>(&items_query);
        for value in &filter.args {
            items_statement = match value {
                FilterArg::Text(text) => items_statement.bind(text),
                FilterArg::Id(id) => items_statement.bind(id),
            };
        }
        items_statement = items_statement.bind(per_page).bind(offset);
        let items = items_statement.fetch_all(&self.pool).await?;

        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        for value in &filter.args {
            total_statement = match value {
                FilterArg::Text(text) => total_statement.bind(text),
                FilterArg::Id(id) => total_statement.bind(id),
            };
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        let total_pages = ((total as f64) / (per_page as f64)).ceil() as i64;

        Ok(JobList {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_shows_open_jobs_and_own_postings() {
        let viewer = Uuid::new_v4();
        let filter = build_job_filter(&JobListQuery::default(), viewer);
        assert_eq!(filter.where_clause, "WHERE (status = 'open' OR recruiter_id = $1)");
        assert_eq!(filter.args, vec![FilterArg::Id(viewer)]);
    }

    #[test]
    fn filters_are_numbered_in_order() {
        let viewer = Uuid::new_v4();
        let company = Uuid::new_v4();
        let query = JobListQuery {
            search: Some(" rust ".into()),
            location: Some("Berlin".into()),
            employment_type: Some("contract".into()),
            company_id: Some(company),
            ..Default::default()
        };
        let filter = build_job_filter(&query, viewer);
        assert_eq!(
            filter.where_clause,
            "WHERE (status = 'open' OR recruiter_id = $1) AND (title ILIKE $2 OR description ILIKE $2) \
             AND location ILIKE $3 AND employment_type = $4 AND company_id = $5"
        );
        assert_eq!(filter.args[1], FilterArg::Text("%rust%".into()));
        assert_eq!(filter.args[4], FilterArg::Id(company));
    }

    #[test]
    fn blank_search_is_ignored() {
        let query = JobListQuery {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(build_job_filter(&query, Uuid::new_v4()).args.len(), 1);
    }

    #[test]
    fn search_wildcards_are_matched_literally() {
        assert_eq!(contains_pattern("rust"), "%rust%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("c_sharp"), "%c\\_sharp%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");

        let query = JobListQuery {
            search: Some("%".into()),
            location: Some("_".into()),
            ..Default::default()
        };
        let filter = build_job_filter(&query, Uuid::new_v4());
        assert_eq!(filter.args[1], FilterArg::Text("%\\%%".into()));
        assert_eq!(filter.args[2], FilterArg::Text("%\\_%".into()));
    }

    #[test]
    fn pagination_is_clamped() {
        assert_eq!(page_bounds(None, None), (1, 20, 0));
        assert_eq!(page_bounds(Some(0), Some(500)), (1, 100, 0));
        assert_eq!(page_bounds(Some(3), Some(10)), (3, 10, 20));
    }
}
