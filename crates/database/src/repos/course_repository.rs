//! Course repository for database operations.

use crate::entities::{Course, CourseFilter, NewCourse};
use crate::types::{new_public_id, timestamp_now, DatabaseError, DatabaseResult};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const COURSE_COLUMNS: &str = "id, public_id, title, description, price_cents, duration_minutes, \
     category, instructor, image_url, video_url, notes_url, correction_url, is_published, \
     created_at, updated_at";

/// Repository for course database operations
#[derive(Clone)]
pub struct CourseRepository {
    pool: SqlitePool,
}

impl CourseRepository {
    /// Create a new course repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a validated course
    pub async fn create(&self, request: &NewCourse) -> DatabaseResult<Course> {
        let now = timestamp_now();
        let course = sqlx::query_as::<_, Course>(&format!(
            "INSERT INTO courses (public_id, title, description, price_cents, duration_minutes, category, \
             instructor, image_url, video_url, notes_url, correction_url, is_published, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COURSE_COLUMNS}"
        ))
        .bind(new_public_id())
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.price_cents)
        .bind(request.duration_minutes)
        .bind(request.category.as_str())
        .bind(&request.instructor)
        .bind(&request.image_url)
        .bind(&request.video_url)
        .bind(&request.notes_url)
        .bind(&request.correction_url)
        .bind(request.is_published)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;
        Ok(course)
    }

    /// Find course by ID
    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(course)
    }

    /// Find course by public ID
    pub async fn find_by_public_id(&self, public_id: &str) -> DatabaseResult<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE public_id = ?"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(course)
    }

    /// Published courses matching the filter, newest first.
    ///
    /// `search` is a case-insensitive substring match over title,
    /// description and instructor. SQLite's `LOWER` only folds ASCII, so the
    /// text match runs on Rust's Unicode lowercasing after the query.
    pub async fn list_published(&self, filter: &CourseFilter) -> DatabaseResult<Vec<Course>> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE is_published = 1"
        ));

        if let Some(category) = filter.category {
            builder.push(" AND category = ").push_bind(category.as_str());
        }

        builder.push(" ORDER BY created_at DESC, id DESC");

        let courses = builder
            .build_query_as::<Course>()
            .fetch_all(&self.pool)
            .await?;

        let needle = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|search| !search.is_empty())
            .map(str::to_lowercase);

        Ok(match needle {
            Some(needle) => courses
                .into_iter()
                .filter(|course| matches_search(course, &needle))
                .collect(),
            None => courses,
        })
    }

    /// Every course regardless of publication, newest first.
    pub async fn list_all(&self) -> DatabaseResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(courses)
    }

    pub async fn set_published(&self, id: i64, published: bool) -> DatabaseResult<Course> {
        let result =
            sqlx::query("UPDATE courses SET is_published = ?, updated_at = ? WHERE id = ?")
                .bind(published)
                .bind(timestamp_now())
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("course {id}")));
        }
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::not_found(format!("course {id}")))
    }

    pub async fn count(&self) -> DatabaseResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn matches_search(course: &Course, needle: &str) -> bool {
    [&course.title, &course.description, &course.instructor]
        .into_iter()
        .any(|field| field.to_lowercase().contains(needle))
}
