//! Course entity definitions

use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Course {
    #[serde(skip_serializing)]
    pub id: i64,
    pub public_id: String,
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    pub duration_minutes: i64,
    pub category: Category,
    pub instructor: String,
    pub image_url: String,
    pub video_url: String,
    pub notes_url: String,
    pub correction_url: String,
    pub is_published: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl<'r> FromRow<'r, SqliteRow> for Course {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let category: String = row.try_get("category")?;
        Ok(Self {
            id: row.try_get("id")?,
            public_id: row.try_get("public_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            price_cents: row.try_get("price_cents")?,
            duration_minutes: row.try_get("duration_minutes")?,
            category: category
                .parse()
                .map_err(|err: UnknownCategory| sqlx::Error::ColumnDecode {
                    index: "category".to_string(),
                    source: Box::new(err),
                })?,
            instructor: row.try_get("instructor")?,
            image_url: row.try_get("image_url")?,
            video_url: row.try_get("video_url")?,
            notes_url: row.try_get("notes_url")?,
            correction_url: row.try_get("correction_url")?,
            is_published: row.try_get("is_published")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Validated values for a new course row.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    pub duration_minutes: i64,
    pub category: Category,
    pub instructor: String,
    pub image_url: String,
    pub video_url: String,
    pub notes_url: String,
    pub correction_url: String,
    pub is_published: bool,
}

/// Filters for the public catalog listing.
#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    pub category: Option<Category>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Economics,
    Entrepreneurship,
    Business,
    Marketing,
    Finance,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Economics,
        Category::Entrepreneurship,
        Category::Business,
        Category::Marketing,
        Category::Finance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Economics => "Economics",
            Category::Entrepreneurship => "Entrepreneurship",
            Category::Business => "Business",
            Category::Marketing => "Marketing",
            Category::Finance => "Finance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category `{}`", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
