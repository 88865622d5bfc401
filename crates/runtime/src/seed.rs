//! Sample catalog used by the `seed-catalog` command.

use anyhow::{Context, Result};
use coursehub_catalog::CourseInput;
use coursehub_database::CourseRepository;
use tracing::info;

use crate::BackendServices;

const SAMPLE_PRICE_CENTS: i64 = 500;
const SAMPLE_IMAGE: &str = "/placeholder.svg?height=200&width=300";

// (title, description, instructor, hours, category)
const SAMPLE_COURSES: [(&str, &str, &str, i64, &str); 9] = [
    (
        "Microeconomics Fundamentals",
        "Master supply and demand, market structures, and consumer behavior principles.",
        "Dr. Sarah Mitchell",
        12,
        "Economics",
    ),
    (
        "Starting Your First Business",
        "Complete guide to launching a startup from idea validation to first sales.",
        "Mark Johnson, CEO",
        15,
        "Entrepreneurship",
    ),
    (
        "Macroeconomic Policy Analysis",
        "Understand fiscal policy, monetary policy, and their impact on business.",
        "Prof. David Chen",
        10,
        "Economics",
    ),
    (
        "Digital Marketing for Entrepreneurs",
        "Build your brand and acquire customers through digital marketing strategies.",
        "Lisa Rodriguez",
        8,
        "Marketing",
    ),
    (
        "Financial Markets & Investment",
        "Navigate stock markets, bonds, and investment strategies for business growth.",
        "Robert Kim, CFA",
        14,
        "Finance",
    ),
    (
        "Business Model Innovation",
        "Design and validate profitable business models for the modern economy.",
        "Emma Thompson",
        11,
        "Business",
    ),
    (
        "International Trade Economics",
        "Explore global trade patterns, tariffs, and international business opportunities.",
        "Dr. Ahmed Hassan",
        9,
        "Economics",
    ),
    (
        "Venture Capital & Fundraising",
        "Learn how to raise capital and pitch to investors for your startup.",
        "Jennifer Park, VC",
        7,
        "Finance",
    ),
    (
        "Behavioral Economics",
        "Understand how psychology influences economic decisions and consumer behavior.",
        "Dr. Michael Brown",
        6,
        "Economics",
    ),
];

pub fn sample_courses() -> Vec<CourseInput> {
    SAMPLE_COURSES
        .iter()
        .map(|(title, description, instructor, hours, category)| CourseInput {
            title: (*title).to_string(),
            description: (*description).to_string(),
            price_cents: Some(SAMPLE_PRICE_CENTS),
            duration_minutes: Some(hours * 60),
            category: (*category).to_string(),
            instructor: (*instructor).to_string(),
            image_url: Some(SAMPLE_IMAGE.to_string()),
            ..CourseInput::default()
        })
        .collect()
}

/// Create and publish the sample courses. Does nothing when the catalog
/// already has courses. Returns the number of courses created.
pub async fn seed_catalog(services: &BackendServices) -> Result<usize> {
    let admin = services
        .bootstrap_admin
        .as_ref()
        .context("seeding the catalog requires the bootstrap administrator")?;

    let existing = CourseRepository::new(services.db_pool.clone())
        .count()
        .await
        .context("failed to count courses")?;
    if existing > 0 {
        info!(existing, "catalog already populated; skipping seed");
        return Ok(0);
    }

    let mut created = 0;
    for input in sample_courses() {
        let course = services
            .catalog
            .create_course(admin, input)
            .await
            .context("failed to create sample course")?;
        services
            .catalog
            .set_published(admin, &course.public_id, true)
            .await
            .context("failed to publish sample course")?;
        created += 1;
    }

    info!(created, "sample catalog seeded");
    Ok(created)
}
