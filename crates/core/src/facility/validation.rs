//! Field rules for every entity a caller can submit.
//!
//! Each function reports all broken rules at once rather than stopping at
//! the first one. Lengths count characters, except passwords which count
//! bytes.

use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;

use super::error::ValidationErrors;
use super::requests::{NewComment, NewFacility, NewSpace, NewUser};
use super::types::{Facility, TaskDetails};

static EMAIL_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

static TIMESTAMP_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$").expect("timestamp pattern is valid")
});

const REQUIRED: &str = "Field is required";

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RX.is_match(email)
}

/// Matches `YYYY-MM-DDTHH:MM:SSZ` and names a real instant.
pub fn is_valid_timestamp(value: &str) -> bool {
    TIMESTAMP_RX.is_match(value) && DateTime::parse_from_rfc3339(value).is_ok()
}

fn chars(value: &str) -> usize {
    value.chars().count()
}

fn check_required(errors: &mut ValidationErrors, value: &str, field: &'static str) -> bool {
    let present = !value.trim().is_empty();
    errors.check(present, field, REQUIRED);
    present
}

fn check_length(
    errors: &mut ValidationErrors,
    value: &str,
    field: &'static str,
    label: &str,
    min: usize,
    max: usize,
) {
    if !check_required(errors, value, field) {
        return;
    }
    let len = chars(value);
    errors.check(
        len >= min,
        field,
        format!("{label} must be at least {min} characters long"),
    );
    errors.check(
        len <= max,
        field,
        format!("{label} must not be more than {max} characters long"),
    );
}

fn check_email(errors: &mut ValidationErrors, value: &str, field: &'static str) {
    if check_required(errors, value, field) {
        errors.check(
            is_valid_email(value),
            field,
            "Email must be in the correct email format",
        );
    }
}

fn check_coordinate(errors: &mut ValidationErrors, value: &str, field: &'static str, label: &str) {
    if !check_required(errors, value, field) {
        return;
    }
    match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => {
            errors.check(
                n >= 0.0,
                field,
                format!("{label} must be equal to or greater than 0"),
            );
            errors.check(
                n <= 100.0,
                field,
                format!("{label} must be equal to or less than 100"),
            );
        }
        _ => errors.add(field, format!("{label} must be a number")),
    }
}

pub fn validate_password(errors: &mut ValidationErrors, password: &str) {
    if password.is_empty() {
        errors.add("password", REQUIRED);
        return;
    }
    errors.check(
        password.len() >= 8,
        "password",
        "Password must be at least 8 bytes long",
    );
    errors.check(
        password.len() <= 72,
        "password",
        "Password must not be more than 72 bytes long",
    );
}

pub fn validate_new_user(user: &NewUser) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    check_length(&mut errors, &user.name, "name", "Name", 5, 50);
    errors.check(
        user.name.split_whitespace().count() >= 2,
        "name",
        "Must contain two names separated by whitespace",
    );
    check_email(&mut errors, &user.email, "email");
    validate_password(&mut errors, &user.password);

    errors.into_result()
}

pub fn validate_new_facility(facility: &NewFacility) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    check_length(&mut errors, &facility.name, "name", "Name", 2, 50);
    check_length(&mut errors, &facility.address, "address", "Address", 6, 100);
    check_length(&mut errors, &facility.city, "city", "City", 3, 100);
    check_required(&mut errors, &facility.image_url, "imageUrl");
    check_email(&mut errors, &facility.creator, "creator");
    errors.check(
        !facility.owners.is_empty(),
        "owners",
        "Must contain at least one owner",
    );
    errors.check(
        facility.owners.iter().all(|owner| is_valid_email(owner)),
        "owners",
        "Owners must be valid email addresses",
    );

    errors.into_result()
}

pub fn validate_new_space(space: &NewSpace) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    check_length(&mut errors, &space.name, "name", "Name", 2, 50);
    check_length(&mut errors, &space.location, "location", "Location", 6, 100);

    errors.into_result()
}

/// Checks a task's editable fields against the facility it belongs to.
///
/// The assignee must already be one of the facility's maintainers and the
/// asset one of its assets.
pub fn validate_task(details: &TaskDetails, facility: &Facility) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    check_length(&mut errors, &details.title, "title", "Title", 5, 100);
    errors.check(
        chars(&details.description) <= 500,
        "description",
        "Description must not be more than 500 characters long",
    );

    let start_ok = check_required(&mut errors, &details.start_date, "startDate");
    let start_ok = start_ok && is_valid_timestamp(&details.start_date);
    if !details.start_date.trim().is_empty() {
        errors.check(start_ok, "startDate", "Invalid datetime format");
    }
    let end_ok = check_required(&mut errors, &details.end_date, "endDate");
    let end_ok = end_ok && is_valid_timestamp(&details.end_date);
    if !details.end_date.trim().is_empty() {
        errors.check(end_ok, "endDate", "Invalid datetime format");
    }
    if start_ok && end_ok {
        // Fixed-width UTC timestamps order lexicographically.
        errors.check(
            details.start_date <= details.end_date,
            "endDate",
            "Invalid datetime range",
        );
    }

    check_coordinate(&mut errors, &details.coord_x, "coordX", "CoordX");
    check_coordinate(&mut errors, &details.coord_y, "coordY", "CoordY");

    if let Some(assignee) = &details.assignee {
        errors.check(
            facility.is_maintainer(assignee),
            "assignee",
            "Assignee must be a maintainer in the facility",
        );
    }
    if let Some(asset) = &details.asset {
        errors.check(
            facility.has_asset(asset),
            "asset",
            "Asset must be registered in the facility",
        );
    }

    errors.into_result()
}

pub fn validate_new_comment(comment: &NewComment) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    check_length(&mut errors, &comment.text, "text", "Text", 5, 500);
    check_email(&mut errors, &comment.author_email, "authorEmail");

    errors.into_result()
}

pub fn validate_asset_name(name: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check_length(&mut errors, name, "asset", "Asset name", 1, 100);
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::facility::types::{Role, TaskStatus};

    fn facility() -> Facility {
        Facility {
            id: Uuid::new_v4(),
            name: "Plant".to_string(),
            address: "1 Main Street".to_string(),
            city: "Springfield".to_string(),
            image_url: "https://img/plant.png".to_string(),
            creator: "bob@x.com".to_string(),
            owners: BTreeSet::from(["bob@x.com".to_string()]),
            maintainers: BTreeSet::from(["alice@x.com".to_string()]),
            assets: BTreeMap::from([("Pump-1".to_string(), Utc::now())]),
        }
    }

    fn details() -> TaskDetails {
        TaskDetails {
            title: "Fix the pump".to_string(),
            description: "Leaking seal".to_string(),
            start_date: "2024-06-01T08:00:00Z".to_string(),
            end_date: "2024-06-02T08:00:00Z".to_string(),
            coord_x: "12.5".to_string(),
            coord_y: "100".to_string(),
            status: TaskStatus::InProgress,
            assignee: Some("alice@x.com".to_string()),
            asset: Some("Pump-1".to_string()),
        }
    }

    fn new_user() -> NewUser {
        NewUser {
            name: "Alice Smith".to_string(),
            email: "alice@x.com".to_string(),
            role: Role::Maintainer,
            password: "pa55word".to_string(),
        }
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("alice@x.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@"));
        assert!(!is_valid_email("@x.com"));
    }

    #[test]
    fn test_timestamp_pattern() {
        assert!(is_valid_timestamp("2024-06-01T08:00:00Z"));
        assert!(!is_valid_timestamp("2024-06-01 08:00:00"));
        assert!(!is_valid_timestamp("2024-06-01T08:00:00+02:00"));
        assert!(!is_valid_timestamp("2024-13-01T08:00:00Z"));
    }

    #[test]
    fn test_valid_user_passes() {
        assert!(validate_new_user(&new_user()).is_ok());
    }

    #[test]
    fn test_user_reports_every_broken_field() {
        let user = NewUser {
            name: "Al".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            ..new_user()
        };

        let errors = validate_new_user(&user).unwrap_err();

        assert_eq!(errors.len(), 3);
        assert!(errors.contains("name"));
        assert!(errors.contains("email"));
        assert!(errors.contains("password"));
    }

    #[test]
    fn test_user_name_needs_two_words() {
        let user = NewUser {
            name: "Alexander".to_string(),
            ..new_user()
        };
        let errors = validate_new_user(&user).unwrap_err();
        assert_eq!(
            errors.get("name"),
            Some("Must contain two names separated by whitespace")
        );
    }

    #[test]
    fn test_password_counts_bytes() {
        let mut errors = ValidationErrors::new();
        validate_password(&mut errors, &"é".repeat(37));
        assert_eq!(
            errors.get("password"),
            Some("Password must not be more than 72 bytes long")
        );
    }

    #[test]
    fn test_facility_bounds() {
        let facility = NewFacility {
            name: "P".to_string(),
            address: "short".to_string(),
            city: "NY".to_string(),
            image_url: String::new(),
            creator: "bob@x.com".to_string(),
            owners: BTreeSet::new(),
            maintainers: BTreeSet::new(),
        };

        let errors = validate_new_facility(&facility).unwrap_err();

        assert_eq!(
            errors.get("name"),
            Some("Name must be at least 2 characters long")
        );
        assert!(errors.contains("address"));
        assert!(errors.contains("city"));
        assert_eq!(errors.get("imageUrl"), Some(REQUIRED));
        assert_eq!(errors.get("owners"), Some("Must contain at least one owner"));
        assert!(!errors.contains("creator"));
    }

    #[test]
    fn test_space_bounds() {
        let space = NewSpace {
            facility_id: Uuid::new_v4(),
            name: "Boiler room".to_string(),
            location: "x".repeat(101),
            schema_url: String::new(),
        };

        let errors = validate_new_space(&space).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("location"),
            Some("Location must not be more than 100 characters long")
        );
    }

    #[test]
    fn test_valid_task_passes() {
        assert!(validate_task(&details(), &facility()).is_ok());
    }

    #[test]
    fn test_task_assignee_must_be_maintainer() {
        let task = TaskDetails {
            assignee: Some("carol@x.com".to_string()),
            ..details()
        };

        let errors = validate_task(&task, &facility()).unwrap_err();

        assert_eq!(
            errors.get("assignee"),
            Some("Assignee must be a maintainer in the facility")
        );
    }

    #[test]
    fn test_task_asset_must_exist() {
        let task = TaskDetails {
            asset: Some("Pump-2".to_string()),
            ..details()
        };
        let errors = validate_task(&task, &facility()).unwrap_err();
        assert!(errors.contains("asset"));
    }

    #[test]
    fn test_task_without_assignee_or_asset_passes() {
        let task = TaskDetails {
            assignee: None,
            asset: None,
            status: TaskStatus::Unassigned,
            ..details()
        };
        assert!(validate_task(&task, &facility()).is_ok());
    }

    #[test]
    fn test_task_dates() {
        let reversed = TaskDetails {
            start_date: "2024-06-03T08:00:00Z".to_string(),
            ..details()
        };
        let errors = validate_task(&reversed, &facility()).unwrap_err();
        assert_eq!(errors.get("endDate"), Some("Invalid datetime range"));

        let malformed = TaskDetails {
            start_date: "2024-06-03".to_string(),
            end_date: String::new(),
            ..details()
        };
        let errors = validate_task(&malformed, &facility()).unwrap_err();
        assert_eq!(errors.get("startDate"), Some("Invalid datetime format"));
        assert_eq!(errors.get("endDate"), Some(REQUIRED));
    }

    #[test]
    fn test_task_coordinates() {
        let task = TaskDetails {
            coord_x: "-1".to_string(),
            coord_y: "north".to_string(),
            ..details()
        };

        let errors = validate_task(&task, &facility()).unwrap_err();

        assert_eq!(
            errors.get("coordX"),
            Some("CoordX must be equal to or greater than 0")
        );
        assert_eq!(errors.get("coordY"), Some("CoordY must be a number"));
    }

    #[test]
    fn test_task_title_and_description() {
        let task = TaskDetails {
            title: "Fix".to_string(),
            description: "d".repeat(501),
            ..details()
        };
        let errors = validate_task(&task, &facility()).unwrap_err();
        assert!(errors.contains("title"));
        assert!(errors.contains("description"));
    }

    #[test]
    fn test_comment_text_bounds() {
        let comment = NewComment {
            facility_id: Uuid::new_v4(),
            space_id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            text: "ok".to_string(),
            created_at: Utc::now(),
            author_email: "alice@x.com".to_string(),
            author_name: "Alice Smith".to_string(),
        };
        let errors = validate_new_comment(&comment).unwrap_err();
        assert_eq!(
            errors.get("text"),
            Some("Text must be at least 5 characters long")
        );

        let comment = NewComment {
            text: "Seal replaced".to_string(),
            ..comment
        };
        assert!(validate_new_comment(&comment).is_ok());
    }

    #[test]
    fn test_asset_name() {
        assert!(validate_asset_name("Pump-1").is_ok());
        assert!(validate_asset_name("  ").is_err());
        assert!(validate_asset_name(&"a".repeat(101)).is_err());
    }
}
