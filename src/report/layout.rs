//! Column layout for each report type.

use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::error::{Error, Result};
use crate::spreadsheet::{Cell, Sheet};
use crate::types::{MovieRecord, UserRecord};

/// Movie report columns
pub const MOVIE_HEADERS: [&str; 9] = [
    "Id",
    "Title",
    "Description",
    "Genre",
    "Price",
    "Add Date",
    "Last Modified Date",
    "Rating",
    "Reviews Count",
];

/// Top users report columns
pub const USER_HEADERS: [&str; 4] = ["User id", "Email", "Reviews Count", "Average Rating"];

pub(super) fn movie_sheet(
    title: &str,
    movies: &[MovieRecord],
    date_format: &str,
) -> Result<Sheet> {
    let mut sheet = Sheet::new(title, MOVIE_HEADERS);
    for movie in movies {
        sheet.push_row(vec![
            Cell::from(movie.id),
            Cell::from(movie.name_native.as_str()),
            Cell::from(movie.description.as_str()),
            Cell::from(movie.genres.as_str()),
            Cell::from(or_zero(movie.price)),
            Cell::from(format_date(&movie.add_date, date_format)?),
            Cell::from(format_date(&movie.last_modified_date, date_format)?),
            Cell::from(or_zero(movie.rating)),
            Cell::from(movie.review_count),
        ]);
    }
    Ok(sheet)
}

pub(super) fn user_sheet(title: &str, users: &[UserRecord]) -> Sheet {
    let mut sheet = Sheet::new(title, USER_HEADERS);
    for user in users {
        sheet.push_row(vec![
            Cell::from(user.id),
            Cell::from(user.email.as_str()),
            Cell::from(user.review_count),
            Cell::from(user.average_rating),
        ]);
    }
    sheet
}

// Specifiers such as %z parse but cannot be rendered without an offset
fn format_date(date: &NaiveDateTime, date_format: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", date.format(date_format)).map_err(|_| Error::Config {
        message: format!("date format {:?} cannot render {}", date_format, date),
        key: Some("report.date_format".to_string()),
    })?;
    Ok(out)
}

// Missing and NaN amounts are reported as 0
pub(super) fn or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| !v.is_nan()).unwrap_or(0.0)
}
