use crate::error::{ExviewError, ExviewResult};
use exview_models::PageNumber;
use std::collections::BTreeSet;
use validator::{Validate, ValidationErrors};

pub fn validate_models<T: Validate>(models: &[T]) -> ExviewResult<()> {
    for (idx, model) in models.iter().enumerate() {
        if let Err(errors) = model.validate() {
            return Err(ExviewError::validation(
                format!("row {}", idx + 1),
                format_validation_errors(&errors),
            ));
        }
    }
    Ok(())
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = match (&error.message, error.code.as_ref()) {
                (Some(message), _) => message.to_string(),
                (None, "length") => format!("Length validation failed for field '{}'", field),
                (None, "range") => format!("Value out of range for field '{}'", field),
                (None, "required") => format!("Field '{}' is required", field),
                (None, code) => format!("Validation failed for field '{}': {}", field, code),
            };
            messages.push(message);
        }
    }

    messages.sort();
    messages.join(", ")
}

/// Parse a page selection such as `"1,3,5-7"` into sorted, unique page numbers.
///
/// Pages outside `1..=total_pages` and malformed pieces are skipped.
pub fn parse_page_range(input: &str, total_pages: PageNumber) -> Vec<PageNumber> {
    let mut pages = BTreeSet::new();

    for piece in input.split(',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        if let Some((start, end)) = piece.split_once('-') {
            let (Ok(start), Ok(end)) = (start.trim().parse::<PageNumber>(), end.trim().parse::<PageNumber>()) else {
                continue;
            };
            pages.extend((start..=end).filter(|p| (1..=total_pages).contains(p)));
        } else if piece.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(page) = piece.parse::<PageNumber>() {
                if (1..=total_pages).contains(&page) {
                    pages.insert(page);
                }
            }
        }
    }

    pages.into_iter().collect()
}

pub fn validate_file_type(file_name: &str, allowed_types: &[&str]) -> ExviewResult<()> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    if !allowed_types.contains(&extension.to_lowercase().as_str()) {
        return Err(ExviewError::validation(
            "file_type",
            format!("File type '{}' not allowed. Allowed types: {}", extension, allowed_types.join(", ")),
        ));
    }

    Ok(())
}

pub fn validate_file_size(file_size: u64, max_size: u64) -> ExviewResult<()> {
    if file_size > max_size {
        return Err(ExviewError::validation(
            "file_size",
            format!("File size {} bytes exceeds maximum allowed size {} bytes", file_size, max_size),
        ));
    }

    Ok(())
}
