use crate::ValidationError;

pub const TITLE_MIN_CHARS: usize = 5;
pub const TITLE_MAX_CHARS: usize = 100;
pub const NOTES_MAX_CHARS: usize = 500;

const IMAGE_EXTENSIONS: &[&str] = &[".jpeg", ".jpg", ".png", ".gif"];

pub fn title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    let len = trimmed.chars().count();

    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&len) {
        return Err(ValidationError::TitleLength {
            len,
            min: TITLE_MIN_CHARS,
            max: TITLE_MAX_CHARS,
        });
    }

    Ok(trimmed.to_string())
}

/// Blank notes are treated as absent.
pub fn notes(notes: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(trimmed) = notes.map(str::trim).filter(|notes| !notes.is_empty()) else {
        return Ok(None);
    };

    let len = trimmed.chars().count();
    if len > NOTES_MAX_CHARS {
        return Err(ValidationError::NotesTooLong {
            len,
            max: NOTES_MAX_CHARS,
        });
    }

    Ok(Some(trimmed.to_string()))
}

pub fn images(images: Vec<String>) -> Result<Vec<String>, ValidationError> {
    images.into_iter().map(image).collect()
}

fn image(reference: String) -> Result<String, ValidationError> {
    let has_scheme = ["http://", "https://"]
        .iter()
        .any(|scheme| reference.starts_with(scheme) && reference.len() > scheme.len());
    let has_extension = IMAGE_EXTENSIONS
        .iter()
        .any(|extension| reference.ends_with(extension));

    if has_scheme && has_extension {
        Ok(reference)
    } else {
        Err(ValidationError::InvalidImage(reference))
    }
}

pub fn device_token(token: &str) -> Result<&str, ValidationError> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyDeviceToken);
    }

    Ok(trimmed)
}
