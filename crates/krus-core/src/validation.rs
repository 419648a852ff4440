use std::collections::BTreeMap;

use thiserror::Error;

/// A failed field check. The `Display` string is the user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("Email is required")]
    EmailRequired,

    #[error("Please enter a valid email address")]
    EmailFormat,

    #[error("Password is required")]
    PasswordRequired,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("Name is required")]
    NameRequired,

    #[error("Name must be at least 2 characters")]
    NameTooShort,

    #[error("Beer name is required")]
    BeerNameRequired,

    #[error("Beer name must be at least 2 characters")]
    BeerNameTooShort,

    #[error("Place is required")]
    PlaceRequired,

    #[error("Place must be at least 2 characters")]
    PlaceTooShort,

    #[error("Rating must be between 1 and 5")]
    RatingOutOfRange,

    #[error("Please select an image")]
    ImageMissing,
}

/// Map from field name to its error message. A missing key means the field
/// is valid; an empty map means the form is valid.
pub type FormErrors = BTreeMap<String, String>;

/// Outcome of a form-level check.
///
/// Validity is derived from the error map, never stored independently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    pub errors: FormErrors,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Message for a single field, if it failed.
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

/// Validator for form input.
///
/// Field checks are pure and synchronous; each reports the first failing
/// rule for its own field. Form composites evaluate every field and merge
/// the failures into a [`FormErrors`] map, so all problems are reported at
/// once.
pub struct Validator;

impl Validator {
    /// Validate an email address.
    /// Required, then must look like `local@domain.tld`: one `@`, at least
    /// one `.` after it, no whitespace. Intentionally shallow; the
    /// authority performs the authoritative check.
    pub fn validate_email(email: &str) -> Result<(), FieldError> {
        if email.is_empty() {
            return Err(FieldError::EmailRequired);
        }
        if !email_shape_ok(email) {
            return Err(FieldError::EmailFormat);
        }
        Ok(())
    }

    /// Validate a password. Required, then at least 6 characters.
    pub fn validate_password(password: &str) -> Result<(), FieldError> {
        if password.is_empty() {
            return Err(FieldError::PasswordRequired);
        }
        if password.chars().count() < 6 {
            return Err(FieldError::PasswordTooShort);
        }
        Ok(())
    }

    /// Validate a display name. Required, then at least 2 characters.
    pub fn validate_name(name: &str) -> Result<(), FieldError> {
        if name.is_empty() {
            return Err(FieldError::NameRequired);
        }
        if name.chars().count() < 2 {
            return Err(FieldError::NameTooShort);
        }
        Ok(())
    }

    /// Validate a beer name. Required, then at least 2 characters.
    pub fn validate_beer_name(beer_name: &str) -> Result<(), FieldError> {
        if beer_name.is_empty() {
            return Err(FieldError::BeerNameRequired);
        }
        if beer_name.chars().count() < 2 {
            return Err(FieldError::BeerNameTooShort);
        }
        Ok(())
    }

    /// Validate a place. Required, then at least 2 characters.
    pub fn validate_place(place: &str) -> Result<(), FieldError> {
        if place.is_empty() {
            return Err(FieldError::PlaceRequired);
        }
        if place.chars().count() < 2 {
            return Err(FieldError::PlaceTooShort);
        }
        Ok(())
    }

    /// Validate a star rating. Must be in 1..=5 inclusive.
    /// The `u8` type already rules out negative and fractional input.
    pub fn validate_rating(rating: u8) -> Result<(), FieldError> {
        if !(1..=5).contains(&rating) {
            return Err(FieldError::RatingOutOfRange);
        }
        Ok(())
    }

    /// Validate image presence. Only existence is checked, never format.
    pub fn validate_image(image_uri: Option<&str>) -> Result<(), FieldError> {
        match image_uri {
            Some(uri) if !uri.is_empty() => Ok(()),
            _ => Err(FieldError::ImageMissing),
        }
    }

    /// Validate a login form. Checks email and password.
    pub fn validate_login_form(email: &str, password: &str) -> ValidationResult {
        let mut result = ValidationResult::default();
        merge(&mut result, "email", Self::validate_email(email));
        merge(&mut result, "password", Self::validate_password(password));
        result
    }

    /// Validate a registration form. Checks name, email, and password.
    pub fn validate_register_form(name: &str, email: &str, password: &str) -> ValidationResult {
        let mut result = ValidationResult::default();
        merge(&mut result, "name", Self::validate_name(name));
        merge(&mut result, "email", Self::validate_email(email));
        merge(&mut result, "password", Self::validate_password(password));
        result
    }

    /// Validate a beer post form. Checks beer name, place, rating, and
    /// image presence.
    pub fn validate_beer_post_form(
        beer_name: &str,
        place: &str,
        rating: u8,
        image_uri: Option<&str>,
    ) -> ValidationResult {
        let mut result = ValidationResult::default();
        merge(&mut result, "beerName", Self::validate_beer_name(beer_name));
        merge(&mut result, "place", Self::validate_place(place));
        merge(&mut result, "rating", Self::validate_rating(rating));
        merge(&mut result, "image", Self::validate_image(image_uri));
        result
    }
}

fn merge(result: &mut ValidationResult, field: &str, check: Result<(), FieldError>) {
    if let Err(e) = check {
        result.errors.insert(field.to_string(), e.to_string());
    }
}

/// Shape check matching `local@domain.tld`: non-empty local part, a single
/// split at the first `@`, a dot in the domain with non-empty segments on
/// both sides, and no whitespace or second `@` anywhere.
fn email_shape_ok(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_email() {
        assert_eq!(Validator::validate_email(""), Err(FieldError::EmailRequired));
    }

    #[test]
    fn test_invalid_email_format() {
        assert_eq!(
            Validator::validate_email("invalid"),
            Err(FieldError::EmailFormat)
        );
        assert_eq!(
            Validator::validate_email("test@"),
            Err(FieldError::EmailFormat)
        );
        assert_eq!(
            Validator::validate_email("@test.com"),
            Err(FieldError::EmailFormat)
        );
        assert_eq!(
            Validator::validate_email("a@b"),
            Err(FieldError::EmailFormat)
        );
        assert_eq!(
            Validator::validate_email("ab.com"),
            Err(FieldError::EmailFormat)
        );
        assert_eq!(
            Validator::validate_email("a b@c.com"),
            Err(FieldError::EmailFormat)
        );
        assert_eq!(
            Validator::validate_email("a@@b.com"),
            Err(FieldError::EmailFormat)
        );
        assert_eq!(
            Validator::validate_email("a@b."),
            Err(FieldError::EmailFormat)
        );
    }

    #[test]
    fn test_valid_email() {
        assert!(Validator::validate_email("a@b.c").is_ok());
        assert!(Validator::validate_email("test@example.com").is_ok());
        assert!(Validator::validate_email("user.name+tag@example.co.uk").is_ok());
    }

    #[test]
    fn test_empty_password() {
        assert_eq!(
            Validator::validate_password(""),
            Err(FieldError::PasswordRequired)
        );
    }

    #[test]
    fn test_short_password() {
        assert_eq!(
            Validator::validate_password("12345"),
            Err(FieldError::PasswordTooShort)
        );
    }

    #[test]
    fn test_valid_password() {
        // 6 characters is the inclusive boundary
        assert!(Validator::validate_password("123456").is_ok());
        assert!(Validator::validate_password("securePassword123").is_ok());
    }

    #[test]
    fn test_name_rules() {
        assert_eq!(Validator::validate_name(""), Err(FieldError::NameRequired));
        assert_eq!(Validator::validate_name("A"), Err(FieldError::NameTooShort));
        assert!(Validator::validate_name("Jo").is_ok());
        assert!(Validator::validate_name("John Doe").is_ok());
    }

    #[test]
    fn test_beer_name_rules() {
        assert_eq!(
            Validator::validate_beer_name(""),
            Err(FieldError::BeerNameRequired)
        );
        assert_eq!(
            Validator::validate_beer_name("A"),
            Err(FieldError::BeerNameTooShort)
        );
        assert!(Validator::validate_beer_name("IPA").is_ok());
    }

    #[test]
    fn test_place_rules() {
        assert_eq!(Validator::validate_place(""), Err(FieldError::PlaceRequired));
        assert_eq!(
            Validator::validate_place("X"),
            Err(FieldError::PlaceTooShort)
        );
        assert!(Validator::validate_place("Local Bar").is_ok());
    }

    #[test]
    fn test_rating_boundaries() {
        assert_eq!(
            Validator::validate_rating(0),
            Err(FieldError::RatingOutOfRange)
        );
        assert_eq!(
            Validator::validate_rating(6),
            Err(FieldError::RatingOutOfRange)
        );
        assert!(Validator::validate_rating(1).is_ok());
        assert!(Validator::validate_rating(5).is_ok());
    }

    #[test]
    fn test_image_presence() {
        assert_eq!(
            Validator::validate_image(None),
            Err(FieldError::ImageMissing)
        );
        assert_eq!(
            Validator::validate_image(Some("")),
            Err(FieldError::ImageMissing)
        );
        assert!(Validator::validate_image(Some("file:///photo.jpg")).is_ok());
    }

    #[test]
    fn test_login_form_reports_all_fields() {
        let result = Validator::validate_login_form("", "");

        assert!(!result.is_valid());
        assert_eq!(result.error("email"), Some("Email is required"));
        assert_eq!(result.error("password"), Some("Password is required"));
    }

    #[test]
    fn test_login_form_valid() {
        let result = Validator::validate_login_form("test@example.com", "123456");
        assert!(result.is_valid());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_register_form_reports_all_fields() {
        let result = Validator::validate_register_form("A", "bad", "123");

        assert!(!result.is_valid());
        assert_eq!(result.error("name"), Some("Name must be at least 2 characters"));
        assert_eq!(result.error("email"), Some("Please enter a valid email address"));
        assert_eq!(
            result.error("password"),
            Some("Password must be at least 6 characters")
        );
    }

    #[test]
    fn test_register_form_valid() {
        let result = Validator::validate_register_form("John", "john@example.com", "123456");
        assert!(result.is_valid());
    }

    #[test]
    fn test_beer_post_form_valid() {
        let result = Validator::validate_beer_post_form("IPA", "Local Bar", 4, Some("uri"));
        assert!(result.is_valid());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_beer_post_form_reports_all_fields() {
        let result = Validator::validate_beer_post_form("", "", 0, None);

        assert!(!result.is_valid());
        assert_eq!(result.errors.len(), 4);
        assert_eq!(result.error("beerName"), Some("Beer name is required"));
        assert_eq!(result.error("place"), Some("Place is required"));
        assert_eq!(result.error("rating"), Some("Rating must be between 1 and 5"));
        assert_eq!(result.error("image"), Some("Please select an image"));
    }

    #[test]
    fn test_field_order_does_not_affect_result() {
        // Every field is evaluated independently; a failure in one never
        // hides a failure in another.
        let result = Validator::validate_beer_post_form("IPA", "", 6, Some("uri"));

        assert_eq!(result.error("beerName"), None);
        assert_eq!(result.error("place"), Some("Place is required"));
        assert_eq!(result.error("rating"), Some("Rating must be between 1 and 5"));
        assert_eq!(result.error("image"), None);
    }
}
