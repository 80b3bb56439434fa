use rxkit::RequestError;
use rxkit_errors::ValidationViolation;

const MAX_TEXT: usize = 200;

/// Collects field violations for one input and reports them together.
#[derive(Debug, Default)]
pub struct Violations(Vec<ValidationViolation>);

impl Violations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.0.push(ValidationViolation::new(field, message));
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add(field, message);
        }
    }

    /// Non-blank and at most 200 characters
    pub fn text(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "must not be blank");
        } else if value.chars().count() > MAX_TEXT {
            self.add(field, "must be at most 200 characters");
        }
    }

    pub fn optional_text(&mut self, field: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.text(field, value);
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        self.check(is_email(value), field, "must be an email address");
    }

    pub fn fax(&mut self, field: &str, value: &str) {
        self.check(is_fax_number(value), field, "must be a fax number");
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// # Errors
    /// `InvalidArgument` carrying every collected violation.
    pub fn finish(self) -> Result<(), RequestError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(RequestError::validation(self.0))
        }
    }
}

/// `local@domain.tld` with no whitespace
#[must_use]
pub fn is_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    value.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.contains('@')
            && domain
                .rsplit_once('.')
                .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
    })
}

/// Digits with optional leading `+` and `-`, space or parentheses separators
#[must_use]
pub fn is_fax_number(value: &str) -> bool {
    let value = value.trim();
    let body = value.strip_prefix('+').unwrap_or(value);
    let digits = body.chars().filter(char::is_ascii_digit).count();
    digits >= 7
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | ' ' | '(' | ')'))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_email("billing@riverside.example"));
        assert!(!is_email("billing"));
        assert!(!is_email("@riverside.example"));
        assert!(!is_email("billing@localhost"));
        assert!(!is_email("bill ing@riverside.example"));
    }

    #[test]
    fn fax_shapes() {
        assert!(is_fax_number("+1 (555) 010-2030"));
        assert!(is_fax_number("5550102030"));
        assert!(!is_fax_number("555-01"));
        assert!(!is_fax_number("call me"));
    }

    #[test]
    fn collects_every_violation() {
        let mut v = Violations::new();
        v.text("name", "  ");
        v.email("billingEmail", "nope");
        v.text("code", "ok");
        let err = v.finish().unwrap_err();
        let fields: Vec<_> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, ["name", "billingEmail"]);
    }

    #[test]
    fn clean_input_passes() {
        let mut v = Violations::new();
        v.text("name", "North wing");
        assert!(v.is_empty());
        assert!(v.finish().is_ok());
    }
}
