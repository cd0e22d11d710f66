//! Pre-flight field checks, run before any job is created

pub const ERROR_LOGIN_FIELDS: &str = "You can't login without an email and password.";
pub const ERROR_REGISTRATION_FIELDS: &str = "All fields are required.";
pub const ERROR_PASSWORDS_MUST_MATCH: &str = "Passwords must match.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationVerdict {
    Valid,
    Invalid { message: String },
}

impl ValidationVerdict {
    fn invalid(message: &str) -> Self {
        Self::Invalid {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[derive(Debug, Clone, Copy)]
pub struct LoginFields<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl<'a> LoginFields<'a> {
    #[must_use]
    pub fn new(email: &'a str, password: &'a str) -> Self {
        Self { email, password }
    }

    #[must_use]
    pub fn validate(&self) -> ValidationVerdict {
        if blank(self.email) || blank(self.password) {
            return ValidationVerdict::invalid(ERROR_LOGIN_FIELDS);
        }
        ValidationVerdict::Valid
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RegistrationFields<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
}

impl<'a> RegistrationFields<'a> {
    #[must_use]
    pub fn new(
        email: &'a str,
        username: &'a str,
        password: &'a str,
        confirm_password: &'a str,
    ) -> Self {
        Self {
            email,
            username,
            password,
            confirm_password,
        }
    }

    #[must_use]
    pub fn validate(&self) -> ValidationVerdict {
        if [self.email, self.username, self.password, self.confirm_password]
            .into_iter()
            .any(blank)
        {
            return ValidationVerdict::invalid(ERROR_REGISTRATION_FIELDS);
        }
        if self.password != self.confirm_password {
            return ValidationVerdict::invalid(ERROR_PASSWORDS_MUST_MATCH);
        }
        ValidationVerdict::Valid
    }
}
