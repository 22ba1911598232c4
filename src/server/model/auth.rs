//! Registration parameters and their validation.

use crate::{model::auth::RegisterDto, server::model::user::Role};

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 32;
const PASSWORD_MIN: usize = 8;

/// Validated registration request; the password is still plain text here.
#[derive(Debug, Clone)]
pub struct RegisterParams {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub display_name: String,
    pub phone: Option<String>,
}

impl RegisterParams {
    /// Validates and normalizes a registration request.
    ///
    /// The email is trimmed and lowercased. A missing display name falls back to the
    /// username. `ADMIN` accounts cannot be self-registered.
    ///
    /// # Returns
    /// - `Ok(RegisterParams)` - Valid request
    /// - `Err(String)` - Human readable validation failure
    pub fn from_dto(dto: RegisterDto) -> Result<Self, String> {
        let username = dto.username.trim().to_string();
        if username.len() < USERNAME_MIN
            || username.len() > USERNAME_MAX
            || !username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            return Err(format!(
                "Username must be {}-{} characters of letters, digits, '_' or '.'",
                USERNAME_MIN, USERNAME_MAX
            ));
        }

        let email = dto.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err("Email address is invalid".to_string());
        }

        if dto.password.chars().count() < PASSWORD_MIN {
            return Err(format!(
                "Password must be at least {} characters",
                PASSWORD_MIN
            ));
        }

        let role: Role = dto.role.trim().to_uppercase().parse()?;
        if role == Role::Admin {
            return Err("Admin accounts cannot be registered".to_string());
        }

        let display_name = dto
            .display_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| username.clone());

        let phone = dto
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        Ok(Self {
            username,
            email,
            password: dto.password,
            role,
            display_name,
            phone,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto() -> RegisterDto {
        RegisterDto {
            username: "pho_lover".to_string(),
            email: " Pho@Example.com ".to_string(),
            password: "correct horse".to_string(),
            role: "customer".to_string(),
            display_name: None,
            phone: Some(" ".to_string()),
        }
    }

    /// Tests normalization of a valid registration.
    ///
    /// Expected: lowercased email, username as display name, blank phone dropped
    #[test]
    fn normalizes_valid_request() {
        let params = RegisterParams::from_dto(dto()).unwrap();

        assert_eq!(params.email, "pho@example.com");
        assert_eq!(params.display_name, "pho_lover");
        assert_eq!(params.role, Role::Customer);
        assert!(params.phone.is_none());
    }

    /// Tests the rejection rules for usernames, passwords and roles.
    ///
    /// Expected: Err for each invalid field
    #[test]
    fn rejects_invalid_fields() {
        let mut short = dto();
        short.username = "ab".to_string();
        assert!(RegisterParams::from_dto(short).is_err());

        let mut symbols = dto();
        symbols.username = "pho lover!".to_string();
        assert!(RegisterParams::from_dto(symbols).is_err());

        let mut weak = dto();
        weak.password = "short".to_string();
        assert!(RegisterParams::from_dto(weak).is_err());

        let mut admin = dto();
        admin.role = "ADMIN".to_string();
        assert!(RegisterParams::from_dto(admin).is_err());

        let mut email = dto();
        email.email = "nope".to_string();
        assert!(RegisterParams::from_dto(email).is_err());
    }
}
