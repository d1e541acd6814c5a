//! Request and response bodies.

use serde::{Deserialize, Serialize};

use crate::auth::Signup;
use crate::db::{BlogRecord, BlogWrite, UserRecord};
use crate::error::ApiError;
use crate::types::{Email, UserId};

fn validate_email(email: &str) -> Result<Email, ApiError> {
    let email = Email::new(email.trim());
    if email.as_str().is_empty() {
        return Err(ApiError::bad_request("Email must not be empty"));
    }
    if !email.is_plausible() {
        return Err(ApiError::bad_request("Email is not valid"));
    }
    Ok(email)
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.is_empty() {
        return Err(ApiError::bad_request("Password must not be empty"));
    }
    Ok(())
}

/// Body of `POST /auth/signup` and `POST /user`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignupRequest {
    pub fn validate(self) -> Result<Signup, ApiError> {
        let email = validate_email(&self.email)?;
        validate_password(&self.password)?;
        Ok(Signup {
            name: self.name,
            email,
            password: self.password,
        })
    }
}

/// Body of `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    /// Credentials as presented.
    ///
    /// No shape checks: a malformed email is just an unknown one, and must
    /// fail the same way a wrong password does.
    pub fn into_credentials(self) -> (Email, String) {
        (Email::new(self.email.trim()), self.password)
    }
}

/// OAuth2 password-grant form of `POST /auth/token`.
///
/// `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
}

impl From<TokenForm> for LoginRequest {
    fn from(form: TokenForm) -> Self {
        Self {
            email: form.username,
            password: form.password,
        }
    }
}

/// Body of `POST /blog` and `PUT /blog/{id}`.
#[derive(Debug, Deserialize)]
pub struct BlogRequest {
    pub title: String,
    pub body: String,
}

impl BlogRequest {
    pub fn validate(self) -> Result<BlogWrite, ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::bad_request("Title must not be empty"));
        }
        Ok(BlogWrite {
            title: self.title,
            body: self.body,
        })
    }
}

/// Public user profile. Never carries the password hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// User profile with the blogs they own.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserWithBlogs {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub blogs: Vec<BlogRecord>,
}

impl UserWithBlogs {
    pub fn new(user: UserRecord, blogs: Vec<BlogRecord>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            blogs,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Detail {
    pub detail: String,
}

impl Detail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into() }
    }
}
