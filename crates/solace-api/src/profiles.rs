use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{NaiveDate, Utc};
use solace_db::models::ProfilePatch;
use tracing::info;

use solace_types::api::{Claims, CreateProfileRequest, OnboardingResponse, UpdateProfileRequest};
use solace_types::models::{BadgeKind, Profile};

use crate::achievements;
use crate::convert;
use crate::error::ApiError;
use crate::state::{AppState, run_db};

const MAX_NAME_LEN: usize = 50;
const MIN_AGE: u16 = 13;
const MAX_AGE: u16 = 120;

fn validate_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::BadRequest(format!(
            "display name must be 1 to {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn validate_age(age: Option<u16>) -> Result<Option<i64>, ApiError> {
    match age {
        Some(a) if !(MIN_AGE..=MAX_AGE).contains(&a) => Err(ApiError::BadRequest(format!(
            "age must be between {MIN_AGE} and {MAX_AGE}"
        ))),
        other => Ok(other.map(i64::from)),
    }
}

fn validate_birth_date(dob: Option<NaiveDate>) -> Result<Option<String>, ApiError> {
    match dob {
        Some(d) if d > Utc::now().date_naive() => {
            Err(ApiError::BadRequest("date of birth cannot be in the future".into()))
        }
        other => Ok(other.map(|d| d.to_string())),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// POST /profile (onboarding). Awards the welcome badge.
pub async fn create_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let display_name = validate_name(&req.display_name)?;
    let age = validate_age(req.age)?;
    let dob = validate_birth_date(req.date_of_birth)?;
    let gender = non_blank(req.gender);
    let avatar = non_blank(req.avatar);

    let uid = claims.sub.to_string();
    let row = run_db(&state, move |db| {
        if db.get_profile(&uid)?.is_some() {
            return Ok(None);
        }
        db.create_profile(
            &uid,
            &display_name,
            age,
            gender.as_deref(),
            dob.as_deref(),
            avatar.as_deref(),
        )
        .map(Some)
    })
    .await?
    .ok_or_else(|| ApiError::Conflict("profile already exists".into()))?;

    let new_achievements = achievements::award(&state, claims.sub, BadgeKind::Welcome)
        .await?
        .into_iter()
        .collect();

    info!("Onboarded user {}", claims.username);

    Ok((
        StatusCode::CREATED,
        Json(OnboardingResponse {
            profile: convert::profile(row),
            new_achievements,
        }),
    ))
}

/// GET /profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Profile>, ApiError> {
    let uid = claims.sub.to_string();
    let row = run_db(&state, move |db| db.get_profile(&uid))
        .await?
        .ok_or(ApiError::NotFound("profile"))?;
    Ok(Json(convert::profile(row)))
}

/// PATCH /profile. Only the fields present are changed.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    let patch = ProfilePatch {
        display_name: req.display_name.as_deref().map(validate_name).transpose()?,
        age: validate_age(req.age)?,
        gender: non_blank(req.gender),
        date_of_birth: validate_birth_date(req.date_of_birth)?,
        avatar: non_blank(req.avatar),
    };

    let uid = claims.sub.to_string();
    let row = run_db(&state, move |db| db.update_profile(&uid, &patch))
        .await?
        .ok_or(ApiError::NotFound("profile"))?;
    Ok(Json(convert::profile(row)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(validate_name("  Sam ").unwrap(), "Sam");
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(51)).is_err());
    }

    #[test]
    fn age_and_birth_date_bounds() {
        assert_eq!(validate_age(Some(30)).unwrap(), Some(30));
        assert!(validate_age(Some(9)).is_err());
        assert!(validate_age(Some(121)).is_err());
        assert_eq!(validate_age(None).unwrap(), None);

        let tomorrow = Utc::now().date_naive() + chrono::Duration::days(1);
        assert!(validate_birth_date(Some(tomorrow)).is_err());
    }
}
