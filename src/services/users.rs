use crate::DbConn;
use crate::{
    config::JwtConfig,
    error::{Error, Result, ValidationErrors},
    models::users::{
        AuthResult, LoginUser, NewUser, RegisterUser, TokenPair, UpdateProfile, User,
        UserNutrition,
    },
    queries::{clubs as club_queries, nutrition, users},
    services::{
        clubs,
        jwt::{TokenType, generate_jwt, get_user_id_from_token},
    },
    validation::{
        MAX_FIELD_CHARS, validate_club_name, validate_email, validate_max_chars,
        validate_password, validate_username,
    },
};
use sqlx::Acquire;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Duration;
use secrecy::ExposeSecret;
use std::collections::HashMap;
use uuid::Uuid;

/// Registers a new user, optionally joining (or founding) a club, and issues a token pair.
///
/// Passwords are compared before anything else so a mismatch never touches the database.
pub async fn register_user(
    conn: &mut DbConn,
    register_user: RegisterUser,
    jwt: &JwtConfig,
) -> Result<AuthResult> {
    if register_user.password != register_user.password2 {
        return Err(Error::validation("password2", "Passwords do not match"));
    }

    let username = validate_username(&register_user.username)?;
    let email = register_user.email.trim().to_lowercase();
    validate_email(&email)?;
    validate_password(&register_user.password)?;
    let club_name = match register_user
        .club_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
    {
        Some(name) => Some(validate_club_name(name).map_err(|e| match e {
            Error::Validation(ValidationErrors::Single { message, .. }) => {
                Error::validation("club_name", message)
            }
            other => other,
        })?),
        None => None,
    };

    let (username_taken, email_taken) =
        users::username_or_email_taken(conn, &username, &email).await?;
    if username_taken || email_taken {
        let mut fields = HashMap::new();
        if username_taken {
            fields.insert("username".to_string(), "Username already taken".to_string());
        }
        if email_taken {
            fields.insert("email".to_string(), "Email already in use".to_string());
        }
        return Err(Error::Validation(ValidationErrors::Multiple { fields }));
    }

    let password_hash = hash_password(&register_user.password)?;

    // The account and its club membership are written together or not at all
    let mut tx = conn
        .begin()
        .await
        .map_err(|e| Error::Internal(format!("Failed to begin transaction: {}", e)))?;

    let user = users::create_user(
        &mut tx,
        NewUser {
            username,
            email,
            password_hash,
        },
    )
    .await?;

    if let Some(club_name) = club_name {
        let club = clubs::get_or_create_club(&mut tx, &club_name, user.id).await?;
        club_queries::add_member(&mut tx, club.id, user.id).await?;
    }

    tx.commit()
        .await
        .map_err(|e| Error::Internal(format!("Failed to commit transaction: {}", e)))?;

    let token = issue_tokens(user.id, jwt)?;
    Ok(AuthResult { user, token })
}

/// Authenticates by username and password and issues a token pair.
pub async fn login_user(conn: &mut DbConn, login_user: LoginUser, jwt: &JwtConfig) -> Result<AuthResult> {
    let user = users::get_user_by_username(conn, login_user.username.trim())
        .await?
        .ok_or_else(|| Error::Authentication("Invalid credentials".to_string()))?;

    if !verify_password(&login_user.password, &user.password_hash)? {
        return Err(Error::Authentication("Invalid credentials".to_string()));
    }

    let token = issue_tokens(user.id, jwt)?;
    Ok(AuthResult { user, token })
}

/// Exchanges a valid refresh token for a new access token.
pub fn refresh_access_token(refresh_token: &str, jwt: &JwtConfig) -> Result<String> {
    let secret = jwt.secret.expose_secret();
    let user_id = get_user_id_from_token(refresh_token, secret, TokenType::Refresh)?;
    generate_jwt(
        user_id,
        secret,
        TokenType::Access,
        Duration::minutes(jwt.access_token_expiration_minutes),
    )
}

/// Issues a fresh access/refresh pair for a user.
pub fn issue_tokens(user_id: Uuid, jwt: &JwtConfig) -> Result<TokenPair> {
    let secret = jwt.secret.expose_secret();
    Ok(TokenPair {
        access: generate_jwt(
            user_id,
            secret,
            TokenType::Access,
            Duration::minutes(jwt.access_token_expiration_minutes),
        )?,
        refresh: generate_jwt(
            user_id,
            secret,
            TokenType::Refresh,
            Duration::days(jwt.refresh_token_expiration_days),
        )?,
    })
}

/// Gets a user by ID, failing with NotFound if absent.
pub async fn get_user(conn: &mut DbConn, user_id: Uuid) -> Result<User> {
    users::get_user_by_id(conn, user_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User with ID {} not found", user_id)))
}

/// Applies a partial profile update.
pub async fn update_profile(conn: &mut DbConn, user_id: Uuid, update: UpdateProfile) -> Result<User> {
    check_profile_lengths(&update)?;
    let mut user = get_user(conn, user_id).await?;

    if let Some(age) = update.age {
        if !(0..=150).contains(&age) {
            return Err(Error::validation("age", "Age must be between 0 and 150"));
        }
        user.age = Some(age);
    }
    if let Some(plan_id) = update.nutrition_plan_id {
        if nutrition::get_plan(conn, plan_id).await?.is_none() {
            return Err(Error::validation(
                "nutrition_plan_id",
                format!("Nutrition plan {} does not exist", plan_id),
            ));
        }
        user.nutrition_plan_id = Some(plan_id);
    }
    if update.weight.is_some() {
        user.weight = update.weight;
    }
    if update.height.is_some() {
        user.height = update.height;
    }
    if update.activity_level.is_some() {
        user.activity_level = update.activity_level;
    }
    if let Some(vegan) = update.vegan {
        user.vegan = vegan;
    }
    if let Some(vegetarian) = update.vegetarian {
        user.vegetarian = vegetarian;
    }
    user.targets.merge(update.targets);

    users::update_user(conn, &user).await
}

/// Rejects free-text profile values that do not fit their columns.
fn check_profile_lengths(update: &UpdateProfile) -> Result<()> {
    let texts = [("weight", update.weight.as_deref()), ("height", update.height.as_deref())]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .chain(update.targets.set_fields());

    let mut errors = HashMap::new();
    for (name, value) in texts {
        if let Err(Error::Validation(ValidationErrors::Single { field, message })) =
            validate_max_chars(value, name, MAX_FIELD_CHARS)
        {
            errors.insert(field, message);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(ValidationErrors::Multiple { fields: errors }))
    }
}

/// Nutrient targets of a user plus their assigned plan.
pub async fn get_user_nutrition(conn: &mut DbConn, user_id: Uuid) -> Result<UserNutrition> {
    let user = get_user(conn, user_id).await?;
    let nutrition_plan = match user.nutrition_plan_id {
        Some(plan_id) => nutrition::get_plan(conn, plan_id).await?,
        None => None,
    };

    Ok(UserNutrition {
        user_id: user.id,
        targets: user.targets,
        nutrition_plan,
    })
}

/// Case-insensitive substring search on email or username.
pub async fn search_users(conn: &mut DbConn, query: &str) -> Result<Vec<User>> {
    let query = query.trim();
    if query.is_empty() {
        return Err(Error::validation("query", "Search query is required"));
    }
    users::search_users(conn, query).await
}

/// Hashes a password into an Argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))
}

/// Verifies a password against a password hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| Error::Internal(format!("Invalid password hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(Error::Internal(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}
