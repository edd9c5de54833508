use crate::{
    error::{Error, Result, ValidationErrors},
    models::users::{NewUser, User},
};
use uuid::Uuid;

use crate::DbConn;

const USER_COLUMNS: &str = r#"
    id, username, email, password_hash, age, weight, height, activity_level,
    vegan, vegetarian, nutrition_plan_id,
    daily_calories, carbohydrates_g, proteins_g, fats_g,
    boron_mg, calcium_mg, iron_mg, selenium_ug, zinc_mg, sodium_mg,
    created_at, updated_at
"#;

/// Creates a new user in the database.
pub async fn create_user(conn: &mut DbConn, new_user: NewUser) -> Result<User> {
    let sql = format!(
        r#"
        INSERT INTO users (id, username, email, password_hash)
        VALUES ($1, $2, $3, $4)
        RETURNING {USER_COLUMNS}
        "#
    );

    let user = sqlx::query_as::<_, User>(&sql)
        .bind(Uuid::now_v7())
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            let error_msg = e.to_string().to_lowercase();

            // Unique constraint violations surface as field errors
            if error_msg.contains("users_username_key") {
                Error::Validation(ValidationErrors::Single {
                    field: "username".to_string(),
                    message: "Username already taken".to_string(),
                })
            } else if error_msg.contains("users_email_key") {
                Error::Validation(ValidationErrors::Single {
                    field: "email".to_string(),
                    message: "Email already in use".to_string(),
                })
            } else {
                Error::Sqlx(e)
            }
        })?;

    Ok(user)
}

/// Gets a single user by their ID. The user may not exist.
pub async fn get_user_by_id(conn: &mut DbConn, id: Uuid) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(user)
}

/// Gets a single user by their username. The user may not exist.
pub async fn get_user_by_username(conn: &mut DbConn, username: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");

    let user = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(user)
}

/// Gets a single user by their email address, case-insensitively. The user may not exist.
pub async fn get_user_by_email(conn: &mut DbConn, email: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)");

    let user = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(user)
}

/// Whether a username or email is already registered.
pub async fn username_or_email_taken(
    conn: &mut DbConn,
    username: &str,
    email: &str,
) -> Result<(bool, bool)> {
    let (username_taken, email_taken): (bool, bool) = sqlx::query_as(
        r#"
        SELECT
            EXISTS(SELECT 1 FROM users WHERE username = $1),
            EXISTS(SELECT 1 FROM users WHERE lower(email) = lower($2))
        "#,
    )
    .bind(username)
    .bind(email)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok((username_taken, email_taken))
}

/// Case-insensitive substring search on email or username.
pub async fn search_users(conn: &mut DbConn, needle: &str) -> Result<Vec<User>> {
    let sql = format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE email ILIKE $1 OR username ILIKE $1
        ORDER BY username ASC
        "#
    );

    let users = sqlx::query_as::<_, User>(&sql)
        .bind(format!("%{}%", escape_like(needle)))
        .fetch_all(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(users)
}

/// Writes every profile column of `user` back to the database.
pub async fn update_user(conn: &mut DbConn, user: &User) -> Result<User> {
    let sql = format!(
        r#"
        UPDATE users
        SET age = $1, weight = $2, height = $3, activity_level = $4,
            vegan = $5, vegetarian = $6, nutrition_plan_id = $7,
            daily_calories = $8, carbohydrates_g = $9, proteins_g = $10, fats_g = $11,
            boron_mg = $12, calcium_mg = $13, iron_mg = $14, selenium_ug = $15,
            zinc_mg = $16, sodium_mg = $17,
            updated_at = now()
        WHERE id = $18
        RETURNING {USER_COLUMNS}
        "#
    );

    let targets = &user.targets;
    let updated_user = sqlx::query_as::<_, User>(&sql)
        .bind(user.age)
        .bind(&user.weight)
        .bind(&user.height)
        .bind(user.activity_level)
        .bind(user.vegan)
        .bind(user.vegetarian)
        .bind(user.nutrition_plan_id)
        .bind(&targets.daily_calories)
        .bind(&targets.carbohydrates_g)
        .bind(&targets.proteins_g)
        .bind(&targets.fats_g)
        .bind(&targets.boron_mg)
        .bind(&targets.calcium_mg)
        .bind(&targets.iron_mg)
        .bind(&targets.selenium_ug)
        .bind(&targets.zinc_mg)
        .bind(&targets.sodium_mg)
        .bind(user.id)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?
        .ok_or_else(|| Error::NotFound(format!("User with ID {} not found", user.id)))?;

    Ok(updated_user)
}

/// Escapes `%`, `_` and `\` so user input is matched literally inside LIKE patterns.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
