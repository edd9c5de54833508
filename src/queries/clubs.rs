use crate::{
    error::{Error, Result, ValidationErrors},
    models::{
        clubs::{Club, NewClub},
        users::User,
    },
};
use uuid::Uuid;

use crate::DbConn;

/// Creates a new club in the database. A duplicate name is a validation error.
pub async fn create_club(conn: &mut DbConn, new_club: NewClub) -> Result<Club> {
    let club = sqlx::query_as::<_, Club>(
        r#"
        INSERT INTO clubs (id, name, description, image, owner_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, description, image, owner_id, created_at
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(&new_club.name)
    .bind(&new_club.description)
    .bind(&new_club.image)
    .bind(new_club.owner_id)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        if e.to_string().to_lowercase().contains("clubs_name_key") {
            Error::Validation(ValidationErrors::Single {
                field: "name".to_string(),
                message: "A club with this name already exists".to_string(),
            })
        } else {
            Error::Sqlx(e)
        }
    })?;

    Ok(club)
}

/// Gets a club by its unique name. The club may not exist.
pub async fn get_club_by_name(conn: &mut DbConn, name: &str) -> Result<Option<Club>> {
    let club = sqlx::query_as::<_, Club>(
        r#"
        SELECT id, name, description, image, owner_id, created_at
        FROM clubs
        WHERE name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(club)
}

/// Gets a club by ID. Expects the club to exist.
pub async fn get_club_by_id(conn: &mut DbConn, id: Uuid) -> Result<Club> {
    let club = sqlx::query_as::<_, Club>(
        r#"
        SELECT id, name, description, image, owner_id, created_at
        FROM clubs
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?
    .ok_or_else(|| Error::NotFound(format!("Club with ID {} not found", id)))?;

    Ok(club)
}

/// Lists every club the user is a member of, by name.
pub async fn list_clubs_for_user(conn: &mut DbConn, user_id: Uuid) -> Result<Vec<Club>> {
    let clubs = sqlx::query_as::<_, Club>(
        r#"
        SELECT c.id, c.name, c.description, c.image, c.owner_id, c.created_at
        FROM clubs c
        JOIN club_members m ON m.club_id = c.id
        WHERE m.user_id = $1
        ORDER BY c.name ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(clubs)
}

/// Adds a user to a club. Returns false when the user was already a member.
pub async fn add_member(conn: &mut DbConn, club_id: Uuid, user_id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO club_members (club_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT (club_id, user_id) DO NOTHING
        "#,
    )
    .bind(club_id)
    .bind(user_id)
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(result.rows_affected() > 0)
}

/// Removes a user from a club. Returns false when the user was not a member.
pub async fn remove_member(conn: &mut DbConn, club_id: Uuid, user_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM club_members WHERE club_id = $1 AND user_id = $2")
        .bind(club_id)
        .bind(user_id)
        .execute(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(result.rows_affected() > 0)
}

pub async fn is_member(conn: &mut DbConn, club_id: Uuid, user_id: Uuid) -> Result<bool> {
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM club_members WHERE club_id = $1 AND user_id = $2)",
    )
    .bind(club_id)
    .bind(user_id)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(exists)
}

/// Lists the members of a club in join order.
pub async fn list_members(conn: &mut DbConn, club_id: Uuid) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.username, u.email, u.password_hash, u.age, u.weight, u.height,
               u.activity_level, u.vegan, u.vegetarian, u.nutrition_plan_id,
               u.daily_calories, u.carbohydrates_g, u.proteins_g, u.fats_g,
               u.boron_mg, u.calcium_mg, u.iron_mg, u.selenium_ug, u.zinc_mg, u.sodium_mg,
               u.created_at, u.updated_at
        FROM users u
        JOIN club_members m ON m.user_id = u.id
        WHERE m.club_id = $1
        ORDER BY m.joined_at ASC, u.username ASC
        "#,
    )
    .bind(club_id)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(users)
}
