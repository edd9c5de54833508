use crate::DbConn;
use crate::{
    error::{Error, Result},
    models::{
        clubs::{Club, ClubRole, CreateClubRequest, MemberEmailRequest, NewClub},
        users::User,
    },
    queries::{clubs, users},
    validation::{sanitize_string, validate_club_name, validate_email},
};
use sqlx::Acquire;
use uuid::Uuid;

/// Creates a club owned by `owner_id` and records the owner as its first member.
pub async fn create_club(
    conn: &mut DbConn,
    owner_id: Uuid,
    request: CreateClubRequest,
) -> Result<Club> {
    let name = validate_club_name(&request.name)?;
    let description = request
        .description
        .as_deref()
        .map(sanitize_string)
        .unwrap_or_default();

    let mut tx = conn
        .begin()
        .await
        .map_err(|e| Error::Internal(format!("Failed to begin transaction: {}", e)))?;

    let club = clubs::create_club(
        &mut tx,
        NewClub {
            name,
            description,
            image: request.image,
            owner_id,
        },
    )
    .await?;
    clubs::add_member(&mut tx, club.id, owner_id).await?;

    tx.commit()
        .await
        .map_err(|e| Error::Internal(format!("Failed to commit transaction: {}", e)))?;

    Ok(club)
}

/// Returns the named club, creating it with `user_id` as owner when it does not exist.
pub async fn get_or_create_club(conn: &mut DbConn, name: &str, user_id: Uuid) -> Result<Club> {
    let name = validate_club_name(name)?;
    if let Some(club) = clubs::get_club_by_name(conn, &name).await? {
        return Ok(club);
    }

    create_club(
        conn,
        user_id,
        CreateClubRequest {
            name,
            description: None,
            image: None,
        },
    )
    .await
}

/// Gets a club by name, failing with NotFound if it does not exist.
pub async fn get_club(conn: &mut DbConn, name: &str) -> Result<Club> {
    clubs::get_club_by_name(conn, name)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Club '{}' not found", name)))
}

pub async fn list_user_clubs(conn: &mut DbConn, user_id: Uuid) -> Result<Vec<Club>> {
    clubs::list_clubs_for_user(conn, user_id).await
}

/// How `user_id` relates to `club`, if at all.
pub async fn role_in_club(conn: &mut DbConn, club: &Club, user_id: Uuid) -> Result<Option<ClubRole>> {
    if club.owner_id == user_id {
        return Ok(Some(ClubRole::Owner));
    }
    if clubs::is_member(conn, club.id, user_id).await? {
        return Ok(Some(ClubRole::Member));
    }
    Ok(None)
}

/// Fails with Forbidden unless the user owns or belongs to the club.
pub async fn require_owner_or_member(
    conn: &mut DbConn,
    club: &Club,
    user_id: Uuid,
) -> Result<ClubRole> {
    role_in_club(conn, club, user_id).await?.ok_or_else(|| {
        Error::Forbidden(format!(
            "You must be the owner or a member of '{}'",
            club.name
        ))
    })
}

/// Fails with Forbidden unless the user owns the club.
pub fn require_owner(club: &Club, user_id: Uuid) -> Result<()> {
    if club.owner_id != user_id {
        return Err(Error::Forbidden(format!(
            "Only the owner of '{}' can manage its members",
            club.name
        )));
    }
    Ok(())
}

/// Members of the named club. Callers must own or belong to it.
pub async fn list_members(conn: &mut DbConn, club_name: &str, caller_id: Uuid) -> Result<Vec<User>> {
    let club = get_club(conn, club_name).await?;
    require_owner_or_member(conn, &club, caller_id).await?;
    clubs::list_members(conn, club.id).await
}

/// Adds the user with the given email to the club. Owner only.
pub async fn add_member(
    conn: &mut DbConn,
    club_name: &str,
    caller_id: Uuid,
    request: MemberEmailRequest,
) -> Result<User> {
    let club = get_club(conn, club_name).await?;
    require_owner(&club, caller_id)?;

    let user = find_member_candidate(conn, request).await?;
    if !clubs::add_member(conn, club.id, user.id).await? {
        return Err(Error::validation(
            "email",
            format!("{} is already a member of this club", user.email),
        ));
    }

    Ok(user)
}

/// Removes the user with the given email from the club. Owner only; the owner stays.
pub async fn remove_member(
    conn: &mut DbConn,
    club_name: &str,
    caller_id: Uuid,
    request: MemberEmailRequest,
) -> Result<User> {
    let club = get_club(conn, club_name).await?;
    require_owner(&club, caller_id)?;

    let user = find_member_candidate(conn, request).await?;
    if user.id == club.owner_id {
        return Err(Error::validation(
            "email",
            "The club owner cannot be removed from the club",
        ));
    }
    if !clubs::remove_member(conn, club.id, user.id).await? {
        return Err(Error::validation(
            "email",
            format!("{} is not a member of this club", user.email),
        ));
    }

    Ok(user)
}

async fn find_member_candidate(conn: &mut DbConn, request: MemberEmailRequest) -> Result<User> {
    let email = request
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| Error::validation("email", "Email is required"))?;
    validate_email(&email)?;

    users::get_user_by_email(conn, &email)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User with email {} not found", email)))
}
