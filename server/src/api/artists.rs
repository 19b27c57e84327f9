use axum::extract::{Path, Query, State};
use axum::Json;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, LoaderTrait,
    ModelTrait, PaginatorTrait, QueryFilter, TransactionTrait,
};
use sea_query::{Expr, Func};
use time::OffsetDateTime;

use super::documents::{
    seeking_flag, ArtistDetails, ArtistForm, EntitySummary, MutationResponse, NamedEntity,
    SearchResults, VenueShowRecord,
};
use super::{AppState, Error, SearchQuery};
use crate::format;
use entity::Genres;

async fn upcoming_count<C>(db: &C, artist_id: i32, now: OffsetDateTime) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    entity::ShowEntity::find()
        .filter(entity::ShowColumn::ArtistId.eq(artist_id))
        .filter(entity::ShowColumn::StartTime.gte(now))
        .count(db)
        .await
}

/// The flat id/name artist directory.
pub async fn all<C>(db: &C) -> Result<Vec<NamedEntity>, DbErr>
where
    C: ConnectionTrait,
{
    Ok(entity::ArtistEntity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|artist| NamedEntity {
            id: artist.id,
            name: artist.name,
        })
        .collect())
}

/// All artists whose name contains `term` as a case-insensitive substring.
/// An empty term matches every artist.
pub async fn search<C>(db: &C, term: &str, now: OffsetDateTime) -> Result<SearchResults, DbErr>
where
    C: ConnectionTrait,
{
    let matches = entity::ArtistEntity::find()
        .filter(
            Expr::expr(Func::lower(Expr::col((
                entity::ArtistEntity,
                entity::ArtistColumn::Name,
            ))))
            .like(format!("%{}%", term.to_lowercase())),
        )
        .all(db)
        .await?;

    let mut data = Vec::with_capacity(matches.len());
    for artist in matches {
        data.push(EntitySummary {
            id: artist.id,
            num_upcoming_shows: upcoming_count(db, artist.id, now).await?,
            name: artist.name,
        });
    }
    Ok(SearchResults {
        count: data.len(),
        data,
    })
}

/// The artist with its shows partitioned into past and upcoming relative to
/// `now`, each entry joined with the hosting venue.
pub async fn details<C>(db: &C, artist_id: i32, now: OffsetDateTime) -> Result<ArtistDetails, Error>
where
    C: ConnectionTrait,
{
    let artist = entity::ArtistEntity::find_by_id(artist_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound(None))?;
    let shows = artist.find_related(entity::ShowEntity).all(db).await?;
    let venues = shows.load_one(entity::VenueEntity, db).await?;

    let mut past_shows = Vec::new();
    let mut upcoming_shows = Vec::new();
    for (show, venue) in shows.iter().zip(venues) {
        let venue = venue.ok_or(Error::NotFound(None))?;
        let record = VenueShowRecord {
            venue_id: venue.id,
            venue_name: venue.name,
            venue_image_link: venue.image_link,
            start_time: format::short(&show.start_time)?,
        };
        if show.start_time < now {
            past_shows.push(record);
        } else {
            upcoming_shows.push(record);
        }
    }

    Ok(ArtistDetails {
        id: artist.id,
        name: artist.name,
        genres: artist.genres,
        city: artist.city,
        state: artist.state,
        phone: artist.phone,
        website: artist.website,
        facebook_link: artist.facebook_link,
        seeking_venue: artist.seeking_venue,
        seeking_description: artist.seeking_description,
        image_link: artist.image_link,
        past_shows_count: past_shows.len(),
        upcoming_shows_count: upcoming_shows.len(),
        past_shows,
        upcoming_shows,
    })
}

fn to_active(form: &ArtistForm) -> entity::ArtistActive {
    entity::ArtistActive {
        id: ActiveValue::NotSet,
        name: ActiveValue::Set(form.name.clone()),
        city: ActiveValue::Set(form.city.clone()),
        state: ActiveValue::Set(form.state.clone()),
        phone: ActiveValue::Set(form.phone.clone()),
        genres: ActiveValue::Set(Genres(form.genres.clone())),
        image_link: ActiveValue::Set(form.image_link.clone()),
        facebook_link: ActiveValue::Set(form.facebook_link.clone()),
        website: ActiveValue::Set(form.website.clone()),
        seeking_venue: ActiveValue::Set(seeking_flag(&form.seeking_venue)),
        seeking_description: ActiveValue::Set(form.seeking_description.clone()),
    }
}

pub async fn create<C>(db: &C, form: &ArtistForm) -> Result<entity::Artist, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let tx = db.begin().await?;
    let artist = to_active(form).insert(&tx).await?;
    tx.commit().await?;
    Ok(artist)
}

/// Overwrites every field of the artist from the form. Full replace, no
/// partial-update semantics.
pub async fn update<C>(db: &C, artist_id: i32, form: &ArtistForm) -> Result<entity::Artist, Error>
where
    C: ConnectionTrait + TransactionTrait,
{
    let tx = db.begin().await?;
    entity::ArtistEntity::find_by_id(artist_id)
        .one(&tx)
        .await?
        .ok_or(Error::NotFound(None))?;
    let mut artist = to_active(form);
    artist.id = ActiveValue::Unchanged(artist_id);
    let artist = artist.update(&tx).await?;
    tx.commit().await?;
    Ok(artist)
}

pub async fn artists(State(AppState(db)): State<AppState>) -> Result<Json<Vec<NamedEntity>>, Error> {
    Ok(Json(all(&db).await?))
}

pub async fn search_artists(
    State(AppState(db)): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResults>, Error> {
    Ok(Json(
        search(&db, &query.search_term, OffsetDateTime::now_utc()).await?,
    ))
}

pub async fn show_artist(
    State(AppState(db)): State<AppState>,
    Path(artist_id): Path<i32>,
) -> Result<Json<ArtistDetails>, Error> {
    Ok(Json(
        details(&db, artist_id, OffsetDateTime::now_utc()).await?,
    ))
}

pub async fn create_artist_form() -> Json<ArtistForm> {
    Json(ArtistForm::default())
}

pub async fn create_artist_submission(
    State(AppState(db)): State<AppState>,
    Json(form): Json<ArtistForm>,
) -> Result<Json<MutationResponse>, Error> {
    let artist = create(&db, &form).await?;
    tracing::info! {artist = %artist.name, id = artist.id, "Listed artist"};
    Ok(Json(MutationResponse {
        id: artist.id,
        message: format!("Artist {} was successfully listed!", artist.name),
    }))
}

/// Seeds the edit form with the stored field values.
pub async fn edit_artist(
    State(AppState(db)): State<AppState>,
    Path(artist_id): Path<i32>,
) -> Result<Json<ArtistForm>, Error> {
    let artist = entity::ArtistEntity::find_by_id(artist_id)
        .one(&db)
        .await?
        .ok_or(Error::NotFound(None))?;
    Ok(Json(artist.into()))
}

pub async fn edit_artist_submission(
    State(AppState(db)): State<AppState>,
    Path(artist_id): Path<i32>,
    Json(form): Json<ArtistForm>,
) -> Result<Json<MutationResponse>, Error> {
    let artist = update(&db, artist_id, &form).await?;
    Ok(Json(MutationResponse {
        id: artist.id,
        message: format!("Artist {} was successfully updated!", artist.name),
    }))
}
