use axum::extract::State;
use axum::Json;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ConnectionTrait, DbErr, EntityTrait, LoaderTrait,
    TransactionTrait,
};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::documents::{MutationResponse, NamedEntity, ShowForm, ShowFormOptions, ShowRecord};
use super::{AppState, Error};
use crate::format;

/// Every show flattened into one record, joined with its venue and artist.
/// A dangling reference fails the whole listing.
pub async fn all<C>(db: &C) -> Result<Vec<ShowRecord>, Error>
where
    C: ConnectionTrait,
{
    let shows = entity::ShowEntity::find().all(db).await?;
    let venues = shows.load_one(entity::VenueEntity, db).await?;
    let artists = shows.load_one(entity::ArtistEntity, db).await?;

    let mut records = Vec::with_capacity(shows.len());
    for ((show, venue), artist) in shows.iter().zip(venues).zip(artists) {
        let venue = venue.ok_or(Error::NotFound(None))?;
        let artist = artist.ok_or(Error::NotFound(None))?;
        records.push(ShowRecord {
            venue_id: venue.id,
            venue_name: venue.name,
            artist_id: artist.id,
            artist_name: artist.name,
            artist_image_link: artist.image_link,
            start_time: format::short(&show.start_time)?,
        });
    }
    Ok(records)
}

/// The selectable venues and artists for the new-show form.
pub async fn options<C>(db: &C) -> Result<ShowFormOptions, DbErr>
where
    C: ConnectionTrait,
{
    let venues = entity::VenueEntity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|venue| NamedEntity {
            id: venue.id,
            name: venue.name,
        })
        .collect();
    let artists = entity::ArtistEntity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|artist| NamedEntity {
            id: artist.id,
            name: artist.name,
        })
        .collect();
    Ok(ShowFormOptions { venues, artists })
}

/// Books an artist into a venue at the submitted start time. The timestamp
/// must be RFC 3339; referential integrity is left to the foreign keys.
pub async fn create<C>(db: &C, form: &ShowForm) -> Result<entity::Show, Error>
where
    C: ConnectionTrait + TransactionTrait,
{
    let start_time = OffsetDateTime::parse(&form.start_time, &Rfc3339)
        .map_err(|e| Error::BadRequest(Some(format!("Invalid start time: {e}"))))?;
    let tx = db.begin().await?;
    let show = entity::ShowActive {
        id: ActiveValue::NotSet,
        start_time: ActiveValue::Set(start_time),
        venue_id: ActiveValue::Set(form.venue_id),
        artist_id: ActiveValue::Set(form.artist_id),
    }
    .insert(&tx)
    .await?;
    tx.commit().await?;
    Ok(show)
}

pub async fn shows(State(AppState(db)): State<AppState>) -> Result<Json<Vec<ShowRecord>>, Error> {
    Ok(Json(all(&db).await?))
}

pub async fn create_show_form(
    State(AppState(db)): State<AppState>,
) -> Result<Json<ShowFormOptions>, Error> {
    Ok(Json(options(&db).await?))
}

pub async fn create_show_submission(
    State(AppState(db)): State<AppState>,
    Json(form): Json<ShowForm>,
) -> Result<Json<MutationResponse>, Error> {
    let show = create(&db, &form).await?;
    tracing::info! {id = show.id, venue = show.venue_id, artist = show.artist_id, "Listed show"};
    Ok(Json(MutationResponse {
        id: show.id,
        message: "Show was successfully listed!".to_string(),
    }))
}
