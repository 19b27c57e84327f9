use axum::extract::{Path, Query, State};
use axum::Json;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, LoaderTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QuerySelect, TransactionTrait,
};
use sea_query::{Expr, Func};
use time::OffsetDateTime;

use super::documents::{
    seeking_flag, ArtistShowRecord, EntitySummary, MutationResponse, SearchResults, VenueArea,
    VenueDetails, VenueForm,
};
use super::{AppState, Error, SearchQuery};
use crate::format;
use entity::Genres;

async fn upcoming_count<C>(db: &C, venue_id: i32, now: OffsetDateTime) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    entity::ShowEntity::find()
        .filter(entity::ShowColumn::VenueId.eq(venue_id))
        .filter(entity::ShowColumn::StartTime.gte(now))
        .count(db)
        .await
}

/// Groups all venues under their distinct `(city, state)` pairs. Ordering
/// within and across groups inherits storage iteration order.
pub async fn areas<C>(db: &C, now: OffsetDateTime) -> Result<Vec<VenueArea>, DbErr>
where
    C: ConnectionTrait,
{
    let pairs: Vec<(String, String)> = entity::VenueEntity::find()
        .select_only()
        .column(entity::VenueColumn::City)
        .column(entity::VenueColumn::State)
        .distinct()
        .into_tuple()
        .all(db)
        .await?;

    let mut areas = Vec::with_capacity(pairs.len());
    for (city, state) in pairs {
        let venues = entity::VenueEntity::find()
            .filter(entity::VenueColumn::City.eq(city.as_str()))
            .filter(entity::VenueColumn::State.eq(state.as_str()))
            .all(db)
            .await?;
        let mut summaries = Vec::with_capacity(venues.len());
        for venue in venues {
            summaries.push(EntitySummary {
                id: venue.id,
                num_upcoming_shows: upcoming_count(db, venue.id, now).await?,
                name: venue.name,
            });
        }
        areas.push(VenueArea {
            city,
            state,
            venues: summaries,
        });
    }
    Ok(areas)
}

/// All venues whose name contains `term` as a case-insensitive substring. An
/// empty term matches every venue.
pub async fn search<C>(db: &C, term: &str, now: OffsetDateTime) -> Result<SearchResults, DbErr>
where
    C: ConnectionTrait,
{
    let matches = entity::VenueEntity::find()
        .filter(
            Expr::expr(Func::lower(Expr::col((
                entity::VenueEntity,
                entity::VenueColumn::Name,
            ))))
            .like(format!("%{}%", term.to_lowercase())),
        )
        .all(db)
        .await?;

    let mut data = Vec::with_capacity(matches.len());
    for venue in matches {
        data.push(EntitySummary {
            id: venue.id,
            num_upcoming_shows: upcoming_count(db, venue.id, now).await?,
            name: venue.name,
        });
    }
    Ok(SearchResults {
        count: data.len(),
        data,
    })
}

/// The venue with its shows partitioned into past and upcoming relative to
/// `now`, each entry joined with the performing artist.
pub async fn details<C>(db: &C, venue_id: i32, now: OffsetDateTime) -> Result<VenueDetails, Error>
where
    C: ConnectionTrait,
{
    let venue = entity::VenueEntity::find_by_id(venue_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound(None))?;
    let shows = venue.find_related(entity::ShowEntity).all(db).await?;
    let artists = shows.load_one(entity::ArtistEntity, db).await?;

    let mut past_shows = Vec::new();
    let mut upcoming_shows = Vec::new();
    for (show, artist) in shows.iter().zip(artists) {
        let artist = artist.ok_or(Error::NotFound(None))?;
        let record = ArtistShowRecord {
            artist_id: artist.id,
            artist_name: artist.name,
            artist_image_link: artist.image_link,
            start_time: format::short(&show.start_time)?,
        };
        if show.start_time < now {
            past_shows.push(record);
        } else {
            upcoming_shows.push(record);
        }
    }

    Ok(VenueDetails {
        id: venue.id,
        name: venue.name,
        genres: venue.genres,
        address: venue.address,
        city: venue.city,
        state: venue.state,
        phone: venue.phone,
        website: venue.website,
        facebook_link: venue.facebook_link,
        seeking_talent: venue.seeking_talent,
        seeking_description: venue.seeking_description,
        image_link: venue.image_link,
        past_shows_count: past_shows.len(),
        upcoming_shows_count: upcoming_shows.len(),
        past_shows,
        upcoming_shows,
    })
}

fn to_active(form: &VenueForm) -> entity::VenueActive {
    entity::VenueActive {
        id: ActiveValue::NotSet,
        name: ActiveValue::Set(form.name.clone()),
        city: ActiveValue::Set(form.city.clone()),
        state: ActiveValue::Set(form.state.clone()),
        address: ActiveValue::Set(form.address.clone()),
        phone: ActiveValue::Set(form.phone.clone()),
        image_link: ActiveValue::Set(form.image_link.clone()),
        facebook_link: ActiveValue::Set(form.facebook_link.clone()),
        genres: ActiveValue::Set(Genres(form.genres.clone())),
        website: ActiveValue::Set(form.website.clone()),
        seeking_talent: ActiveValue::Set(seeking_flag(&form.seeking_talent)),
        seeking_description: ActiveValue::Set(form.seeking_description.clone()),
    }
}

pub async fn create<C>(db: &C, form: &VenueForm) -> Result<entity::Venue, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let tx = db.begin().await?;
    let venue = to_active(form).insert(&tx).await?;
    tx.commit().await?;
    Ok(venue)
}

/// Overwrites every field of the venue from the form. Full replace, no
/// partial-update semantics.
pub async fn update<C>(db: &C, venue_id: i32, form: &VenueForm) -> Result<entity::Venue, Error>
where
    C: ConnectionTrait + TransactionTrait,
{
    let tx = db.begin().await?;
    entity::VenueEntity::find_by_id(venue_id)
        .one(&tx)
        .await?
        .ok_or(Error::NotFound(None))?;
    let mut venue = to_active(form);
    venue.id = ActiveValue::Unchanged(venue_id);
    let venue = venue.update(&tx).await?;
    tx.commit().await?;
    Ok(venue)
}

/// Deletes the venue unless shows still reference it, in which case the
/// deletion is rejected with a conflict.
pub async fn remove<C>(db: &C, venue_id: i32) -> Result<entity::Venue, Error>
where
    C: ConnectionTrait + TransactionTrait,
{
    let tx = db.begin().await?;
    let venue = entity::VenueEntity::find_by_id(venue_id)
        .one(&tx)
        .await?
        .ok_or(Error::NotFound(None))?;
    let dependents = entity::ShowEntity::find()
        .filter(entity::ShowColumn::VenueId.eq(venue_id))
        .count(&tx)
        .await?;
    if dependents > 0 {
        return Err(Error::Conflict(format!(
            "Venue {} still has {} booked shows",
            venue.name, dependents
        )));
    }
    venue.clone().delete(&tx).await?;
    tx.commit().await?;
    Ok(venue)
}

pub async fn venues(State(AppState(db)): State<AppState>) -> Result<Json<Vec<VenueArea>>, Error> {
    Ok(Json(areas(&db, OffsetDateTime::now_utc()).await?))
}

pub async fn search_venues(
    State(AppState(db)): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResults>, Error> {
    Ok(Json(
        search(&db, &query.search_term, OffsetDateTime::now_utc()).await?,
    ))
}

pub async fn show_venue(
    State(AppState(db)): State<AppState>,
    Path(venue_id): Path<i32>,
) -> Result<Json<VenueDetails>, Error> {
    Ok(Json(details(&db, venue_id, OffsetDateTime::now_utc()).await?))
}

pub async fn create_venue_form() -> Json<VenueForm> {
    Json(VenueForm::default())
}

pub async fn create_venue_submission(
    State(AppState(db)): State<AppState>,
    Json(form): Json<VenueForm>,
) -> Result<Json<MutationResponse>, Error> {
    let venue = create(&db, &form).await?;
    tracing::info! {venue = %venue.name, id = venue.id, "Listed venue"};
    Ok(Json(MutationResponse {
        id: venue.id,
        message: format!("Venue {} was successfully listed!", venue.name),
    }))
}

pub async fn delete_venue(
    State(AppState(db)): State<AppState>,
    Path(venue_id): Path<i32>,
) -> Result<Json<MutationResponse>, Error> {
    let venue = remove(&db, venue_id).await?;
    tracing::info! {venue = %venue.name, id = venue.id, "Deleted venue"};
    Ok(Json(MutationResponse {
        id: venue.id,
        message: format!("Successfully deleted Venue {}", venue.name),
    }))
}

/// Seeds the edit form with the stored field values.
pub async fn edit_venue(
    State(AppState(db)): State<AppState>,
    Path(venue_id): Path<i32>,
) -> Result<Json<VenueForm>, Error> {
    let venue = entity::VenueEntity::find_by_id(venue_id)
        .one(&db)
        .await?
        .ok_or(Error::NotFound(None))?;
    Ok(Json(venue.into()))
}

pub async fn edit_venue_submission(
    State(AppState(db)): State<AppState>,
    Path(venue_id): Path<i32>,
    Json(form): Json<VenueForm>,
) -> Result<Json<MutationResponse>, Error> {
    let venue = update(&db, venue_id, &form).await?;
    Ok(Json(MutationResponse {
        id: venue.id,
        message: format!("Venue {} was successfully updated!", venue.name),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{seed_artist, seed_show, seed_venue, test_db};
    use time::macros::datetime;

    #[tokio::test]
    async fn venues_sharing_a_city_group_under_one_area() {
        let db = test_db().await;
        seed_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        seed_venue(&db, "Park Square Live Music & Coffee", "San Francisco", "CA").await;
        seed_venue(&db, "The Dueling Pianos Bar", "New York", "NY").await;

        let areas = areas(&db, datetime!(2020-01-01 0:00 UTC)).await.unwrap();
        assert_eq!(areas.len(), 2);
        let sf = areas
            .iter()
            .find(|a| a.city == "San Francisco" && a.state == "CA")
            .unwrap();
        assert_eq!(sf.venues.len(), 2);
        let ny = areas
            .iter()
            .find(|a| a.city == "New York" && a.state == "NY")
            .unwrap();
        assert_eq!(ny.venues.len(), 1);
    }

    #[tokio::test]
    async fn search_matches_substrings_case_insensitively() {
        let db = test_db().await;
        seed_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        seed_venue(&db, "Park Square Live Music & Coffee", "San Francisco", "CA").await;
        let now = datetime!(2020-01-01 0:00 UTC);

        let results = search(&db, "hop", now).await.unwrap();
        assert_eq!(results.count, 1);
        assert_eq!(results.data[0].name, "The Musical Hop");

        let results = search(&db, "Music", now).await.unwrap();
        assert_eq!(results.count, 2);

        let results = search(&db, "", now).await.unwrap();
        assert_eq!(results.count, 2);

        let results = search(&db, "no such venue", now).await.unwrap();
        assert_eq!(results.count, 0);
    }

    #[tokio::test]
    async fn search_reports_true_upcoming_counts() {
        let db = test_db().await;
        let venue = seed_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let artist = seed_artist(&db, "Guns N Petals").await;
        let now = datetime!(2020-01-01 0:00 UTC);
        seed_show(&db, venue.id, artist.id, datetime!(2019-05-21 21:30 UTC)).await;
        seed_show(&db, venue.id, artist.id, datetime!(2020-06-15 20:00 UTC)).await;

        let results = search(&db, "hop", now).await.unwrap();
        assert_eq!(results.data[0].num_upcoming_shows, 1);
    }

    #[tokio::test]
    async fn details_partitions_shows_without_overlap() {
        let db = test_db().await;
        let venue = seed_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let artist = seed_artist(&db, "Guns N Petals").await;
        let now = datetime!(2020-01-01 0:00 UTC);
        seed_show(&db, venue.id, artist.id, datetime!(2019-05-21 21:30 UTC)).await;
        seed_show(&db, venue.id, artist.id, datetime!(2019-12-31 23:00 UTC)).await;
        seed_show(&db, venue.id, artist.id, datetime!(2020-06-15 20:00 UTC)).await;
        // a show starting exactly at the evaluation instant counts as upcoming
        seed_show(&db, venue.id, artist.id, now).await;

        let details = details(&db, venue.id, now).await.unwrap();
        assert_eq!(details.past_shows_count, 2);
        assert_eq!(details.upcoming_shows_count, 2);
        assert_eq!(details.past_shows.len(), 2);
        assert_eq!(details.upcoming_shows.len(), 2);
        assert_eq!(details.past_shows[0].artist_name, "Guns N Petals");
        assert_eq!(details.past_shows[0].start_time, "05/21/2019, 21:30");
    }

    #[tokio::test]
    async fn details_of_a_missing_venue_is_not_found() {
        let db = test_db().await;
        let err = details(&db, 42, datetime!(2020-01-01 0:00 UTC))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn create_coerces_the_seeking_flag_from_the_true_literal() {
        let db = test_db().await;
        let form = VenueForm {
            name: "The Musical Hop".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            genres: vec!["Jazz".to_string(), "Reggae".to_string()],
            seeking_talent: Some("True".to_string()),
            ..VenueForm::default()
        };
        let venue = create(&db, &form).await.unwrap();
        assert!(venue.seeking_talent);
        assert_eq!(venue.genres, Genres(vec!["Jazz".to_string(), "Reggae".to_string()]));

        let form = VenueForm {
            name: "Park Square Live Music & Coffee".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            seeking_talent: Some("true".to_string()),
            ..VenueForm::default()
        };
        let venue = create(&db, &form).await.unwrap();
        assert!(!venue.seeking_talent);
    }

    #[tokio::test]
    async fn update_overwrites_every_field() {
        let db = test_db().await;
        let venue = seed_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let form = VenueForm {
            name: "The Musical Hop".to_string(),
            city: "Oakland".to_string(),
            state: "CA".to_string(),
            phone: Some("123-123-1234".to_string()),
            ..VenueForm::default()
        };
        let updated = update(&db, venue.id, &form).await.unwrap();
        assert_eq!(updated.city, "Oakland");
        assert_eq!(updated.phone.as_deref(), Some("123-123-1234"));
        // fields absent from the form are cleared, not preserved
        assert_eq!(updated.image_link, None);
        assert_eq!(updated.genres, Genres(vec![]));
    }

    #[tokio::test]
    async fn update_of_a_missing_venue_is_not_found() {
        let db = test_db().await;
        let err = update(&db, 42, &VenueForm::default()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn remove_deletes_a_venue_without_shows() {
        let db = test_db().await;
        let venue = seed_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        remove(&db, venue.id).await.unwrap();
        let left = entity::VenueEntity::find().all(&db).await.unwrap();
        assert!(left.is_empty());
    }

    #[tokio::test]
    async fn remove_rejects_a_venue_with_dependent_shows() {
        let db = test_db().await;
        let venue = seed_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let artist = seed_artist(&db, "Guns N Petals").await;
        seed_show(&db, venue.id, artist.id, datetime!(2019-05-21 21:30 UTC)).await;

        let err = remove(&db, venue.id).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        // neither the venue nor its show went anywhere
        assert!(entity::VenueEntity::find_by_id(venue.id)
            .one(&db)
            .await
            .unwrap()
            .is_some());
        assert_eq!(entity::ShowEntity::find().all(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn listing_scenario_reports_counts_after_a_past_show() {
        let db = test_db().await;
        let form = VenueForm {
            name: "The Musical Hop".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            seeking_talent: Some("True".to_string()),
            ..VenueForm::default()
        };
        let venue = create(&db, &form).await.unwrap();
        let now = datetime!(2020-01-01 0:00 UTC);

        let view = details(&db, venue.id, now).await.unwrap();
        assert!(view.seeking_talent);
        assert_eq!(view.past_shows_count, 0);
        assert_eq!(view.upcoming_shows_count, 0);

        let artist = seed_artist(&db, "Guns N Petals").await;
        seed_show(&db, venue.id, artist.id, datetime!(2019-05-21 21:30 UTC)).await;
        let view = details(&db, venue.id, now).await.unwrap();
        assert_eq!(view.past_shows_count, 1);
        assert_eq!(view.upcoming_shows_count, 0);
    }
}
