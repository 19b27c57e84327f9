use entity::Genres;
use migration::Migrator;
use sea_orm::{ActiveModelTrait, ActiveValue, ConnectOptions, Database, DbConn};
use sea_orm_migration::MigratorTrait;
use time::OffsetDateTime;

/// A freshly migrated in-memory database. One connection only, so every
/// query sees the same memory store.
pub async fn test_db() -> DbConn {
    let mut opt = ConnectOptions::new("sqlite::memory:?mode=rwc".to_owned());
    opt.max_connections(1);
    let conn = Database::connect(opt).await.unwrap();
    Migrator::up(&conn, None).await.unwrap();
    conn
}

pub async fn seed_venue(db: &DbConn, name: &str, city: &str, state: &str) -> entity::Venue {
    entity::VenueActive {
        id: ActiveValue::NotSet,
        name: ActiveValue::Set(name.to_string()),
        city: ActiveValue::Set(city.to_string()),
        state: ActiveValue::Set(state.to_string()),
        address: ActiveValue::Set(None),
        phone: ActiveValue::Set(None),
        image_link: ActiveValue::Set(Some(format!("https://img.example/{name}.png"))),
        facebook_link: ActiveValue::Set(None),
        genres: ActiveValue::Set(Genres(vec!["Jazz".to_string()])),
        website: ActiveValue::Set(None),
        seeking_talent: ActiveValue::Set(false),
        seeking_description: ActiveValue::Set(None),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_artist(db: &DbConn, name: &str) -> entity::Artist {
    entity::ArtistActive {
        id: ActiveValue::NotSet,
        name: ActiveValue::Set(name.to_string()),
        city: ActiveValue::Set("San Francisco".to_string()),
        state: ActiveValue::Set("CA".to_string()),
        phone: ActiveValue::Set(None),
        genres: ActiveValue::Set(Genres(vec!["Rock n Roll".to_string()])),
        image_link: ActiveValue::Set(Some(format!("https://img.example/{name}.png"))),
        facebook_link: ActiveValue::Set(None),
        website: ActiveValue::Set(None),
        seeking_venue: ActiveValue::Set(false),
        seeking_description: ActiveValue::Set(None),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_show(
    db: &DbConn,
    venue_id: i32,
    artist_id: i32,
    start_time: OffsetDateTime,
) -> entity::Show {
    entity::ShowActive {
        id: ActiveValue::NotSet,
        start_time: ActiveValue::Set(start_time),
        venue_id: ActiveValue::Set(venue_id),
        artist_id: ActiveValue::Set(artist_id),
    }
    .insert(db)
    .await
    .unwrap()
}
