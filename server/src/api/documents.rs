use entity::Genres;
use serde::{Deserialize, Serialize};

/// A bare id/name pair, used by the flat artist listing and by the show form
/// options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntity {
    pub id: i32,
    pub name: String,
}

/// A search or listing hit, with its upcoming show count computed relative
/// to the evaluation instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySummary {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: u64,
}

/// One `(city, state)` group of the venue listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueArea {
    pub city: String,
    pub state: String,
    pub venues: Vec<EntitySummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<EntitySummary>,
}

/// A show entry on a venue detail page: the artist side of the join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistShowRecord {
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

/// A show entry on an artist detail page: the venue side of the join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueShowRecord {
    pub venue_id: i32,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub start_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueDetails {
    pub id: i32,
    pub name: String,
    pub genres: Genres,
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    pub past_shows: Vec<ArtistShowRecord>,
    pub upcoming_shows: Vec<ArtistShowRecord>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistDetails {
    pub id: i32,
    pub name: String,
    pub genres: Genres,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    pub past_shows: Vec<VenueShowRecord>,
    pub upcoming_shows: Vec<VenueShowRecord>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

/// One flattened record of the shows listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowRecord {
    pub venue_id: i32,
    pub venue_name: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

/// The response to a successful mutation, carrying the user-facing message
/// the templates flash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResponse {
    pub id: i32,
    pub message: String,
}

/// The typed venue form body. The create and edit endpoints bind the whole
/// request to this DTO before anything reaches the mutation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueForm {
    pub name: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub image_link: Option<String>,
    #[serde(default)]
    pub facebook_link: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub seeking_talent: Option<String>,
    #[serde(default)]
    pub seeking_description: Option<String>,
}

impl From<entity::Venue> for VenueForm {
    fn from(venue: entity::Venue) -> Self {
        Self {
            name: venue.name,
            city: venue.city,
            state: venue.state,
            address: venue.address,
            phone: venue.phone,
            genres: venue.genres.0,
            image_link: venue.image_link,
            facebook_link: venue.facebook_link,
            website: venue.website,
            seeking_talent: venue.seeking_talent.then(|| "True".to_string()),
            seeking_description: venue.seeking_description,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistForm {
    pub name: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub image_link: Option<String>,
    #[serde(default)]
    pub facebook_link: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub seeking_venue: Option<String>,
    #[serde(default)]
    pub seeking_description: Option<String>,
}

impl From<entity::Artist> for ArtistForm {
    fn from(artist: entity::Artist) -> Self {
        Self {
            name: artist.name,
            city: artist.city,
            state: artist.state,
            phone: artist.phone,
            genres: artist.genres.0,
            image_link: artist.image_link,
            facebook_link: artist.facebook_link,
            website: artist.website,
            seeking_venue: artist.seeking_venue.then(|| "True".to_string()),
            seeking_description: artist.seeking_description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowForm {
    pub venue_id: i32,
    pub artist_id: i32,
    pub start_time: String,
}

/// The data the new-show form needs: the selectable venues and artists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowFormOptions {
    pub venues: Vec<NamedEntity>,
    pub artists: Vec<NamedEntity>,
}

/// The booking forms submit seeking flags as the literal string `"True"`;
/// any other value, including omission, reads as false.
pub fn seeking_flag(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some("True"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_models_serialize_in_template_shape() {
        let area = VenueArea {
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            venues: vec![EntitySummary {
                id: 1,
                name: "The Musical Hop".to_string(),
                num_upcoming_shows: 0,
            }],
        };
        assert_eq!(
            serde_json::to_value(&area).unwrap(),
            serde_json::json!({
                "city": "San Francisco",
                "state": "CA",
                "venues": [{"id": 1, "name": "The Musical Hop", "num_upcoming_shows": 0}]
            })
        );
    }

    #[test]
    fn seeking_flag_only_accepts_the_true_literal() {
        assert!(seeking_flag(&Some("True".to_string())));
        assert!(!seeking_flag(&Some("true".to_string())));
        assert!(!seeking_flag(&Some("False".to_string())));
        assert!(!seeking_flag(&Some(String::new())));
        assert!(!seeking_flag(&None));
    }
}
