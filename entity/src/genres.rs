use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An ordered list of genre tags, persisted as a JSON array in a single text
/// column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Genres(pub Vec<String>);
