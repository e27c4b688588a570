use mongodb::bson;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure of a pagination request.
///
/// Coercion of `limit`, `offset` and `page` never produces an error; invalid
/// numbers silently degrade to their defaults.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The count or the find issued against the collection failed.
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// A populate path has no relation registered on the source.
    #[error("unknown relation `{0}`")]
    UnknownRelation(String),

    /// A document could not be decoded, e.g. an invalid collation or a
    /// record that does not match the hydration target.
    #[error("BSON decoding error: {0}")]
    Deserialize(#[from] bson::de::Error),

    /// A nested page could not be encoded back into a record.
    #[error("BSON encoding error: {0}")]
    Serialize(#[from] bson::ser::Error),
}
