pub mod contentful;
pub mod indexer;

pub use contentful::{ContentfulClient, ContentfulSettings};
pub use indexer::IndexerClient;
