//! Services for cd-catalog

pub mod discogs_client;
pub mod normalizer;
pub mod ranker;
pub mod similarity;

pub use discogs_client::DiscogsClient;
pub use normalizer::normalize;
pub use ranker::ReleaseRanker;
pub use similarity::similarity;
