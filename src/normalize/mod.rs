//! Text normalizers shared by the aggregator: price text and product names.

pub mod name;
pub mod price;

pub use name::canonical_name;
pub use price::parse_price;
