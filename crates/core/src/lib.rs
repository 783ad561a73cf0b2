pub mod eligibility;
pub mod error;
pub mod poster;
pub mod types;

pub use eligibility::EligibilityFilter;
pub use poster::{PosterPolicy, PosterRef, PosterSource};
pub use types::{Availability, CatalogItem, CatalogKind, ImageDescriptor, Tag};
