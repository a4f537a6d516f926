//! Shared data types for the livechannel channel store.
//!
//! This crate defines the records exchanged between the channel store, the
//! reconciler and anything that produces desired channel lists (tuner scans,
//! playlist importers, the CLI).
//!
//! # Channel identity
//!
//! A channel row has two identities:
//!
//! - a store-assigned row id ([`Channel::id`]), `None` until persisted
//! - a [`NaturalKey`] (service id, transport stream id, original network id)
//!   which recognises the same logical channel across synchronisation runs
//!
//! ```rust
//! use livechannel_types::{Channel, NaturalKey};
//!
//! let ch = Channel::new(1024, 32736, 0x7FE8).with_display_name("NHK総合");
//! assert_eq!(ch.id, None);
//! assert_eq!(ch.natural_key(), NaturalKey::new(1024, 32736, 0x7FE8));
//! ```
//!
//! # Ratings and formats
//!
//! ```rust
//! use livechannel_types::rating::{parse_content_ratings, video_format_for_height};
//!
//! let ratings = parse_content_ratings("com.android.tv/US_TV/US_TV_PG").unwrap().unwrap();
//! assert_eq!(ratings[0].rating, "US_TV_PG");
//! assert_eq!(video_format_for_height(1080), Some("VIDEO_FORMAT_1080P"));
//! ```

pub mod columns;
pub mod error;
pub mod rating;
pub mod types;

pub use error::ContractError;
pub use rating::{ContentRating, SourceType};
pub use types::{Channel, InputSource, InputState, NaturalKey};
